mod property_char_buffer;
