pub mod char_offsets;
pub mod common_affix_len;
pub mod merge_ascending;
pub mod side;
