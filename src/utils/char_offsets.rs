/// Byte index of the `char_index`-th character of `text`, or `text.len()`
/// when `char_index` points just past the last character.
pub fn byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map_or(text.len(), |(byte_index, _)| byte_index)
}

/// Characters `start..end` of `text`. Out-of-range indices are clamped.
pub fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let start_byte = byte_index(text, start);
    let end_byte = start_byte + byte_index(&text[start_byte..], end.saturating_sub(start));
    &text[start_byte..end_byte]
}
