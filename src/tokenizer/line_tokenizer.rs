use super::token::Token;

/// Splits text into lines, each line keeping its terminator (`\n` or `\r\n`).
/// The last line has no terminator if the text doesn't end with one.
///
/// ## Example
///
/// ```not_rust
/// "A\nB\r\nC" -> ["A\n", "B\r\n", "C"]
/// ```
pub fn line_tokenizer(text: &str) -> Vec<Token<String>> {
    text.split_inclusive('\n').map(Token::from).collect()
}
