use super::token::Token;

/// Splits text on word boundaries, creating tokens of alternating words and
/// whitespace.
///
/// ## Example
///
/// ```not_rust
/// "Hi there!" -> ["Hi", " ", "there!"]
/// ```
pub fn word_tokenizer(text: &str) -> Vec<Token<String>> {
    let mut result = Vec::new();

    let mut previous_boundary_index = 0;
    let mut previous_char_is_whitespace = text.chars().next().is_none_or(char::is_whitespace);

    for (i, c) in text.char_indices() {
        let is_current_char_whitespace = c.is_whitespace();
        if previous_char_is_whitespace != is_current_char_whitespace {
            result.push(text[previous_boundary_index..i].into());
            previous_boundary_index = i;
        }

        previous_char_is_whitespace = is_current_char_whitespace;
    }

    if previous_boundary_index < text.len() {
        result.push(text[previous_boundary_index..].into());
    }

    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;

    #[test_case("", &[] ; "empty")]
    #[test_case("Hi there!", &["Hi", " ", "there!"] ; "two words")]
    #[test_case(" what? ", &[" ", "what?", " "] ; "surrounding whitespace")]
    #[test_case(" hello, \nwhere", &[" ", "hello,", " \n", "where"] ; "mixed whitespace")]
    fn test_word_tokenizer(text: &str, expected: &[&str]) {
        assert_eq!(
            word_tokenizer(text)
                .iter()
                .map(Token::original)
                .collect::<Vec<_>>(),
            expected
        );
    }
}
