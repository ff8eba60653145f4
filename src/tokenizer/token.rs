#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A piece of text together with the normalised form used to compare it.
///
/// The original form is what the offsets of equal runs are measured on, so
/// two tokens with equal normalised forms are considered equal even if their
/// original texts differ. It's UTF-8 compatible.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Token<T>
where
    T: PartialEq + Clone + std::fmt::Debug,
{
    normalised: T,
    original: String,
}

/// Trivial implementation of Token when the normalised form is the same as the
/// original string.
impl From<&str> for Token<String> {
    fn from(text: &str) -> Self { Token::new(text.to_owned(), text.to_owned()) }
}

impl<T> Token<T>
where
    T: PartialEq + Clone + std::fmt::Debug,
{
    pub fn new(normalised: T, original: String) -> Self {
        Token {
            normalised,
            original,
        }
    }

    pub fn original(&self) -> &str { &self.original }

    pub fn normalised(&self) -> &T { &self.normalised }

    pub fn set_normalised(&mut self, normalised: T) { self.normalised = normalised; }

    /// Length of the original text in characters.
    pub fn original_length(&self) -> usize { self.original.chars().count() }
}

impl<T> PartialEq for Token<T>
where
    T: PartialEq + Clone + std::fmt::Debug,
{
    fn eq(&self, other: &Self) -> bool { self.normalised == other.normalised }
}
