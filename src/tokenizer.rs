use std::fmt::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use token::Token;

pub mod character_tokenizer;
pub mod comparison_policy;
pub mod line_tokenizer;
pub mod token;
pub mod word_tokenizer;

use comparison_policy::ComparisonPolicy;

/// The granularities at which the built-in differencer compares texts.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuiltinTokenizer {
    #[default]
    Line,
    Word,
    Character,
}

impl BuiltinTokenizer {
    /// Split `text` into tokens and normalise each token according to
    /// `policy`.
    #[must_use]
    pub fn tokenize(self, text: &str, policy: ComparisonPolicy) -> Vec<Token<String>> {
        let mut tokens = match self {
            BuiltinTokenizer::Line => line_tokenizer::line_tokenizer(text),
            BuiltinTokenizer::Word => word_tokenizer::word_tokenizer(text),
            BuiltinTokenizer::Character => character_tokenizer::character_tokenizer(text),
        };

        if policy != ComparisonPolicy::Default {
            for token in &mut tokens {
                let normalised = policy.normalise(token.normalised());
                token.set_normalised(normalised);
            }
        }

        tokens
    }
}

impl Display for BuiltinTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuiltinTokenizer::Line => write!(f, "line"),
            BuiltinTokenizer::Word => write!(f, "word"),
            BuiltinTokenizer::Character => write!(f, "character"),
        }
    }
}
