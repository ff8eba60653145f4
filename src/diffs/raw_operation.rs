use std::fmt::Debug;

use crate::tokenizer::token::Token;

/// One token-level step of a diff between an old and a new token sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum RawOperation<T>
where
    T: PartialEq + Clone + Debug,
{
    Insert(Token<T>),
    Delete(Token<T>),
    Equal(Token<T>),
}

impl<T> RawOperation<T>
where
    T: PartialEq + Clone + Debug,
{
    /// Number of characters this operation consumes from the old text.
    pub fn old_length(&self) -> usize {
        match self {
            RawOperation::Insert(_) => 0,
            RawOperation::Delete(token) | RawOperation::Equal(token) => token.original_length(),
        }
    }

    /// Number of characters this operation produces in the new text.
    pub fn new_length(&self) -> usize {
        match self {
            RawOperation::Delete(_) => 0,
            RawOperation::Insert(token) | RawOperation::Equal(token) => token.original_length(),
        }
    }
}
