use log::debug;
use tokio_util::sync::CancellationToken;

use crate::{
    MergeConfig, Side,
    diffs::{equal_pair::EqualPair, myers::myers_diff, raw_operation::RawOperation},
    errors::MergeError,
    tokenizer::{BuiltinTokenizer, comparison_policy::ComparisonPolicy, token::Token},
};

/// Computes the runs in which a branch is equal to the base text.
///
/// Implementations must return pairs in ascending, non-overlapping order.
pub trait Differencer {
    /// # Errors
    ///
    /// Returns an error if the texts can't be compared, for instance because
    /// they are too large or the computation got cancelled.
    fn equal_pairs(
        &self,
        base: &str,
        other: &str,
        side: Side,
    ) -> Result<Vec<EqualPair>, MergeError>;
}

/// The built-in differencer: tokenizes both texts and runs Myers' algorithm
/// over the tokens.
#[derive(Debug, Clone)]
pub struct TokenDifferencer {
    tokenizer: BuiltinTokenizer,
    policy: ComparisonPolicy,
    max_tokens: usize,
    cancellation: CancellationToken,
}

impl TokenDifferencer {
    #[must_use]
    pub fn new(config: &MergeConfig) -> Self {
        Self {
            tokenizer: config.tokenizer,
            policy: config.policy,
            max_tokens: config.max_tokens,
            cancellation: CancellationToken::new(),
        }
    }

    /// Share `cancellation` with the differencer; cancelling it aborts any
    /// comparison in progress.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }
}

impl Default for TokenDifferencer {
    fn default() -> Self { Self::new(&MergeConfig::default()) }
}

impl Differencer for TokenDifferencer {
    fn equal_pairs(
        &self,
        base: &str,
        other: &str,
        side: Side,
    ) -> Result<Vec<EqualPair>, MergeError> {
        let base_tokens = self.tokenizer.tokenize(base, self.policy);
        let other_tokens = self.tokenizer.tokenize(other, self.policy);

        let token_count = base_tokens.len() + other_tokens.len();
        if token_count > self.max_tokens {
            return Err(MergeError::TooLarge {
                side,
                token_count,
                limit: self.max_tokens,
            });
        }

        let operations = myers_diff(&base_tokens, &other_tokens, &self.cancellation)?;
        let pairs = fold_equal_runs(side, &operations, &other_tokens);

        debug!(
            "Compared base with {side} using the {} tokenizer: {token_count} tokens, {} equal runs",
            self.tokenizer,
            pairs.len()
        );

        Ok(pairs)
    }
}

/// Join consecutive equal operations into character-offset `EqualPair`s.
///
/// Tokens that are only equal under the comparison policy don't form a run,
/// the region is reported as changed so that no text difference is hidden.
fn fold_equal_runs(
    side: Side,
    operations: &[RawOperation<String>],
    branch_tokens: &[Token<String>],
) -> Vec<EqualPair> {
    let mut pairs: Vec<EqualPair> = Vec::new();
    let mut base_offset = 0;
    let mut branch_offset = 0;
    let mut branch_tokens = branch_tokens.iter();

    for operation in operations {
        let base_length = operation.old_length();
        let mut branch_length = operation.new_length();

        match operation {
            RawOperation::Equal(token) => {
                let branch_token = branch_tokens.next();
                branch_length = branch_token.map_or(branch_length, Token::original_length);

                if branch_token.is_some_and(|branch| branch.original() == token.original()) {
                    match pairs.last_mut() {
                        Some(last)
                            if last.base.end == base_offset && last.branch.end == branch_offset =>
                        {
                            last.base.end += base_length;
                            last.branch.end += base_length;
                        }
                        _ => pairs.push(EqualPair::new(
                            side,
                            base_offset,
                            branch_offset,
                            base_length,
                        )),
                    }
                }
            }
            RawOperation::Insert(_) => {
                branch_tokens.next();
            }
            RawOperation::Delete(_) => {}
        }

        base_offset += base_length;
        branch_offset += branch_length;
    }

    pairs.retain(|pair| !pair.is_empty());
    pairs
}
