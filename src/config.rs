use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    consts::DEFAULT_MAX_TOKENS,
    tokenizer::{BuiltinTokenizer, comparison_policy::ComparisonPolicy},
};

/// Settings of the built-in differencer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeConfig {
    #[cfg_attr(feature = "serde", serde(default = "default_tokenizer"))]
    pub tokenizer: BuiltinTokenizer,

    #[cfg_attr(feature = "serde", serde(default = "default_policy"))]
    pub policy: ComparisonPolicy,

    #[cfg_attr(feature = "serde", serde(default = "default_max_tokens"))]
    pub max_tokens: usize,
}

fn default_tokenizer() -> BuiltinTokenizer {
    let tokenizer = BuiltinTokenizer::default();
    debug!("Using default tokenizer: {tokenizer}");
    tokenizer
}

fn default_policy() -> ComparisonPolicy {
    let policy = ComparisonPolicy::default();
    debug!("Using default comparison policy: {policy:?}");
    policy
}

fn default_max_tokens() -> usize {
    debug!("Using default max tokens: {DEFAULT_MAX_TOKENS}");
    DEFAULT_MAX_TOKENS
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            tokenizer: default_tokenizer(),
            policy: default_policy(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[cfg(feature = "serde")]
impl MergeConfig {
    /// Parse a configuration from YAML; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns the parser's error if `yaml` is not a valid configuration.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> { serde_yaml::from_str(yaml) }
}
