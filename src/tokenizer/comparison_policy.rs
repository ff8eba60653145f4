#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Controls which differences between tokens are significant when computing
/// equal runs. Offsets always refer to the original text, only the
/// comparison is relaxed.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparisonPolicy {
    /// Tokens must be identical.
    #[default]
    Default,

    /// Leading and trailing whitespace of a token is ignored.
    TrimWhitespace,

    /// All whitespace inside a token is ignored.
    IgnoreWhitespace,
}

impl ComparisonPolicy {
    #[must_use]
    pub fn normalise(self, text: &str) -> String {
        match self {
            ComparisonPolicy::Default => text.to_owned(),
            ComparisonPolicy::TrimWhitespace => text.trim().to_owned(),
            ComparisonPolicy::IgnoreWhitespace => {
                text.chars().filter(|c| !c.is_whitespace()).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;

    #[test_case(ComparisonPolicy::Default, "  a b \n", "  a b \n")]
    #[test_case(ComparisonPolicy::TrimWhitespace, "  a b \n", "a b")]
    #[test_case(ComparisonPolicy::IgnoreWhitespace, "  a b \n", "ab")]
    fn test_normalise(policy: ComparisonPolicy, text: &str, expected: &str) {
        assert_eq!(policy.normalise(text), expected);
    }
}
