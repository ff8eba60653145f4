/// Combined token count of base and one branch above which the built-in
/// differencer refuses to compare them.
pub const DEFAULT_MAX_TOKENS: usize = 1_000_000;
