mod alignment;
mod changes;
mod config;
mod consts;
mod diffs;
mod document;
mod errors;
mod session;
mod tokenizer;
mod utils;

pub use alignment::{
    fragment::Fragment,
    merge_aligner::{MergeAligner, align},
};
pub use changes::{
    change::{Change, ChangeId, ChangeKind, ChangeStatus},
    change_event::ChangeEvent,
    change_list::{ChangeList, ChangeListener},
    merge_conflict::{ConflictId, ConflictState, MergeConflict},
};
pub use config::MergeConfig;
pub use consts::DEFAULT_MAX_TOKENS;
pub use diffs::{
    differencer::{Differencer, TokenDifferencer},
    equal_pair::EqualPair,
};
pub use document::{
    Document,
    edit_dispatcher::TrackerId,
    range_tracker::{RangeTracker, TextEdit},
};
pub use errors::MergeError;
pub use session::{MergeSession, build_merge, build_merge_with};
pub use tokenizer::{BuiltinTokenizer, comparison_policy::ComparisonPolicy, token::Token};
pub use tokio_util::sync::CancellationToken;
pub use utils::side::{Side, TextRole};
