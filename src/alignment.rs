pub mod fragment;
pub mod merge_aligner;
