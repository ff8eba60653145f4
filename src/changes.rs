pub mod change;
pub mod change_event;
pub mod change_list;
pub mod merge_conflict;
