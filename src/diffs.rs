pub mod differencer;
pub mod equal_pair;
pub mod myers;
pub mod raw_operation;
