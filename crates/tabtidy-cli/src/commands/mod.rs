pub mod control;
pub mod daemon;
pub mod policy;
pub mod reading_list;
