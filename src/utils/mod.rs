pub mod bug_store;
pub mod bug_types;
pub mod bug_utils;
pub mod config;
pub mod errors;
