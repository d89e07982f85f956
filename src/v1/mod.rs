pub mod bugs;
pub mod version;
