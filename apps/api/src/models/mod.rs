pub mod candidate;
pub mod file;
