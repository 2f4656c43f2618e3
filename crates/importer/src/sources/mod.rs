pub mod catalog;
pub mod directory;
pub mod download;
