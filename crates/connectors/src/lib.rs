pub mod file;
pub mod store;
