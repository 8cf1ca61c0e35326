//! Record store implementations

pub mod migrations;
pub mod sqlite_store;

pub use sqlite_store::*;
