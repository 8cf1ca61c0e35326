//! Documentation fetcher implementations

pub mod reader_fetcher;

pub use reader_fetcher::*;
