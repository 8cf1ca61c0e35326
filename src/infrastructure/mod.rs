//! Infrastructure layer - concrete implementations of domain ports

pub mod fetch;
pub mod llm;
pub mod output;
pub mod store;
pub mod workflow;

pub use fetch::*;
pub use output::*;
pub use store::*;
pub use workflow::*;
