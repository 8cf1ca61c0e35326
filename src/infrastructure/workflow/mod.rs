//! Generation workflow implementations

pub mod plan_and_code;

pub use plan_and_code::*;
