//! docforge library
//!
//! Turns third-party API documentation into an MCP server template: documentation is
//! aggregated, handed to an LLM workflow, the response is mined for source files and
//! the result is materialised on disk under a template identifier.
#![deny(unsafe_code)]

pub mod application;
pub mod core;
pub mod documentation;
pub mod generation;
pub mod infrastructure;

pub use application::{
    DeployRequest, DeployResponse, DeployServerUseCase, GenerateResponse,
    GenerateTemplateUseCase,
};
pub use core::{Config, Error, Result};
pub use generation::{ApiCredentials, GenerationRequest};
