//! LLM client and prompt templates

pub mod chat_client;
pub mod prompts;

pub use chat_client::*;
pub use prompts::*;
