//! Application layer - orchestrates use cases and coordinates between domains

pub mod deploy_server;
pub mod dto;
pub mod errors;
pub mod generate_template;
pub mod records;
pub mod session_recorder;
pub mod traits;

pub use deploy_server::*;
pub use dto::*;
pub use errors::*;
pub use generate_template::*;
pub use records::*;
pub use session_recorder::*;
pub use traits::*;
