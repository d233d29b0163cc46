pub mod config;
pub mod controller;
pub mod conversation;
pub mod error;
pub mod input;
pub mod logging;
pub mod message;
pub mod runtime_paths;
pub mod submission_fsm;
pub mod surface;
pub mod transport;

pub use error::AskbotError;

pub type Result<T> = std::result::Result<T, AskbotError>;
