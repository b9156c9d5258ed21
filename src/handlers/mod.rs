// Handler modules
pub mod tools;
pub mod verify;

// Re-export all handler functions
pub use tools::handle_tools;
pub use verify::{handle_verify, VerifyOptions};
