pub mod api;
pub mod error;
pub mod identity;
pub mod prompts;
pub mod protocol;
pub mod session;
pub mod types;
pub mod ws;
