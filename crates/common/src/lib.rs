//! api-cli Common Library
//!
//! Session context, configuration and the step catalogue shared by the
//! api-cli binary.

pub mod config;
pub mod error;
pub mod session;
pub mod steps;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use session::{
    FileSessionStore, MemorySessionStore, SessionContext, SessionState, SessionStore,
    StepPlacement,
};
pub use steps::StepAction;
pub use types::*;

/// api-cli version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default store path
pub fn default_store_path() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".api-cli")
}

/// Default session file path
pub fn default_session_path() -> std::path::PathBuf {
    default_store_path().join("session.json")
}

/// Home directory helper
mod dirs {
    pub fn home_dir() -> Option<std::path::PathBuf> {
        std::env::var_os("HOME").map(std::path::PathBuf::from)
    }
}
