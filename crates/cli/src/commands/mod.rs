//! CLI Commands

pub mod assert;
pub mod checkpoint;
pub mod data;
pub mod dialog;
pub mod file;
pub mod interact;
pub mod library;
pub mod misc;
pub mod mouse;
pub mod navigate;
pub mod select;
pub mod session;
pub mod step;
pub mod validate;
pub mod wait;
pub mod window;

use anyhow::Result;
use std::path::PathBuf;
use tracing::debug;

use virtuoso_common::error::exit_code;
use virtuoso_common::{Config, Error, FileSessionStore, SessionContext};

use crate::client::VirtuosoClient;
use crate::output::OutputFormat;

/// Everything a command needs from the environment
pub struct Context {
    pub config: Config,
    pub format: OutputFormat,
    pub session_path: PathBuf,
}

impl Context {
    pub fn new(config: Config, format: OutputFormat, session_path: PathBuf) -> Self {
        Self {
            config,
            format,
            session_path,
        }
    }

    /// Load the session, with the auto-increment toggle taken from config
    pub fn load_session(&self) -> Result<SessionContext<FileSessionStore>> {
        debug!(path = %self.session_path.display(), "loading session");
        let store = FileSessionStore::new(&self.session_path);
        let session = SessionContext::load(store)?
            .with_auto_increment(self.config.session.auto_increment_position);
        Ok(session)
    }

    /// Load the session for a command that replaces it, tolerating a file
    /// that cannot be parsed
    pub fn load_session_or_default(&self) -> SessionContext<FileSessionStore> {
        let store = FileSessionStore::new(&self.session_path);
        SessionContext::load_or_default(store)
            .with_auto_increment(self.config.session.auto_increment_position)
    }

    /// Build an API client after checking the configuration
    pub fn client(&self) -> Result<VirtuosoClient> {
        self.config.validate()?;
        VirtuosoClient::new(&self.config)
    }
}

/// Process exit code for a failed command
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(err) = cause.downcast_ref::<Error>() {
            return err.exit_code();
        }
        if let Some(err) = cause.downcast_ref::<reqwest::Error>() {
            return if err.is_timeout() {
                exit_code::TIMEOUT
            } else {
                exit_code::GENERAL
            };
        }
    }
    exit_code::GENERAL
}
