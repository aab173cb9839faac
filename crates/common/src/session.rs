//! Session context
//!
//! Remembers the checkpoint being edited and the position of the next step
//! between invocations, and resolves where a new step is placed.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::types::CheckpointId;

/// Persisted session state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    /// Checkpoint new steps go to when none is given
    pub current_checkpoint_id: Option<CheckpointId>,

    /// Position assigned to the next auto-positioned step
    pub next_position: u32,

    /// Whether auto-positioned steps advance `next_position`
    pub auto_increment_enabled: bool,

    /// Last time the state was written
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            current_checkpoint_id: None,
            next_position: 1,
            auto_increment_enabled: true,
            updated_at: None,
        }
    }
}

/// Where a new step goes, and how that was decided
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepPlacement {
    pub checkpoint_id: CheckpointId,
    pub position: u32,
    pub used_session_context: bool,
    pub auto_positioned: bool,
}

/// Load/save contract for session state
pub trait SessionStore {
    /// Read the stored state, or defaults when nothing is stored yet
    fn load(&self) -> Result<SessionState>;

    /// Replace the stored state
    fn save(&self, state: &SessionState) -> Result<()>;

    /// Human readable location, for status output
    fn describe(&self) -> String;
}

/// Session state kept as a JSON file.
///
/// Every save rewrites the whole file. Nothing guards against two processes
/// writing at once; the last writer wins.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<SessionState> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no session file, using defaults");
            return Ok(SessionState::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(SessionState::default());
        }
        let state = serde_json::from_str(&content)?;
        Ok(state)
    }

    fn save(&self, state: &SessionState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, content)?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process store. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    state: Arc<Mutex<Option<SessionState>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: SessionState) -> Self {
        Self {
            state: Arc::new(Mutex::new(Some(state))),
        }
    }

    /// The last saved state, if any
    pub fn snapshot(&self) -> Option<SessionState> {
        self.state.lock().clone()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<SessionState> {
        Ok(self.state.lock().clone().unwrap_or_default())
    }

    fn save(&self, state: &SessionState) -> Result<()> {
        *self.state.lock() = Some(state.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Loaded session state plus the store it came from
#[derive(Debug)]
pub struct SessionContext<S: SessionStore> {
    store: S,
    state: SessionState,
}

impl<S: SessionStore> SessionContext<S> {
    /// Load state from the store
    pub fn load(store: S) -> Result<Self> {
        let state = store.load()?;
        Ok(Self::new(store, state))
    }

    /// Load state from the store, starting from defaults when it cannot be
    /// read. Used by commands that overwrite the whole state anyway.
    pub fn load_or_default(store: S) -> Self {
        match store.load() {
            Ok(state) => Self::new(store, state),
            Err(e) => {
                warn!(store = %store.describe(), error = %e, "unreadable session, starting fresh");
                Self::new(store, SessionState::default())
            }
        }
    }

    /// Wrap an already loaded state
    pub fn new(store: S, mut state: SessionState) -> Self {
        // positions start at 1
        state.next_position = state.next_position.max(1);
        Self { store, state }
    }

    /// Override the auto-increment toggle, usually from configuration
    pub fn with_auto_increment(mut self, enabled: bool) -> Self {
        self.state.auto_increment_enabled = enabled;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Decide which checkpoint and position a new step gets.
    ///
    /// An explicit checkpoint always wins and the stored one is not looked
    /// at. A position present at `position_index` in `args` must be an
    /// integer; otherwise the stored `next_position` is used. Nothing is
    /// written.
    pub fn resolve(
        &self,
        args: &[String],
        explicit_checkpoint: Option<&str>,
        position_index: usize,
    ) -> Result<StepPlacement> {
        let explicit = explicit_checkpoint
            .map(str::trim)
            .filter(|raw| !raw.is_empty() && *raw != "0");

        let (checkpoint_id, used_session_context) = match explicit {
            Some(raw) => (CheckpointId::parse(raw)?, false),
            None => match &self.state.current_checkpoint_id {
                Some(id) => (id.clone(), true),
                None => return Err(Error::NoCheckpoint),
            },
        };

        let (position, auto_positioned) = match args.get(position_index) {
            Some(raw) => {
                let position = raw
                    .parse::<u32>()
                    .map_err(|_| Error::InvalidPosition(raw.clone()))?;
                (position, false)
            }
            None => (self.state.next_position, true),
        };

        Ok(StepPlacement {
            checkpoint_id,
            position,
            used_session_context,
            auto_positioned,
        })
    }

    /// Advance `next_position` after a step was created at an auto-assigned
    /// position. Returns whether anything was written.
    pub fn persist(&mut self, placement: &StepPlacement) -> Result<bool> {
        if !placement.auto_positioned || !self.state.auto_increment_enabled {
            return Ok(false);
        }

        let mut next = self.state.clone();
        next.next_position = placement.position.saturating_add(1);
        self.commit(next)?;
        debug!(next_position = self.state.next_position, "advanced session position");
        Ok(true)
    }

    /// Make `id` the current checkpoint and start again at position 1
    pub fn set_checkpoint(&mut self, id: CheckpointId) -> Result<()> {
        info!(checkpoint = %id, "setting session checkpoint");
        let mut next = self.state.clone();
        next.current_checkpoint_id = Some(id);
        next.next_position = 1;
        self.commit(next)
    }

    pub fn set_next_position(&mut self, position: u32) -> Result<()> {
        if position == 0 {
            return Err(Error::InvalidPosition(position.to_string()));
        }
        let mut next = self.state.clone();
        next.next_position = position;
        self.commit(next)
    }

    /// Forget the checkpoint and reset the position
    pub fn clear(&mut self) -> Result<()> {
        let next = SessionState {
            auto_increment_enabled: self.state.auto_increment_enabled,
            ..SessionState::default()
        };
        self.commit(next)
    }

    fn commit(&mut self, mut next: SessionState) -> Result<()> {
        next.updated_at = Some(Utc::now());
        self.store
            .save(&next)
            .map_err(|e| Error::SessionPersistFailed(e.to_string()))?;
        self.state = next;
        Ok(())
    }
}
