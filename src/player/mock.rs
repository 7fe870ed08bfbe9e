/*!
 * Mock player for testing.
 *
 * - `MockPlayer::working()` - Accepts every command and records it
 * - `MockPlayer::failing()` - Rejects every command with an error
 */

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::errors::PlayerError;
use crate::player::Player;

/// Command received by the mock
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCall {
    /// Absolute seek in seconds
    Seek(f64),
    /// File load
    LoadFile(PathBuf),
}

/// Behavior mode for the mock player
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Always fails with an error
    Failing,
}

/// Mock player recording every call
#[derive(Debug, Clone)]
pub struct MockPlayer {
    /// Behavior mode
    behavior: MockBehavior,
    /// Calls in arrival order, shared between clones
    calls: Arc<Mutex<Vec<PlayerCall>>>,
}

impl MockPlayer {
    /// Create a new mock player with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock player that accepts everything
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock player that rejects everything
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Calls received so far
    pub fn calls(&self) -> Vec<PlayerCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn record(&self, call: PlayerCall) -> Result<(), PlayerError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }

        match self.behavior {
            MockBehavior::Working => Ok(()),
            MockBehavior::Failing => Err(PlayerError::ConnectionError(
                "mock player is offline".to_string(),
            )),
        }
    }
}

#[async_trait]
impl Player for MockPlayer {
    async fn seek(&self, seconds: f64) -> Result<(), PlayerError> {
        self.record(PlayerCall::Seek(seconds))
    }

    async fn load_file(&self, path: &Path) -> Result<(), PlayerError> {
        self.record(PlayerCall::LoadFile(path.to_path_buf()))
    }
}
