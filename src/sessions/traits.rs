//! Session storage types and the store trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Positive session identifier, assigned sequentially starting at 1.
pub type SessionId = u64;

/// Domain errors for session and transcript operations.
///
/// Every variant carries a fixed, literal message so error paths are
/// deterministic for callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Username cannot be empty.")]
    EmptyUsername,
    #[error("Session ID not found.")]
    SessionNotFound,
    #[error("Role must be 'user' or 'assistant'.")]
    InvalidRole,
    #[error("Invalid role filter.")]
    InvalidRoleFilter,
}

/// Speaker tag on a transcript message.
///
/// A closed enum rather than a free string: invalid values fail at the
/// decode boundary via [`FromStr`] and never reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl FromStr for Role {
    type Err = StoreError;

    /// Exact match only. No trimming, no case folding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            _ => Err(StoreError::InvalidRole),
        }
    }
}

/// A registered conversation session. Metadata is immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    /// Username, trimmed and lowercased before storage.
    pub user: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Wire form of `created_at`: ISO-8601 with microseconds, UTC,
    /// no timezone suffix appended.
    pub fn created_at_iso(&self) -> String {
        self.created_at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

/// A single entry in a session transcript. Content is stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Storage for conversation sessions and their transcripts.
///
/// Implementations must allocate identifiers and append messages
/// atomically: concurrent creates never assign the same id twice, and a
/// concurrent append never tears or drops a message.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a session from a raw username. The username is trimmed and
    /// lowercased; empty-after-trim fails with [`StoreError::EmptyUsername`]
    /// and leaves the registry unchanged.
    async fn create_session(&self, raw_username: &str) -> Result<Session, StoreError>;

    /// Append a message to the end of a session's transcript.
    async fn append_message(
        &self,
        session_id: SessionId,
        role: Role,
        content: String,
    ) -> Result<(), StoreError>;

    /// Retrieve a session's transcript in insertion order, optionally
    /// narrowed to one role (relative order preserved). Pure read.
    async fn messages(
        &self,
        session_id: SessionId,
        role_filter: Option<Role>,
    ) -> Result<Vec<Message>, StoreError>;

    /// Whether a session id is registered.
    async fn session_exists(&self, session_id: SessionId) -> bool;

    /// Number of registered sessions.
    async fn session_count(&self) -> usize;

    /// Total messages across all transcripts.
    async fn message_count(&self) -> usize;

    /// The name of this session store implementation.
    fn name(&self) -> &str;
}
