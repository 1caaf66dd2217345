//! Session management — the session registry and per-session transcripts.

pub mod in_memory;
pub mod traits;

pub use in_memory::InMemorySessionStore;
pub use traits::{Message, Role, Session, SessionId, SessionStore, StoreError};

/// Create the default in-memory session store.
pub fn create_session_store() -> Box<dyn SessionStore> {
    Box::new(InMemorySessionStore::new())
}
