//! In-memory session store implementation.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};

use super::traits::{Message, Role, Session, SessionId, SessionStore, StoreError};

/// Session records plus the id counter that guards allocation.
///
/// The counter lives inside the same lock as the records so "allocate id"
/// and "insert" are one atomic step. Ids are strictly increasing and never
/// reused, even if deletion is ever added.
struct Registry {
    next_id: SessionId,
    sessions: BTreeMap<SessionId, Session>,
}

/// An in-memory session store backed by mutex-protected maps.
///
/// Two lock domains: the registry (counter + session records) and the
/// transcript map. Each append happens under a single transcript lock
/// hold, so concurrent appends serialize without tearing a message.
pub struct InMemorySessionStore {
    registry: Mutex<Registry>,
    transcripts: Mutex<HashMap<SessionId, Vec<Message>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry {
                next_id: 1,
                sessions: BTreeMap::new(),
            }),
            transcripts: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create_session(&self, raw_username: &str) -> Result<Session, StoreError> {
        let user = raw_username.trim().to_lowercase();
        if user.is_empty() {
            return Err(StoreError::EmptyUsername);
        }

        let session = {
            let mut registry = self.registry.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            let session = Session {
                id,
                user,
                created_at: Utc::now(),
            };
            registry.sessions.insert(id, session.clone());
            session
        };

        // The transcript begins empty. The id has not been handed out yet,
        // so no append can observe the gap between the two lock holds.
        self.transcripts.lock().insert(session.id, Vec::new());
        Ok(session)
    }

    async fn append_message(
        &self,
        session_id: SessionId,
        role: Role,
        content: String,
    ) -> Result<(), StoreError> {
        let mut transcripts = self.transcripts.lock();
        match transcripts.get_mut(&session_id) {
            Some(entries) => {
                entries.push(Message { role, content });
                Ok(())
            }
            None => Err(StoreError::SessionNotFound),
        }
    }

    async fn messages(
        &self,
        session_id: SessionId,
        role_filter: Option<Role>,
    ) -> Result<Vec<Message>, StoreError> {
        let transcripts = self.transcripts.lock();
        let entries = transcripts
            .get(&session_id)
            .ok_or(StoreError::SessionNotFound)?;

        Ok(match role_filter {
            Some(role) => entries.iter().filter(|m| m.role == role).cloned().collect(),
            None => entries.clone(),
        })
    }

    async fn session_exists(&self, session_id: SessionId) -> bool {
        self.registry.lock().sessions.contains_key(&session_id)
    }

    async fn session_count(&self) -> usize {
        self.registry.lock().sessions.len()
    }

    async fn message_count(&self) -> usize {
        self.transcripts.lock().values().map(Vec::len).sum()
    }

    fn name(&self) -> &str {
        "in_memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn ids_are_sequential_from_one() {
        let store = InMemorySessionStore::new();
        for expected in 1..=5u64 {
            let session = store.create_session("arshad").await.unwrap();
            assert_eq!(session.id, expected);
        }
    }

    #[tokio::test]
    async fn username_is_trimmed_and_lowercased() {
        let store = InMemorySessionStore::new();
        let session = store.create_session(" Arshad ").await.unwrap();
        assert_eq!(session.user, "arshad");
    }

    #[tokio::test]
    async fn empty_username_leaves_registry_unchanged() {
        let store = InMemorySessionStore::new();
        for raw in ["", "   ", "\t\n"] {
            assert_eq!(
                store.create_session(raw).await,
                Err(StoreError::EmptyUsername)
            );
        }
        assert_eq!(store.session_count().await, 0);
        assert_eq!(store.message_count().await, 0);
    }

    #[tokio::test]
    async fn new_session_has_empty_transcript() {
        let store = InMemorySessionStore::new();
        let session = store.create_session("bob").await.unwrap();
        assert!(store.messages(session.id, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_to_unknown_session_fails() {
        let store = InMemorySessionStore::new();
        let result = store
            .append_message(999, Role::User, "hi".into())
            .await;
        assert_eq!(result, Err(StoreError::SessionNotFound));
    }

    #[tokio::test]
    async fn read_of_unknown_session_fails() {
        let store = InMemorySessionStore::new();
        assert_eq!(
            store.messages(999, None).await,
            Err(StoreError::SessionNotFound)
        );
    }

    #[tokio::test]
    async fn append_preserves_insertion_order() {
        let store = InMemorySessionStore::new();
        let session = store.create_session("carol").await.unwrap();

        for i in 0..5 {
            store
                .append_message(session.id, Role::User, format!("message {i}"))
                .await
                .unwrap();
        }

        let all = store.messages(session.id, None).await.unwrap();
        assert_eq!(all.len(), 5);
        for (i, message) in all.iter().enumerate() {
            assert_eq!(message.content, format!("message {i}"));
        }

        // Reads are idempotent until the next append.
        let again = store.messages(session.id, None).await.unwrap();
        assert_eq!(all, again);
    }

    #[tokio::test]
    async fn content_is_stored_verbatim() {
        let store = InMemorySessionStore::new();
        let session = store.create_session("dave").await.unwrap();
        store
            .append_message(session.id, Role::User, "  What is AI?  ".into())
            .await
            .unwrap();
        let all = store.messages(session.id, None).await.unwrap();
        assert_eq!(all[0].content, "  What is AI?  ");
    }

    #[tokio::test]
    async fn role_filter_returns_order_preserving_subsequence() {
        let store = InMemorySessionStore::new();
        let session = store.create_session("erin").await.unwrap();

        let turns = [
            (Role::User, "What is AI?"),
            (Role::Assistant, "A broad field."),
            (Role::User, "Go on."),
            (Role::Assistant, "Gladly."),
        ];
        for (role, content) in turns {
            store
                .append_message(session.id, role, content.into())
                .await
                .unwrap();
        }

        let users = store
            .messages(session.id, Some(Role::User))
            .await
            .unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].content, "What is AI?");
        assert_eq!(users[1].content, "Go on.");

        let assistants = store
            .messages(session.id, Some(Role::Assistant))
            .await
            .unwrap();
        assert_eq!(assistants.len(), 2);
        assert_eq!(assistants[0].content, "A broad field.");
        assert_eq!(assistants[1].content, "Gladly.");
    }

    #[tokio::test]
    async fn counts_track_sessions_and_messages() {
        let store = InMemorySessionStore::new();
        let a = store.create_session("a").await.unwrap();
        let b = store.create_session("b").await.unwrap();
        store
            .append_message(a.id, Role::User, "one".into())
            .await
            .unwrap();
        store
            .append_message(b.id, Role::Assistant, "two".into())
            .await
            .unwrap();
        store
            .append_message(b.id, Role::User, "three".into())
            .await
            .unwrap();

        assert_eq!(store.session_count().await, 2);
        assert_eq!(store.message_count().await, 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_lose_nothing() {
        let store = Arc::new(InMemorySessionStore::new());
        let session = store.create_session("load").await.unwrap();

        let mut handles = Vec::new();
        for task in 0..8u64 {
            let store = Arc::clone(&store);
            let id = session.id;
            handles.push(tokio::spawn(async move {
                for i in 0..25u64 {
                    store
                        .append_message(id, Role::User, format!("t{task}-m{i}"))
                        .await
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let all = store.messages(session.id, None).await.unwrap();
        assert_eq!(all.len(), 200);
        // No message was torn: every content still matches its writer's pattern.
        for message in &all {
            assert!(message.content.starts_with('t'));
            assert!(message.content.contains("-m"));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_assign_unique_ids() {
        let store = Arc::new(InMemorySessionStore::new());

        let mut handles = Vec::new();
        for i in 0..50u64 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.create_session(&format!("user{i}")).await.unwrap().id
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=50u64).collect::<Vec<_>>());
    }

    #[test]
    fn store_name() {
        let store = InMemorySessionStore::new();
        assert_eq!(store.name(), "in_memory");
    }
}
