//! Credential supply and invalidation signalling.
//!
//! The engine only ever sees an opaque bearer token; how it was obtained
//! (OAuth exchange, secure storage) is the embedding application's concern.
//! When the backend rejects the credential, clients invalidate it here and
//! broadcast an event so the UI can force re-authentication regardless of
//! which component made the failing call.

use std::sync::RwLock;

use tokio::sync::broadcast;

/// Supplies the opaque bearer credential for backend requests.
pub trait CredentialStore: Send + Sync {
    /// The current bearer token, if one is available.
    fn bearer_token(&self) -> Option<String>;

    /// Discard the stored token. Called when the backend rejects it.
    fn invalidate(&self);
}

/// In-memory credential store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().expect("credential lock poisoned") = Some(token.into());
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn bearer_token(&self) -> Option<String> {
        self.token.read().expect("credential lock poisoned").clone()
    }

    fn invalidate(&self) {
        *self.token.write().expect("credential lock poisoned") = None;
    }
}

/// Events broadcast when authentication state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// The stored credential was rejected and has been discarded.
    CredentialInvalidated,
}

/// Broadcast channel for [`AuthEvent`]s.
///
/// Cloneable handle; every subscriber sees every event sent after it
/// subscribed. Sending with no subscribers is fine.
#[derive(Debug, Clone)]
pub struct AuthEvents {
    tx: broadcast::Sender<AuthEvent>,
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(8);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.tx.subscribe()
    }

    pub fn credential_invalidated(&self) {
        // No receivers is not an error; the UI may not be listening yet.
        let _ = self.tx.send(AuthEvent::CredentialInvalidated);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_invalidate() {
        let store = MemoryCredentialStore::with_token("abc");
        assert_eq!(store.bearer_token().as_deref(), Some("abc"));
        store.invalidate();
        assert!(store.bearer_token().is_none());
    }

    #[tokio::test]
    async fn test_auth_events_reach_subscribers() {
        let events = AuthEvents::new();
        let mut rx = events.subscribe();
        events.credential_invalidated();
        assert_eq!(rx.recv().await.unwrap(), AuthEvent::CredentialInvalidated);
    }

    #[test]
    fn test_send_without_subscribers_is_ok() {
        let events = AuthEvents::new();
        events.credential_invalidated();
    }
}
