use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::broadcast;

/// Identity resolved from an API key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: String,
    pub display_name: String,
}

/// Change notification delivered to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Principal),
    SignedOut { user_id: String },
    Shutdown,
}

/// Receiving half of a subscription. Dropping it unsubscribes.
pub type AuthSubscription = broadcast::Receiver<AuthEvent>;

/// How long a verified key is trusted before it is checked again
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct CachedIdentity {
    principal: Principal,
    verified_at: Instant,
}

/// Shared authentication state for the whole process.
///
/// Owned by the application root and handed to the auth middleware as an
/// `Arc`. Identities are cached by API key digest so every request does
/// not go back to the user store. An entry older than the session TTL is
/// treated as absent, so a key deactivated in the database stops working
/// within one TTL even if nothing revokes it here.
pub struct AuthStateStore {
    sessions: RwLock<HashMap<String, CachedIdentity>>,
    events: broadcast::Sender<AuthEvent>,
    closed: AtomicBool,
    ttl: Duration,
}

impl AuthStateStore {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            sessions: RwLock::new(HashMap::new()),
            events,
            closed: AtomicBool::new(false),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached identity for an API key digest, if verified within the TTL
    pub fn current(&self, key_digest: &str) -> Option<Principal> {
        self.read()
            .get(key_digest)
            .filter(|cached| cached.verified_at.elapsed() < self.ttl)
            .map(|cached| cached.principal.clone())
    }

    /// Cache a freshly verified identity and notify subscribers
    pub fn publish(&self, key_digest: impl Into<String>, principal: Principal) {
        if self.is_shut_down() {
            return;
        }

        let cached = CachedIdentity {
            principal: principal.clone(),
            verified_at: Instant::now(),
        };
        let previous = self.write().insert(key_digest.into(), cached);
        if previous.map(|p| p.principal).as_ref() != Some(&principal) {
            // No receivers is not an error
            let _ = self.events.send(AuthEvent::SignedIn(principal));
        }
    }

    /// Forget one key. Subscribers hear `SignedOut` when it was cached.
    pub fn revoke_key(&self, key_digest: &str) -> Option<Principal> {
        let removed = self.write().remove(key_digest).map(|cached| cached.principal)?;
        let _ = self.events.send(AuthEvent::SignedOut {
            user_id: removed.user_id.clone(),
        });
        Some(removed)
    }

    /// Drop every cached key for a user. Returns the number of entries removed.
    pub fn revoke_user(&self, user_id: &str) -> usize {
        let removed = {
            let mut sessions = self.write();
            let before = sessions.len();
            sessions.retain(|_, cached| cached.principal.user_id != user_id);
            before - sessions.len()
        };

        if removed > 0 {
            let _ = self.events.send(AuthEvent::SignedOut {
                user_id: user_id.to_string(),
            });
        }
        removed
    }

    pub fn subscribe(&self) -> AuthSubscription {
        self.events.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    /// Clear all state and tell subscribers to stop. Idempotent.
    pub fn shutdown(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.write().clear();
        let _ = self.events.send(AuthEvent::Shutdown);
        tracing::info!("Auth state store shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CachedIdentity>> {
        self.sessions.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CachedIdentity>> {
        self.sessions.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for AuthStateStore {
    fn default() -> Self {
        Self::new(64, DEFAULT_SESSION_TTL)
    }
}
