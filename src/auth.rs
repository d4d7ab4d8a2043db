//! Demo authentication.
//!
//! [`SessionManager`] fabricates sessions locally: any email and password
//! are accepted. Users keep a durable id across sign-ins because the manager
//! records every email it has seen in an identity registry stored next to
//! the session.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::kv::{KeyValueStore, StorageKey};
use crate::model::{Session, SignUpMetadata, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Identity {
    user_id: String,
    email: String,
    display_name: String,
    created_at: OffsetDateTime,
}

impl Identity {
    fn to_user(&self) -> User {
        User {
            id: self.user_id.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            created_at: self.created_at,
        }
    }
}

/// Registry entries keyed by lowercased email.
type Registry = BTreeMap<String, Identity>;

/// Creates, persists and tears down demo sessions, and publishes the
/// current session to the rest of the application.
///
/// ```no_run
/// use std::sync::Arc;
/// use studio_store::{MemoryStore, SessionManager, StoreConfig};
///
/// # async fn example() -> studio_store::Result<()> {
/// let manager = SessionManager::new(Arc::new(MemoryStore::new()), StoreConfig::default());
/// manager.restore_session().await;
///
/// let session = manager.sign_in("ana@example.com", "anything").await?;
/// assert_eq!(manager.current_user().map(|u| u.id), Some(session.user.id));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SessionManager {
    kv: Arc<dyn KeyValueStore>,
    config: StoreConfig,
    current: watch::Sender<Option<Session>>,
}

impl SessionManager {
    /// A manager with no current session. Call
    /// [`restore_session`](Self::restore_session) to pick up a persisted one.
    pub fn new(kv: Arc<dyn KeyValueStore>, config: StoreConfig) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            kv,
            config,
            current,
        }
    }

    fn session_key(&self) -> StorageKey {
        StorageKey::session(self.config.namespace())
    }

    /// Registers `email` and starts a session for it.
    ///
    /// The display name comes from `metadata.full_name`, falling back to the
    /// local part of the email. Signing up with an email that is already
    /// registered keeps its user id; a non-empty `full_name` replaces the
    /// stored display name, an empty one leaves it alone.
    pub async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        metadata: SignUpMetadata,
    ) -> Result<Session> {
        let user = self.resolve_identity(email, metadata.full_name).await?;
        self.start_session(user).await
    }

    /// Starts a session for `email`. Any password is accepted.
    pub async fn sign_in(&self, email: &str, _password: &str) -> Result<Session> {
        let user = self.resolve_identity(email, None).await?;
        self.start_session(user).await
    }

    /// Clears the persisted session. Afterwards there is no current user.
    pub async fn sign_out(&self) -> Result<()> {
        self.kv.remove(self.session_key().as_str()).await?;
        if let Some(previous) = self.current.send_replace(None) {
            info!(user_id = %previous.user.id, "signed out");
        }
        Ok(())
    }

    /// Pretends to send a reset email. Always succeeds.
    pub async fn reset_password(&self, email: &str) -> Result<()> {
        debug!(email, "password reset requested");
        Ok(())
    }

    /// Loads the persisted session, typically once at startup.
    ///
    /// A stored session that is undecodable or expired is removed and
    /// `None` is returned. When the provider cannot be read the stored
    /// session is left in place for a later attempt. This never fails.
    pub async fn restore_session(&self) -> Option<Session> {
        let key = self.session_key();

        let payload = match self.kv.get(key.as_str()).await {
            Ok(payload) => payload,
            Err(err) => {
                warn!(%key, error = %err, "failed to read stored session");
                self.current.send_replace(None);
                return None;
            }
        };

        let restored = payload.and_then(|bytes| match rmp_serde::from_slice::<Session>(&bytes) {
            Ok(session) if session.is_expired_at(OffsetDateTime::now_utc()) => {
                debug!(user_id = %session.user.id, "stored session expired");
                None
            }
            Ok(session) => Some(session),
            Err(err) => {
                warn!(%key, error = %err, "discarding corrupt stored session");
                None
            }
        });

        if restored.is_none() {
            if let Err(err) = self.kv.remove(key.as_str()).await {
                warn!(%key, error = %err, "failed to remove stored session");
            }
        }

        self.current.send_replace(restored.clone());
        restored
    }

    /// The session signed in right now, if any.
    pub fn current_session(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    /// User of the current session.
    pub fn current_user(&self) -> Option<User> {
        self.current
            .borrow()
            .as_ref()
            .map(|session| session.user.clone())
    }

    /// Receives every change of the current session.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }

    async fn start_session(&self, user: User) -> Result<Session> {
        let issued_at = OffsetDateTime::now_utc();
        let session = Session {
            access_token: format!("demo-token-{}-{}", user.id, Uuid::new_v4().simple()),
            refresh_token: format!("demo-refresh-{}-{}", user.id, Uuid::new_v4().simple()),
            user,
            issued_at,
            expires_at: issued_at + self.config.session_ttl(),
        };

        self.kv
            .set(self.session_key().as_str(), rmp_serde::to_vec(&session)?)
            .await?;
        self.current.send_replace(Some(session.clone()));
        info!(user_id = %session.user.id, "signed in");

        Ok(session)
    }

    /// Returns the user registered for `email`, registering it first when it
    /// is new. A given `full_name` becomes the stored display name.
    async fn resolve_identity(&self, email: &str, full_name: Option<String>) -> Result<User> {
        let key = StorageKey::identities(self.config.namespace());
        let lookup = email.trim().to_lowercase();
        let full_name = full_name.filter(|name| !name.trim().is_empty());
        let mut resolved = None;

        self.kv
            .update(
                key.as_str(),
                Box::new(|payload: Option<Vec<u8>>| -> Result<Vec<u8>> {
                    let mut registry = decode_registry(&key, payload);
                    let mut registered = false;

                    let identity = registry.entry(lookup.clone()).or_insert_with(|| {
                        registered = true;
                        Identity {
                            user_id: Uuid::new_v4().to_string(),
                            email: email.to_string(),
                            display_name: default_display_name(email),
                            created_at: OffsetDateTime::now_utc(),
                        }
                    });
                    if let Some(name) = &full_name {
                        identity.display_name = name.clone();
                    }

                    resolved = Some((identity.to_user(), registered));
                    Ok(rmp_serde::to_vec(&registry)?)
                }),
            )
            .await?;

        let (user, registered) = resolved
            .ok_or_else(|| Error::Backend(format!("`{key}` was not updated")))?;
        if registered {
            debug!(user_id = %user.id, "registered new identity");
        }

        // The session reports the address as typed for this sign-in
        Ok(User {
            email: email.to_string(),
            ..user
        })
    }
}

fn decode_registry(key: &StorageKey, payload: Option<Vec<u8>>) -> Registry {
    let Some(bytes) = payload else {
        return Registry::new();
    };

    rmp_serde::from_slice(&bytes).unwrap_or_else(|err| {
        warn!(%key, error = %err, "discarding corrupt identity registry");
        Registry::new()
    })
}

fn default_display_name(email: &str) -> String {
    let email = email.trim();
    email.split('@').next().unwrap_or(email).to_string()
}
