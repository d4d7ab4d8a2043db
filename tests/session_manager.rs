use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use studio_store::kv::UpdateFn;
use studio_store::{
    Error, KeyValueStore, MemoryStore, Result, SessionManager, SignUpMetadata, StorageKey,
    StoreConfig,
};

/// Fails the next read once `fail_next_get` is set, then behaves normally.
#[derive(Debug, Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_next_get: AtomicBool,
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if self.fail_next_get.swap(false, Ordering::SeqCst) {
            return Err(Error::Backend("timeout".into()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key).await
    }

    async fn update<'a>(&self, key: &str, apply: UpdateFn<'a>) -> Result<()> {
        self.inner.update(key, apply).await
    }
}

fn manager(kv: &MemoryStore) -> SessionManager {
    SessionManager::new(Arc::new(kv.clone()), StoreConfig::default())
}

#[tokio::test]
async fn sign_up_and_sign_in_accept_any_credentials() {
    let kv = MemoryStore::new();
    let auth = manager(&kv);

    for (email, password) in [
        ("sarah@example.com", "hunter2"),
        ("mike@example.com", ""),
        ("odd+tag@sub.example.org", "🙂"),
    ] {
        let session = auth
            .sign_up(email, password, SignUpMetadata::default())
            .await
            .expect("sign up");
        assert_eq!(session.user.email, email);

        let session = auth.sign_in(email, password).await.expect("sign in");
        assert_eq!(session.user.email, email);
        assert_eq!(auth.current_user().map(|user| user.email), Some(email.to_string()));
    }
}

#[tokio::test]
async fn sign_up_uses_full_name_or_email_local_part() {
    let kv = MemoryStore::new();
    let auth = manager(&kv);

    let named = auth
        .sign_up(
            "sarah@example.com",
            "pw",
            SignUpMetadata {
                full_name: Some("Sarah Johnson".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(named.user.display_name, "Sarah Johnson");

    let unnamed = auth
        .sign_up("mike@example.com", "pw", SignUpMetadata::default())
        .await
        .unwrap();
    assert_eq!(unnamed.user.display_name, "mike");
}

#[tokio::test]
async fn signing_up_again_refreshes_the_display_name() {
    let kv = MemoryStore::new();
    let auth = manager(&kv);

    let first = auth
        .sign_up("sarah@example.com", "pw", SignUpMetadata::default())
        .await
        .unwrap();
    assert_eq!(first.user.display_name, "sarah");

    let renamed = auth
        .sign_up(
            "sarah@example.com",
            "pw",
            SignUpMetadata {
                full_name: Some("Sarah Johnson".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.user.id, first.user.id);
    assert_eq!(renamed.user.display_name, "Sarah Johnson");

    let blank = auth
        .sign_up(
            "sarah@example.com",
            "pw",
            SignUpMetadata {
                full_name: Some("  ".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(blank.user.display_name, "Sarah Johnson");

    let signed_in = manager(&kv).sign_in("sarah@example.com", "pw").await.unwrap();
    assert_eq!(signed_in.user.display_name, "Sarah Johnson");
}

#[tokio::test]
async fn repeated_sign_ins_keep_the_same_user_id() {
    let kv = MemoryStore::new();
    let auth = manager(&kv);

    let first = auth.sign_in("ana@example.com", "a").await.unwrap();
    auth.sign_out().await.unwrap();
    let second = auth.sign_in("ANA@example.com", "b").await.unwrap();

    assert_eq!(first.user.id, second.user.id);
    assert_ne!(first.access_token, second.access_token);

    let other = auth.sign_in("bo@example.com", "a").await.unwrap();
    assert_ne!(other.user.id, first.user.id);
}

#[tokio::test]
async fn identity_survives_a_new_manager() {
    let kv = MemoryStore::new();

    let signed_up = manager(&kv)
        .sign_up("ana@example.com", "pw", SignUpMetadata::default())
        .await
        .unwrap();
    let signed_in = manager(&kv).sign_in("ana@example.com", "pw").await.unwrap();

    assert_eq!(signed_up.user.id, signed_in.user.id);
    assert_eq!(signed_up.user.created_at, signed_in.user.created_at);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn separate_managers_agree_on_new_identities() {
    let kv = MemoryStore::new();

    for round in 0..50 {
        let email = format!("user{round}@example.com");
        let left = manager(&kv);
        let right = manager(&kv);

        let (a, b) = tokio::join!(left.sign_in(&email, "pw"), right.sign_in(&email, "pw"));
        assert_eq!(a.unwrap().user.id, b.unwrap().user.id, "round {round}");
    }
}

#[tokio::test]
async fn restore_picks_up_persisted_session() {
    let kv = MemoryStore::new();
    let session = manager(&kv).sign_in("ana@example.com", "pw").await.unwrap();

    let restarted = manager(&kv);
    assert_eq!(restarted.current_user(), None);
    assert_eq!(restarted.restore_session().await, Some(session.clone()));
    assert_eq!(restarted.current_user(), Some(session.user));
}

#[tokio::test]
async fn restore_after_sign_out_is_none() {
    let kv = MemoryStore::new();
    let auth = manager(&kv);

    auth.sign_in("ana@example.com", "pw").await.unwrap();
    auth.sign_out().await.unwrap();

    assert_eq!(auth.current_user(), None);
    assert_eq!(auth.restore_session().await, None);
    assert_eq!(manager(&kv).restore_session().await, None);
}

#[tokio::test]
async fn corrupt_session_is_discarded_on_restore() {
    let kv = MemoryStore::new();
    let key = StorageKey::session(StoreConfig::default().namespace());
    kv.set(key.as_str(), b"{\"user\": oops".to_vec()).await.unwrap();

    let auth = manager(&kv);
    assert_eq!(auth.restore_session().await, None);
    assert_eq!(auth.current_user(), None);
    assert_eq!(kv.get(key.as_str()).await.unwrap(), None);
}

#[tokio::test]
async fn read_failure_keeps_the_stored_session() {
    let kv = Arc::new(FlakyStore::default());
    let session = SessionManager::new(kv.clone(), StoreConfig::default())
        .sign_in("ana@example.com", "pw")
        .await
        .unwrap();

    kv.fail_next_get.store(true, Ordering::SeqCst);
    let auth = SessionManager::new(kv.clone(), StoreConfig::default());
    assert_eq!(auth.restore_session().await, None);
    assert_eq!(auth.current_user(), None);

    assert_eq!(auth.restore_session().await, Some(session.clone()));
    assert_eq!(auth.current_user(), Some(session.user));
}

#[tokio::test]
async fn expired_session_is_not_restored() {
    let kv = MemoryStore::new();
    let config = StoreConfig::default().with_session_ttl(time::Duration::seconds(-1));

    SessionManager::new(Arc::new(kv.clone()), config.clone())
        .sign_in("ana@example.com", "pw")
        .await
        .unwrap();

    let auth = SessionManager::new(Arc::new(kv.clone()), config);
    assert_eq!(auth.restore_session().await, None);
    assert_eq!(auth.current_user(), None);
}

#[tokio::test]
async fn subscribers_see_sign_in_and_sign_out() {
    let kv = MemoryStore::new();
    let auth = manager(&kv);
    let mut changes = auth.subscribe();

    auth.sign_in("ana@example.com", "pw").await.unwrap();
    changes.changed().await.unwrap();
    assert_eq!(
        changes.borrow_and_update().as_ref().map(|s| s.user.email.clone()),
        Some("ana@example.com".to_string())
    );

    auth.sign_out().await.unwrap();
    changes.changed().await.unwrap();
    assert!(changes.borrow_and_update().is_none());
}

#[tokio::test]
async fn reset_password_always_succeeds() {
    let kv = MemoryStore::new();
    let auth = manager(&kv);

    auth.reset_password("nobody@example.com").await.unwrap();
    assert_eq!(auth.current_user(), None);
}

#[tokio::test]
async fn namespaces_keep_sessions_apart() {
    let kv = MemoryStore::new();
    let a = SessionManager::new(Arc::new(kv.clone()), StoreConfig::new().with_namespace("a"));
    let b = SessionManager::new(Arc::new(kv.clone()), StoreConfig::new().with_namespace("b"));

    a.sign_in("ana@example.com", "pw").await.unwrap();
    assert_eq!(b.restore_session().await, None);
}
