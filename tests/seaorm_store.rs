#![cfg(all(feature = "sqlite", feature = "migration"))]

use std::sync::Arc;

use sea_orm::{ConnectOptions, Database, EntityTrait};
use sea_orm_migration::MigratorTrait;
use studio_store::entity::stored_entry;
use studio_store::migration::Migrator;
use studio_store::{
    Error, KeyValueStore, NewProject, RecordStore, SeaOrmStore, SessionManager, StoreConfig,
};

async fn store() -> SeaOrmStore {
    // A single connection keeps every query on the same in-memory database
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1);

    let conn = Database::connect(opt).await.expect("connect");
    Migrator::up(&conn, None).await.expect("migrate");
    SeaOrmStore::new(conn)
}

#[tokio::test]
async fn set_get_and_remove() {
    let store = store().await;

    assert_eq!(store.get("k").await.unwrap(), None);

    store.set("k", vec![1, 2, 3]).await.unwrap();
    assert_eq!(store.get("k").await.unwrap(), Some(vec![1, 2, 3]));

    store.remove("k").await.unwrap();
    assert_eq!(store.get("k").await.unwrap(), None);

    store.remove("k").await.unwrap();
}

#[tokio::test]
async fn set_overwrites_existing_entry() {
    let store = store().await;

    store.set("k", vec![1]).await.unwrap();
    store.set("k", vec![2, 2]).await.unwrap();

    assert_eq!(store.get("k").await.unwrap(), Some(vec![2, 2]));
    let rows = stored_entry::Entity::find()
        .all(store.connection())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn update_sees_the_current_payload() {
    let store = store().await;

    for byte in [1u8, 2, 3] {
        store
            .update(
                "k",
                Box::new(move |current: Option<Vec<u8>>| -> studio_store::Result<Vec<u8>> {
                    let mut bytes = current.unwrap_or_default();
                    bytes.push(byte);
                    Ok(bytes)
                }),
            )
            .await
            .unwrap();
    }

    assert_eq!(store.get("k").await.unwrap(), Some(vec![1, 2, 3]));
}

#[tokio::test]
async fn failed_update_rolls_back() {
    let store = store().await;
    store.set("k", vec![7]).await.unwrap();

    let err = store
        .update(
            "k",
            Box::new(|_: Option<Vec<u8>>| -> studio_store::Result<Vec<u8>> {
                Err(Error::Backend("refused".into()))
            }),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Backend(_)));
    assert_eq!(store.get("k").await.unwrap(), Some(vec![7]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn independent_record_stores_share_the_database_safely() {
    let kv: Arc<dyn KeyValueStore> = Arc::new(store().await);
    let left = RecordStore::new(kv.clone(), StoreConfig::default());
    let right = RecordStore::new(kv.clone(), StoreConfig::default());

    for round in 0..20 {
        let owner = format!("owner-{round}");
        let (a, b) = tokio::join!(
            left.create_project(&owner, NewProject::new("Left")),
            right.create_project(&owner, NewProject::new("Right")),
        );
        a.unwrap();
        b.unwrap();

        assert_eq!(right.projects(&owner).await.len(), 2, "round {round}");
    }
}

#[tokio::test]
async fn migration_can_be_rerun() {
    let store = store().await;
    Migrator::up(store.connection(), None).await.unwrap();

    store.set("k", vec![9]).await.unwrap();
    assert_eq!(store.get("k").await.unwrap(), Some(vec![9]));
}

#[tokio::test]
async fn session_and_records_round_trip_through_the_database() {
    let kv = Arc::new(store().await);
    let config = StoreConfig::default();

    let session = SessionManager::new(kv.clone(), config.clone())
        .sign_in("ana@example.com", "pw")
        .await
        .unwrap();

    let records = RecordStore::new(kv.clone(), config.clone());
    let project = records
        .create_project(&session.user.id, NewProject::new("Headshots"))
        .await
        .unwrap();

    let restarted = SessionManager::new(kv.clone(), config.clone());
    let restored = restarted.restore_session().await.expect("restored session");
    assert_eq!(restored.user.id, session.user.id);

    let records = RecordStore::new(kv, config);
    assert_eq!(records.projects(&restored.user.id).await, vec![project]);
}
