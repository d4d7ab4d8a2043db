use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QuerySelect, Set, SqlErr,
    TransactionTrait,
};
use time::OffsetDateTime;
use tracing::debug;

use super::{KeyValueStore, UpdateFn};
use crate::entity::stored_entry::{ActiveModel as EntryActiveModel, Entity as EntryEntity};
use crate::error::{Error, Result};

/// Attempts before an update racing first inserts of the same key gives up.
const MAX_UPDATE_ATTEMPTS: usize = 5;

/// A key-value store kept in a database table through Sea-ORM.
///
/// Works with SQLite (`sqlite` feature, on by default) and PostgreSQL
/// (`postgres` feature). The `stored_entry` table is created by
/// [`Migrator`](crate::migration::Migrator) when the `migration` feature is
/// enabled.
///
/// ```no_run
/// use sea_orm::Database;
/// use studio_store::{KeyValueStore, SeaOrmStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let conn = Database::connect("sqlite://studio.db?mode=rwc").await?;
/// let store = SeaOrmStore::new(conn);
/// store.set("studio:session", vec![1, 2, 3]).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SeaOrmStore {
    conn: DatabaseConnection,
}

/// How one transactional read-modify-write ended.
enum Attempt {
    Written,
    /// Another writer inserted the key first; the transaction was rolled back.
    LostInsertRace,
}

impl SeaOrmStore {
    /// Wraps an open connection. The `stored_entry` table must exist.
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// The underlying connection.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Reads the entry with an exclusive row lock, applies `apply` and
    /// writes the result, all inside one transaction.
    ///
    /// On backends without row locks (SQLite) the database write lock
    /// serializes competing transactions instead.
    async fn try_update(&self, key: &str, apply: &mut UpdateFn<'_>) -> Result<Attempt> {
        let txn = self
            .conn
            .begin()
            .await
            .map_err(|e| Error::Backend(e.to_string()))?;

        let existing = EntryEntity::find_by_id(key.to_string())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| Error::Backend(e.to_string()))?;

        let value = apply(existing.as_ref().map(|model| model.value.clone()))?;
        let updated_at = convert_time_to_datetime(OffsetDateTime::now_utc());

        match existing {
            Some(existing) => {
                let mut active_model = existing.into_active_model();
                active_model.value = Set(value);
                active_model.updated_at = Set(updated_at);
                active_model
                    .update(&txn)
                    .await
                    .map_err(|e| Error::Backend(e.to_string()))?;
            }
            None => {
                let entry = EntryActiveModel {
                    key: Set(key.to_string()),
                    value: Set(value),
                    updated_at: Set(updated_at),
                };

                if let Err(err) = entry.insert(&txn).await {
                    if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
                        return Ok(Attempt::LostInsertRace);
                    }
                    return Err(Error::Backend(err.to_string()));
                }
            }
        }

        txn.commit()
            .await
            .map_err(|e| Error::Backend(e.to_string()))?;

        Ok(Attempt::Written)
    }
}

#[async_trait]
impl KeyValueStore for SeaOrmStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entry = EntryEntity::find_by_id(key.to_string())
            .one(&self.conn)
            .await
            .map_err(|e| Error::Backend(e.to_string()))?;

        Ok(entry.map(|model| model.value))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.update(
            key,
            Box::new(move |_: Option<Vec<u8>>| -> Result<Vec<u8>> { Ok(value.clone()) }),
        )
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        EntryEntity::delete_by_id(key.to_string())
            .exec(&self.conn)
            .await
            .map_err(|e| Error::Backend(e.to_string()))?;

        Ok(())
    }

    /// Retries when a concurrent transaction inserts the same new key
    /// first; `apply` then sees that writer's payload.
    async fn update<'a>(&self, key: &str, mut apply: UpdateFn<'a>) -> Result<()> {
        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            match self.try_update(key, &mut apply).await? {
                Attempt::Written => return Ok(()),
                Attempt::LostInsertRace => {
                    debug!(key, attempt, "concurrent insert of the same key, retrying");
                }
            }
        }

        Err(Error::Backend(format!(
            "gave up updating `{key}` after {MAX_UPDATE_ATTEMPTS} conflicting inserts"
        )))
    }
}

// Sea-ORM timestamps are chrono values; the rest of the crate uses `time`.
fn convert_time_to_datetime(time: OffsetDateTime) -> DateTimeWithTimeZone {
    use chrono::{DateTime, Utc};

    DateTime::<Utc>::from_timestamp(time.unix_timestamp(), time.nanosecond())
        .unwrap_or_default()
        .into()
}
