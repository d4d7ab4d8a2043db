//! Per-user record collections.
//!
//! Each (owner, kind[, scope]) triple maps to one stored sequence under a
//! [`StorageKey`]. Writes to a sequence are read-modify-write cycles run
//! through [`KeyValueStore::update`], so concurrent inserts into the same
//! sequence never drop each other, whichever store handle they come from.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::kv::{KeyValueStore, StorageKey};
use crate::model::{
    Booking, BookingStatus, Image, NewBooking, NewProject, Project, ProjectSummary, RecordKind,
};

/// A record type that can live in a [`RecordStore`] sequence.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: RecordKind;

    /// Whether listings re-sort by creation time, newest first, instead of
    /// returning the stored order.
    const SORT_NEWEST_FIRST: bool = false;

    fn id(&self) -> &str;

    fn created_at(&self) -> OffsetDateTime;
}

impl Record for Project {
    const KIND: RecordKind = RecordKind::Project;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
}

impl Record for Image {
    const KIND: RecordKind = RecordKind::Image;
    const SORT_NEWEST_FIRST: bool = true;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
}

impl Record for Booking {
    const KIND: RecordKind = RecordKind::Booking;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.submitted_at
    }
}

/// Typed, user-partitioned collections on top of a [`KeyValueStore`].
///
/// Clones share the provider. Independent stores over the same provider
/// are as safe as clones.
#[derive(Debug, Clone)]
pub struct RecordStore {
    kv: Arc<dyn KeyValueStore>,
    config: StoreConfig,
}

impl RecordStore {
    /// A record store keeping its sequences in `kv`.
    pub fn new(kv: Arc<dyn KeyValueStore>, config: StoreConfig) -> Self {
        Self { kv, config }
    }

    /// Settings this store was built with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn key<R: Record>(&self, owner: &str, scope: Option<&str>) -> StorageKey {
        StorageKey::records(self.config.namespace(), R::KIND, owner, scope)
    }

    /// Lists the records of kind `R` stored for `owner`.
    ///
    /// A sequence that cannot be read or decoded lists as empty.
    pub async fn list<R: Record>(&self, owner: &str, scope: Option<&str>) -> Vec<R> {
        let key = self.key::<R>(owner, scope);

        let mut records = match self.kv.get(key.as_str()).await {
            Ok(payload) => decode_sequence::<R>(&key, payload),
            Err(err) => {
                warn!(%key, error = %err, "failed to read records, listing as empty");
                Vec::new()
            }
        };

        if R::SORT_NEWEST_FIRST {
            records.sort_by_key(|record| std::cmp::Reverse(record.created_at()));
        }
        records
    }

    /// Prepends `record` to the stored sequence and persists the sequence.
    ///
    /// A stored sequence that no longer decodes is replaced; provider errors
    /// are returned without writing.
    pub async fn insert<R: Record>(&self, owner: &str, scope: Option<&str>, record: R) -> Result<()> {
        let key = self.key::<R>(owner, scope);
        let mut len = 0;

        self.kv
            .update(
                key.as_str(),
                Box::new(|payload: Option<Vec<u8>>| -> Result<Vec<u8>> {
                    let mut records = decode_sequence::<R>(&key, payload);
                    records.insert(0, record.clone());
                    len = records.len();
                    Ok(rmp_serde::to_vec(&records)?)
                }),
            )
            .await?;
        debug!(%key, len, "inserted {}", R::KIND);

        Ok(())
    }

    /// Applies `f` to the record with `id` and persists the sequence.
    async fn update<R, F>(&self, owner: &str, scope: Option<&str>, id: &str, f: F) -> Result<R>
    where
        R: Record,
        F: Fn(&mut R) + Sync,
    {
        let key = self.key::<R>(owner, scope);
        let not_found = || Error::NotFound {
            kind: R::KIND,
            id: id.to_string(),
        };
        let mut updated = None;

        self.kv
            .update(
                key.as_str(),
                Box::new(|payload: Option<Vec<u8>>| -> Result<Vec<u8>> {
                    let mut records = decode_sequence::<R>(&key, payload);
                    let record = records
                        .iter_mut()
                        .find(|record| record.id() == id)
                        .ok_or_else(not_found)?;
                    f(record);
                    updated = Some(record.clone());
                    Ok(rmp_serde::to_vec(&records)?)
                }),
            )
            .await?;
        debug!(%key, id, "updated {}", R::KIND);

        updated.ok_or_else(not_found)
    }

    /// Projects of `owner`, most recently created first.
    pub async fn projects(&self, owner: &str) -> Vec<Project> {
        self.list(owner, None).await
    }

    /// Creates a project from form input and stores it at the head of the
    /// owner's project list.
    pub async fn create_project(&self, owner: &str, input: NewProject) -> Result<Project> {
        let project = Project {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            description: input.description,
            client_name: input.client_name,
            shoot_date: input.shoot_date,
            location: input.location,
            status: input.status,
            created_at: OffsetDateTime::now_utc(),
        };
        self.insert(owner, None, project.clone()).await?;
        Ok(project)
    }

    /// Images of one project, newest first.
    pub async fn project_images(&self, owner: &str, project_id: &str) -> Vec<Image> {
        self.list(owner, Some(project_id)).await
    }

    /// Stores an image under its own `project_id`. The project is not
    /// required to exist.
    pub async fn add_image(&self, owner: &str, image: Image) -> Result<()> {
        let project_id = image.project_id.clone();
        self.insert(owner, Some(&project_id), image).await
    }

    /// Images of every project of `owner`, newest first.
    pub async fn list_images_across_projects(&self, owner: &str) -> Vec<Image> {
        let projects = self.projects(owner).await;

        let mut images = Vec::new();
        for project in &projects {
            images.extend(self.project_images(owner, &project.id).await);
        }
        images.sort_by_key(|image| std::cmp::Reverse(image.created_at));
        images
    }

    /// Projects with their image counts, in project list order.
    pub async fn project_summaries(&self, owner: &str) -> Vec<ProjectSummary> {
        let projects = self.projects(owner).await;

        let mut summaries = Vec::with_capacity(projects.len());
        for project in projects {
            let image_count = self.project_images(owner, &project.id).await.len();
            summaries.push(ProjectSummary {
                project,
                image_count,
            });
        }
        summaries
    }

    /// Booking requests of `owner`, most recently submitted first.
    pub async fn bookings(&self, owner: &str) -> Vec<Booking> {
        self.list(owner, None).await
    }

    /// Records a booking request. New bookings start as pending.
    pub async fn submit_booking(&self, owner: &str, input: NewBooking) -> Result<Booking> {
        let booking = Booking {
            id: Uuid::new_v4().to_string(),
            client_name: input.client_name,
            email: input.email,
            shoot_type: input.shoot_type,
            date: input.date,
            time: input.time,
            location: input.location,
            notes: input.notes,
            status: BookingStatus::Pending,
            submitted_at: OffsetDateTime::now_utc(),
        };
        self.insert(owner, None, booking.clone()).await?;
        Ok(booking)
    }

    /// Persists a booking status transition such as approve or reject.
    pub async fn set_booking_status(
        &self,
        owner: &str,
        booking_id: &str,
        status: BookingStatus,
    ) -> Result<Booking> {
        self.update(owner, None, booking_id, |booking: &mut Booking| {
            booking.status = status;
        })
        .await
    }
}

fn decode_sequence<R: Record>(key: &StorageKey, payload: Option<Vec<u8>>) -> Vec<R> {
    let Some(bytes) = payload else {
        return Vec::new();
    };

    match rmp_serde::from_slice(&bytes) {
        Ok(records) => records,
        Err(err) => {
            warn!(%key, error = %err, "discarding undecodable {} sequence", R::KIND);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;

    fn store() -> (MemoryStore, RecordStore) {
        let kv = MemoryStore::new();
        let records = RecordStore::new(Arc::new(kv.clone()), StoreConfig::default());
        (kv, records)
    }

    #[tokio::test]
    async fn corrupt_sequence_lists_as_empty() {
        let (kv, records) = store();
        kv.set("studio:projects:u1", b"not msgpack".to_vec())
            .await
            .unwrap();

        assert!(records.projects("u1").await.is_empty());
    }

    #[tokio::test]
    async fn insert_replaces_corrupt_sequence() {
        let (kv, records) = store();
        kv.set("studio:projects:u1", vec![0xc1]).await.unwrap();

        records
            .create_project("u1", NewProject::new("Fresh start"))
            .await
            .unwrap();

        let projects = records.projects("u1").await;
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].title, "Fresh start");
    }

    #[tokio::test]
    async fn updating_unknown_booking_is_not_found() {
        let (_, records) = store();

        let err = records
            .set_booking_status("u1", "missing", BookingStatus::Approved)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NotFound {
                kind: RecordKind::Booking,
                ..
            }
        ));
    }
}
