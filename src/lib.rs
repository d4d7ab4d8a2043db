//! # Studio Store
//!
//! The data and demo-authentication layer of a photography studio
//! management application: a session manager that fabricates local
//! sessions, a record store that keeps each user's projects, images and
//! bookings in their own partition, and pure view derivations for the
//! gallery, status badges and dashboard.
//!
//! ## Features
//!
//! - Pluggable persistence through [`KeyValueStore`], with an in-memory
//!   provider and a Sea-ORM provider for SQLite or PostgreSQL
//! - Stable demo identities: signing in twice with one email yields one user id
//! - Atomic read-modify-write per key, so concurrent inserts are never lost,
//!   even from independent store handles
//! - Content-addressed image storage with per-file upload reporting
//! - Records serialized with MessagePack for compact storage
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::collections::BTreeSet;
//! use std::sync::Arc;
//!
//! use studio_store::views::DashboardStats;
//! use studio_store::{
//!     MemoryObjectStore, MemoryStore, NewProject, RecordStore, SessionManager, StoreConfig,
//!     UploadFile, Uploader,
//! };
//!
//! # async fn example() -> studio_store::Result<()> {
//! let kv = Arc::new(MemoryStore::new());
//! let config = StoreConfig::default();
//!
//! let auth = SessionManager::new(kv.clone(), config.clone());
//! let session = auth.sign_in("ana@example.com", "any password").await?;
//! let owner = session.user.id.as_str();
//!
//! let records = RecordStore::new(kv, config);
//! let project = records.create_project(owner, NewProject::new("Spring lookbook")).await?;
//!
//! let uploader = Uploader::new(records.clone(), Arc::new(MemoryObjectStore::new()));
//! let files = vec![UploadFile::new("look-01.jpg", vec![0xff, 0xd8, 0xff])];
//! let report = uploader.upload_images(owner, &project.id, files, &BTreeSet::new()).await?;
//! assert_eq!(report.success_count(), 1);
//!
//! let stats = DashboardStats::compute(
//!     &records.project_summaries(owner).await,
//!     &records.bookings(owner).await,
//!     &records.list_images_across_projects(owner).await,
//! );
//! assert_eq!(stats.total_photos, 1);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod entity;
pub mod error;
pub mod fixtures;
pub mod kv;
#[cfg(feature = "migration")]
pub mod migration;
pub mod model;
pub mod records;
pub mod uploads;
pub mod views;

pub use auth::SessionManager;
pub use config::StoreConfig;
pub use error::{Error, Result};
pub use kv::{KeyValueStore, MemoryStore, SeaOrmStore, StorageKey, UpdateFn};
pub use model::{
    Booking, BookingStatus, Image, NewBooking, NewProject, Project, ProjectStatus,
    ProjectSummary, RecordKind, Session, SignUpMetadata, User,
};
pub use records::{Record, RecordStore};
pub use uploads::{MemoryObjectStore, ObjectStore, UploadFile, UploadReport, Uploader};
