//! Walks through a demo account end to end on a database-backed store.
//!
//! # Running the demo
//!
//! 1. Optionally point `DATABASE_URL` at a SQLite file (defaults to an
//!    in-memory database):
//!    ```bash
//!    export DATABASE_URL=sqlite://studio.db?mode=rwc
//!    ```
//! 2. Run it, raising the log level to see store activity:
//!    ```bash
//!    RUST_LOG=studio_store=debug cargo run --example studio_demo
//!    ```

use std::collections::BTreeSet;
use std::{env, sync::Arc, time::Duration};

use dotenvy::dotenv;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use studio_store::fixtures::seed_sample_catalog;
use studio_store::migration::Migrator;
use studio_store::views::{badge_tone, filter_gallery, DashboardStats, GalleryFilter, ProjectFilter};
use studio_store::{
    BookingStatus, MemoryObjectStore, NewProject, RecordStore, SeaOrmStore, SessionManager,
    SignUpMetadata, StoreConfig, UploadFile, Uploader,
};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    dotenv().ok();

    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    info!("Connecting to database: {}", database_url);

    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(1)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10));

    let db = Database::connect(opt).await?;
    Migrator::up(&db, None).await?;

    let kv = Arc::new(SeaOrmStore::new(db));
    let config = StoreConfig::default();

    let auth = SessionManager::new(kv.clone(), config.clone());
    let session = match auth.restore_session().await {
        Some(session) => session,
        None => {
            auth.sign_up(
                "studio@example.com",
                "demo",
                SignUpMetadata {
                    full_name: Some("Demo Studio".to_string()),
                },
            )
            .await?
        }
    };
    let owner = session.user.id.clone();
    info!(user = %session.user.display_name, "signed in");

    let records = RecordStore::new(kv, config);
    if records.projects(&owner).await.is_empty() {
        seed_sample_catalog(&records, &owner).await?;
    }

    let project = records
        .create_project(&owner, NewProject::new("Urban Photography"))
        .await?;
    let uploader = Uploader::new(records.clone(), Arc::new(MemoryObjectStore::new()));
    let tags: BTreeSet<String> = ["urban", "street", "architecture"]
        .into_iter()
        .map(String::from)
        .collect();
    let report = uploader
        .upload_images(
            &owner,
            &project.id,
            vec![
                UploadFile::new("city-01.jpg", b"first frame".to_vec()),
                UploadFile::new("city-02.jpg", b"second frame".to_vec()),
            ],
            &tags,
        )
        .await?;
    info!(
        uploaded = report.success_count(),
        failed = report.failure_count(),
        "upload finished"
    );

    if let Some(pending) = records
        .bookings(&owner)
        .await
        .into_iter()
        .find(|booking| booking.status == BookingStatus::Pending)
    {
        let booking = records
            .set_booking_status(&owner, &pending.id, BookingStatus::Approved)
            .await?;
        info!(client = %booking.client_name, status = %booking.status, "booking updated");
    }

    let summaries = records.project_summaries(&owner).await;
    let images = records.list_images_across_projects(&owner).await;
    let projects: Vec<_> = summaries.iter().map(|s| s.project.clone()).collect();

    for summary in &summaries {
        println!(
            "{:<28} {:<12} {:>3} photos  [{}]",
            summary.project.title,
            summary.project.status,
            summary.image_count,
            badge_tone(summary.project.status.label()).css_class()
        );
    }

    let hits = filter_gallery(&images, &projects, &GalleryFilter::new("street", ProjectFilter::All));
    println!("\"street\" matches {} image(s)", hits.len());

    let stats = DashboardStats::compute(&summaries, &records.bookings(&owner).await, &images);
    println!(
        "active projects: {}, photos: {}, pending bookings: {}, storage: {}",
        stats.active_projects,
        stats.total_photos,
        stats.pending_bookings,
        stats.storage_used_label()
    );

    Ok(())
}
