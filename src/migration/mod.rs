//! Schema migrations for [`SeaOrmStore`](crate::kv::SeaOrmStore).
//!
//! ```no_run
//! use sea_orm::Database;
//! use sea_orm_migration::MigratorTrait;
//! use studio_store::migration::Migrator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let conn = Database::connect("sqlite://studio.db?mode=rwc").await?;
//! Migrator::up(&conn, None).await?;
//! # Ok(())
//! # }
//! ```

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_stored_entry_table;

/// Creates and drops the `stored_entry` table.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    // Own bookkeeping table so the host application's migrations are untouched
    fn migration_table_name() -> sea_orm::DynIden {
        Alias::new("studio_store_migrations").into_iden()
    }

    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000001_create_stored_entry_table::Migration)]
    }
}
