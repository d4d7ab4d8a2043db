use sea_orm::Schema;
use sea_orm_migration::prelude::*;

use crate::entity::stored_entry;

/// Creates the `stored_entry` table from its entity definition.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        manager
            .create_table(
                schema
                    .create_table_from_entity(stored_entry::Entity)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(stored_entry::Entity)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}
