//! Entity for the table backing [`SeaOrmStore`](crate::kv::SeaOrmStore).

use sea_orm::entity::prelude::*;

/// One key-value entry.
///
/// | Column     | Type               | Description                          |
/// |------------|--------------------|--------------------------------------|
/// | key        | TEXT (Primary Key) | Namespaced storage key               |
/// | value      | BYTEA / BLOB       | MessagePack payload                  |
/// | updated_at | TIMESTAMPTZ        | Time of the last write to this entry |
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "stored_entry")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub key: String,

    pub value: Vec<u8>,

    pub updated_at: DateTimeWithTimeZone,
}

/// Entries stand alone; there are no relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
