//! Sea-ORM entities used by the database-backed persistence provider.

pub mod stored_entry;
