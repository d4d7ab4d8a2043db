//! Error type shared by every store in this crate.

use crate::model::RecordKind;

/// Errors produced by the persistence providers, the record store and the
/// upload pipeline.
///
/// Authentication never produces an error of its own: the demo session
/// manager accepts every credential. It can only surface a provider failure
/// while persisting the session.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The persistence provider failed to read or write.
    #[error("backend error: {0}")]
    Backend(String),

    /// A value could not be serialized for storage.
    #[error("encode error: {0}")]
    Encode(String),

    /// A stored value could not be deserialized.
    #[error("decode error: {0}")]
    Decode(String),

    /// An upload was attempted before the user created any project.
    #[error("create a project before uploading images")]
    NoProjects,

    /// A record addressed by id does not exist in the user's partition.
    #[error("{kind} `{id}` not found")]
    NotFound { kind: RecordKind, id: String },

    /// An uploaded file had no content.
    #[error("`{0}` is empty")]
    EmptyUpload(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl From<rmp_serde::encode::Error> for Error {
    fn from(err: rmp_serde::encode::Error) -> Self {
        Error::Encode(err.to_string())
    }
}

impl From<rmp_serde::decode::Error> for Error {
    fn from(err: rmp_serde::decode::Error) -> Self {
        Error::Decode(err.to_string())
    }
}
