//! Error types for the case engine.

use crate::legal::entity::EntityType;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("failed to parse settings: {0}")]
    ParseError(String),

    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while editing or saving case records.
///
/// Every variant is returned before the store is touched, so a rejected
/// operation never leaves a partial change behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaseError {
    #[error("case '{id}' not found")]
    NotFound { id: String },

    #[error("case '{id}' already exists")]
    AlreadyExists { id: String },

    #[error("case '{id}' cannot be related to itself")]
    SelfLink { id: String },

    #[error("case '{id}' is already related to '{target}'")]
    DuplicateLink { id: String, target: String },

    #[error("cannot relate to unknown case '{id}'")]
    UnknownCase { id: String },

    #[error("'{id}' is already attached as {field}")]
    DuplicateReference { field: &'static str, id: String },

    #[error("{kind} references cannot be attached to a case")]
    UnsupportedReference { kind: EntityType },

    #[error("{collection} entry '{id}' not found")]
    EntryNotFound {
        collection: &'static str,
        id: String,
    },
}

/// Errors raised by reference registries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("{kind} '{id}' already exists")]
    DuplicateId { kind: EntityType, id: String },

    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityType, id: String },

    #[error("{kind} name must not be empty")]
    EmptyName { kind: EntityType },
}

/// Errors raised by bulk import/export.
#[derive(Debug, thiserror::Error)]
pub enum InterchangeError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("input has no header row")]
    MissingHeader,
}

/// Errors from the advisory-text model.
///
/// These never cross the `Advisor` boundary; they are logged and turned into
/// display text there.
#[derive(Debug, thiserror::Error)]
pub enum AdvisoryError {
    #[error("advisory requests are disabled")]
    Disabled,

    #[error("invalid model endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model returned no text")]
    EmptyResponse,

    #[error("model request timed out after {0}s")]
    Timeout(u64),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors from the two steps of a quick-create.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuickCreateError {
    #[error("label must not be empty")]
    EmptyLabel,

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Case(#[from] CaseError),
}
