//! Error types for the Runscope provider

use thiserror::Error;

use crate::client::ApiError;

/// Result type alias using the provider Error
pub type Result<T> = std::result::Result<T, Error>;

/// Provider error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to create {kind}: {source}")]
    Create {
        kind: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("Couldn't find {kind}: {source}")]
    Read {
        kind: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("Error deleting {kind}: {source}")]
    Delete {
        kind: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("Couldn't find {kind}: {key}")]
    ImportNotFound { kind: &'static str, key: String },

    #[error("Missing required attribute: {0}")]
    MissingAttribute(String),

    #[error("Invalid provider configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("Provider has not been configured")]
    NotConfigured,

    #[error("{type_name} does not support in-place update of: {attributes:?}")]
    UpdateUnsupported {
        type_name: String,
        attributes: Vec<String>,
    },

    #[error("Failed to build API client: {0}")]
    Client(#[source] ApiError),
}
