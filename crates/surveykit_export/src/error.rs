//! Error types for the export pipeline.

use thiserror::Error;

/// Object-storage failures, keyed by the object or prefix involved.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to list objects under {prefix}: {source}")]
    List {
        prefix: String,
        #[source]
        source: object_store::Error,
    },

    #[error("failed to read object {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: object_store::Error,
    },

    #[error("failed to upload object {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: object_store::Error,
    },

    #[error("failed to sign retrieval link for {key}: {source}")]
    Sign {
        key: String,
        #[source]
        source: object_store::Error,
    },

    /// A key that cannot address an object (empty, `.` or `..` segments, control characters).
    #[error("invalid object key {key:?}: {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: object_store::path::Error,
    },

    #[error("failed to build storage client: {0}")]
    Client(#[source] object_store::Error),
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction or merge error.
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// A configuration field has an invalid value.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Top-level export failure, one variant per response class.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Missing or malformed identifying parameters.
    #[error("{0}")]
    BadRequest(String),

    /// Zero parseable records under the report prefix.
    #[error("no responses found for workspace {workspace_name:?}, survey {survey_name:?}")]
    NotFound {
        workspace_name: String,
        survey_name: String,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Workbook assembly or serialization failure.
    #[error("workbook error: {0}")]
    Workbook(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ExportError {
    /// HTTP status code for the invocation response.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Storage(_) | Self::Workbook(_) | Self::Config(_) => 500,
        }
    }

    /// Short machine-facing error label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "workspace_name and survey_name are required",
            Self::NotFound { .. } => "No responses found",
            Self::Storage(_) | Self::Workbook(_) | Self::Config(_) => "Internal server error",
        }
    }
}
