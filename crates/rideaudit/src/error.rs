//! Custom error types for the audit pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. Degenerate
//! statistical conditions (constant columns, all-missing columns, undefined
//! VIF) are NOT errors: those are carried as flagged results by the modules
//! that produce them. Errors here are conditions that stop a computation.

use thiserror::Error;

/// The main error type for the audit pipeline.
#[derive(Error, Debug)]
pub enum AuditError {
    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// The dataset has no rows; nothing can be assessed.
    #[error("Dataset has zero rows")]
    EmptyDataset,

    /// The dataset has no numeric columns; the audit is undefined.
    #[error("Dataset has no numeric columns")]
    NoNumericColumns,

    /// A column's physical type does not match its declared kind.
    #[error("Column '{column}' declared as {expected} but stored as {found}")]
    SchemaMismatch {
        column: String,
        expected: String,
        found: String,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A row mask was built against a dataset of a different height.
    #[error("Row mask of length {mask_len} applied to dataset with {rows} rows")]
    MaskLengthMismatch { mask_len: usize, rows: usize },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AuditError>,
    },
}

impl AuditError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AuditError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Check whether this error aborts the whole run rather than a single
    /// column computation.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::EmptyDataset | Self::NoNumericColumns | Self::InvalidConfig(_)
        )
    }
}

/// Result type alias for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AuditError::Polars(e).with_context(context))
    }
}
