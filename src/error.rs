//! Error types for the genotab filter family.
//!
//! This module defines a hierarchy of error types, one per concern:
//!
//! - [`TableError`] - reading tab-delimited streams
//! - [`ColumnError`] - column-reference resolution
//! - [`ApiError`] - remote data-service lookups
//! - [`WorkspaceError`] - workspace object retrieval
//! - [`CliError`] - top-level command errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Table Stream Errors
// =============================================================================

/// Errors while reading a tab-delimited stream.
#[derive(Debug, Error)]
pub enum TableError {
    /// Failed to read from the stream.
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// The header record could not be parsed.
    #[error("Malformed header: {0}")]
    MalformedHeader(String),
}

// =============================================================================
// Column Resolution Errors
// =============================================================================

/// Errors while resolving a column reference against a header.
#[derive(Debug, Error)]
pub enum ColumnError {
    /// The reference is neither a valid position nor a known column name.
    #[error("Unknown column: '{0}'")]
    UnknownColumn(String),

    /// A positional reference falls outside the header.
    #[error("Column position {position} out of range (table has {width} columns)")]
    PositionOutOfRange { position: usize, width: usize },
}

// =============================================================================
// Data Service Errors
// =============================================================================

/// Errors from the remote data service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("Data service request failed: {0}")]
    RequestFailed(String),

    /// Response body was not the JSON we expect.
    #[error("Invalid data service response: {0}")]
    InvalidJson(String),

    /// The service answered with an error status.
    #[error("Data service error: {0}")]
    Service(String),
}

// =============================================================================
// Workspace Errors
// =============================================================================

/// Errors from the remote workspace service.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// Missing or rejected credentials. Always fatal.
    #[error("Workspace authentication failed: {0}")]
    AuthFailed(String),

    /// The object path does not exist.
    #[error("Workspace object not found: {0}")]
    NotFound(String),

    /// HTTP request failed.
    #[error("Workspace request failed: {0}")]
    RequestFailed(String),

    /// The object payload did not contain the expected id list.
    #[error("Invalid workspace payload: {0}")]
    InvalidPayload(String),
}

// =============================================================================
// Command Errors (top-level)
// =============================================================================

/// Top-level errors returned by the command implementations.
///
/// Wraps all lower-level errors so a command can report a single
/// diagnostic and exit non-zero.
#[derive(Debug, Error)]
pub enum CliError {
    /// Stream reading error.
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// Column resolution error.
    #[error("Column error: {0}")]
    Column(#[from] ColumnError),

    /// Data service error.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Workspace error.
    #[error("Workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    /// IO error while writing output or opening files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for stream operations.
pub type TableResult<T> = Result<T, TableError>;

/// Result type for column resolution.
pub type ColumnResult<T> = Result<T, ColumnError>;

/// Result type for data service operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type for workspace operations.
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

/// Result type for command implementations.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // ColumnError -> CliError
        let col_err = ColumnError::UnknownColumn("genome_id".into());
        let cli_err: CliError = col_err.into();
        assert!(cli_err.to_string().contains("genome_id"));

        // TableError -> CliError
        let table_err = TableError::MalformedHeader("empty record".into());
        let cli_err: CliError = table_err.into();
        assert!(cli_err.to_string().contains("empty record"));
    }

    #[test]
    fn test_position_error_format() {
        let err = ColumnError::PositionOutOfRange {
            position: 7,
            width: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains('7'));
        assert!(msg.contains('3'));
    }
}
