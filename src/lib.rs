//! # genotab - filters for tab-delimited genomic data tables
//!
//! genotab is a family of command-line filters over tab-delimited streams,
//! optionally joined against a remote biological-data service by key.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐     ┌─────────────┐
//! │  TSV input  │────▶│ Header + Col │────▶│ Couplets /   │────▶│  TSV/FASTA  │
//! │ (stdin/file)│     │  resolution  │     │ batch lookup │     │   output    │
//! └─────────────┘     └──────────────┘     └──────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use genotab::table::{read_header, read_row, columns};
//!
//! let header = read_header(&mut reader, true)?.unwrap();
//! let index = columns::resolve_one("genome_id", &header)?;
//! while let Some(row) = read_row(&mut reader)? {
//!     println!("{}", row[index]);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`table`] - Headers, rows, column resolution, couplets
//! - [`expand`] - Delimited set expansion
//! - [`api`] - Remote data-service client and batch joiner
//! - [`workspace`] - Workspace group retrieval
//! - [`fasta`] - FASTA record assembly
//! - [`logs`] - stderr status logging

// Core modules
pub mod error;
pub mod logs;

// Tabular streams
pub mod table;

// Set expansion
pub mod expand;

// Remote services
pub mod api;
pub mod workspace;

// Output formatting
pub mod fasta;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ApiError, ApiResult, CliError, CliResult, ColumnError, ColumnResult, TableError, TableResult,
    WorkspaceError, WorkspaceResult,
};

// =============================================================================
// Re-exports - Table primitives
// =============================================================================

pub use table::{
    join_row, read_header, read_row, split_record, wrap_values, Header, Row, FIELD_DELIMITER,
};

pub use table::columns::{
    all_columns, complement, resolve_many, resolve_one, select, ColumnRef,
};

pub use table::couplets::{Couplet, Couplets};

// =============================================================================
// Re-exports - Set expansion
// =============================================================================

pub use expand::{GroupEntry, GroupIdSource, SetExpander, DEFAULT_DELIMITER};

// =============================================================================
// Re-exports - Remote services
// =============================================================================

pub use api::{fetch_keyed, index_by_key, DataClient, RecordSource};

pub use workspace::WorkspaceClient;

// =============================================================================
// Re-exports - Logging
// =============================================================================

pub use logs::{log_error, log_info, log_success, log_warning, LOGGER};
