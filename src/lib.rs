//! # sqlskel - Statement skeletons for legacy SQL/PLSQL
//!
//! Extracts a simplified structural skeleton from legacy SQL sources for
//! modernization tooling.
//!
//! sqlskel provides:
//! - A statement tree (ROOT, SELECT, INSERT, UPDATE, DELETE, MERGE) with line ranges
//! - A pluggable grammar front end emitting enter/exit events
//! - Object name extraction for packages, procedures, functions and triggers
//! - A session-scoped file store with idempotent uploads and legacy encoding reads
//! - An analysis orchestrator that caches results as JSON artifacts

pub mod statement;
pub mod tree;
pub mod frontend;
pub mod object_name;
pub mod storage;
pub mod analysis;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use statement::{Phase, StatementEvent, StatementKind};
pub use tree::{ArtifactNode, NodeId, StatementTree, TreeBuilder};
pub use frontend::{DmlScanner, GrammarFrontEnd};
pub use object_name::{extract_object, extract_object_name, ObjectKind, SqlObject};
pub use storage::{FileCategory, FileRecord, FileType, SessionScope, SessionStore};
pub use analysis::{AnalysisOutcome, Analyzer};
pub use config::StoreConfig;

use std::path::PathBuf;

/// Result type alias for sqlskel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for sqlskel operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Source file not found: {0}")]
    SourceFileNotFound(String),

    #[error("Source directory not found: {}", .0.display())]
    SourceDirectoryMissing(PathBuf),

    #[error("No .sql files in {}", .0.display())]
    NoSourceFiles(PathBuf),

    #[error("Could not decode {} with any configured encoding", path.display())]
    Decode { path: PathBuf },

    #[error("Parse error at line {line}: {message}")]
    Parse { line: u32, message: String },

    #[error("Unbalanced event at line {line}: {message}")]
    UnbalancedEvent { line: u32, message: String },

    #[error("{0} statement(s) still open when the tree was finished")]
    UnclosedStatements(usize),

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error("Invalid session or project key: {0}")]
    InvalidScope(String),

    #[error("Unknown statement kind: {0}")]
    InvalidKind(String),
}
