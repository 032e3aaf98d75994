//! Storage Layer - session-scoped filesystem store
//!
//! Layout under the configured base directory:
//! - `{session}/{project?}/src` - PL/SQL sources
//! - `{session}/{project?}/ddl` - files with `DDL` in the name
//! - `{session}/{project?}/sequence` - files with `SEQ` in the name
//! - `{session}/{project?}/analysis` - one JSON artifact per analyzed source

pub mod layout;
pub mod encoding;
pub mod record;
pub mod session;

pub use layout::{FileCategory, FileType, SessionScope};
pub use record::FileRecord;
pub use session::{SessionStore, WriteOutcome};
