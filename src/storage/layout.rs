//! Session directory layout
//!
//! `base/{session}/{project?}/{src|ddl|sequence|analysis}/`
//!
//! Files are routed to a category by substrings of their name. The same
//! rule is used when writing and when looking files up again.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Storage scope: a session key, optionally narrowed to a logical project
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionScope {
    pub session: String,
    pub project: Option<String>,
}

impl SessionScope {
    /// Scope for a session key. The key becomes a directory name, so it
    /// must be a single path segment.
    pub fn new(session: impl Into<String>) -> Result<Self> {
        let session = session.into();
        validate_scope_key(&session)?;
        Ok(Self {
            session,
            project: None,
        })
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Result<Self> {
        let project = project.into();
        validate_scope_key(&project)?;
        self.project = Some(project);
        Ok(self)
    }

    /// Root directory of this scope under `base`
    pub fn dir_in(&self, base: &Path) -> PathBuf {
        let dir = base.join(&self.session);
        match &self.project {
            Some(project) => dir.join(project),
            None => dir,
        }
    }
}

impl std::fmt::Display for SessionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.project {
            Some(project) => write!(f, "{}/{}", self.session, project),
            None => write!(f, "{}", self.session),
        }
    }
}

/// Category directory inside a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileCategory {
    Source,
    Ddl,
    Sequence,
    Analysis,
}

impl FileCategory {
    /// Categories holding uploaded sources, in lookup order
    pub const SOURCES: [FileCategory; 3] = [FileCategory::Source, FileCategory::Ddl, FileCategory::Sequence];

    /// Every category directory
    pub const ALL: [FileCategory; 4] = [
        FileCategory::Source,
        FileCategory::Ddl,
        FileCategory::Sequence,
        FileCategory::Analysis,
    ];

    pub fn dir_name(&self) -> &'static str {
        match self {
            FileCategory::Source => "src",
            FileCategory::Ddl => "ddl",
            FileCategory::Sequence => "sequence",
            FileCategory::Analysis => "analysis",
        }
    }

    /// Route a source file by name. `SEQ` wins over `DDL`; neither means source.
    pub fn classify(file_name: &str) -> Self {
        match FileType::classify(file_name) {
            FileType::Seq => FileCategory::Sequence,
            FileType::Ddl => FileCategory::Ddl,
            FileType::Plsql => FileCategory::Source,
        }
    }
}

/// File type label reported with each record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileType {
    Plsql,
    Ddl,
    Seq,
}

impl FileType {
    pub fn classify(file_name: &str) -> Self {
        let upper = file_name.to_uppercase();
        if upper.contains("SEQ") {
            FileType::Seq
        } else if upper.contains("DDL") {
            FileType::Ddl
        } else {
            FileType::Plsql
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Plsql => "PLSQL",
            FileType::Ddl => "DDL",
            FileType::Seq => "SEQ",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Name without its last extension (`pkg.body.sql` -> `pkg.body`)
pub fn base_name(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(idx) => &file_name[..idx],
    }
}

/// True when the name ends in `.sql`, in any case
pub fn has_sql_extension(file_name: &str) -> bool {
    file_name.to_lowercase().ends_with(".sql")
}

/// True for one plain path component: no separators, not `.` or `..`
fn is_single_segment(name: &str) -> bool {
    !(name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']))
}

/// Reject names that would escape their category directory
pub fn validate_file_name(file_name: &str) -> Result<()> {
    if !is_single_segment(file_name) {
        return Err(Error::InvalidFileName(file_name.to_string()));
    }
    Ok(())
}

/// Reject session and project keys that would escape the base directory
pub fn validate_scope_key(key: &str) -> Result<()> {
    if !is_single_segment(key) {
        return Err(Error::InvalidScope(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_substring() {
        assert_eq!(FileCategory::classify("orders_ddl.sql"), FileCategory::Ddl);
        assert_eq!(FileCategory::classify("SEQ_ORDERS.sql"), FileCategory::Sequence);
        assert_eq!(FileCategory::classify("pkg_orders.sql"), FileCategory::Source);
        assert_eq!(FileCategory::classify("ddl_seq_all.sql"), FileCategory::Sequence);
    }

    #[test]
    fn test_file_type_matches_category() {
        for name in ["a_DDL.sql", "x_seq.sql", "proc.sql", "ddlseq"] {
            let expected = match FileType::classify(name) {
                FileType::Seq => FileCategory::Sequence,
                FileType::Ddl => FileCategory::Ddl,
                FileType::Plsql => FileCategory::Source,
            };
            assert_eq!(FileCategory::classify(name), expected);
        }
    }

    #[test]
    fn test_scope_dirs() {
        let base = Path::new("/data");
        assert_eq!(SessionScope::new("s1").unwrap().dir_in(base), PathBuf::from("/data/s1"));
        assert_eq!(
            SessionScope::new("s1").unwrap().with_project("p").unwrap().dir_in(base),
            PathBuf::from("/data/s1/p")
        );
    }

    #[test]
    fn test_scope_keys_stay_inside_base() {
        for key in ["../../x", "..", "a/b", "a\\b", ""] {
            assert!(matches!(SessionScope::new(key), Err(Error::InvalidScope(_))), "{key}");
        }
        let scope = SessionScope::new("s1").unwrap();
        assert!(matches!(scope.with_project("../other"), Err(Error::InvalidScope(_))));
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("pkg.sql"), "pkg");
        assert_eq!(base_name("pkg.body.sql"), "pkg.body");
        assert_eq!(base_name("noext"), "noext");
        assert_eq!(base_name(".hidden"), ".hidden");
    }

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("ok.sql").is_ok());
        assert!(validate_file_name("../etc/passwd").is_err());
        assert!(validate_file_name("a\\b.sql").is_err());
        assert!(validate_file_name("").is_err());
    }

    #[test]
    fn test_sql_extension() {
        assert!(has_sql_extension("A.SQL"));
        assert!(!has_sql_extension("a.sql.bak"));
    }
}
