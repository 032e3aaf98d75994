//! Analysis orchestration
//!
//! Ties the session store to a grammar front end:
//! - single file: skip if an artifact exists, otherwise locate, parse, store
//! - batch: best-effort per file, never aborts on one file's failure
//! - directory: re-analyze every source unconditionally
//!
//! The artifact on disk is the only cache. Nothing is kept in memory
//! between calls.

use crate::frontend::{DmlScanner, GrammarFrontEnd};
use crate::storage::layout::validate_file_name;
use crate::storage::{FileCategory, FileRecord, SessionScope, SessionStore};
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// What happened to a single-file analysis request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// Artifact already present; the source was not parsed
    Cached(PathBuf),
    /// Source parsed and artifact written
    Analyzed { path: PathBuf, statements: usize },
}

impl AnalysisOutcome {
    pub fn path(&self) -> &Path {
        match self {
            AnalysisOutcome::Cached(path) => path,
            AnalysisOutcome::Analyzed { path, .. } => path,
        }
    }

    pub fn was_cached(&self) -> bool {
        matches!(self, AnalysisOutcome::Cached(_))
    }
}

/// Analysis orchestrator over a session store
pub struct Analyzer<F: GrammarFrontEnd = DmlScanner> {
    store: SessionStore,
    front_end: F,
}

impl Analyzer<DmlScanner> {
    /// Analyzer using the built-in DML scanner
    pub fn with_scanner(store: SessionStore) -> Self {
        Self::new(store, DmlScanner::new())
    }
}

impl<F: GrammarFrontEnd> Analyzer<F> {
    pub fn new(store: SessionStore, front_end: F) -> Self {
        Self { store, front_end }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn front_end(&self) -> &F {
        &self.front_end
    }

    /// Analyze one source file unless its artifact already exists
    pub fn analyze_file(&self, scope: &SessionScope, file_name: &str) -> Result<AnalysisOutcome> {
        validate_file_name(file_name)?;
        let artifact = self.store.artifact_path(scope, file_name);
        if artifact.is_file() {
            tracing::info!("Already analyzed, skipping: {}", file_name);
            return Ok(AnalysisOutcome::Cached(artifact));
        }
        self.analyze_file_fresh(scope, file_name)
    }

    /// Analyze one source file, replacing any existing artifact
    pub fn analyze_file_fresh(&self, scope: &SessionScope, file_name: &str) -> Result<AnalysisOutcome> {
        let artifact = self.store.artifact_path(scope, file_name);
        self.store.ensure_dir(&self.store.analysis_dir(scope))?;

        let source = self
            .store
            .locate_source(scope, file_name)?
            .ok_or_else(|| Error::SourceFileNotFound(file_name.to_string()))?;

        let statements = self.analyze_source(&source, &artifact)?;
        Ok(AnalysisOutcome::Analyzed {
            path: artifact,
            statements,
        })
    }

    /// Parse `source` and write its tree to `artifact`. Returns the statement count.
    fn analyze_source(&self, source: &Path, artifact: &Path) -> Result<usize> {
        let text = self.store.read_content(source)?;
        let tree = self.front_end.parse(&text)?;
        let json = serde_json::to_string_pretty(&tree.to_artifact())?;
        self.store.write_artifact(artifact, &json)?;

        tracing::debug!(
            "{} parsed {} with {} statement(s)",
            self.front_end.name(),
            source.display(),
            tree.len() - 1
        );
        Ok(tree.len() - 1)
    }

    /// Process a batch of logical object names, each resolved to `<name>.sql`.
    ///
    /// Names that cannot be located are skipped. Files that fail to analyze
    /// are still reported, with `analysis_exists = Some(false)`.
    pub fn process_batch<S: AsRef<str>>(&self, scope: &SessionScope, names: &[S]) -> Result<Vec<FileRecord>> {
        self.store.ensure_dir(&self.store.analysis_dir(scope))?;
        let mut records = Vec::new();

        for name in names {
            let sql_name = format!("{}.sql", name.as_ref());
            let source = match self.store.locate_source(scope, &sql_name) {
                Ok(Some(path)) => path,
                Ok(None) => {
                    tracing::warn!("Source not found, skipping: {}", sql_name);
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Cannot look up {}: {}", sql_name, e);
                    continue;
                }
            };

            let record = match self.store.read_record(&source) {
                Ok(record) => record,
                Err(e) => {
                    tracing::error!("Failed to read {}: {}", source.display(), e);
                    continue;
                }
            };

            let artifact = self.store.artifact_path(scope, &record.file_name);
            if artifact.is_file() {
                tracing::info!("Already analyzed, skipping: {}", record.file_name);
            } else {
                match self.analyze_source(&source, &artifact) {
                    Ok(_) => tracing::info!("Analyzed {}", record.file_name),
                    Err(e) => tracing::warn!("Analysis failed for {} (continuing): {}", record.file_name, e),
                }
            }

            let exists = artifact.is_file();
            records.push(record.with_analysis(exists));
        }

        Ok(records)
    }

    /// Analyze every `.sql` file in the session's source directory, ignoring
    /// existing artifacts.
    pub fn analyze_directory(&self, scope: &SessionScope) -> Result<Vec<FileRecord>> {
        let src_dir = self.store.category_dir(scope, FileCategory::Source);
        if !src_dir.is_dir() {
            return Err(Error::SourceDirectoryMissing(src_dir));
        }
        self.store.ensure_dir(&self.store.analysis_dir(scope))?;

        let files = self.store.list_sql_files(&src_dir)?;
        if files.is_empty() {
            return Err(Error::NoSourceFiles(src_dir));
        }

        tracing::info!("Analyzing {} file(s) in {}", files.len(), src_dir.display());
        let mut records = Vec::with_capacity(files.len());

        for path in files {
            let record = self.store.read_record(&path)?;
            let artifact = self.store.artifact_path(scope, &record.file_name);

            let analyzed = match self.analyze_source(&path, &artifact) {
                Ok(_) => true,
                Err(e) => {
                    tracing::error!("Failed to analyze {}: {}", record.file_name, e);
                    false
                }
            };
            records.push(record.with_analysis(analyzed));
        }

        Ok(records)
    }
}
