//! Session file store implementation

use super::encoding::Decoder;
use super::layout::{base_name, has_sql_extension, validate_file_name, FileCategory, SessionScope};
use super::record::FileRecord;
use crate::config::StoreConfig;
use crate::object_name::extract_object_name;
use crate::tree::ArtifactNode;
use crate::{Error, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Result of an idempotent write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    AlreadyExists,
}

/// Filesystem store for uploaded sources and analysis artifacts.
///
/// Single-writer: existence checks and creation are not atomic with respect
/// to other processes working on the same session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    config: StoreConfig,
    decoder: Decoder,
}

impl SessionStore {
    pub fn new(config: StoreConfig) -> Self {
        let decoder = Decoder::from_labels(config.encodings.as_slice());
        Self { config, decoder }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ========== Directory Resolution ==========

    pub fn scope_dir(&self, scope: &SessionScope) -> PathBuf {
        scope.dir_in(&self.config.base_dir)
    }

    pub fn category_dir(&self, scope: &SessionScope, category: FileCategory) -> PathBuf {
        self.scope_dir(scope).join(category.dir_name())
    }

    /// Directory a source file belongs in; `None` means the plain source directory
    pub fn target_dir(&self, scope: &SessionScope, file_name: Option<&str>) -> PathBuf {
        let category = file_name.map(FileCategory::classify).unwrap_or(FileCategory::Source);
        self.category_dir(scope, category)
    }

    pub fn analysis_dir(&self, scope: &SessionScope) -> PathBuf {
        self.category_dir(scope, FileCategory::Analysis)
    }

    /// Create a directory and its parents if missing
    pub fn ensure_dir(&self, path: &Path) -> Result<()> {
        if path.is_dir() {
            return Ok(());
        }
        fs::create_dir_all(path).map_err(|source| Error::DirectoryCreation {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Created directory {}", path.display());
        Ok(())
    }

    // ========== Writes ==========

    /// Write `bytes` as `dir/file_name` unless that file already exists.
    ///
    /// The first write wins: existing content is never replaced.
    pub fn write_if_absent(&self, dir: &Path, file_name: &str, bytes: &[u8]) -> Result<WriteOutcome> {
        validate_file_name(file_name)?;
        let path = dir.join(file_name);

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                tracing::debug!("File already exists, keeping stored copy: {}", path.display());
                return Ok(WriteOutcome::AlreadyExists);
            }
            Err(err) => return Err(err.into()),
        };

        if let Err(err) = file.write_all(bytes).and_then(|_| file.sync_all()) {
            drop(file);
            fs::remove_file(&path).ok();
            return Err(err.into());
        }

        tracing::info!("Saved new file: {}", path.display());
        Ok(WriteOutcome::Created)
    }

    /// Store an uploaded file and describe what is now on disk
    pub fn save_upload(&self, scope: &SessionScope, file_name: &str, bytes: &[u8]) -> Result<FileRecord> {
        validate_file_name(file_name)?;
        let dir = self.target_dir(scope, Some(file_name));
        self.ensure_dir(&dir)?;

        self.write_if_absent(&dir, file_name, bytes)?;

        let record = self.read_record(&dir.join(file_name))?;
        tracing::info!(
            "Stored {} ({}), object: {}",
            record.file_name,
            record.file_type,
            record.object_name.as_deref().unwrap_or("-")
        );
        Ok(record)
    }

    /// Write an artifact completely or not at all
    pub fn write_artifact(&self, path: &Path, contents: &str) -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| Error::InvalidFileName(path.display().to_string()))?;
        self.ensure_dir(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|err| err.error)?;
        Ok(())
    }

    // ========== Reads ==========

    /// Read a file as text, falling back through the legacy encodings
    pub fn read_content(&self, path: &Path) -> Result<String> {
        self.decoder.read(path)
    }

    /// Read a file into a [`FileRecord`]
    pub fn read_record(&self, path: &Path) -> Result<FileRecord> {
        let content = self.read_content(path)?;
        Ok(self.read_record_from(path, content))
    }

    /// Path of the artifact for a source file name
    pub fn artifact_path(&self, scope: &SessionScope, file_name: &str) -> PathBuf {
        self.analysis_dir(scope).join(format!("{}.json", base_name(file_name)))
    }

    pub fn artifact_exists(&self, scope: &SessionScope, file_name: &str) -> bool {
        self.artifact_path(scope, file_name).is_file()
    }

    /// Load a previously written artifact
    pub fn read_artifact(&self, scope: &SessionScope, file_name: &str) -> Result<Option<ArtifactNode>> {
        let path = self.artifact_path(scope, file_name);
        if !path.is_file() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    // ========== Lookup ==========

    /// Regular files in a directory, sorted by name. A missing directory is empty.
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// `.sql` files in a directory, sorted by name
    pub fn list_sql_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        Ok(self
            .list_files(dir)?
            .into_iter()
            .filter(|p| p.file_name().and_then(|n| n.to_str()).is_some_and(has_sql_extension))
            .collect())
    }

    /// Find `name` in `dir`: exact match first, then ignoring case
    pub fn find_in_dir(&self, dir: &Path, name: &str) -> Result<Option<PathBuf>> {
        let exact = dir.join(name);
        if exact.is_file() {
            return Ok(Some(exact));
        }
        self.find_ignoring_case(dir, name)
    }

    fn find_ignoring_case(&self, dir: &Path, name: &str) -> Result<Option<PathBuf>> {
        let wanted = name.to_lowercase();
        Ok(self.list_files(dir)?.into_iter().find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.to_lowercase() == wanted)
        }))
    }

    /// Locate a source file across the source categories.
    ///
    /// Every category is tried for an exact match before any
    /// case-insensitive match is considered.
    pub fn locate_source(&self, scope: &SessionScope, file_name: &str) -> Result<Option<PathBuf>> {
        validate_file_name(file_name)?;
        let dirs: Vec<PathBuf> = FileCategory::SOURCES
            .iter()
            .map(|&c| self.category_dir(scope, c))
            .collect();

        if let Some(exact) = dirs.iter().map(|d| d.join(file_name)).find(|p| p.is_file()) {
            return Ok(Some(exact));
        }

        for dir in &dirs {
            if let Some(found) = self.find_ignoring_case(dir, file_name)? {
                tracing::debug!("Matched {} ignoring case: {}", file_name, found.display());
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Every `.sql` file in the session whose declared object matches
    /// `object_name` ignoring case. Duplicates are all returned.
    pub fn retrieve_files(&self, scope: &SessionScope, object_name: &str) -> Result<Vec<FileRecord>> {
        let wanted = object_name.to_lowercase();
        let mut matches = Vec::new();

        for category in FileCategory::ALL {
            for path in self.list_sql_files(&self.category_dir(scope, category))? {
                let content = self.read_content(&path)?;
                let found = extract_object_name(&content).is_some_and(|n| n.to_lowercase() == wanted);
                if found {
                    let record = self.read_record_from(&path, content);
                    tracing::info!("Found {} in {}", object_name, record.file_name);
                    matches.push(record);
                }
            }
        }

        Ok(matches)
    }

    fn read_record_from(&self, path: &Path, content: String) -> FileRecord {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        FileRecord::new(file_name, content)
    }
}
