use super::layout::FileType;
use crate::object_name::extract_object_name;
use serde::{Deserialize, Serialize};

/// Per-call view of a stored source file. Never persisted or cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub file_name: String,
    pub file_content: String,
    pub object_name: Option<String>,
    pub file_type: FileType,
    /// Whether an analysis artifact exists, when the caller checked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_exists: Option<bool>,
}

impl FileRecord {
    /// Build a record from decoded content, extracting the object name
    pub fn new(file_name: impl Into<String>, file_content: impl Into<String>) -> Self {
        let file_name = file_name.into();
        let file_content = file_content.into();
        Self {
            object_name: extract_object_name(&file_content),
            file_type: FileType::classify(&file_name),
            file_name,
            file_content,
            analysis_exists: None,
        }
    }

    pub fn with_analysis(mut self, exists: bool) -> Self {
        self.analysis_exists = Some(exists);
        self
    }
}
