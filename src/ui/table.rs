use crate::storage::FileRecord;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct RecordRow {
    #[tabled(rename = "File")]
    pub file: String,
    #[tabled(rename = "Type")]
    pub file_type: String,
    #[tabled(rename = "Object")]
    pub object: String,
    #[tabled(rename = "Analyzed")]
    pub analyzed: String,
}

impl From<&FileRecord> for RecordRow {
    fn from(record: &FileRecord) -> Self {
        Self {
            file: record.file_name.clone(),
            file_type: record.file_type.to_string(),
            object: record.object_name.clone().unwrap_or_else(|| "-".to_string()),
            analyzed: match record.analysis_exists {
                Some(true) => "yes".to_string(),
                Some(false) => "no".to_string(),
                None => "-".to_string(),
            },
        }
    }
}

/// Summary table of file records; empty string for no records
pub fn records_table(records: &[FileRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let rows: Vec<RecordRow> = records.iter().map(RecordRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}
