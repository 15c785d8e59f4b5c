use serde::Serialize;

/// What the upload endpoints report for each stored file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub original_name: String,
    pub filename: String,
    pub mimetype: String,
    pub size: usize,
    pub url: String,
    #[serde(rename = "type")]
    pub file_type: String,
}
