use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub processed: usize,
    pub imported: usize,
}
