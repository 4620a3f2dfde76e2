// Mock data generation request/response

use serde::{Deserialize, Serialize};

pub const MIN_MOCK_ROWS: u32 = 1;
pub const MAX_MOCK_ROWS: u32 = 10_000;
const DEFAULT_MOCK_ROWS: u32 = 10;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MockDataFormat {
    #[default]
    Json,
    Csv,
}

impl MockDataFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MockDataFormat::Json => "json",
            MockDataFormat::Csv => "csv",
        }
    }
}

fn default_rows() -> u32 {
    DEFAULT_MOCK_ROWS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockDataRequest {
    #[serde(default = "default_rows")]
    pub rows: u32,
    /// Natural language description of the fields
    pub schema_description: String,
    #[serde(default)]
    pub format: MockDataFormat,
    #[serde(default)]
    pub seed: Option<i64>,
    #[serde(default)]
    pub preview_only: bool,
}

/// "id,name , email" -> "id, name, email"
pub fn normalize_schema(schema_description: &str) -> String {
    schema_description
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

impl MockDataRequest {
    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_MOCK_ROWS..=MAX_MOCK_ROWS).contains(&self.rows) {
            return Err(format!(
                "rows must be between {} and {}",
                MIN_MOCK_ROWS, MAX_MOCK_ROWS
            ));
        }
        if normalize_schema(&self.schema_description).is_empty() {
            return Err("schemaDescription is required".to_string());
        }
        Ok(())
    }
}

/// Either `data` (generated sample) or `prompt` (preview) is set, never both
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockDataResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<MockDataFormat>,
}

impl MockDataResponse {
    pub fn data(data: String, format: MockDataFormat) -> Self {
        Self {
            data: Some(data),
            prompt: None,
            format: Some(format),
        }
    }

    pub fn preview(prompt: String, format: MockDataFormat) -> Self {
        Self {
            data: None,
            prompt: Some(prompt),
            format: Some(format),
        }
    }
}
