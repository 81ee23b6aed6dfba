use serde::Serialize;

/// JSON envelope shared by every requirement endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            message: message.into(),
            error,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub database: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<u64>,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ExportQuery {
    #[serde(rename = "filterBy")]
    pub filter_by: Option<String>,
    pub year: Option<String>,
    pub month: Option<String>,
}
