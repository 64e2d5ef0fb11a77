use common::config::ConfigOverrides;
use serde::{Deserialize, Serialize};

// Request models
#[derive(Debug, Deserialize, Default)]
pub struct AnalyzeQuery {
    pub semantic_column_threshold: Option<f64>,
    pub minimum_spend: Option<f64>,
}

impl From<AnalyzeQuery> for ConfigOverrides {
    fn from(query: AnalyzeQuery) -> Self {
        ConfigOverrides {
            semantic_column_threshold: query.semantic_column_threshold,
            minimum_spend: query.minimum_spend,
            ..Default::default()
        }
    }
}

// Response models
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
