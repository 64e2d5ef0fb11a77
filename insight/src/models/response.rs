use common::config::EngineConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ColumnMapping, DatasetRow, Insight, InsightRequest};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResolvedContext {
    pub column_mapping: ColumnMapping,
    pub normalized_rows: Vec<DatasetRow>,
    #[serde(default)]
    pub failed_columns: Vec<String>,
}

/// Everything one analysis produced, owned by value.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InsightResponse {
    pub request: InsightRequest,
    pub config: EngineConfig,
    pub resolved_context: ResolvedContext,
    pub insights: Vec<Insight>,
    pub metrics_snapshot: BTreeMap<String, f64>,
}
