//! Ad-performance analysis: fuzzy column resolution, metric derivation and
//! rule-based insights over heterogeneous tabular exports.

pub mod models;
pub mod processor;
pub mod utils;

pub use models::{
    CanonicalField, CellValue, ColumnMapping, DataSource, DatasetRow, Insight, InsightRequest,
    InsightResponse, InsightTopic, Severity,
};
pub use processor::InsightEngine;

use common::Result;
use common::config::EngineConfig;

/// Analyzes `request` with a one-off engine built from `config`.
pub fn analyze(request: InsightRequest, config: &EngineConfig) -> Result<InsightResponse> {
    InsightEngine::new(config.clone())?.analyze(request)
}
