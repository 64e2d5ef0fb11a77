pub mod metrics;
pub mod pipeline;
pub mod resolver;
pub mod rules;

pub use metrics::{MetricsEngine, MetricsResult};
pub use resolver::{ColumnResolver, SynonymTable};
pub use rules::{DEFAULT_MINIMUM_SPEND, RuleEngine};

use common::Result;
use common::config::{ConfigOverrides, EngineConfig};
use std::sync::Arc;
use tracing::info_span;

use crate::models::{InsightRequest, InsightResponse};

/// Entry point for analyses. Holds only immutable state, so one instance can
/// serve any number of concurrent, independent invocations.
#[derive(Clone)]
pub struct InsightEngine {
    config: EngineConfig,
    synonyms: Arc<SynonymTable>,
}

impl InsightEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_synonyms(config, Arc::new(SynonymTable::standard()))
    }

    pub fn with_synonyms(config: EngineConfig, synonyms: Arc<SynonymTable>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, synonyms })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn analyze(&self, request: InsightRequest) -> Result<InsightResponse> {
        self.analyze_with_overrides(request, &ConfigOverrides::default())
    }

    /// Runs one analysis against a config snapshot taken now, with
    /// `overrides` layered over the engine's base config.
    pub fn analyze_with_overrides(
        &self,
        request: InsightRequest,
        overrides: &ConfigOverrides,
    ) -> Result<InsightResponse> {
        let config = self.config.with_overrides(overrides)?;

        let span = info_span!(
            "analyze",
            dataset = %request.dataset_name,
            source = %request.data_source,
            rows = request.records.len(),
        );
        let _guard = span.enter();

        pipeline::run(request, config, &self.synonyms)
    }
}
