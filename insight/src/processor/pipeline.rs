//! The analysis as a fixed sequence of stages. Each stage consumes the
//! previous stage's output by value and returns a new value, so no stage can
//! observe or mutate anything produced later.

use common::Result;
use common::config::EngineConfig;
use tracing::{info, warn};

use super::metrics::{MetricsEngine, MetricsResult};
use super::resolver::{ColumnResolver, SynonymTable};
use super::rules::RuleEngine;
use crate::models::{ColumnMapping, Insight, InsightRequest, InsightResponse, ResolvedContext};

/// Validated request plus the dataset's column names in first-seen order.
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub request: InsightRequest,
    pub config: EngineConfig,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedInput {
    pub request: InsightRequest,
    pub config: EngineConfig,
    pub mapping: ColumnMapping,
    pub context: ResolvedContext,
}

#[derive(Debug, Clone)]
pub struct MeasuredInput {
    pub request: InsightRequest,
    pub config: EngineConfig,
    pub context: ResolvedContext,
    pub metrics: MetricsResult,
}

#[derive(Debug, Clone)]
pub struct EvaluatedInput {
    pub request: InsightRequest,
    pub config: EngineConfig,
    pub context: ResolvedContext,
    pub metrics: MetricsResult,
    pub insights: Vec<Insight>,
}

pub fn load(request: InsightRequest, config: EngineConfig) -> Result<LoadedInput> {
    request.validate()?;
    let columns = request.columns();
    Ok(LoadedInput {
        request,
        config,
        columns,
    })
}

pub fn resolve_columns(input: LoadedInput, synonyms: &SynonymTable) -> Result<ResolvedInput> {
    let LoadedInput {
        request,
        config,
        columns,
    } = input;

    let threshold = config.semantic_column_threshold;
    let mut resolver = ColumnResolver::new(synonyms, threshold);
    if let Some(overrides) = &request.manual_column_overrides {
        resolver = resolver.with_overrides(overrides);
    }

    let result = resolver.resolve(&columns);
    let mapping = result.to_mapping(threshold)?;

    let failed_columns = result.failed_names();
    if !failed_columns.is_empty() {
        warn!(failed = ?failed_columns, threshold, "Optional columns left unresolved");
    }

    let context = ResolvedContext {
        column_mapping: mapping.clone(),
        normalized_rows: request.records.clone(),
        failed_columns,
    };

    Ok(ResolvedInput {
        request,
        config,
        mapping,
        context,
    })
}

pub fn compute_metrics(input: ResolvedInput) -> MeasuredInput {
    let metrics = MetricsEngine::new(&input.mapping).run(&input.request.records);
    MeasuredInput {
        request: input.request,
        config: input.config,
        context: input.context,
        metrics,
    }
}

pub fn evaluate_rules(input: MeasuredInput) -> EvaluatedInput {
    let insights = RuleEngine::new(input.config.minimum_spend).evaluate(&input.metrics.entities);
    EvaluatedInput {
        request: input.request,
        config: input.config,
        context: input.context,
        metrics: input.metrics,
        insights,
    }
}

pub fn assemble(input: EvaluatedInput) -> InsightResponse {
    info!(
        rows = input.metrics.entities.len(),
        insights = input.insights.len(),
        failed_columns = input.context.failed_columns.len(),
        "Analysis complete"
    );

    InsightResponse {
        request: input.request,
        config: input.config,
        resolved_context: input.context,
        insights: input.insights,
        metrics_snapshot: input.metrics.summary.to_snapshot(),
    }
}

/// Runs every stage in order.
pub fn run(
    request: InsightRequest,
    config: EngineConfig,
    synonyms: &SynonymTable,
) -> Result<InsightResponse> {
    let loaded = load(request, config)?;
    let resolved = resolve_columns(loaded, synonyms)?;
    let measured = compute_metrics(resolved);
    let evaluated = evaluate_rules(measured);
    Ok(assemble(evaluated))
}
