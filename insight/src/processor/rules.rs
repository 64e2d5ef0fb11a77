use tracing::debug;

use crate::models::{EntityMetricsRow, Insight, InsightTopic, Severity};
use crate::utils::text::human_join;

pub const DEFAULT_MINIMUM_SPEND: f64 = 50.0;

const ROAS_GUARDRAIL: f64 = 1.5;
const ROAS_CRITICAL: f64 = 1.0;
const HEALTHY_CTR: f64 = 0.015;
const MIN_CART_TO_PURCHASE: f64 = 0.2;
const FATIGUE_DROP: f64 = 0.25;

/// Turns per-entity metrics into insights. Always yields at least one.
pub struct RuleEngine {
    minimum_spend: f64,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MINIMUM_SPEND)
    }
}

impl RuleEngine {
    pub fn new(minimum_spend: f64) -> Self {
        Self { minimum_spend }
    }

    pub fn evaluate(&self, entities: &[EntityMetricsRow]) -> Vec<Insight> {
        let mut insights = Vec::new();
        let mut evaluated = 0usize;

        for entity in entities {
            let Some(spend) = entity.spend.filter(|spend| *spend >= self.minimum_spend) else {
                continue;
            };
            evaluated += 1;

            let labels = entity.identity_labels();
            let impacted = if labels.is_empty() {
                Vec::new()
            } else {
                vec![human_join(labels)]
            };

            if let Some(insight) = roas_rule(spend, entity) {
                insights.push(insight.with_entities(impacted.clone()));
            }
            if let Some(insight) = conversion_rule(entity) {
                insights.push(insight.with_entities(impacted.clone()));
            }
            if let Some(insight) = fatigue_rule(entity) {
                insights.push(insight.with_entities(impacted));
            }
        }

        debug!(
            entities = entities.len(),
            evaluated,
            fired = insights.len(),
            minimum_spend = self.minimum_spend,
            "Evaluated insight rules"
        );

        if insights.is_empty() {
            insights.push(fallback_insight());
        }
        insights
    }
}

fn roas_rule(spend: f64, entity: &EntityMetricsRow) -> Option<Insight> {
    let roas = entity.roas.filter(|roas| *roas < ROAS_GUARDRAIL)?;
    let severity = if roas <= ROAS_CRITICAL {
        Severity::Critical
    } else {
        Severity::Warning
    };
    Some(
        Insight::new(
            InsightTopic::Roas,
            severity,
            format!("ROAS below efficiency guardrail at {:.2}.", roas),
            "Test 2–3 new hooks or thumbnails, rotate in fresh creative, and cap frequency if delivery is fatigued.",
        )
        .with_data("spend", spend)
        .with_data("roas", roas),
    )
}

fn conversion_rule(entity: &EntityMetricsRow) -> Option<Insight> {
    let ctr = entity.ctr.unwrap_or(0.0);
    let atc_to_purchase = entity.atc_to_purchase?;
    if ctr < HEALTHY_CTR || atc_to_purchase >= MIN_CART_TO_PURCHASE {
        return None;
    }
    Some(
        Insight::new(
            InsightTopic::Conversion,
            Severity::Warning,
            "CTR healthy but poor conversion from cart to purchase.",
            "Audit landing and checkout flow, watch session recordings, validate funnel tracking.",
        )
        .with_data("ctr", ctr)
        .with_data("atc_to_purchase", atc_to_purchase),
    )
}

fn fatigue_rule(entity: &EntityMetricsRow) -> Option<Insight> {
    let (ctr_7d, ctr_prev_7d) = entity.ctr_7d.zip(entity.ctr_prev_7d)?;
    if ctr_prev_7d <= 0.0 || (ctr_prev_7d - ctr_7d) / ctr_prev_7d <= FATIGUE_DROP {
        return None;
    }
    Some(
        Insight::new(
            InsightTopic::Fatigue,
            Severity::Info,
            "CTR dropped >25% vs previous 7 days.",
            "Refresh creative variants or rotate in best performers to arrest fatigue.",
        )
        .with_data("ctr_7d", ctr_7d)
        .with_data("ctr_prev_7d", ctr_prev_7d),
    )
}

fn fallback_insight() -> Insight {
    Insight::new(
        InsightTopic::Meta,
        Severity::Info,
        "No critical anomalies detected across evaluated entities.",
        "Maintain current optimizations and continue monitoring daily pacing.",
    )
}
