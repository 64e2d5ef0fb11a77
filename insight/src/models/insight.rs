use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InsightTopic {
    Roas,
    Ctr,
    Conversion,
    Fatigue,
    Status,
    Anomaly,
    Meta,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// One actionable finding.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Insight {
    pub topic: InsightTopic,
    pub severity: Severity,
    pub summary: String,
    pub recommendation: String,
    #[serde(default)]
    pub impacted_entities: Vec<String>,
    #[serde(default)]
    pub supporting_data: BTreeMap<String, f64>,
}

impl Insight {
    pub fn new(
        topic: InsightTopic,
        severity: Severity,
        summary: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            topic,
            severity,
            summary: summary.into(),
            recommendation: recommendation.into(),
            impacted_entities: Vec::new(),
            supporting_data: BTreeMap::new(),
        }
    }

    pub fn with_entities(mut self, entities: Vec<String>) -> Self {
        self.impacted_entities = entities;
        self
    }

    pub fn with_data(mut self, name: &str, value: f64) -> Self {
        self.supporting_data.insert(name.to_string(), value);
        self
    }
}
