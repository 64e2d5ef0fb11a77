use common::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One cell of an uploaded dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Numeric view of the cell. Never fails: anything that is not a finite
    /// number (or text holding one) comes back as `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Display label for identity columns; `None` for null or blank cells.
    pub fn as_label(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

/// A single observation keyed by dataset-native column names, in source order.
pub type DatasetRow = IndexMap<String, CellValue>;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    MetaAds,
    TiktokAds,
    GoogleAds,
    #[default]
    Unknown,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MetaAds => "meta_ads",
            Self::TiktokAds => "tiktok_ads",
            Self::GoogleAds => "google_ads",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input payload containing an ad-performance dataset.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InsightRequest {
    pub dataset_name: String,
    #[serde(default)]
    pub data_source: DataSource,
    pub records: Vec<DatasetRow>,
    #[serde(default)]
    pub manual_column_overrides: Option<HashMap<String, String>>,
}

impl InsightRequest {
    pub fn new(dataset_name: impl Into<String>, records: Vec<DatasetRow>) -> Self {
        Self {
            dataset_name: dataset_name.into(),
            data_source: DataSource::Unknown,
            records,
            manual_column_overrides: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.records.is_empty() {
            return Err(Error::InvalidInput(
                "records must contain at least one row".to_string(),
            ));
        }
        Ok(())
    }

    /// Union of row keys in order of first appearance.
    pub fn columns(&self) -> Vec<String> {
        let mut seen: IndexMap<&str, ()> = IndexMap::new();
        for row in &self.records {
            for key in row.keys() {
                seen.entry(key.as_str()).or_insert(());
            }
        }
        seen.into_keys().map(str::to_string).collect()
    }
}
