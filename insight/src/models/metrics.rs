use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate totals across every row of a dataset.
///
/// Ratios are recomputed from the summed numerators and denominators, so
/// they are volume-weighted. A zero denominator yields `0.0` here, unlike the
/// per-row `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub spend: f64,
    pub impressions: f64,
    pub clicks: f64,
    pub purchases: f64,
    pub purchase_value: f64,
    pub adds_to_cart: f64,
    pub ctr: f64,
    pub roas: f64,
    pub atc_to_purchase: f64,
}

impl MetricsSummary {
    pub fn to_snapshot(&self) -> BTreeMap<String, f64> {
        [
            ("spend", self.spend),
            ("impressions", self.impressions),
            ("clicks", self.clicks),
            ("purchases", self.purchases),
            ("purchase_value", self.purchase_value),
            ("adds_to_cart", self.adds_to_cart),
            ("ctr", self.ctr),
            ("roas", self.roas),
            ("atc_to_purchase", self.atc_to_purchase),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
    }
}

/// Derived metrics for one input row, carrying whichever identity columns resolved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityMetricsRow {
    pub campaign: Option<String>,
    pub adset: Option<String>,
    pub ad: Option<String>,
    pub ad_id: Option<String>,
    pub spend: Option<f64>,
    pub impressions: Option<f64>,
    pub clicks: Option<f64>,
    pub purchases: Option<f64>,
    pub purchase_value: Option<f64>,
    pub adds_to_cart: Option<f64>,
    pub ctr: Option<f64>,
    pub roas: Option<f64>,
    pub atc_to_purchase: Option<f64>,
    pub ctr_7d: Option<f64>,
    pub ctr_prev_7d: Option<f64>,
}

impl EntityMetricsRow {
    /// Identity labels in campaign, adset, ad, ad id order.
    pub fn identity_labels(&self) -> Vec<&str> {
        [&self.campaign, &self.adset, &self.ad, &self.ad_id]
            .into_iter()
            .filter_map(|label| label.as_deref())
            .filter(|label| !label.is_empty())
            .collect()
    }
}
