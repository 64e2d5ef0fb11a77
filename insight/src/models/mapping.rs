use common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Normalised metric and identity names, in resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Spend,
    Impressions,
    Clicks,
    Ctr,
    Frequency,
    Roas,
    Purchases,
    PurchaseValue,
    AddsToCart,
    #[serde(rename = "ctr_7d")]
    Ctr7d,
    #[serde(rename = "ctr_prev_7d")]
    CtrPrev7d,
    Status,
    AdName,
    AdId,
    CampaignName,
    AdsetName,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 16] = [
        Self::Spend,
        Self::Impressions,
        Self::Clicks,
        Self::Ctr,
        Self::Frequency,
        Self::Roas,
        Self::Purchases,
        Self::PurchaseValue,
        Self::AddsToCart,
        Self::Ctr7d,
        Self::CtrPrev7d,
        Self::Status,
        Self::AdName,
        Self::AdId,
        Self::CampaignName,
        Self::AdsetName,
    ];

    /// Fields without which no ratio can be computed.
    pub const REQUIRED: [CanonicalField; 3] = [Self::Spend, Self::Impressions, Self::Clicks];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spend => "spend",
            Self::Impressions => "impressions",
            Self::Clicks => "clicks",
            Self::Ctr => "ctr",
            Self::Frequency => "frequency",
            Self::Roas => "roas",
            Self::Purchases => "purchases",
            Self::PurchaseValue => "purchase_value",
            Self::AddsToCart => "adds_to_cart",
            Self::Ctr7d => "ctr_7d",
            Self::CtrPrev7d => "ctr_prev_7d",
            Self::Status => "status",
            Self::AdName => "ad_name",
            Self::AdId => "ad_id",
            Self::CampaignName => "campaign_name",
            Self::AdsetName => "adset_name",
        }
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown canonical field '{}'", s)))
    }
}

/// Resolved binding from canonical field to dataset column.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ColumnMapping {
    pub spend: String,
    pub impressions: String,
    pub clicks: String,
    pub ctr: Option<String>,
    pub frequency: Option<String>,
    pub roas: Option<String>,
    pub purchases: Option<String>,
    pub purchase_value: Option<String>,
    pub adds_to_cart: Option<String>,
    pub ctr_7d: Option<String>,
    pub ctr_prev_7d: Option<String>,
    pub status: Option<String>,
    pub ad_name: Option<String>,
    pub ad_id: Option<String>,
    pub campaign_name: Option<String>,
    pub adset_name: Option<String>,
}

impl ColumnMapping {
    /// Source column bound to `field`, if any.
    pub fn column(&self, field: CanonicalField) -> Option<&str> {
        let column = match field {
            CanonicalField::Spend => return Some(self.spend.as_str()),
            CanonicalField::Impressions => return Some(self.impressions.as_str()),
            CanonicalField::Clicks => return Some(self.clicks.as_str()),
            CanonicalField::Ctr => &self.ctr,
            CanonicalField::Frequency => &self.frequency,
            CanonicalField::Roas => &self.roas,
            CanonicalField::Purchases => &self.purchases,
            CanonicalField::PurchaseValue => &self.purchase_value,
            CanonicalField::AddsToCart => &self.adds_to_cart,
            CanonicalField::Ctr7d => &self.ctr_7d,
            CanonicalField::CtrPrev7d => &self.ctr_prev_7d,
            CanonicalField::Status => &self.status,
            CanonicalField::AdName => &self.ad_name,
            CanonicalField::AdId => &self.ad_id,
            CanonicalField::CampaignName => &self.campaign_name,
            CanonicalField::AdsetName => &self.adset_name,
        };
        column.as_deref()
    }
}

/// Outcome of column resolution: every canonical field is either bound or failed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolutionResult {
    pub resolved: BTreeMap<CanonicalField, String>,
    pub failed: Vec<CanonicalField>,
}

impl ResolutionResult {
    pub fn failed_names(&self) -> Vec<String> {
        self.failed.iter().map(|f| f.as_str().to_string()).collect()
    }

    /// Builds the usable mapping, failing when any required field is unbound.
    pub fn to_mapping(&self, threshold: f64) -> Result<ColumnMapping> {
        let missing: Vec<String> = CanonicalField::REQUIRED
            .iter()
            .filter(|field| !self.resolved.contains_key(*field))
            .map(|field| field.as_str().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::UnresolvedColumns {
                fields: missing,
                threshold,
            });
        }

        let get = |field: CanonicalField| self.resolved.get(&field).cloned();
        Ok(ColumnMapping {
            spend: self.resolved[&CanonicalField::Spend].clone(),
            impressions: self.resolved[&CanonicalField::Impressions].clone(),
            clicks: self.resolved[&CanonicalField::Clicks].clone(),
            ctr: get(CanonicalField::Ctr),
            frequency: get(CanonicalField::Frequency),
            roas: get(CanonicalField::Roas),
            purchases: get(CanonicalField::Purchases),
            purchase_value: get(CanonicalField::PurchaseValue),
            adds_to_cart: get(CanonicalField::AddsToCart),
            ctr_7d: get(CanonicalField::Ctr7d),
            ctr_prev_7d: get(CanonicalField::CtrPrev7d),
            status: get(CanonicalField::Status),
            ad_name: get(CanonicalField::AdName),
            ad_id: get(CanonicalField::AdId),
            campaign_name: get(CanonicalField::CampaignName),
            adset_name: get(CanonicalField::AdsetName),
        })
    }
}
