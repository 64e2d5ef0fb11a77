use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

use crate::models::{CanonicalField, ResolutionResult};
use crate::utils::text::{jaccard, tokenize};

const STANDARD_SYNONYMS: [(CanonicalField, &[&str]); 16] = [
    (CanonicalField::Spend, &["spend", "amount_spent", "total_spent", "cost"]),
    (CanonicalField::Impressions, &["impressions", "impr"]),
    (CanonicalField::Clicks, &["clicks", "link_clicks", "click_count"]),
    (CanonicalField::Ctr, &["ctr", "click_through_rate"]),
    (CanonicalField::Frequency, &["frequency"]),
    (CanonicalField::Roas, &["roas", "return_on_ad_spend"]),
    (CanonicalField::Purchases, &["purchases", "purchase", "conversions", "results"]),
    (CanonicalField::PurchaseValue, &["purchase_value", "purchasevalue", "value", "revenue"]),
    (CanonicalField::AddsToCart, &["adds_to_cart", "atc", "addtocart"]),
    (CanonicalField::Ctr7d, &["ctr_7d", "ctr_7_day", "ctr_7day"]),
    (
        CanonicalField::CtrPrev7d,
        &["ctr_prev_7d", "ctr_prior_7d", "ctr_previous_7days", "ctr_prev_week"],
    ),
    (CanonicalField::Status, &["status", "delivery", "state"]),
    (CanonicalField::AdName, &["ad", "ad_name", "creative_name"]),
    (CanonicalField::AdId, &["ad_id", "adid", "adset_ad_id"]),
    (CanonicalField::CampaignName, &["campaign_name", "campaign"]),
    (CanonicalField::AdsetName, &["ad_set_name", "adset_name", "adset"]),
];

struct SynonymEntry {
    names: Vec<String>,
    tokens: Vec<HashSet<String>>,
}

/// Known alternate spellings per canonical field, tokenized once.
///
/// Every field always carries its own canonical name as a synonym, so a
/// dataset column named exactly like the field scores 1.0.
pub struct SynonymTable {
    entries: BTreeMap<CanonicalField, SynonymEntry>,
}

impl SynonymTable {
    pub fn new<I, S>(synonyms: I) -> Self
    where
        I: IntoIterator<Item = (CanonicalField, Vec<S>)>,
        S: Into<String>,
    {
        let mut lists: BTreeMap<CanonicalField, Vec<String>> = CanonicalField::ALL
            .iter()
            .map(|field| (*field, vec![field.as_str().to_string()]))
            .collect();

        for (field, names) in synonyms {
            let list = lists.entry(field).or_default();
            for name in names {
                let name = name.into();
                if !list.contains(&name) {
                    list.push(name);
                }
            }
        }

        let entries = lists
            .into_iter()
            .map(|(field, names)| {
                let tokens = names.iter().map(|name| tokenize(name)).collect();
                (field, SynonymEntry { names, tokens })
            })
            .collect();

        Self { entries }
    }

    /// The built-in table for common ad-platform exports.
    pub fn standard() -> Self {
        Self::new(
            STANDARD_SYNONYMS
                .iter()
                .map(|(field, names)| (*field, names.to_vec())),
        )
    }

    pub fn synonyms(&self, field: CanonicalField) -> &[String] {
        self.entries
            .get(&field)
            .map(|entry| entry.names.as_slice())
            .unwrap_or_default()
    }

    /// Best Jaccard score of `column_tokens` against any single synonym of `field`.
    fn score_tokens(&self, field: CanonicalField, column_tokens: &HashSet<String>) -> f64 {
        self.entries
            .get(&field)
            .map(|entry| {
                entry
                    .tokens
                    .iter()
                    .map(|synonym| jaccard(column_tokens, synonym))
                    .fold(0.0, f64::max)
            })
            .unwrap_or(0.0)
    }

    pub fn score(&self, field: CanonicalField, column: &str) -> f64 {
        self.score_tokens(field, &tokenize(column))
    }
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Binds canonical fields to dataset columns by token-overlap similarity.
pub struct ColumnResolver<'a> {
    synonyms: &'a SynonymTable,
    threshold: f64,
    overrides: HashMap<CanonicalField, String>,
}

impl<'a> ColumnResolver<'a> {
    pub fn new(synonyms: &'a SynonymTable, threshold: f64) -> Self {
        Self {
            synonyms,
            threshold,
            overrides: HashMap::new(),
        }
    }

    /// Manual bindings keyed by canonical name. Unknown keys are ignored.
    pub fn with_overrides(mut self, overrides: &HashMap<String, String>) -> Self {
        for (key, column) in overrides {
            match key.parse::<CanonicalField>() {
                Ok(field) => {
                    self.overrides.insert(field, column.clone());
                }
                Err(_) => warn!(key = %key, "Ignoring override for unknown canonical field"),
            }
        }
        self
    }

    pub fn resolve(&self, dataset_columns: &[String]) -> ResolutionResult {
        let column_tokens: Vec<HashSet<String>> =
            dataset_columns.iter().map(|c| tokenize(c)).collect();
        let mut result = ResolutionResult::default();

        for field in CanonicalField::ALL {
            if let Some(column) = self.overrides.get(&field) {
                if !dataset_columns.contains(column) {
                    // A required metric must come from a real column.
                    if field.is_required() {
                        warn!(
                            field = %field,
                            column = %column,
                            "Manual override for a required field names an absent column"
                        );
                        result.failed.push(field);
                        continue;
                    }
                    warn!(
                        field = %field,
                        column = %column,
                        "Manual override names a column absent from the dataset"
                    );
                }
                debug!(field = %field, column = %column, "Bound by manual override");
                result.resolved.insert(field, column.clone());
                continue;
            }

            // Strictly greater keeps the earliest column on ties.
            let mut best: Option<(usize, f64)> = None;
            for (idx, tokens) in column_tokens.iter().enumerate() {
                let score = self.synonyms.score_tokens(field, tokens);
                if best.is_none_or(|(_, best_score)| score > best_score) {
                    best = Some((idx, score));
                }
            }

            match best {
                Some((idx, score)) if score >= self.threshold => {
                    debug!(
                        field = %field,
                        column = %dataset_columns[idx],
                        score,
                        "Resolved column"
                    );
                    result.resolved.insert(field, dataset_columns[idx].clone());
                }
                best => {
                    debug!(
                        field = %field,
                        best_score = best.map(|(_, score)| score).unwrap_or(0.0),
                        threshold = self.threshold,
                        "Failed to resolve column"
                    );
                    result.failed.push(field);
                }
            }
        }

        result
    }
}
