use tracing::debug;

use crate::models::{
    CanonicalField, CellValue, ColumnMapping, DatasetRow, EntityMetricsRow, MetricsSummary,
};

/// Output of a metrics run: the aggregate summary plus one row per input row.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsResult {
    pub summary: MetricsSummary,
    pub entities: Vec<EntityMetricsRow>,
}

/// Derives per-row and aggregate performance metrics from raw rows.
pub struct MetricsEngine<'a> {
    mapping: &'a ColumnMapping,
}

/// `numerator / denominator`, or `None` when either side is missing or the
/// denominator is zero.
fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d),
        _ => None,
    }
}

fn aggregate_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

impl<'a> MetricsEngine<'a> {
    pub fn new(mapping: &'a ColumnMapping) -> Self {
        Self { mapping }
    }

    fn cell<'r>(&self, row: &'r DatasetRow, field: CanonicalField) -> Option<&'r CellValue> {
        self.mapping.column(field).and_then(|column| row.get(column))
    }

    /// Parsed value of a mapped column; unparsable or absent cells are `None`.
    fn parsed(&self, row: &DatasetRow, field: CanonicalField) -> Option<f64> {
        self.cell(row, field).and_then(CellValue::as_f64)
    }

    /// Like [`Self::parsed`], but an unmapped field reads as a constant 0.0.
    fn counted(&self, row: &DatasetRow, field: CanonicalField) -> Option<f64> {
        match self.mapping.column(field) {
            Some(_) => self.parsed(row, field),
            None => Some(0.0),
        }
    }

    fn label(&self, row: &DatasetRow, field: CanonicalField) -> Option<String> {
        self.cell(row, field).and_then(CellValue::as_label)
    }

    pub fn entity_row(&self, row: &DatasetRow) -> EntityMetricsRow {
        let spend = self.counted(row, CanonicalField::Spend);
        let impressions = self.counted(row, CanonicalField::Impressions);
        let clicks = self.counted(row, CanonicalField::Clicks);
        let purchases = self.counted(row, CanonicalField::Purchases);
        let purchase_value = self.counted(row, CanonicalField::PurchaseValue);
        let adds_to_cart = self.counted(row, CanonicalField::AddsToCart);

        EntityMetricsRow {
            campaign: self.label(row, CanonicalField::CampaignName),
            adset: self.label(row, CanonicalField::AdsetName),
            ad: self.label(row, CanonicalField::AdName),
            ad_id: self.label(row, CanonicalField::AdId),
            spend,
            impressions,
            clicks,
            purchases,
            purchase_value,
            adds_to_cart,
            ctr: ratio(clicks, impressions),
            roas: ratio(purchase_value, spend),
            atc_to_purchase: ratio(purchases, adds_to_cart),
            ctr_7d: self.parsed(row, CanonicalField::Ctr7d),
            ctr_prev_7d: self.parsed(row, CanonicalField::CtrPrev7d),
        }
    }

    pub fn summarize(entities: &[EntityMetricsRow]) -> MetricsSummary {
        let total = |value: fn(&EntityMetricsRow) -> Option<f64>| -> f64 {
            // Float `sum` starts at -0.0; fold from 0.0 so empty totals stay positive.
            entities.iter().filter_map(value).fold(0.0, |acc, v| acc + v)
        };

        let spend = total(|row| row.spend);
        let impressions = total(|row| row.impressions);
        let clicks = total(|row| row.clicks);
        let purchases = total(|row| row.purchases);
        let purchase_value = total(|row| row.purchase_value);
        let adds_to_cart = total(|row| row.adds_to_cart);

        MetricsSummary {
            spend,
            impressions,
            clicks,
            purchases,
            purchase_value,
            adds_to_cart,
            ctr: aggregate_ratio(clicks, impressions),
            roas: aggregate_ratio(purchase_value, spend),
            atc_to_purchase: aggregate_ratio(purchases, adds_to_cart),
        }
    }

    pub fn run(&self, rows: &[DatasetRow]) -> MetricsResult {
        let entities: Vec<EntityMetricsRow> = rows.iter().map(|row| self.entity_row(row)).collect();
        let summary = Self::summarize(&entities);

        debug!(
            rows = entities.len(),
            spend = summary.spend,
            roas = summary.roas,
            ctr = summary.ctr,
            "Computed metrics"
        );

        MetricsResult { summary, entities }
    }
}
