mod insight;
mod mapping;
mod metrics;
mod request;
mod response;

pub use insight::{Insight, InsightTopic, Severity};
pub use mapping::{CanonicalField, ColumnMapping, ResolutionResult};
pub use metrics::{EntityMetricsRow, MetricsSummary};
pub use request::{CellValue, DataSource, DatasetRow, InsightRequest};
pub use response::{InsightResponse, ResolvedContext};
