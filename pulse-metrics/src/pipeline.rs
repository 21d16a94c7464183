//! Entry point: six raw exports and a selected month in, dashboard out.

use pulse_core::MonthBucket;
use pulse_ingest::{ParsedExports, RawExports};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::charts::{ChartData, ChartSeriesBuilder};
use crate::engine::{DashboardMetrics, MetricEngine};
use crate::error::PipelineError;
use crate::scorecard::Scorecard;
use crate::summary::generate_summary;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    /// Zero-indexed
    pub month: u32,
    pub year: i32,
    pub label: String,
}

impl From<MonthBucket> for Period {
    fn from(bucket: MonthBucket) -> Self {
        Self {
            month: bucket.month(),
            year: bucket.year(),
            label: bucket.long_label(),
        }
    }
}

/// Everything the dashboard shows for one month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub period: Period,
    pub metrics: DashboardMetrics,
    pub scorecard: Scorecard,
    pub charts: ChartData,
    pub summary: String,
}

/// Compute the dashboard for zero-indexed `month` of `year`.
///
/// Fails when any export is missing, the month is out of range or the year
/// is beyond what the calendar can represent. Bad rows inside an export never
/// fail the call.
pub fn process_exports(
    raw: &RawExports,
    month: u32,
    year: i32,
) -> Result<DashboardData, PipelineError> {
    let target = MonthBucket::new(year, month).ok_or(if month > 11 {
        PipelineError::InvalidMonth(month)
    } else {
        PipelineError::InvalidYear(year)
    })?;
    let exports = raw.parse()?;
    Ok(process_parsed(&exports, target))
}

pub fn process_parsed(exports: &ParsedExports, target: MonthBucket) -> DashboardData {
    let metrics = MetricEngine::new(exports).metrics(target);
    let scorecard = Scorecard::build(&metrics, target);
    let charts = ChartSeriesBuilder::new(exports, target).build();
    let summary = generate_summary(&scorecard, target);

    info!(
        month = %target.long_label(),
        new_members = metrics.new_members.value,
        total_sales = metrics.total_sales.value,
        "dashboard computed"
    );

    DashboardData {
        period: target.into(),
        metrics,
        scorecard,
        charts,
        summary,
    }
}
