//! pulse-metrics: classification rules, the metric engine, chart series and
//! the executive summary, tied together by [`process_exports`].

pub mod category_rules;
pub mod charts;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod scorecard;
pub mod summary;

pub use category_rules::{PatternSet, SaleCategory, categorize_sale, classify_by_pattern};
pub use charts::{
    ChartData, ChartSeriesBuilder, CumulativeMembersPoint, LeadsIntroSalesPoint, NewMembersPoint,
    SalesBreakdown, TotalSalesPoint,
};
pub use engine::{DashboardMetrics, MetricEngine};
pub use error::PipelineError;
pub use pipeline::{DashboardData, Period, process_exports, process_parsed};
pub use pulse_core::month_number;
pub use scorecard::{Scorecard, ScorecardEntry};
pub use summary::generate_summary;
