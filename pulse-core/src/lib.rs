//! pulse-core: month buckets, date normalization, KPI identities, targets and status colors

pub mod kpi;
pub mod period;
pub mod status;
pub mod targets;
pub mod time;

pub use kpi::{Kpi, KpiKind, percentage_change, ratio_percent, round_half_up, round_to_tenth};
pub use period::{MONTH_NAMES, MonthBucket, TrailingWindow, is_supported_year, month_number};
pub use status::{StatusColor, StatusRule, static_thresholds, status_rule};
pub use targets::{
    LowIsGoodThresholds, TargetMetric, TargetThresholds, cancellation_thresholds, get_target,
    high_is_good_thresholds,
};
pub use time::{CanonicalInstant, is_in_month, is_in_three_month_window, parse_date};
