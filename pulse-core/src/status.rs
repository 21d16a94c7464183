//! Status colors: how a KPI's value compares to what was expected of it.

use serde::{Deserialize, Serialize};

use crate::kpi::KpiKind;
use crate::period::MonthBucket;
use crate::targets::{
    LowIsGoodThresholds, TargetMetric, TargetThresholds, cancellation_thresholds,
    high_is_good_thresholds,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StatusColor {
    #[serde(rename = "green")]
    Green,
    #[serde(rename = "yellow")]
    Yellow,
    #[serde(rename = "red")]
    Red,
    /// No meaningful target
    #[serde(rename = "gray")]
    Gray,
}

/// How a value maps onto a color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusRule {
    /// Higher is better; both cut points are inclusive.
    HighIsGood(TargetThresholds),
    /// Lower is better: green up to `green_max`, red from `red_min`.
    LowIsGood(LowIsGoodThresholds),
    Unrated,
}

impl StatusRule {
    pub fn resolve(&self, value: f64) -> StatusColor {
        match self {
            StatusRule::HighIsGood(t) => {
                if value >= t.green_threshold {
                    StatusColor::Green
                } else if value >= t.yellow_threshold {
                    StatusColor::Yellow
                } else {
                    StatusColor::Red
                }
            }
            StatusRule::LowIsGood(t) => {
                if value <= t.green_max {
                    StatusColor::Green
                } else if value < t.red_min {
                    StatusColor::Yellow
                } else {
                    StatusColor::Red
                }
            }
            StatusRule::Unrated => StatusColor::Gray,
        }
    }

    /// The value this rule considers "on target", if any.
    pub fn target(&self) -> Option<f64> {
        match self {
            StatusRule::HighIsGood(t) => Some(t.target),
            StatusRule::LowIsGood(t) => Some(t.target),
            StatusRule::Unrated => None,
        }
    }
}

/// Fixed green/yellow cut points for KPIs without a monthly plan.
pub fn static_thresholds(kind: KpiKind) -> Option<TargetThresholds> {
    let (green, yellow) = match kind {
        KpiKind::NewMembers => (30.0, 15.0),
        KpiKind::IntrosSold => (90.0, 60.0),
        KpiKind::AvgLeadsPerDay => (7.0, 4.0),
        KpiKind::LeadToIntroConversion => (40.0, 30.0),
        KpiKind::IntroToMemberConversion => (33.0, 20.0),
        KpiKind::TotalSales => (45000.0, 40000.0),
        KpiKind::IntroToPackConversion | KpiKind::PackSales | KpiKind::MembershipCancellations => {
            return None;
        }
    };
    Some(TargetThresholds {
        target: green,
        yellow_threshold: yellow,
        green_threshold: green,
    })
}

/// The rule that colors `kind` for the month `bucket`.
///
/// Intros, sales and packs follow the monthly plan; leads per day follow the
/// constant target; the remaining rated KPIs use [`static_thresholds`].
pub fn status_rule(kind: KpiKind, bucket: MonthBucket) -> StatusRule {
    let planned = |metric: TargetMetric| {
        StatusRule::HighIsGood(high_is_good_thresholds(metric.target_for(bucket)))
    };
    match kind {
        KpiKind::IntrosSold => planned(TargetMetric::IntrosSold),
        KpiKind::TotalSales => planned(TargetMetric::TotalSales),
        KpiKind::PackSales => planned(TargetMetric::ClassPacks),
        KpiKind::AvgLeadsPerDay => planned(TargetMetric::LeadsPerDay),
        KpiKind::MembershipCancellations => StatusRule::LowIsGood(cancellation_thresholds()),
        KpiKind::IntroToPackConversion => StatusRule::Unrated,
        other => static_thresholds(other)
            .map(StatusRule::HighIsGood)
            .unwrap_or(StatusRule::Unrated),
    }
}
