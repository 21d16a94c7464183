//! Per-KPI status for the selected month: value, change, target and color.

use pulse_core::{KpiKind, MonthBucket, StatusColor, status_rule};
use serde::{Deserialize, Serialize};

use crate::engine::DashboardMetrics;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScorecardEntry {
    pub kind: KpiKind,
    pub value: f64,
    pub change: i64,
    pub target: Option<f64>,
    pub status: StatusColor,
}

impl ScorecardEntry {
    /// Value as a fraction of target, when there is one.
    pub fn attainment(&self) -> Option<f64> {
        self.target
            .filter(|t| *t > 0.0)
            .map(|t| self.value / t)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Scorecard {
    pub entries: Vec<ScorecardEntry>,
}

impl Scorecard {
    pub fn build(metrics: &DashboardMetrics, target: MonthBucket) -> Self {
        let entries = metrics
            .iter()
            .map(|(kind, kpi)| {
                let rule = status_rule(kind, target);
                ScorecardEntry {
                    kind,
                    value: kpi.value,
                    change: kpi.change,
                    target: rule.target(),
                    status: rule.resolve(kpi.value),
                }
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, kind: KpiKind) -> Option<&ScorecardEntry> {
        self.entries.iter().find(|e| e.kind == kind)
    }

    pub fn status(&self, kind: KpiKind) -> StatusColor {
        self.get(kind).map(|e| e.status).unwrap_or(StatusColor::Gray)
    }
}
