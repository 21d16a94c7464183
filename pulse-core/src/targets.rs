//! Monthly targets.
//!
//! Four metrics have an explicit per-month plan covering Dec 2025 through
//! Dec 2026. Months outside the plan fall back to a fixed default. Leads
//! targets are constant.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::period::MonthBucket;

/// Metrics that have a target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TargetMetric {
    #[serde(rename = "introsSold")]
    IntrosSold,
    #[serde(rename = "totalMemberships")]
    TotalMemberships,
    #[serde(rename = "classPacks")]
    ClassPacks,
    #[serde(rename = "totalSales")]
    TotalSales,
    #[serde(rename = "leadsPerDay")]
    LeadsPerDay,
    #[serde(rename = "newLeadsPerMonth")]
    NewLeadsPerMonth,
}

/// First month of the published plan (December 2025).
pub const PLAN_START: MonthBucket = MonthBucket {
    year: 2025,
    month: 11,
};

const PLAN_MONTHS: usize = 13;

const INTRO_SALES_PLAN: [f64; PLAN_MONTHS] = [
    53.0, 55.0, 49.0, 42.0, 42.0, 37.0, 31.0, 33.0, 32.0, 47.0, 47.0, 42.0, 37.0,
];

const TOTAL_MEMBERSHIPS_PLAN: [f64; PLAN_MONTHS] = [
    143.0, 132.0, 135.0, 140.0, 142.0, 138.0, 133.0, 128.0, 123.0, 128.0, 132.0, 134.0, 136.0,
];

const CLASS_PACKS_PLAN: [f64; PLAN_MONTHS] = [
    34.0, 33.0, 33.0, 33.0, 33.0, 33.0, 33.0, 33.0, 33.0, 33.0, 33.0, 33.0, 33.0,
];

const TOTAL_SALES_PLAN: [f64; PLAN_MONTHS] = [
    40614.0, 43548.0, 39892.0, 40016.0, 40254.0, 39173.0, 38131.0, 37405.0, 35961.0, 37691.0,
    38221.0, 38106.0, 38207.0,
];

const DEFAULT_INTRO_SALES: f64 = 90.0;
// Outside the plan this tracks new members, not the total.
const DEFAULT_TOTAL_MEMBERSHIPS: f64 = 30.0;
const DEFAULT_CLASS_PACKS: f64 = 33.0;
const DEFAULT_TOTAL_SALES: f64 = 45000.0;
pub const LEADS_PER_DAY: f64 = 8.0;
pub const NEW_LEADS_PER_MONTH: f64 = 238.0;

struct TargetTable {
    planned: HashMap<MonthBucket, f64>,
    default: f64,
}

impl TargetTable {
    fn from_plan(plan: &[f64; PLAN_MONTHS], default: f64) -> Self {
        let planned = plan
            .iter()
            .enumerate()
            .map(|(i, value)| (PLAN_START.offset(i as i32), *value))
            .collect();
        Self { planned, default }
    }

    fn lookup(&self, bucket: MonthBucket) -> f64 {
        self.planned.get(&bucket).copied().unwrap_or(self.default)
    }
}

static INTRO_SALES: Lazy<TargetTable> =
    Lazy::new(|| TargetTable::from_plan(&INTRO_SALES_PLAN, DEFAULT_INTRO_SALES));
static TOTAL_MEMBERSHIPS: Lazy<TargetTable> =
    Lazy::new(|| TargetTable::from_plan(&TOTAL_MEMBERSHIPS_PLAN, DEFAULT_TOTAL_MEMBERSHIPS));
static CLASS_PACKS: Lazy<TargetTable> =
    Lazy::new(|| TargetTable::from_plan(&CLASS_PACKS_PLAN, DEFAULT_CLASS_PACKS));
static TOTAL_SALES: Lazy<TargetTable> =
    Lazy::new(|| TargetTable::from_plan(&TOTAL_SALES_PLAN, DEFAULT_TOTAL_SALES));

impl TargetMetric {
    /// Target for the given month, falling back to the metric's default.
    pub fn target_for(&self, bucket: MonthBucket) -> f64 {
        match self {
            TargetMetric::IntrosSold => INTRO_SALES.lookup(bucket),
            TargetMetric::TotalMemberships => TOTAL_MEMBERSHIPS.lookup(bucket),
            TargetMetric::ClassPacks => CLASS_PACKS.lookup(bucket),
            TargetMetric::TotalSales => TOTAL_SALES.lookup(bucket),
            TargetMetric::LeadsPerDay => LEADS_PER_DAY,
            TargetMetric::NewLeadsPerMonth => NEW_LEADS_PER_MONTH,
        }
    }
}

/// Target for `metric` in zero-indexed `month` of `year`; None for a month outside 0..=11.
pub fn get_target(metric: TargetMetric, year: i32, month: u32) -> Option<f64> {
    MonthBucket::new(year, month).map(|bucket| metric.target_for(bucket))
}

/// Cut points for a status color.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TargetThresholds {
    pub target: f64,
    pub yellow_threshold: f64,
    pub green_threshold: f64,
}

/// Green at or above target, yellow from 80% of target, red below.
pub fn high_is_good_thresholds(target: f64) -> TargetThresholds {
    TargetThresholds {
        target,
        yellow_threshold: target * 0.8,
        green_threshold: target,
    }
}

/// Cut points for a KPI where fewer is better.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LowIsGoodThresholds {
    pub target: f64,
    /// Green at or below this value.
    pub green_max: f64,
    /// Red at or above this value; yellow in between.
    pub red_min: f64,
}

/// Cancellations: green up to 12, yellow below 16, red from 16.
pub fn cancellation_thresholds() -> LowIsGoodThresholds {
    LowIsGoodThresholds {
        target: 12.0,
        green_max: 12.0,
        red_min: 16.0,
    }
}
