//! KPI identities and the value/change pair reported for each one.

use serde::{Deserialize, Serialize};

/// The nine monthly KPIs on the dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KpiKind {
    #[serde(rename = "newMembers")]
    NewMembers,
    #[serde(rename = "introsSold")]
    IntrosSold,
    #[serde(rename = "avgLeadsPerDay")]
    AvgLeadsPerDay,
    #[serde(rename = "leadToIntroConversion")]
    LeadToIntroConversion,
    #[serde(rename = "introToMemberConversion")]
    IntroToMemberConversion,
    #[serde(rename = "introToPackConversion")]
    IntroToPackConversion,
    #[serde(rename = "totalSales")]
    TotalSales,
    #[serde(rename = "packSales")]
    PackSales,
    #[serde(rename = "membershipCancellations")]
    MembershipCancellations,
}

impl KpiKind {
    pub const ALL: [KpiKind; 9] = [
        KpiKind::NewMembers,
        KpiKind::IntrosSold,
        KpiKind::AvgLeadsPerDay,
        KpiKind::LeadToIntroConversion,
        KpiKind::IntroToMemberConversion,
        KpiKind::IntroToPackConversion,
        KpiKind::TotalSales,
        KpiKind::PackSales,
        KpiKind::MembershipCancellations,
    ];

    /// Human-readable card title
    pub fn label(&self) -> &'static str {
        match self {
            KpiKind::NewMembers => "New Members",
            KpiKind::IntrosSold => "Intros Sold",
            KpiKind::AvgLeadsPerDay => "Avg Leads / Day",
            KpiKind::LeadToIntroConversion => "Lead → Intro Conversion",
            KpiKind::IntroToMemberConversion => "Intro → Member Conversion",
            KpiKind::IntroToPackConversion => "Intro → Pack Conversion",
            KpiKind::TotalSales => "Total Sales",
            KpiKind::PackSales => "Pack Sales",
            KpiKind::MembershipCancellations => "Membership Cancellations",
        }
    }

    /// Rates reported as a percentage (one decimal)
    pub fn is_rate(&self) -> bool {
        matches!(
            self,
            KpiKind::LeadToIntroConversion
                | KpiKind::IntroToMemberConversion
                | KpiKind::IntroToPackConversion
        )
    }

    /// Format a value the way it is shown on its card.
    pub fn format_value(&self, value: f64) -> String {
        match self {
            KpiKind::TotalSales => format!("${}", group_thousands(value)),
            KpiKind::AvgLeadsPerDay => format!("{value:.1}"),
            k if k.is_rate() => format!("{value:.1}%"),
            _ => format!("{value:.0}"),
        }
    }
}

fn group_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0.0 {
        format!("-{out}")
    } else {
        out
    }
}

/// A KPI's value for the selected month and its integer percent change
/// against the month before.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Kpi {
    pub value: f64,
    pub change: i64,
}

impl Kpi {
    pub fn compare(current: f64, previous: f64) -> Self {
        Self {
            value: current,
            change: percentage_change(current, previous),
        }
    }
}

/// Round half toward positive infinity (`-2.5` → `-2`, `2.5` → `3`).
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Round to one decimal place.
pub fn round_to_tenth(x: f64) -> f64 {
    round_half_up(x * 10.0) / 10.0
}

/// `numerator / denominator` as a percentage with one decimal. A zero
/// denominator gives 0.
pub fn ratio_percent(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round_half_up(numerator as f64 / denominator as f64 * 1000.0) / 10.0
}

/// Whole-percent change from `previous` to `current`.
///
/// A zero baseline reports 100 when anything appeared and 0 otherwise.
pub fn percentage_change(current: f64, previous: f64) -> i64 {
    if previous == 0.0 {
        return if current > 0.0 { 100 } else { 0 };
    }
    round_half_up((current - previous) / previous * 100.0) as i64
}
