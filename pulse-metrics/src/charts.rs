//! Thirteen-month chart series ending at the selected month.
//!
//! Each point re-runs the same per-month aggregation the metric engine uses.

use pulse_core::{KpiKind, MonthBucket, TargetMetric, round_half_up, static_thresholds};
use pulse_ingest::ParsedExports;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::category_rules::SaleCategory;
use crate::engine::{MetricEngine, net_sale_value, sale_category, succeeded_payments};

/// Points per series: the selected month and the twelve before it.
pub const SERIES_MONTHS: u32 = 13;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeadsIntroSalesPoint {
    pub month: String,
    pub intro_sales: usize,
    pub new_leads: usize,
    pub target_intro_sales: f64,
    pub target_new_leads: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewMembersPoint {
    pub month: String,
    pub new_members: usize,
    pub target: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CumulativeMembersPoint {
    pub month: String,
    /// Total less new. Negative only when the two membership exports disagree.
    pub retained_members: i64,
    pub new_members: usize,
    pub total_members: usize,
    pub target_total_members: f64,
}

/// Net sales per sales bucket, each rounded to whole units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SalesBreakdown {
    pub membership: f64,
    pub intro: f64,
    pub drop_in: f64,
    pub pack: f64,
    pub private: f64,
    pub party: f64,
    pub other: f64,
}

impl SalesBreakdown {
    fn slot(&mut self, category: SaleCategory) -> &mut f64 {
        match category {
            SaleCategory::Membership => &mut self.membership,
            SaleCategory::Intro => &mut self.intro,
            SaleCategory::DropIn => &mut self.drop_in,
            SaleCategory::Pack => &mut self.pack,
            SaleCategory::Private => &mut self.private,
            SaleCategory::Party => &mut self.party,
            SaleCategory::Other => &mut self.other,
        }
    }

    pub fn get(&self, category: SaleCategory) -> f64 {
        match category {
            SaleCategory::Membership => self.membership,
            SaleCategory::Intro => self.intro,
            SaleCategory::DropIn => self.drop_in,
            SaleCategory::Pack => self.pack,
            SaleCategory::Private => self.private,
            SaleCategory::Party => self.party,
            SaleCategory::Other => self.other,
        }
    }

    pub fn add(&mut self, category: SaleCategory, amount: f64) {
        *self.slot(category) += amount;
    }

    pub fn rounded(mut self) -> Self {
        for category in SaleCategory::ALL {
            let slot = self.slot(category);
            *slot = round_half_up(*slot);
        }
        self
    }

    pub fn total(&self) -> f64 {
        SaleCategory::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TotalSalesPoint {
    pub month: String,
    #[serde(flatten)]
    pub breakdown: SalesBreakdown,
    pub total_sales: f64,
    pub target_total_sales: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub leads_intro_sales: Vec<LeadsIntroSalesPoint>,
    pub new_members: Vec<NewMembersPoint>,
    pub cumulative_members: Vec<CumulativeMembersPoint>,
    pub total_sales: Vec<TotalSalesPoint>,
}

/// Builds the four dashboard series for one selected month.
pub struct ChartSeriesBuilder<'a> {
    exports: &'a ParsedExports,
    engine: MetricEngine<'a>,
    target: MonthBucket,
}

impl<'a> ChartSeriesBuilder<'a> {
    pub fn new(exports: &'a ParsedExports, target: MonthBucket) -> Self {
        Self {
            exports,
            engine: MetricEngine::new(exports),
            target,
        }
    }

    /// The thirteen months covered, oldest first.
    pub fn months(&self) -> impl Iterator<Item = MonthBucket> {
        self.target.trailing(SERIES_MONTHS)
    }

    fn label(&self, bucket: MonthBucket) -> String {
        bucket.chart_label(self.target.year())
    }

    pub fn leads_intro_sales(&self) -> Vec<LeadsIntroSalesPoint> {
        self.months()
            .map(|bucket| LeadsIntroSalesPoint {
                month: self.label(bucket),
                intro_sales: self.engine.intros_sold(bucket),
                new_leads: self.engine.new_leads(bucket),
                target_intro_sales: TargetMetric::IntrosSold.target_for(bucket),
                target_new_leads: TargetMetric::NewLeadsPerMonth.target_for(bucket),
            })
            .collect()
    }

    pub fn new_members(&self) -> Vec<NewMembersPoint> {
        let target = static_thresholds(KpiKind::NewMembers)
            .map(|t| t.target)
            .unwrap_or_default();
        self.months()
            .map(|bucket| NewMembersPoint {
                month: self.label(bucket),
                new_members: self.engine.new_members(bucket),
                target,
            })
            .collect()
    }

    pub fn cumulative_members(&self) -> Vec<CumulativeMembersPoint> {
        self.months()
            .map(|bucket| {
                let total_members = self.engine.total_members(bucket);
                let new_members = self.engine.new_members(bucket);
                let retained_members = total_members as i64 - new_members as i64;
                if retained_members < 0 {
                    warn!(
                        month = %bucket,
                        total_members,
                        new_members,
                        "fewer memberships with renewals than without; exports are inconsistent"
                    );
                }
                CumulativeMembersPoint {
                    month: self.label(bucket),
                    retained_members,
                    new_members,
                    total_members,
                    target_total_members: TargetMetric::TotalMemberships.target_for(bucket),
                }
            })
            .collect()
    }

    pub fn sales_breakdown(&self, bucket: MonthBucket) -> SalesBreakdown {
        let mut breakdown = SalesBreakdown::default();
        for row in succeeded_payments(self.exports.payments(), bucket) {
            breakdown.add(sale_category(row), net_sale_value(row));
        }
        breakdown.rounded()
    }

    pub fn total_sales(&self) -> Vec<TotalSalesPoint> {
        let points: Vec<TotalSalesPoint> = self
            .months()
            .map(|bucket| {
                let breakdown = self.sales_breakdown(bucket);
                TotalSalesPoint {
                    month: self.label(bucket),
                    total_sales: breakdown.total(),
                    breakdown,
                    target_total_sales: TargetMetric::TotalSales.target_for(bucket),
                }
            })
            .collect();

        if let Some(last) = points.last() {
            debug!(
                month = %last.month,
                total = last.total_sales,
                breakdown = ?last.breakdown,
                "total sales for selected month"
            );
        }
        points
    }

    pub fn build(&self) -> ChartData {
        ChartData {
            leads_intro_sales: self.leads_intro_sales(),
            new_members: self.new_members(),
            cumulative_members: self.cumulative_members(),
            total_sales: self.total_sales(),
        }
    }
}
