//! Metric engine: monthly KPI values and their month-over-month change.
//!
//! Every KPI is one function of (exports, month). The comparison month is
//! the same function evaluated one month earlier.

use pulse_core::{
    CanonicalInstant, Kpi, KpiKind, MonthBucket, TrailingWindow, parse_date, ratio_percent,
    round_half_up, round_to_tenth,
};
use pulse_ingest::{CsvRow, PAYMENT_SUCCEEDED, ParsedExports, columns, parse_amount};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::category_rules::{PatternSet, SaleCategory, categorize_sale};

/// Months in the trailing conversion window, including the selected one.
pub const CONVERSION_WINDOW_MONTHS: u32 = 3;

/// Rows paired with the parsed timestamp in `column`. Rows whose
/// timestamp does not parse are skipped.
pub fn dated_rows<'a>(
    rows: &'a [CsvRow],
    column: &'a str,
) -> impl Iterator<Item = (&'a CsvRow, CanonicalInstant)> + 'a {
    rows.iter()
        .filter_map(move |row| parse_date(row.field(column)).map(|at| (row, at)))
}

pub fn rows_in_month<'a>(
    rows: &'a [CsvRow],
    column: &'a str,
    bucket: MonthBucket,
) -> impl Iterator<Item = &'a CsvRow> + 'a {
    dated_rows(rows, column)
        .filter(move |(_, at)| bucket.contains(at))
        .map(|(row, _)| row)
}

pub fn rows_in_window<'a>(
    rows: &'a [CsvRow],
    column: &'a str,
    window: TrailingWindow,
) -> impl Iterator<Item = &'a CsvRow> + 'a {
    dated_rows(rows, column)
        .filter(move |(_, at)| window.contains(at))
        .map(|(row, _)| row)
}

pub fn count_in_month(rows: &[CsvRow], column: &str, bucket: MonthBucket) -> usize {
    rows_in_month(rows, column, bucket).count()
}

/// Succeeded payments dated in `bucket`.
pub fn succeeded_payments<'a>(
    rows: &'a [CsvRow],
    bucket: MonthBucket,
) -> impl Iterator<Item = &'a CsvRow> + 'a {
    rows_in_month(rows, columns::PAYMENT_DATE, bucket)
        .filter(|row| row.field(columns::PAYMENT_STATUS) == PAYMENT_SUCCEEDED)
}

/// Sale value less any refund.
pub fn net_sale_value(row: &CsvRow) -> f64 {
    parse_amount(row.field(columns::SALE_VALUE)) - parse_amount(row.field(columns::REFUNDED))
}

pub fn sale_category(row: &CsvRow) -> SaleCategory {
    categorize_sale(row.field(columns::CATEGORY), row.field(columns::ITEM))
}

/// Distinct customer emails (trimmed, lower-cased) with a membership charge in `bucket`.
pub fn active_emails(rows: &[CsvRow], bucket: MonthBucket) -> HashSet<String> {
    rows_in_month(rows, columns::BOUGHT_AT, bucket)
        .map(|row| row.field(columns::CUSTOMER_EMAIL).trim().to_lowercase())
        .filter(|email| !email.is_empty())
        .collect()
}

/// Members active in the month before `bucket` but not in `bucket`.
pub fn cancellations(rows: &[CsvRow], bucket: MonthBucket) -> usize {
    let before = active_emails(rows, bucket.previous());
    let now = active_emails(rows, bucket);
    before.difference(&now).count()
}

/// The nine KPIs for one month.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub new_members: Kpi,
    pub intros_sold: Kpi,
    pub avg_leads_per_day: Kpi,
    pub lead_to_intro_conversion: Kpi,
    pub intro_to_member_conversion: Kpi,
    pub intro_to_pack_conversion: Kpi,
    pub total_sales: Kpi,
    pub pack_sales: Kpi,
    pub membership_cancellations: Kpi,
}

impl DashboardMetrics {
    pub fn get(&self, kind: KpiKind) -> Kpi {
        match kind {
            KpiKind::NewMembers => self.new_members,
            KpiKind::IntrosSold => self.intros_sold,
            KpiKind::AvgLeadsPerDay => self.avg_leads_per_day,
            KpiKind::LeadToIntroConversion => self.lead_to_intro_conversion,
            KpiKind::IntroToMemberConversion => self.intro_to_member_conversion,
            KpiKind::IntroToPackConversion => self.intro_to_pack_conversion,
            KpiKind::TotalSales => self.total_sales,
            KpiKind::PackSales => self.pack_sales,
            KpiKind::MembershipCancellations => self.membership_cancellations,
        }
    }

    fn set(&mut self, kind: KpiKind, kpi: Kpi) {
        let slot = match kind {
            KpiKind::NewMembers => &mut self.new_members,
            KpiKind::IntrosSold => &mut self.intros_sold,
            KpiKind::AvgLeadsPerDay => &mut self.avg_leads_per_day,
            KpiKind::LeadToIntroConversion => &mut self.lead_to_intro_conversion,
            KpiKind::IntroToMemberConversion => &mut self.intro_to_member_conversion,
            KpiKind::IntroToPackConversion => &mut self.intro_to_pack_conversion,
            KpiKind::TotalSales => &mut self.total_sales,
            KpiKind::PackSales => &mut self.pack_sales,
            KpiKind::MembershipCancellations => &mut self.membership_cancellations,
        };
        *slot = kpi;
    }

    pub fn iter(&self) -> impl Iterator<Item = (KpiKind, Kpi)> + '_ {
        KpiKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }
}

/// Computes KPIs over one set of parsed exports. Holds no state between calls.
pub struct MetricEngine<'a> {
    exports: &'a ParsedExports,
}

impl<'a> MetricEngine<'a> {
    pub fn new(exports: &'a ParsedExports) -> Self {
        Self { exports }
    }

    /// Value of `kind` for the month `month_offset` months from `target`
    /// (0 = the selected month, -1 = the comparison month).
    pub fn value_at(&self, kind: KpiKind, target: MonthBucket, month_offset: i32) -> f64 {
        self.value(kind, target.offset(month_offset))
    }

    pub fn value(&self, kind: KpiKind, bucket: MonthBucket) -> f64 {
        match kind {
            KpiKind::NewMembers => self.new_members(bucket) as f64,
            KpiKind::IntrosSold => self.intros_sold(bucket) as f64,
            KpiKind::AvgLeadsPerDay => self.avg_leads_per_day(bucket),
            KpiKind::LeadToIntroConversion => self.lead_to_intro_conversion(bucket),
            KpiKind::IntroToMemberConversion => {
                self.intro_conversion(bucket, PatternSet::Membership)
            }
            KpiKind::IntroToPackConversion => self.intro_conversion(bucket, PatternSet::Package),
            KpiKind::TotalSales => self.total_sales(bucket),
            KpiKind::PackSales => self.pack_sales(bucket) as f64,
            KpiKind::MembershipCancellations => {
                cancellations(self.exports.membership_sales_with_renewals(), bucket) as f64
            }
        }
    }

    pub fn kpi(&self, kind: KpiKind, target: MonthBucket) -> Kpi {
        let current = self.value_at(kind, target, 0);
        let previous = self.value_at(kind, target, -1);
        debug!(kpi = ?kind, month = %target, current, previous, "computed kpi");
        Kpi::compare(current, previous)
    }

    pub fn metrics(&self, target: MonthBucket) -> DashboardMetrics {
        let mut metrics = DashboardMetrics::default();
        for kind in KpiKind::ALL {
            metrics.set(kind, self.kpi(kind, target));
        }
        metrics
    }

    pub fn new_members(&self, bucket: MonthBucket) -> usize {
        count_in_month(self.exports.membership_sales(), columns::BOUGHT_AT, bucket)
    }

    /// Memberships charged in the month, renewals included.
    pub fn total_members(&self, bucket: MonthBucket) -> usize {
        count_in_month(
            self.exports.membership_sales_with_renewals(),
            columns::BOUGHT_AT,
            bucket,
        )
    }

    pub fn intros_sold(&self, bucket: MonthBucket) -> usize {
        count_in_month(self.exports.intro_sales(), columns::PURCHASE_DATE, bucket)
    }

    pub fn new_leads(&self, bucket: MonthBucket) -> usize {
        count_in_month(self.exports.leads_customers(), columns::JOIN_DATE, bucket)
    }

    pub fn avg_leads_per_day(&self, bucket: MonthBucket) -> f64 {
        round_to_tenth(self.new_leads(bucket) as f64 / bucket.days_in_month() as f64)
    }

    /// Share of leads who joined in the trailing window and whose first
    /// purchase was an intro offer.
    pub fn lead_to_intro_conversion(&self, bucket: MonthBucket) -> f64 {
        let window = bucket.trailing_window(CONVERSION_WINDOW_MONTHS);
        let leads = rows_in_window(self.exports.leads_customers(), columns::JOIN_DATE, window);
        let (total, intro) = leads.fold((0, 0), |(total, intro), row| {
            let hit = PatternSet::Intro.matches(row.field(columns::FIRST_PURCHASE));
            (total + 1, intro + usize::from(hit))
        });
        ratio_percent(intro, total)
    }

    /// Conversions into `set` over the trailing window, divided by every intro
    /// sold in that window (from the intro sales export, not the conversions one).
    pub fn intro_conversion(&self, bucket: MonthBucket, set: PatternSet) -> f64 {
        let window = bucket.trailing_window(CONVERSION_WINDOW_MONTHS);
        let converted = rows_in_window(
            self.exports.intro_conversions(),
            columns::PURCHASE_DATE,
            window,
        )
        .filter(|row| set.matches(row.field(columns::CONVERTED_TO)))
        .count();
        let intros =
            rows_in_window(self.exports.intro_sales(), columns::PURCHASE_DATE, window).count();
        ratio_percent(converted, intros)
    }

    /// Net succeeded sales, rounded to whole currency units.
    pub fn total_sales(&self, bucket: MonthBucket) -> f64 {
        let net: f64 = succeeded_payments(self.exports.payments(), bucket)
            .map(net_sale_value)
            .sum();
        round_half_up(net)
    }

    pub fn pack_sales(&self, bucket: MonthBucket) -> usize {
        succeeded_payments(self.exports.payments(), bucket)
            .filter(|row| sale_category(row) == SaleCategory::Pack)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_ingest::{DatasetKind, parse_csv};

    fn sept() -> MonthBucket {
        MonthBucket::new(2025, 8).unwrap()
    }

    fn exports(kind: DatasetKind, csv: &str) -> ParsedExports {
        ParsedExports::default().with_rows(kind, parse_csv(csv))
    }

    #[test]
    fn test_new_members_counts_only_target_month() {
        let csv = "\"Customer Email\",\"Bought Date/Time (GMT)\"\n\
                   a@x.com,2025-09-01T10:00:00.000Z\n\
                   b@x.com,2025-09-30T23:18:14.368Z\n\
                   c@x.com,2025-08-31T23:59:00.000Z\n\
                   d@x.com,not a date\n";
        let ex = exports(DatasetKind::MembershipSales, csv);
        let engine = MetricEngine::new(&ex);
        assert_eq!(engine.new_members(sept()), 2);
        assert_eq!(engine.kpi(KpiKind::NewMembers, sept()), Kpi { value: 2.0, change: 100 });
    }

    #[test]
    fn test_avg_leads_per_day() {
        let mut csv = String::from("Join date,First purchase\n");
        for day in 1..=26 {
            csv.push_str(&format!("\"2025-09-{day:02}, 9:00 AM\",\n"));
        }
        let ex = exports(DatasetKind::LeadsCustomers, &csv);
        let engine = MetricEngine::new(&ex);
        // 26 leads / 30 days = 0.8667
        assert_eq!(engine.avg_leads_per_day(sept()), 0.9);
    }

    #[test]
    fn test_lead_to_intro_uses_all_leads_as_denominator() {
        let csv = "Join date,First purchase\n\
                   2025-07-02T10:00:00Z,New Flyer 3 Class Pack\n\
                   2025-08-02T10:00:00Z,\n\
                   2025-09-02T10:00:00Z,Unlimited 14 Day Intro Package\n\
                   2025-09-03T10:00:00Z,Drop-in\n\
                   2025-06-30T10:00:00Z,Intro Pack\n";
        let ex = exports(DatasetKind::LeadsCustomers, csv);
        let engine = MetricEngine::new(&ex);
        // Jul..Sep: 4 leads, 2 intro purchases. June is outside the window.
        assert_eq!(engine.lead_to_intro_conversion(sept()), 50.0);
    }

    #[test]
    fn test_intro_conversion_uses_intro_sales_denominator() {
        let conversions = "Purchase date,Converted to\n\
                           2025-09-01T10:00:00Z,8-Class Membership\n\
                           2025-09-02T10:00:00Z,10 Class Package\n\
                           2025-08-02T10:00:00Z,Unlimited Membership\n";
        let intro_sales = "Purchase date\n\
                           2025-07-01T10:00:00Z\n2025-07-02T10:00:00Z\n2025-08-01T10:00:00Z\n\
                           2025-08-02T10:00:00Z\n2025-09-01T10:00:00Z\n2025-09-02T10:00:00Z\n\
                           2025-09-03T10:00:00Z\n2025-09-04T10:00:00Z\n";
        let ex = ParsedExports::default()
            .with_rows(DatasetKind::IntroConversions, parse_csv(conversions))
            .with_rows(DatasetKind::IntroSales, parse_csv(intro_sales));
        let engine = MetricEngine::new(&ex);
        assert_eq!(engine.intro_conversion(sept(), PatternSet::Membership), 25.0);
        assert_eq!(engine.intro_conversion(sept(), PatternSet::Package), 12.5);
    }

    #[test]
    fn test_intro_conversion_zero_denominator() {
        let conversions = "Purchase date,Converted to\n\
                           2025-09-01T10:00:00Z,8-Class Membership\n";
        let ex = exports(DatasetKind::IntroConversions, conversions);
        let engine = MetricEngine::new(&ex);
        assert_eq!(engine.value(KpiKind::IntroToMemberConversion, sept()), 0.0);
    }

    #[test]
    fn test_conversion_window_crosses_year() {
        let intro_sales = "Purchase date\n2025-11-10T10:00:00Z\n2026-01-10T10:00:00Z\n";
        let conversions = "Purchase date,Converted to\n2025-11-10T10:00:00Z,Unlimited Membership\n";
        let ex = ParsedExports::default()
            .with_rows(DatasetKind::IntroConversions, parse_csv(conversions))
            .with_rows(DatasetKind::IntroSales, parse_csv(intro_sales));
        let engine = MetricEngine::new(&ex);
        let jan = MonthBucket::new(2026, 0).unwrap();
        assert_eq!(engine.intro_conversion(jan, PatternSet::Membership), 50.0);
    }

    #[test]
    fn test_total_sales_nets_refunds_and_skips_failed() {
        let csv = "Date,Sale value,Refunded,Payment status,Category,Item\n\
                   2025-09-01T10:00:00Z,100.00,0,Succeeded,Pack,10 Class Pack\n\
                   2025-09-02T10:00:00Z,50.40,10.00,Succeeded,Class,Drop-in\n\
                   2025-09-03T10:00:00Z,999.00,0,Failed,Pack,10 Class Pack\n\
                   2025-08-03T10:00:00Z,70.00,0,Succeeded,Pack,5 Class Pack\n\
                   2025-09-04T10:00:00Z,20.00,,Succeeded,Pack,New Flyer 3 Class Pack\n";
        let ex = exports(DatasetKind::Payments, csv);
        let engine = MetricEngine::new(&ex);
        assert_eq!(engine.total_sales(sept()), 160.0);
        assert_eq!(engine.pack_sales(sept()), 1);
        assert_eq!(engine.kpi(KpiKind::TotalSales, sept()).change, 129);
    }

    #[test]
    fn test_cancellations_are_set_difference() {
        let csv = "Customer Email,Bought Date/Time (GMT)\n\
                   a@x.com,2025-08-01T10:00:00Z\n\
                   b@x.com,2025-08-02T10:00:00Z\n\
                   c@x.com,2025-08-03T10:00:00Z\n\
                   A@X.com ,2025-09-01T10:00:00Z\n\
                   c@x.com,2025-09-02T10:00:00Z\n\
                   d@x.com,2025-09-03T10:00:00Z\n";
        let rows = parse_csv(csv);
        assert_eq!(cancellations(&rows, sept()), 1);
        // Everyone from September is gone in October.
        assert_eq!(cancellations(&rows, sept().offset(1)), 3);
    }

    #[test]
    fn test_previous_month_rolls_over_year() {
        let csv = "Purchase date\n\
                   2025-12-15T10:00:00Z\n\
                   2025-12-16T10:00:00Z\n\
                   2026-01-15T10:00:00Z\n";
        let ex = exports(DatasetKind::IntroSales, csv);
        let engine = MetricEngine::new(&ex);
        let jan = MonthBucket::new(2026, 0).unwrap();
        assert_eq!(engine.value_at(KpiKind::IntrosSold, jan, -1), 2.0);
        assert_eq!(engine.kpi(KpiKind::IntrosSold, jan), Kpi { value: 1.0, change: -50 });
    }

    #[test]
    fn test_metrics_fills_every_kpi() {
        let csv = "Purchase date\n2025-09-15T10:00:00Z\n";
        let ex = exports(DatasetKind::IntroSales, csv);
        let metrics = MetricEngine::new(&ex).metrics(sept());
        assert_eq!(metrics.intros_sold.value, 1.0);
        assert_eq!(metrics.get(KpiKind::IntrosSold), metrics.intros_sold);
        assert_eq!(metrics.iter().count(), 9);
    }
}
