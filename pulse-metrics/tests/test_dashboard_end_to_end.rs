use pulse_core::{KpiKind, StatusColor, month_number};
use pulse_ingest::{DatasetKind, IngestError, RawExports};
use pulse_metrics::{PipelineError, process_exports};

const MEMBERSHIP_HEADER: &str = "\"Purchase ID\",\"First Name\",\"Last Name\",\"Customer Email\",\
                                 \"Membership Name\",\"Bought Date/Time (GMT)\",\"Paid Amount\"";

fn membership_row(i: usize, email: &str, bought: &str) -> String {
    let id = 50000000 + i;
    format!(
        "\"{id}\",\"First{i}\",\"Last{i}\",\"{email}\",\
         \"8-Class Monthly Membership- $189\",\"{bought}\",\"189.00\""
    )
}

/// 28 new members spread across September 2025, none in August.
fn membership_sales() -> String {
    let mut lines = vec![MEMBERSHIP_HEADER.to_string()];
    for i in 0..28 {
        let day = i % 28 + 1;
        lines.push(membership_row(
            i,
            &format!("new{i}@example.com"),
            &format!("2025-09-{day:02}T{:02}:15:00.000Z", i % 24),
        ));
    }
    lines.join("\n")
}

/// August actives {a..e}; September actives {a, c, new0..new27}.
fn membership_sales_with_renewals() -> String {
    let mut lines = vec![MEMBERSHIP_HEADER.to_string()];
    for (i, who) in ["a", "b", "c", "d", "e"].iter().enumerate() {
        lines.push(membership_row(
            i,
            &format!("{who}@example.com"),
            &format!("2025-08-{:02}T10:00:00.000Z", i + 1),
        ));
    }
    for (i, who) in ["A", "c"].iter().enumerate() {
        lines.push(membership_row(
            i,
            &format!(" {who}@Example.com "),
            &format!("2025-09-{:02}T10:00:00.000Z", i + 1),
        ));
    }
    for i in 0..28 {
        lines.push(membership_row(
            100 + i,
            &format!("new{i}@example.com"),
            &format!("2025-09-{:02}T12:00:00.000Z", i % 28 + 1),
        ));
    }
    lines.join("\n")
}

/// Intro sales: 4 in July, 6 in August, 10 in September.
fn intro_sales() -> String {
    let mut lines = vec!["\"Customer\",\"Intro offer\",\"Purchase date\"".to_string()];
    for (month, count) in [(7, 4), (8, 6), (9, 10)] {
        for i in 0..count {
            let (day, hour) = (i + 1, i % 12 + 1);
            lines.push(format!(
                "\"Customer {month}-{i}\",\"New Flyer 3 Class Pack\",\
                 \"2025-{month:02}-{day:02}, {hour}:30 PM\""
            ));
        }
    }
    lines.join("\n")
}

/// Leads: 30 in August, 60 in September (2 per day). Half of September's
/// leads bought an intro first.
fn leads_customers() -> String {
    let mut lines = vec!["\"Name\",\"Join date\",\"First purchase\"".to_string()];
    for i in 0..30 {
        lines.push(format!(
            "\"Lead A{i}\",\"2025-08-{:02}T09:00:00.000Z\",\"\"",
            i % 30 + 1
        ));
    }
    for i in 0..60 {
        let first = if i % 2 == 0 { "New Flyer 3-Class Pack" } else { "Drop-in" };
        lines.push(format!(
            "\"Lead S{i}\",\"2025-09-{:02}T09:00:00.000Z\",\"{first}\"",
            i / 2 + 1
        ));
    }
    lines.join("\n")
}

/// Five member conversions and two pack conversions from intros bought Jul–Sep.
fn intro_conversions() -> String {
    let rows = [
        ("2025-07-03T10:00:00.000Z", "4-Class Membership"),
        ("2025-08-03T10:00:00.000Z", "Unlimited Membership"),
        ("2025-09-03T10:00:00.000Z", "8 Class Membership"),
        ("2025-09-04T10:00:00.000Z", "12-Class Membership"),
        ("2025-09-05T10:00:00.000Z", "Monthly Membership"),
        ("2025-09-06T10:00:00.000Z", "10-Class Package"),
        ("2025-08-06T10:00:00.000Z", "5 Class Package"),
        ("2025-05-06T10:00:00.000Z", "Unlimited Membership"),
    ];
    let mut lines = vec!["\"Customer\",\"Purchase date\",\"Converted to\"".to_string()];
    for (i, (date, to)) in rows.iter().enumerate() {
        lines.push(format!("\"Customer {i}\",\"{date}\",\"{to}\""));
    }
    lines.join("\n")
}

fn payments() -> String {
    "\"Date\",\"Customer\",\"Category\",\"Item\",\"Sale value\",\"Refunded\",\"Payment status\"\n\
     \"2025-09-02T10:00:00.000Z\",\"Ann\",\"Subscription\",\"8-Class Monthly Membership- $189\",\"189.00\",\"0.00\",\"Succeeded\"\n\
     \"2025-09-03T10:00:00.000Z\",\"Bo\",\"Pack\",\"10 Class Pack\",\"1,000.00\",\"0.00\",\"Failed\"\n\
     \"2025-09-04T10:00:00.000Z\",\"Cy\",\"Pack\",\"10 Class Pack\",\"250.00\",\"50.00\",\"Succeeded\"\n\
     \"2025-09-05T10:00:00.000Z\",\"Di\",\"Pack\",\"5 Class Pack\",\"150.00\",\"0.00\",\"Succeeded\"\n\
     \"2025-09-06T10:00:00.000Z\",\"Ed\",\"Pack\",\"New Flyer 3 Class Pack\",\"49.00\",\"0.00\",\"Succeeded\"\n\
     \"2025-09-07T10:00:00.000Z\",\"Flo\",\"Class\",\"Drop-in\",\"25.50\",\"0.00\",\"Succeeded\"\n\
     \"2025-08-07T10:00:00.000Z\",\"Gus\",\"Subscription\",\"Unlimited Monthly Membership\",\"500.00\",\"0.00\",\"Succeeded\"\n"
        .to_string()
}

fn full_exports() -> RawExports {
    RawExports::new()
        .with(DatasetKind::MembershipSales, membership_sales())
        .with(DatasetKind::MembershipSalesWithRenewals, membership_sales_with_renewals())
        .with(DatasetKind::IntroSales, intro_sales())
        .with(DatasetKind::LeadsCustomers, leads_customers())
        .with(DatasetKind::IntroConversions, intro_conversions())
        .with(DatasetKind::Payments, payments())
}

fn september() -> u32 {
    month_number("September").unwrap()
}

#[test]
fn test_september_dashboard() {
    let data = process_exports(&full_exports(), september(), 2025).unwrap();
    let m = &data.metrics;

    assert_eq!(data.period.label, "September 2025");

    assert_eq!(m.new_members.value, 28.0);
    assert_eq!(m.new_members.change, 100);

    // 10 vs 6
    assert_eq!(m.intros_sold.value, 10.0);
    assert_eq!(m.intros_sold.change, 67);

    // 60 / 30 days vs 30 / 31 days (1.0)
    assert_eq!(m.avg_leads_per_day.value, 2.0);
    assert_eq!(m.avg_leads_per_day.change, 100);

    // Jul–Sep: 90 leads, 30 intro first purchases. Jun–Aug: 30 leads, none.
    assert_eq!(m.lead_to_intro_conversion.value, 33.3);
    assert_eq!(m.lead_to_intro_conversion.change, 100);

    // 5 member conversions over 20 intros sold Jul–Sep
    assert_eq!(m.intro_to_member_conversion.value, 25.0);
    // 2 pack conversions over 20 intros
    assert_eq!(m.intro_to_pack_conversion.value, 10.0);

    // 189 + 200 + 150 + 49 + 25.5 = 613.5 → 614; August 500
    assert_eq!(m.total_sales.value, 614.0);
    assert_eq!(m.total_sales.change, 23);

    assert_eq!(m.pack_sales.value, 2.0);

    // b, d, e stopped renewing
    assert_eq!(m.membership_cancellations.value, 3.0);
}

#[test]
fn test_september_charts() {
    let data = process_exports(&full_exports(), september(), 2025).unwrap();
    let charts = &data.charts;

    let sep = &charts.cumulative_members[12];
    assert_eq!(sep.month, "September");
    assert_eq!(sep.total_members, 30);
    assert_eq!(sep.new_members, 28);
    assert_eq!(sep.retained_members, 2);

    let leads = &charts.leads_intro_sales[12];
    assert_eq!(leads.new_leads, 60);
    assert_eq!(leads.intro_sales, 10);
    assert_eq!(charts.leads_intro_sales[11].intro_sales, 6);
    assert_eq!(charts.leads_intro_sales[0].month, "September...");

    let sales = &charts.total_sales[12];
    assert_eq!(sales.breakdown.membership, 189.0);
    assert_eq!(sales.breakdown.pack, 350.0);
    assert_eq!(sales.breakdown.intro, 49.0);
    assert_eq!(sales.breakdown.drop_in, 26.0);
    assert_eq!(sales.total_sales, 614.0);
    assert_eq!(charts.total_sales[11].breakdown.membership, 500.0);
}

#[test]
fn test_september_scorecard_and_summary() {
    let data = process_exports(&full_exports(), september(), 2025).unwrap();
    let card = &data.scorecard;

    assert_eq!(card.status(KpiKind::NewMembers), StatusColor::Yellow);
    assert_eq!(card.status(KpiKind::IntroToPackConversion), StatusColor::Gray);
    assert_eq!(card.status(KpiKind::MembershipCancellations), StatusColor::Green);
    assert_eq!(card.status(KpiKind::TotalSales), StatusColor::Red);
    assert_eq!(card.get(KpiKind::TotalSales).unwrap().target, Some(45000.0));

    assert!(data.summary.starts_with("Sharp gains: new members up 100%"));
    assert!(data.summary.contains("Total sales came in well under target"));
    assert!(data.summary.ends_with("heading into October."));
}

#[test]
fn test_dashboard_json_shape() {
    let data = process_exports(&full_exports(), september(), 2025).unwrap();
    let json = serde_json::to_value(&data).unwrap();

    assert_eq!(json["metrics"]["newMembers"]["value"], 28.0);
    assert_eq!(json["metrics"]["newMembers"]["change"], 100);
    assert!(json["metrics"]["introToMemberConversion"].is_object());
    assert!(json["metrics"]["membershipCancellations"].is_object());
    assert_eq!(json["charts"]["totalSales"].as_array().unwrap().len(), 13);
    assert_eq!(json["charts"]["cumulativeMembers"][12]["retainedMembers"], 2);
    assert_eq!(json["scorecard"]["entries"][5]["status"], "gray");
    assert_eq!(json["period"]["month"], 8);
}

#[test]
fn test_missing_export_is_named() {
    let mut raw = full_exports();
    raw.set(DatasetKind::IntroConversions, "");
    let err = process_exports(&raw, september(), 2025).unwrap_err();
    assert_eq!(
        err,
        PipelineError::Ingest(IngestError::MissingDatasets(vec![DatasetKind::IntroConversions]))
    );
    assert!(err.to_string().contains("Intro Offers Conversions"));
}

#[test]
fn test_invalid_month() {
    let err = process_exports(&full_exports(), 12, 2025).unwrap_err();
    assert_eq!(err, PipelineError::InvalidMonth(12));
}

#[test]
fn test_years_beyond_the_calendar_are_rejected() {
    let err = process_exports(&full_exports(), 0, i32::MAX).unwrap_err();
    assert_eq!(err, PipelineError::InvalidYear(i32::MAX));

    let err = process_exports(&full_exports(), 5, i32::MIN + 1).unwrap_err();
    assert_eq!(err, PipelineError::InvalidYear(i32::MIN + 1));

    // Month is checked first.
    let err = process_exports(&full_exports(), 12, i32::MAX).unwrap_err();
    assert_eq!(err, PipelineError::InvalidMonth(12));
}

#[test]
fn test_distant_years_inside_the_calendar() {
    let data = process_exports(&full_exports(), 0, 200_000).unwrap();
    assert_eq!(data.period.label, "January 200000");
    assert_eq!(data.charts.total_sales.len(), 13);

    let data = process_exports(&full_exports(), 11, -200_000).unwrap();
    assert_eq!(data.metrics.new_members.value, 0.0);
}

#[test]
fn test_conversion_without_intro_sales_is_zero() {
    let raw = full_exports().with(DatasetKind::IntroSales, "\"Customer\",\"Purchase date\"\n");
    let data = process_exports(&raw, september(), 2025).unwrap();
    assert_eq!(data.metrics.intro_to_member_conversion.value, 0.0);
    assert_eq!(data.metrics.intro_to_member_conversion.change, 0);
    assert_eq!(data.metrics.intro_to_pack_conversion.value, 0.0);
}

#[test]
fn test_month_with_no_activity() {
    let data = process_exports(&full_exports(), 0, 2024).unwrap();
    for (kind, kpi) in data.metrics.iter() {
        assert_eq!(kpi.value, 0.0, "{kind:?}");
        assert_eq!(kpi.change, 0, "{kind:?}");
    }
    // Zeros are red against every plan target but nothing moved.
    assert!(!data.summary.contains("Sharp"));
    assert!(data.summary.contains("New members came in well under target (0 against 30)."));
    assert!(data.summary.ends_with("Sales held level with last month."));
}
