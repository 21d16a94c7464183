use anyhow::{Context, Result};
use clap::ValueEnum;
use pulse_core::StatusColor;
use pulse_metrics::{ChartData, DashboardData, SaleCategory};
use serde::Serialize;
use std::fmt::Write as _;
use std::io;

/// Chart series that can be exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartKind {
    LeadsIntros,
    NewMembers,
    CumulativeMembers,
    TotalSales,
}

fn status_tag(status: StatusColor) -> &'static str {
    match status {
        StatusColor::Green => "GREEN",
        StatusColor::Yellow => "YELLOW",
        StatusColor::Red => "RED",
        StatusColor::Gray => "-",
    }
}

/// Plain-text dashboard: scorecard table, selected month sales split, summary.
pub fn render_text(data: &DashboardData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", data.period.label);

    let _ = writeln!(
        out,
        "{:<28} {:>10} {:>7} {:>10}  {}",
        "KPI", "value", "change", "target", "status"
    );
    for e in &data.scorecard.entries {
        let target = e
            .target
            .map(|t| e.kind.format_value(t))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:<28} {:>10} {:>+6}% {:>10}  {}",
            e.kind.label(),
            e.kind.format_value(e.value),
            e.change,
            target,
            status_tag(e.status)
        );
    }

    if let Some(point) = data.charts.total_sales.last() {
        let _ = writeln!(out, "\n## Sales by category\n");
        for category in SaleCategory::ALL {
            let amount = point.breakdown.get(category);
            if amount != 0.0 {
                let _ = writeln!(out, "- {:?}: ${amount:.0}", category);
            }
        }
        let _ = writeln!(out, "- Total: ${:.0}", point.total_sales);
    }

    let _ = writeln!(out, "\n## Summary\n\n{}", data.summary);
    out
}

fn write_points<W: io::Write, T: Serialize>(w: W, points: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(w);
    for p in points {
        wtr.serialize(p).context("write chart row")?;
    }
    wtr.flush().context("flush chart csv")?;
    Ok(())
}

/// Write one thirteen-point series as CSV with a header row.
pub fn write_chart_csv<W: io::Write>(charts: &ChartData, kind: ChartKind, w: W) -> Result<()> {
    match kind {
        ChartKind::LeadsIntros => write_points(w, &charts.leads_intro_sales),
        ChartKind::NewMembers => write_points(w, &charts.new_members),
        ChartKind::CumulativeMembers => write_points(w, &charts.cumulative_members),
        // csv cannot serialize the flattened breakdown, so write records by hand.
        ChartKind::TotalSales => {
            let mut wtr = csv::Writer::from_writer(w);
            let mut header = vec!["month".to_string()];
            header.extend(SaleCategory::ALL.iter().map(|c| category_column(*c).to_string()));
            header.push("totalSales".to_string());
            header.push("targetTotalSales".to_string());
            wtr.write_record(&header).context("write chart header")?;

            for p in &charts.total_sales {
                let mut record = vec![p.month.clone()];
                record.extend(
                    SaleCategory::ALL
                        .iter()
                        .map(|c| format!("{:.0}", p.breakdown.get(*c))),
                );
                record.push(format!("{:.0}", p.total_sales));
                record.push(format!("{:.0}", p.target_total_sales));
                wtr.write_record(&record).context("write chart row")?;
            }
            wtr.flush().context("flush chart csv")?;
            Ok(())
        }
    }
}

fn category_column(category: SaleCategory) -> &'static str {
    match category {
        SaleCategory::Membership => "membership",
        SaleCategory::Intro => "intro",
        SaleCategory::DropIn => "dropIn",
        SaleCategory::Pack => "pack",
        SaleCategory::Private => "private",
        SaleCategory::Party => "party",
        SaleCategory::Other => "other",
    }
}
