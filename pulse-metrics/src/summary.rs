//! Executive summary text built from the scorecard with fixed rules.
//!
//! Sections appear in a fixed order: sharp increases, sharp decreases,
//! target callouts, conversion commentary. A closing sentence follows the
//! direction of total sales.

use pulse_core::{KpiKind, MonthBucket, StatusColor};

use crate::scorecard::{Scorecard, ScorecardEntry};

/// Minimum absolute change (percent) that counts as a sharp movement.
fn sharp_threshold(kind: KpiKind) -> Option<i64> {
    match kind {
        KpiKind::TotalSales => Some(15),
        KpiKind::NewMembers
        | KpiKind::AvgLeadsPerDay
        | KpiKind::LeadToIntroConversion
        | KpiKind::IntroToMemberConversion
        | KpiKind::IntroToPackConversion => Some(20),
        KpiKind::IntrosSold | KpiKind::PackSales | KpiKind::MembershipCancellations => None,
    }
}

fn phrase_name(kind: KpiKind) -> &'static str {
    match kind {
        KpiKind::NewMembers => "new members",
        KpiKind::IntrosSold => "intro sales",
        KpiKind::AvgLeadsPerDay => "leads per day",
        KpiKind::LeadToIntroConversion => "lead to intro conversion",
        KpiKind::IntroToMemberConversion => "intro to member conversion",
        KpiKind::IntroToPackConversion => "intro to pack conversion",
        KpiKind::TotalSales => "total sales",
        KpiKind::PackSales => "pack sales",
        KpiKind::MembershipCancellations => "membership cancellations",
    }
}

/// Below this share of target a red KPI is called out as a miss.
const MISS_RATIO: f64 = 0.7;

/// "a", "a and b", "a, b and c"
fn join_phrases(parts: &[String]) -> String {
    match parts {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn sharp_moves(scorecard: &Scorecard, rising: bool) -> Vec<String> {
    scorecard
        .entries
        .iter()
        .filter(|e| {
            sharp_threshold(e.kind).is_some_and(|limit| {
                if rising {
                    e.change >= limit
                } else {
                    e.change <= -limit
                }
            })
        })
        .map(|e| {
            let direction = if rising { "up" } else { "down" };
            format!("{} {direction} {}%", phrase_name(e.kind), e.change.abs())
        })
        .collect()
}

fn target_callout(entry: &ScorecardEntry) -> Option<String> {
    if entry.kind == KpiKind::MembershipCancellations {
        return None;
    }
    let target = entry.target?;
    let ratio = entry.attainment()?;
    let value = entry.kind.format_value(entry.value);
    let goal = entry.kind.format_value(target);
    match entry.status {
        StatusColor::Red if ratio < MISS_RATIO => Some(format!(
            "{} came in well under target ({value} against {goal}).",
            capitalize(phrase_name(entry.kind))
        )),
        StatusColor::Green if ratio >= 1.0 => Some(format!(
            "{} beat its target ({value} against {goal}).",
            capitalize(phrase_name(entry.kind))
        )),
        _ => None,
    }
}

fn conversion_commentary(scorecard: &Scorecard) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(e) = scorecard.get(KpiKind::IntroToMemberConversion) {
        if e.value >= 30.0 {
            out.push(format!(
                "Intro to member conversion at {:.1}% shows intros are turning into members.",
                e.value
            ));
        } else if e.value < 20.0 {
            out.push(format!(
                "Intro to member conversion at {:.1}% suggests intro follow-up needs attention.",
                e.value
            ));
        }
    }

    if let Some(e) = scorecard.get(KpiKind::LeadToIntroConversion) {
        if e.value >= 35.0 {
            out.push(format!(
                "Lead to intro conversion is healthy at {:.1}%.",
                e.value
            ));
        } else if e.value < 25.0 {
            out.push(format!(
                "Only {:.1}% of leads are buying an intro; the first touch could be stronger.",
                e.value
            ));
        }
    }

    out
}

fn closing(scorecard: &Scorecard, target: MonthBucket) -> String {
    let change = scorecard
        .get(KpiKind::TotalSales)
        .map(|e| e.change)
        .unwrap_or(0);
    let next = target.offset(1).name();
    if change > 0 {
        format!("Sales are up {change}% on last month, good momentum heading into {next}.")
    } else if change < 0 {
        format!(
            "Sales are down {}% on last month, worth a closer look before {next}.",
            change.abs()
        )
    } else {
        "Sales held level with last month.".to_string()
    }
}

/// Summarize the month in a few sentences.
pub fn generate_summary(scorecard: &Scorecard, target: MonthBucket) -> String {
    let mut sentences = Vec::new();

    let ups = sharp_moves(scorecard, true);
    if !ups.is_empty() {
        sentences.push(format!("Sharp gains: {}.", join_phrases(&ups)));
    }

    let downs = sharp_moves(scorecard, false);
    if !downs.is_empty() {
        sentences.push(format!("Sharp drops: {}.", join_phrases(&downs)));
    }

    sentences.extend(scorecard.entries.iter().filter_map(target_callout));
    sentences.extend(conversion_commentary(scorecard));

    if sentences.is_empty() {
        sentences.push(format!(
            "{} was steady, with no sharp swings or standout results against target.",
            target.long_label()
        ));
    }

    sentences.push(closing(scorecard, target));
    sentences.join(" ")
}
