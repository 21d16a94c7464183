//! Deterministic classification of offer, membership and sale names.
//!
//! Two tables live here:
//! - pattern sets that recognise intro offers, memberships and class packages
//!   in free text ("New Flyer 3-Class Pack", "8 Class Membership")
//! - the sale decision table mapping a payment's (Category, Item) to a
//!   sales bucket
//!
//! Adding a new offer name means adding a row, not a branch.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Named families of offer patterns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PatternSet {
    #[serde(rename = "intro")]
    Intro,
    #[serde(rename = "membership")]
    Membership,
    #[serde(rename = "package")]
    Package,
}

const PATTERN_TABLE: &[(PatternSet, &[&str])] = &[
    (
        PatternSet::Intro,
        &[
            r"new\s+flyer\s+3[\s-]?(class|pack)",
            r"unlimited\s+14\s+day\s+intro",
            r"new\s+flyer\s+6[\s-]?(class|pack)",
            r"3[\s-]?class\s+intro",
            r"6[\s-]?class\s+intro",
            r"intro\s+pack",
        ],
    ),
    (
        PatternSet::Membership,
        &[
            r"4[\s-]?class\s+membership",
            r"8[\s-]?class\s+membership",
            r"12[\s-]?class\s+membership",
            r"unlimited\s+membership",
            r"monthly\s+membership",
        ],
    ),
    (
        PatternSet::Package,
        &[
            r"10[\s-]?class\s+package",
            r"5[\s-]?class\s+package",
            r"15[\s-]?class\s+package",
            r"class\s+package",
        ],
    ),
];

static COMPILED: Lazy<Vec<(PatternSet, Vec<Regex>)>> = Lazy::new(|| {
    PATTERN_TABLE
        .iter()
        .map(|(set, patterns)| {
            let compiled = patterns
                .iter()
                .map(|p| {
                    RegexBuilder::new(p)
                        .case_insensitive(true)
                        .build()
                        .expect("offer pattern is valid")
                })
                .collect();
            (*set, compiled)
        })
        .collect()
});

impl PatternSet {
    pub fn patterns(&self) -> &'static [Regex] {
        COMPILED
            .iter()
            .find(|(set, _)| set == self)
            .map(|(_, patterns)| patterns.as_slice())
            .unwrap_or(&[])
    }

    pub fn matches(&self, text: &str) -> bool {
        classify_by_pattern(text, *self)
    }
}

/// True iff any pattern of `set` matches `text` (case-insensitive).
/// Empty text never matches.
pub fn classify_by_pattern(text: &str, set: PatternSet) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    set.patterns().iter().any(|re| re.is_match(text))
}

/// Sales buckets for the revenue breakdown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SaleCategory {
    #[serde(rename = "membership")]
    Membership,
    #[serde(rename = "intro")]
    Intro,
    #[serde(rename = "dropIn")]
    DropIn,
    #[serde(rename = "pack")]
    Pack,
    #[serde(rename = "private")]
    Private,
    #[serde(rename = "party")]
    Party,
    #[serde(rename = "other")]
    Other,
}

impl SaleCategory {
    pub const ALL: [SaleCategory; 7] = [
        SaleCategory::Membership,
        SaleCategory::Intro,
        SaleCategory::DropIn,
        SaleCategory::Pack,
        SaleCategory::Private,
        SaleCategory::Party,
        SaleCategory::Other,
    ];
}

#[derive(Debug, Clone, Copy)]
enum ItemMatch {
    Any,
    Exact(&'static str),
    Contains(&'static str),
}

impl ItemMatch {
    fn matches(&self, item: &str) -> bool {
        match self {
            ItemMatch::Any => true,
            ItemMatch::Exact(want) => item == *want,
            ItemMatch::Contains(needle) => item.contains(needle),
        }
    }
}

/// Ordered: first row whose category and item both match wins.
const SALE_RULES: &[(&str, ItemMatch, SaleCategory)] = &[
    ("Class", ItemMatch::Any, SaleCategory::DropIn),
    (
        "Subscription",
        ItemMatch::Exact("Unlimited 14 Day Intro Package"),
        SaleCategory::Intro,
    ),
    ("Subscription", ItemMatch::Contains("Monthly"), SaleCategory::Membership),
    ("Subscription", ItemMatch::Any, SaleCategory::Other),
    ("Appointment", ItemMatch::Contains("Private Lesson"), SaleCategory::Private),
    ("Appointment", ItemMatch::Contains("PARTY"), SaleCategory::Party),
    ("Appointment", ItemMatch::Any, SaleCategory::Other),
    ("Pack", ItemMatch::Exact("New Flyer 3 Class Pack"), SaleCategory::Intro),
    ("Pack", ItemMatch::Any, SaleCategory::Pack),
    ("Product", ItemMatch::Any, SaleCategory::Other),
    ("Payment plan installment", ItemMatch::Any, SaleCategory::Other),
    ("Gift card", ItemMatch::Any, SaleCategory::Other),
    ("Automatic penalty charge", ItemMatch::Any, SaleCategory::Other),
    ("On-demand", ItemMatch::Any, SaleCategory::Other),
];

/// Map a payment's Category and Item columns to a sales bucket.
/// Pairs no rule covers land in `Other`.
pub fn categorize_sale(category: &str, item: &str) -> SaleCategory {
    SALE_RULES
        .iter()
        .find(|(cat, rule, _)| *cat == category && rule.matches(item))
        .map(|(_, _, bucket)| *bucket)
        .unwrap_or_else(|| {
            debug!(category, item, "unrecognized sale, counting as other");
            SaleCategory::Other
        })
}
