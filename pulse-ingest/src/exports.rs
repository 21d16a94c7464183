//! The six studio exports the dashboard is computed from.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::IngestError;
use crate::parsers::parse_csv;
use crate::types::CsvRow;

/// Column names the metrics read, matched literally against export headers.
pub mod columns {
    pub const BOUGHT_AT: &str = "Bought Date/Time (GMT)";
    pub const CUSTOMER_EMAIL: &str = "Customer Email";
    pub const PURCHASE_DATE: &str = "Purchase date";
    pub const JOIN_DATE: &str = "Join date";
    pub const FIRST_PURCHASE: &str = "First purchase";
    pub const CONVERTED_TO: &str = "Converted to";
    pub const PAYMENT_DATE: &str = "Date";
    pub const SALE_VALUE: &str = "Sale value";
    pub const REFUNDED: &str = "Refunded";
    pub const PAYMENT_STATUS: &str = "Payment status";
    pub const CATEGORY: &str = "Category";
    pub const ITEM: &str = "Item";
}

/// Payment status counted as revenue.
pub const PAYMENT_SUCCEEDED: &str = "Succeeded";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum DatasetKind {
    MembershipSales,
    MembershipSalesWithRenewals,
    IntroSales,
    LeadsCustomers,
    IntroConversions,
    Payments,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 6] = [
        DatasetKind::MembershipSales,
        DatasetKind::MembershipSalesWithRenewals,
        DatasetKind::IntroSales,
        DatasetKind::LeadsCustomers,
        DatasetKind::IntroConversions,
        DatasetKind::Payments,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            DatasetKind::MembershipSales => "Membership Sales (No Renewals)",
            DatasetKind::MembershipSalesWithRenewals => "Membership Sales (With Renewals)",
            DatasetKind::IntroSales => "Intro Offers Sales",
            DatasetKind::LeadsCustomers => "New Leads and Customers",
            DatasetKind::IntroConversions => "Intro Offers Conversions",
            DatasetKind::Payments => "Latest Payments",
        }
    }

    /// File name the studio software gives this export.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            DatasetKind::MembershipSales => "momence--membership-sales-export-norenewals.csv",
            DatasetKind::MembershipSalesWithRenewals => {
                "momence--membership-sales-export-withrenewals.csv"
            }
            DatasetKind::IntroSales => "momence-intro-offers-sales-report.csv",
            DatasetKind::LeadsCustomers => "momence-new-leads-and-customers.csv",
            DatasetKind::IntroConversions => "momence-intro-offers-conversions-report.csv",
            DatasetKind::Payments => "momence-latest-payments-report.csv",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DatasetKind::MembershipSales => "New members count",
            DatasetKind::MembershipSalesWithRenewals => {
                "Total memberships including renewals, and cancellations"
            }
            DatasetKind::IntroSales => "Intro sales count and conversion denominators",
            DatasetKind::LeadsCustomers => "Leads per day and lead to intro conversion",
            DatasetKind::IntroConversions => "Intro to member and intro to pack conversions",
            DatasetKind::Payments => "Total sales and pack sales",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name(), self.default_file_name())
    }
}

/// Raw export text as handed over by whatever read the files.
#[derive(Debug, Clone, Default)]
pub struct RawExports {
    texts: [Option<String>; 6],
}

impl RawExports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: DatasetKind, text: impl Into<String>) -> Self {
        self.set(kind, text);
        self
    }

    pub fn set(&mut self, kind: DatasetKind, text: impl Into<String>) {
        self.texts[kind as usize] = Some(text.into());
    }

    /// Text for `kind`. An empty upload counts as absent.
    pub fn get(&self, kind: DatasetKind) -> Option<&str> {
        self.texts[kind as usize]
            .as_deref()
            .filter(|text| !text.is_empty())
    }

    pub fn missing(&self) -> Vec<DatasetKind> {
        DatasetKind::ALL
            .into_iter()
            .filter(|kind| self.get(*kind).is_none())
            .collect()
    }

    /// Parse all six exports. Fails, naming every absent export, when any is missing.
    pub fn parse(&self) -> Result<ParsedExports, IngestError> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(IngestError::MissingDatasets(missing));
        }

        let mut parsed = ParsedExports::default();
        for kind in DatasetKind::ALL {
            let rows = parse_csv(self.get(kind).unwrap_or_default());
            debug!(dataset = kind.display_name(), rows = rows.len(), "parsed export");
            parsed.rows[kind as usize] = rows;
        }
        Ok(parsed)
    }
}

/// Rows of all six exports.
#[derive(Debug, Clone, Default)]
pub struct ParsedExports {
    rows: [Vec<CsvRow>; 6],
}

impl ParsedExports {
    pub fn with_rows(mut self, kind: DatasetKind, rows: Vec<CsvRow>) -> Self {
        self.rows[kind as usize] = rows;
        self
    }

    pub fn rows(&self, kind: DatasetKind) -> &[CsvRow] {
        &self.rows[kind as usize]
    }

    pub fn membership_sales(&self) -> &[CsvRow] {
        self.rows(DatasetKind::MembershipSales)
    }

    pub fn membership_sales_with_renewals(&self) -> &[CsvRow] {
        self.rows(DatasetKind::MembershipSalesWithRenewals)
    }

    pub fn intro_sales(&self) -> &[CsvRow] {
        self.rows(DatasetKind::IntroSales)
    }

    pub fn leads_customers(&self) -> &[CsvRow] {
        self.rows(DatasetKind::LeadsCustomers)
    }

    pub fn intro_conversions(&self) -> &[CsvRow] {
        self.rows(DatasetKind::IntroConversions)
    }

    pub fn payments(&self) -> &[CsvRow] {
        self.rows(DatasetKind::Payments)
    }
}
