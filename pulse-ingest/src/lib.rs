//! pulse-ingest: CSV text parsing and the six studio exports the dashboard reads.

pub mod error;
pub mod exports;
pub mod parsers;
pub mod types;

pub use error::IngestError;
pub use exports::{DatasetKind, PAYMENT_SUCCEEDED, ParsedExports, RawExports, columns};
pub use parsers::{parse_amount, parse_csv, tokenize_line};
pub use types::CsvRow;
