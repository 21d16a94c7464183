pub mod csv_text;
pub mod number;

pub use csv_text::{parse_csv, tokenize_line};
pub use number::parse_amount;
