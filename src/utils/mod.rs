//! Formatting helpers

pub mod helper;

pub use helper::{add_commas, format_price, parse_lenient_f64, truncate_string, two_decimals};
