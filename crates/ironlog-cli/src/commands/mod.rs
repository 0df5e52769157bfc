pub mod config;
pub mod plan;
pub mod stats;
pub mod timer;
pub mod workout;

use chrono::{Local, NaiveDate};
use serde::Serialize;

/// Today in the local time zone; session dates are local calendar days.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
