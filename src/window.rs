//! Evaluation time windows.
//!
//! Two conventions are in use and they are kept as distinct types:
//! - [`InclusiveWindow`]: year bounds, both inclusive. Used on dataset facets
//!   and recipe entries.
//! - [`IsoWindow`]: ISO datetimes, end exclusive at the next year boundary.
//!   Used in requests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{EvalprepError, Result};

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Year window with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusiveWindow {
    pub start_year: i32,
    pub end_year: i32,
}

/// Datetime window whose end is the first instant after the last year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsoWindow {
    pub start_date: String,
    pub end_date: String,
}

/// Base year and duration, before either convention is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    pub start_year: i32,
    pub number_of_years: u32,
}

impl WindowSpec {
    pub fn new(start_year: i32, number_of_years: u32) -> Self {
        Self {
            start_year,
            number_of_years,
        }
    }

    pub fn inclusive(&self) -> Result<InclusiveWindow> {
        inclusive_window(self.start_year, self.number_of_years)
    }

    pub fn iso(&self) -> Result<IsoWindow> {
        iso_window(self.start_year, self.number_of_years)
    }
}

/// `end_year = start_year + number_of_years - 1`.
pub fn inclusive_window(start_year: i32, number_of_years: u32) -> Result<InclusiveWindow> {
    let years = checked_years(number_of_years)?;
    let end_year = start_year
        .checked_add(years - 1)
        .ok_or_else(|| out_of_range(start_year, number_of_years))?;
    Ok(InclusiveWindow {
        start_year,
        end_year,
    })
}

/// `start_date = <start_year>-01-01T00:00:00`,
/// `end_date = <start_year + number_of_years>-01-01T00:00:00`.
pub fn iso_window(start_year: i32, number_of_years: u32) -> Result<IsoWindow> {
    let years = checked_years(number_of_years)?;
    let end_year = start_year
        .checked_add(years)
        .ok_or_else(|| out_of_range(start_year, number_of_years))?;
    Ok(IsoWindow {
        start_date: new_year(start_year, number_of_years)?,
        end_date: new_year(end_year, number_of_years)?,
    })
}

fn checked_years(number_of_years: u32) -> Result<i32> {
    if number_of_years < 1 {
        return Err(EvalprepError::Validation(
            "number_of_years must be at least 1".to_string(),
        ));
    }
    i32::try_from(number_of_years).map_err(|_| {
        EvalprepError::Validation(format!("number_of_years {number_of_years} is too large"))
    })
}

fn new_year(year: i32, number_of_years: u32) -> Result<String> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.format(ISO_FORMAT).to_string())
        .ok_or_else(|| out_of_range(year, number_of_years))
}

fn out_of_range(start_year: i32, number_of_years: u32) -> EvalprepError {
    EvalprepError::Validation(format!(
        "window starting {start_year} spanning {number_of_years} years is out of range"
    ))
}
