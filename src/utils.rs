use crate::error::{PeriodError, Result};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};

pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// First instant (00:00:00 UTC) of the given month.
pub fn month_start(year: i32, month: u32) -> Result<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            PeriodError::DateError(format!(
                "Cannot construct the start of month {:02} in year {}",
                month, year
            ))
        })
}

pub fn add_months(instant: DateTime<Utc>, months: u32) -> Result<DateTime<Utc>> {
    instant
        .checked_add_months(Months::new(months))
        .ok_or_else(|| {
            PeriodError::DateError(format!("Adding {} months to {} overflows", months, instant))
        })
}

/// The last representable instant before `next_start`.
pub fn end_before(next_start: DateTime<Utc>) -> DateTime<Utc> {
    next_start - Duration::nanoseconds(1)
}

pub fn next_instant(end: DateTime<Utc>) -> DateTime<Utc> {
    end + Duration::nanoseconds(1)
}

pub fn month_span(start: DateTime<Utc>, months: u32) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let next = add_months(start, months)?;
    Ok((start, end_before(next)))
}

pub fn month_abbreviation(month: u32) -> &'static str {
    MONTH_ABBREVIATIONS[(month.clamp(1, 12) - 1) as usize]
}

/// Deterministic month ID, e.g. `2026-JAN`.
pub fn month_id(instant: DateTime<Utc>) -> String {
    format!("{}-{}", instant.year(), month_abbreviation(instant.month()))
}

pub fn validate_start_month(month: u32) -> Result<()> {
    if !(1..=12).contains(&month) {
        return Err(PeriodError::InvalidFiscalStartMonth(month));
    }
    Ok(())
}

pub fn validate_year_range(start_year: i32, end_year: i32) -> Result<()> {
    if start_year > end_year {
        return Err(PeriodError::InvalidRange {
            start_year,
            end_year,
        });
    }
    Ok(())
}

pub fn fmt_date(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d").to_string()
}
