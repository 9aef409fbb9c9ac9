use crate::error::{PeriodError, Result};
use crate::utils::{month_start, validate_start_month, validate_year_range};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema,
)]
pub enum CalendarType {
    #[serde(rename = "CAL")]
    #[schemars(description = "Standard January-start calendar. Owns every Month period.")]
    Gregorian,

    #[serde(rename = "FY")]
    #[schemars(
        description = "Overlay calendar with a configurable start month. Owns only Year and Quarter periods."
    )]
    Fiscal,
}

impl CalendarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarType::Gregorian => "CAL",
            CalendarType::Fiscal => "FY",
        }
    }
}

impl fmt::Display for CalendarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalendarType {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CAL" => Ok(CalendarType::Gregorian),
            "FY" => Ok(CalendarType::Fiscal),
            other => Err(PeriodError::StorageError(format!(
                "Unknown calendar type '{}', expected CAL or FY",
                other
            ))),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema,
)]
pub enum Granularity {
    #[serde(rename = "MONTHLY")]
    Month,

    #[serde(rename = "QUARTERLY")]
    Quarter,

    #[serde(rename = "CALENDAR")]
    Year,
}

impl Granularity {
    pub fn rank(&self) -> u8 {
        match self {
            Granularity::Month => 1,
            Granularity::Quarter => 2,
            Granularity::Year => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Month => "MONTHLY",
            Granularity::Quarter => "QUARTERLY",
            Granularity::Year => "CALENDAR",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MONTHLY" => Ok(Granularity::Month),
            "QUARTERLY" => Ok(Granularity::Quarter),
            "CALENDAR" => Ok(Granularity::Year),
            other => Err(PeriodError::StorageError(format!(
                "Unknown granularity '{}', expected MONTHLY, QUARTERLY or CALENDAR",
                other
            ))),
        }
    }
}

/// `end_date` is the last nanosecond covered by the period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct Period {
    #[schemars(description = "Globally unique identifier, e.g. '2026', '2026-Q1', '2026-JAN', 'FY2026', 'FY2026-Q1'")]
    pub id: String,

    #[schemars(description = "Human readable label, e.g. 'January 2026'")]
    pub name: String,

    pub calendar: CalendarType,

    pub granularity: Granularity,

    #[schemars(description = "ID of the parent period. Years have none.")]
    pub parent_period_id: Option<String>,

    /// Derived by the store, never persisted.
    #[serde(skip)]
    pub child_period_ids: Vec<String>,

    pub start_date: DateTime<Utc>,

    pub end_date: DateTime<Utc>,
}

impl Period {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(PeriodError::InvalidPeriod {
                id: self.id.clone(),
                details: "period ID cannot be empty".to_string(),
            });
        }
        if self.name.trim().is_empty() {
            return Err(PeriodError::InvalidPeriod {
                id: self.id.clone(),
                details: "period name cannot be empty".to_string(),
            });
        }
        if self.start_date >= self.end_date {
            return Err(PeriodError::InvalidPeriod {
                id: self.id.clone(),
                details: format!(
                    "start date {} must be before end date {}",
                    self.start_date, self.end_date
                ),
            });
        }
        Ok(())
    }

    pub fn contains(&self, other: &Period) -> bool {
        self.start_date <= other.start_date && other.end_date <= self.end_date
    }

    pub fn contains_instant(&self, instant: DateTime<Utc>) -> bool {
        self.start_date <= instant && instant <= self.end_date
    }

}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct PeriodRange {
    pub start_period_id: String,
    pub end_period_id: String,
}

impl PeriodRange {
    pub fn new(start_period_id: impl Into<String>, end_period_id: impl Into<String>) -> Self {
        Self {
            start_period_id: start_period_id.into(),
            end_period_id: end_period_id.into(),
        }
    }

    pub fn single(period_id: impl Into<String>) -> Self {
        let id = period_id.into();
        Self {
            start_period_id: id.clone(),
            end_period_id: id,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct FiscalCalendarConfig {
    #[schemars(
        description = "Calendar year in which the fiscal year begins. FY2026 starting April 2026 has start_year = 2026."
    )]
    pub start_year: i32,

    #[schemars(description = "Month in which the fiscal year begins (1 = January, 12 = December).")]
    pub start_month: u32,
}

impl FiscalCalendarConfig {
    pub fn new(start_year: i32, start_month: u32) -> Self {
        Self {
            start_year,
            start_month,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_start_month(self.start_month)
    }

    pub fn fiscal_year_id(&self) -> String {
        format!("FY{}", self.start_year)
    }

    pub fn start_date(&self) -> Result<DateTime<Utc>> {
        month_start(self.start_year, self.start_month)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct CalendarConfig {
    #[schemars(description = "First Gregorian year to generate (inclusive).")]
    pub start_year: i32,

    #[schemars(description = "Last Gregorian year to generate (inclusive).")]
    pub end_year: i32,

    #[serde(default)]
    #[schemars(
        description = "Fiscal years to overlay on the Gregorian months. May be empty for Gregorian-only deployments."
    )]
    pub fiscal_calendars: Vec<FiscalCalendarConfig>,
}

impl CalendarConfig {
    pub fn new(start_year: i32, end_year: i32) -> Self {
        Self {
            start_year,
            end_year,
            fiscal_calendars: Vec::new(),
        }
    }

    pub fn with_fiscal_calendar(mut self, cfg: FiscalCalendarConfig) -> Self {
        self.fiscal_calendars.push(cfg);
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_year_range(self.start_year, self.end_year)?;
        let mut seen = HashSet::new();
        for cfg in &self.fiscal_calendars {
            cfg.validate()?;
            if !seen.insert(cfg.start_year) {
                return Err(PeriodError::DuplicateFiscalYear(cfg.fiscal_year_id()));
            }
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: CalendarConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(CalendarConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
