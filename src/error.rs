use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PeriodError {
    #[error("Invalid period range: start year {start_year} is after end year {end_year}")]
    InvalidRange { start_year: i32, end_year: i32 },

    #[error("Invalid fiscal start month {0}: must be between 1 and 12")]
    InvalidFiscalStartMonth(u32),

    #[error("Fiscal year {fiscal_year_id} expected 12 months, found {found}")]
    IncompleteFiscalRange { fiscal_year_id: String, found: usize },

    #[error("Fiscal year {0} is configured more than once")]
    DuplicateFiscalYear(String),

    #[error("Fiscal year {fiscal_year_id} already starts on {existing_start}, cannot start it on {requested_start}")]
    FiscalYearConflict {
        fiscal_year_id: String,
        existing_start: String,
        requested_start: String,
    },

    #[error("Fiscal overlay generation failed for {} fiscal year(s)", .0.len())]
    FiscalOverlayErrors(Vec<PeriodError>),

    #[error("Invalid period {id}: {details}")]
    InvalidPeriod { id: String, details: String },

    #[error("Period hierarchy validation failed with {} violation(s)", .0.len())]
    HierarchyViolations(Vec<Violation>),

    #[error("Fiscal calendar validation failed with {} violation(s)", .0.len())]
    CoverageViolations(Vec<Violation>),

    #[error("Period overlaps detected: {} overlap(s)", .0.len())]
    OverlapsDetected(Vec<String>),

    #[error("Period store not initialised")]
    StoreNotInitialised,

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Date calculation error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PeriodError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("month {id} has invalid calendar {calendar} (months must be Gregorian)")]
    MonthNotGregorian { id: String, calendar: String },

    #[error("period {id} ({granularity}) has no parent but is not a year")]
    MissingParentLink { id: String, granularity: String },

    #[error("child {id} references missing parent {parent_id}")]
    MissingParent { id: String, parent_id: String },

    #[error("period {id} ({calendar}) has parent {parent_id} ({parent_calendar}) with different calendar type")]
    CalendarMismatch {
        id: String,
        calendar: String,
        parent_id: String,
        parent_calendar: String,
    },

    #[error("period {id} cannot reference itself as a parent")]
    SelfReference { id: String },

    #[error("period {id} ({granularity}) has parent {parent_id} ({parent_granularity}) which is not a larger granularity")]
    GranularityOrder {
        id: String,
        granularity: String,
        parent_id: String,
        parent_granularity: String,
    },

    #[error("child {id} starts before parent {parent_id}")]
    StartsBeforeParent { id: String, parent_id: String },

    #[error("child {id} ends after parent {parent_id}")]
    EndsAfterParent { id: String, parent_id: String },

    #[error("fiscal year {fiscal_year_id} spans {found} months (expected exactly 12)")]
    FiscalMonthCount { fiscal_year_id: String, found: usize },

    #[error("fiscal year {fiscal_year_id} has gap or overlap between {previous_id} and {current_id}")]
    FiscalGap {
        fiscal_year_id: String,
        previous_id: String,
        current_id: String,
    },

    #[error("fiscal year {fiscal_year_id} does not start on a month boundary (first month starts {first_month_start})")]
    FiscalStartMisaligned {
        fiscal_year_id: String,
        first_month_start: DateTime<Utc>,
    },

    #[error("fiscal year {fiscal_year_id} does not end on a month boundary (last month ends {last_month_end})")]
    FiscalEndMisaligned {
        fiscal_year_id: String,
        last_month_end: DateTime<Utc>,
    },
}

impl Violation {
    pub fn period_id(&self) -> &str {
        match self {
            Violation::MonthNotGregorian { id, .. }
            | Violation::MissingParentLink { id, .. }
            | Violation::MissingParent { id, .. }
            | Violation::CalendarMismatch { id, .. }
            | Violation::SelfReference { id }
            | Violation::GranularityOrder { id, .. }
            | Violation::StartsBeforeParent { id, .. }
            | Violation::EndsAfterParent { id, .. } => id,
            Violation::FiscalMonthCount { fiscal_year_id, .. }
            | Violation::FiscalGap { fiscal_year_id, .. }
            | Violation::FiscalStartMisaligned { fiscal_year_id, .. }
            | Violation::FiscalEndMisaligned { fiscal_year_id, .. } => fiscal_year_id,
        }
    }
}
