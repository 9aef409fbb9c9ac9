//! # Period Hierarchy
//!
//! Generates, validates and queries the trading period calendar: a Gregorian
//! Year → Quarter → Month hierarchy plus any number of fiscal overlays that
//! regroup the same months under different year and quarter boundaries.
//!
//! ## Core Concepts
//!
//! - **Months are atomic**: every month is a Gregorian period. Fiscal calendars
//!   never create months, they only reference them by date range.
//! - **Calendar isolation**: a period's parent always shares its calendar.
//! - **Boundary convention**: a period ends one nanosecond before its successor
//!   starts, so adjacent periods never share an instant.
//! - **Fail-fast startup**: the store is only published after hierarchy,
//!   fiscal coverage and overlap validation all pass.
//!
//! ## Example
//!
//! ```rust,ignore
//! use period_hierarchy::*;
//!
//! let config = CalendarConfig::new(2026, 2027)
//!     .with_fiscal_calendar(FiscalCalendarConfig::new(2026, 4));
//!
//! let mut service = PeriodService::new(InMemoryPeriodRepository::new());
//! service.initialize(&config)?;
//!
//! let months = service.break_down_trade_range(&PeriodRange::new("2026-Q1", "2026-Q2"))?;
//! assert_eq!(months.len(), 6);
//! ```

pub mod breakdown;
pub mod coverage;
pub mod error;
pub mod fiscal;
pub mod generator;
pub mod hierarchy;
pub mod overlap;
pub mod repository;
pub mod schema;
pub mod store;
pub mod utils;

pub use breakdown::{
    break_down_period, break_down_trade_period_range, find_periods_for_date, PeriodLookup,
};
pub use coverage::validate_fiscal_coverage;
pub use error::{PeriodError, Result, Violation};
pub use fiscal::generate_fiscal_year;
pub use generator::generate_periods;
pub use hierarchy::{add_child, validate_hierarchy};
pub use overlap::detect_overlaps;
pub use repository::{
    InMemoryPeriodRepository, JsonFilePeriodRepository, PeriodRepository, PeriodRow,
};
pub use schema::*;
pub use store::PeriodStore;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;

pub struct PeriodService<R: PeriodRepository> {
    repo: R,
    store: Option<Arc<PeriodStore>>,
}

impl<R: PeriodRepository> PeriodService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo, store: None }
    }

    /// On `Err` no store is published and the application must not start.
    pub fn initialize(&mut self, config: &CalendarConfig) -> Result<()> {
        config.validate()?;

        let mut periods = self.repo.load_all_periods()?;
        for period in &periods {
            period.validate()?;
        }
        info!("Loaded {} persisted periods", periods.len());

        let known: HashSet<String> = periods.iter().map(|p| p.id.clone()).collect();
        let missing: Vec<Period> = generate_periods(config.start_year, config.end_year)?
            .into_iter()
            .filter(|p| !known.contains(&p.id))
            .collect();

        if !missing.is_empty() {
            self.repo.save_periods(&missing)?;
            info!(
                "Generated and persisted {} Gregorian periods for {}..={}",
                missing.len(),
                config.start_year,
                config.end_year
            );
            periods.extend(missing);
        }

        let mut store = PeriodStore::new(periods);

        let mut pending = Vec::new();
        let mut overlay_errors = Vec::new();
        for cfg in &config.fiscal_calendars {
            match Self::add_fiscal_overlay(&mut store, cfg) {
                Ok(added) => pending.extend(added),
                Err(e) => {
                    warn!("Fiscal calendar {} rejected: {}", cfg.fiscal_year_id(), e);
                    overlay_errors.push(e);
                }
            }
        }
        if !overlay_errors.is_empty() {
            return Err(PeriodError::FiscalOverlayErrors(overlay_errors));
        }
        self.repo.save_periods(&pending)?;

        Self::validate_store(&store)?;

        info!(
            "Period store initialised with {} periods ({} months)",
            store.len(),
            store.months().count()
        );
        self.store = Some(Arc::new(store));
        Ok(())
    }

    /// The current store stays in place unless the rebuilt one validates.
    pub fn add_fiscal_calendar(&mut self, cfg: &FiscalCalendarConfig) -> Result<()> {
        cfg.validate()?;
        let current = self.store()?;
        let mut rebuilt = PeriodStore::clone(&current);

        let added = Self::add_fiscal_overlay(&mut rebuilt, cfg)?;
        Self::validate_store(&rebuilt)?;
        self.repo.save_periods(&added)?;

        self.store = Some(Arc::new(rebuilt));
        Ok(())
    }

    fn add_fiscal_overlay(
        store: &mut PeriodStore,
        cfg: &FiscalCalendarConfig,
    ) -> Result<Vec<Period>> {
        let fy_id = cfg.fiscal_year_id();
        let requested_start = cfg.start_date()?;
        if let Some(existing) = store.find_by_id(&fy_id) {
            if existing.start_date != requested_start {
                return Err(PeriodError::FiscalYearConflict {
                    fiscal_year_id: fy_id,
                    existing_start: utils::fmt_date(existing.start_date),
                    requested_start: utils::fmt_date(requested_start),
                });
            }
            if store.contains_id(&format!("{}-Q1", fy_id)) {
                debug!("Fiscal year {} already present; skipping generation", fy_id);
                return Ok(Vec::new());
            }
        }

        let fiscal_periods = generate_fiscal_year(store.months(), cfg)?;
        store.merge(fiscal_periods.clone());

        info!(
            "Added fiscal year {} starting {:02}/{}",
            fy_id, cfg.start_month, cfg.start_year
        );
        Ok(fiscal_periods)
    }

    fn validate_store(store: &PeriodStore) -> Result<()> {
        let hierarchy = validate_hierarchy(store);
        if !hierarchy.is_empty() {
            for violation in &hierarchy {
                warn!("Period hierarchy violation: {}", violation);
            }
            return Err(PeriodError::HierarchyViolations(hierarchy));
        }

        let coverage = validate_fiscal_coverage(store);
        if !coverage.is_empty() {
            for violation in &coverage {
                warn!("Fiscal coverage violation: {}", violation);
            }
            return Err(PeriodError::CoverageViolations(coverage));
        }

        let overlaps = detect_overlaps(store.all());
        if !overlaps.is_empty() {
            for overlap in &overlaps {
                warn!("{}", overlap);
            }
            return Err(PeriodError::OverlapsDetected(overlaps));
        }

        debug!("Period store passed hierarchy, coverage and overlap validation");
        Ok(())
    }

    pub fn store(&self) -> Result<Arc<PeriodStore>> {
        self.store.clone().ok_or(PeriodError::StoreNotInitialised)
    }

    fn validated(&self) -> Result<&PeriodStore> {
        self.store.as_deref().ok_or(PeriodError::StoreNotInitialised)
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<Period>> {
        Ok(self.validated()?.find_by_id(id).cloned())
    }

    pub fn break_down_trade_range(&self, range: &PeriodRange) -> Result<Vec<String>> {
        Ok(break_down_trade_period_range(self.validated()?, range))
    }

    pub fn break_down_period(&self, period_id: &str) -> Result<Vec<String>> {
        Ok(break_down_period(self.validated()?, period_id))
    }

    pub fn find_periods_for_date(
        &self,
        instant: DateTime<Utc>,
        calendar: CalendarType,
    ) -> Result<PeriodLookup> {
        Ok(find_periods_for_date(self.validated()?, instant, calendar))
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }
}
