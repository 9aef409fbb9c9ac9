use crate::error::{PeriodError, Result};
use crate::schema::{CalendarType, Granularity, Period};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::PathBuf;

/// Flat persisted form of a [`Period`]. Children are not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRow {
    pub id: String,
    pub name: String,
    pub calendar: CalendarType,
    pub granularity: Granularity,
    pub parent_period_id: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl From<&Period> for PeriodRow {
    fn from(period: &Period) -> Self {
        Self {
            id: period.id.clone(),
            name: period.name.clone(),
            calendar: period.calendar,
            granularity: period.granularity,
            parent_period_id: period.parent_period_id.clone(),
            start_date: period.start_date,
            end_date: period.end_date,
        }
    }
}

impl PeriodRow {
    pub fn into_period(self) -> Period {
        Period {
            id: self.id,
            name: self.name,
            calendar: self.calendar,
            granularity: self.granularity,
            parent_period_id: self.parent_period_id,
            child_period_ids: Vec::new(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// `save_periods` is insert-only and writes nothing when any period is rejected.
pub trait PeriodRepository {
    fn load_all_periods(&self) -> Result<Vec<Period>>;

    fn save_periods(&mut self, periods: &[Period]) -> Result<()>;
}

fn check_new_rows<'a>(
    periods: &'a [Period],
    existing: &HashSet<&str>,
) -> Result<Vec<PeriodRow>> {
    let mut seen: HashSet<&'a str> = HashSet::new();
    let mut rows = Vec::with_capacity(periods.len());

    for period in periods {
        period.validate().map_err(|e| {
            PeriodError::StorageError(format!("period {} validation failed: {}", period.id, e))
        })?;

        if existing.contains(period.id.as_str()) || !seen.insert(period.id.as_str()) {
            return Err(PeriodError::StorageError(format!(
                "period {} already exists",
                period.id
            )));
        }

        rows.push(PeriodRow::from(period));
    }

    Ok(rows)
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryPeriodRepository {
    rows: BTreeMap<String, PeriodRow>,
}

impl InMemoryPeriodRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: impl IntoIterator<Item = PeriodRow>) -> Self {
        Self {
            rows: rows.into_iter().map(|row| (row.id.clone(), row)).collect(),
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &PeriodRow> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl PeriodRepository for InMemoryPeriodRepository {
    fn load_all_periods(&self) -> Result<Vec<Period>> {
        Ok(self.rows.values().cloned().map(PeriodRow::into_period).collect())
    }

    fn save_periods(&mut self, periods: &[Period]) -> Result<()> {
        let existing: HashSet<&str> = self.rows.keys().map(String::as_str).collect();
        let rows = check_new_rows(periods, &existing)?;
        for row in rows {
            self.rows.insert(row.id.clone(), row);
        }
        Ok(())
    }
}

/// Stores rows as a pretty-printed JSON array. A missing file loads as empty.
#[derive(Debug, Clone)]
pub struct JsonFilePeriodRepository {
    path: PathBuf,
}

impl JsonFilePeriodRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sibling file the next snapshot is written to before it replaces `path`.
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn read_rows(&self) -> Result<Vec<PeriodRow>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }
}

impl PeriodRepository for JsonFilePeriodRepository {
    fn load_all_periods(&self) -> Result<Vec<Period>> {
        let rows = self.read_rows()?;
        debug!("Loaded {} period rows from {}", rows.len(), self.path.display());
        Ok(rows.into_iter().map(PeriodRow::into_period).collect())
    }

    fn save_periods(&mut self, periods: &[Period]) -> Result<()> {
        if periods.is_empty() {
            return Ok(());
        }

        let mut stored = self.read_rows()?;
        let existing: HashSet<&str> = stored.iter().map(|row| row.id.as_str()).collect();
        let rows = check_new_rows(periods, &existing)?;
        stored.extend(rows);

        let json = serde_json::to_string_pretty(&stored)?;
        let staging = self.staging_path();
        fs::write(&staging, json)?;
        fs::rename(&staging, &self.path)?;
        debug!(
            "Saved {} period rows to {}",
            periods.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate_periods;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "period-hierarchy-{}-{}.json",
            name,
            std::process::id()
        ))
    }

    #[test]
    fn test_in_memory_round_trip_drops_children() {
        let periods = generate_periods(2026, 2026).unwrap();
        let mut repo = InMemoryPeriodRepository::new();
        repo.save_periods(&periods).unwrap();

        let loaded = repo.load_all_periods().unwrap();
        assert_eq!(loaded.len(), 17);
        assert!(loaded.iter().all(|p| p.child_period_ids.is_empty()));
        let q1 = loaded.iter().find(|p| p.id == "2026-Q1").unwrap();
        assert_eq!(q1.parent_period_id.as_deref(), Some("2026"));
    }

    #[test]
    fn test_rejects_existing_ids() {
        let periods = generate_periods(2026, 2026).unwrap();
        let mut repo = InMemoryPeriodRepository::new();
        repo.save_periods(&periods[..1]).unwrap();

        let result = repo.save_periods(&periods);
        assert!(matches!(result, Err(PeriodError::StorageError(_))));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_rejects_invalid_periods_atomically() {
        let mut periods = generate_periods(2026, 2026).unwrap();
        periods[5].name = String::new();
        let mut repo = InMemoryPeriodRepository::new();

        let result = repo.save_periods(&periods);
        assert!(matches!(result, Err(PeriodError::StorageError(_))));
        assert!(repo.is_empty());
    }

    #[test]
    fn test_json_save_replaces_file_through_staging() {
        let path = temp_path("staging");
        let _ = fs::remove_file(&path);
        let mut repo = JsonFilePeriodRepository::new(&path);
        let periods = generate_periods(2026, 2026).unwrap();

        repo.save_periods(&periods[..3]).unwrap();
        let staging = repo.staging_path();
        assert_eq!(staging.parent(), path.parent());
        assert_ne!(staging, path);

        fs::write(&staging, "leftover from an interrupted save").unwrap();
        assert_eq!(repo.load_all_periods().unwrap().len(), 3);

        repo.save_periods(&periods[3..]).unwrap();
        assert!(!staging.exists());
        assert_eq!(repo.load_all_periods().unwrap().len(), 17);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_json_file_repository() {
        let path = temp_path("json-repo");
        let _ = fs::remove_file(&path);
        let mut repo = JsonFilePeriodRepository::new(&path);
        assert!(repo.load_all_periods().unwrap().is_empty());

        let periods = generate_periods(2026, 2026).unwrap();
        repo.save_periods(&periods[..5]).unwrap();
        repo.save_periods(&periods[5..]).unwrap();

        let loaded = repo.load_all_periods().unwrap();
        assert_eq!(loaded.len(), 17);
        let year = loaded.iter().find(|p| p.id == "2026").unwrap();
        assert_eq!(year.end_date, periods[0].end_date);

        let contents = fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("child_period_ids"));
        assert!(repo.save_periods(&periods[..1]).is_err());
        assert!(!repo.staging_path().exists());

        fs::remove_file(&path).unwrap();
    }
}
