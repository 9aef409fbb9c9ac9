use crate::hierarchy::add_child;
use crate::schema::{CalendarType, Granularity, Period};
use log::{debug, warn};
use std::collections::HashMap;

/// Buckets hold IDs sorted by `(start_date, id)` across both calendars.
#[derive(Debug, Clone, Default)]
pub struct PeriodStore {
    periods: HashMap<String, Period>,
    months: Vec<String>,
    quarters: Vec<String>,
    years: Vec<String>,
}

impl PeriodStore {
    pub fn new(periods: impl IntoIterator<Item = Period>) -> Self {
        let mut store = Self::default();
        for period in periods {
            store.insert(period);
        }
        store.sort_all();
        store.rebuild_children();

        debug!(
            "Period store built: {} months, {} quarters, {} years",
            store.months.len(),
            store.quarters.len(),
            store.years.len()
        );

        store
    }

    /// A period with an already known ID replaces the earlier entry.
    pub fn merge(&mut self, periods: impl IntoIterator<Item = Period>) {
        for period in periods {
            self.insert(period);
        }
        self.sort_all();
        self.rebuild_children();
    }

    fn insert(&mut self, period: Period) {
        if let Some(previous) = self.periods.get(&period.id) {
            warn!(
                "Duplicate period ID {} in store input; replacing earlier entry",
                period.id
            );
            let previous_granularity = previous.granularity;
            self.bucket_mut(previous_granularity).retain(|id| id != &period.id);
        }

        self.bucket_mut(period.granularity).push(period.id.clone());
        self.periods.insert(period.id.clone(), period);
    }

    fn bucket_mut(&mut self, granularity: Granularity) -> &mut Vec<String> {
        match granularity {
            Granularity::Month => &mut self.months,
            Granularity::Quarter => &mut self.quarters,
            Granularity::Year => &mut self.years,
        }
    }

    pub fn sort_all(&mut self) {
        let periods = &self.periods;
        for bucket in [&mut self.months, &mut self.quarters, &mut self.years] {
            bucket.sort_by(|a, b| {
                let (pa, pb) = (&periods[a], &periods[b]);
                pa.start_date
                    .cmp(&pb.start_date)
                    .then_with(|| pa.id.cmp(&pb.id))
            });
        }
    }

    /// Fiscal quarters also list the Gregorian months they contain by date.
    pub fn rebuild_children(&mut self) {
        let mut children: HashMap<String, Vec<String>> = HashMap::new();

        for id in self.months.iter().chain(&self.quarters).chain(&self.years) {
            let period = &self.periods[id];
            if let Some(parent_id) = &period.parent_period_id {
                if self.periods.contains_key(parent_id) {
                    children
                        .entry(parent_id.clone())
                        .or_default()
                        .push(period.id.clone());
                }
            }
        }

        for quarter_id in &self.quarters {
            let quarter = &self.periods[quarter_id];
            if quarter.calendar != CalendarType::Fiscal {
                continue;
            }
            let contained = self
                .months
                .iter()
                .map(|id| &self.periods[id])
                .filter(|m| m.calendar == CalendarType::Gregorian && quarter.contains(m))
                .map(|m| m.id.clone());
            children
                .entry(quarter_id.clone())
                .or_default()
                .extend(contained);
        }

        for period in self.periods.values_mut() {
            period.child_period_ids.clear();
            if let Some(ids) = children.remove(&period.id) {
                for id in ids {
                    add_child(period, &id);
                }
            }
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Period> {
        self.periods.get(id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.periods.contains_key(id)
    }

    pub fn months(&self) -> impl Iterator<Item = &Period> + '_ {
        self.months.iter().map(move |id| &self.periods[id])
    }

    pub fn quarters(&self) -> impl Iterator<Item = &Period> + '_ {
        self.quarters.iter().map(move |id| &self.periods[id])
    }

    pub fn years(&self) -> impl Iterator<Item = &Period> + '_ {
        self.years.iter().map(move |id| &self.periods[id])
    }

    /// Every period, years first, then quarters, then months.
    pub fn all(&self) -> impl Iterator<Item = &Period> + '_ {
        self.years().chain(self.quarters()).chain(self.months())
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fiscal::generate_fiscal_year;
    use crate::generator::generate_periods;
    use crate::schema::FiscalCalendarConfig;

    #[test]
    fn test_find_by_id() {
        let store = PeriodStore::new(generate_periods(2026, 2026).unwrap());
        assert_eq!(store.len(), 17);
        assert_eq!(store.find_by_id("2026-JAN").unwrap().name, "January 2026");
        assert!(store.find_by_id("2026-XYZ").is_none());
    }

    #[test]
    fn test_buckets_are_sorted_regardless_of_input_order() {
        let mut periods = generate_periods(2026, 2027).unwrap();
        periods.reverse();
        let store = PeriodStore::new(periods);

        let month_ids: Vec<&str> = store.months().map(|m| m.id.as_str()).collect();
        assert_eq!(month_ids.len(), 24);
        assert_eq!(month_ids[0], "2026-JAN");
        assert_eq!(month_ids[23], "2027-DEC");
        for pair in store.months().collect::<Vec<_>>().windows(2) {
            assert!(pair[0].start_date < pair[1].start_date);
        }

        let year_ids: Vec<&str> = store.years().map(|y| y.id.as_str()).collect();
        assert_eq!(year_ids, vec!["2026", "2027"]);
    }

    #[test]
    fn test_children_rebuilt_from_flat_rows() {
        let rows: Vec<Period> = generate_periods(2026, 2026)
            .unwrap()
            .into_iter()
            .map(|mut p| {
                p.child_period_ids.clear();
                p
            })
            .collect();
        let store = PeriodStore::new(rows);

        assert_eq!(
            store.find_by_id("2026").unwrap().child_period_ids,
            vec!["2026-Q1", "2026-Q2", "2026-Q3", "2026-Q4"]
        );
        assert_eq!(
            store.find_by_id("2026-Q3").unwrap().child_period_ids,
            vec!["2026-JUL", "2026-AUG", "2026-SEP"]
        );
    }

    #[test]
    fn test_merge_fiscal_overlay() {
        let mut store = PeriodStore::new(generate_periods(2026, 2027).unwrap());
        let fiscal = generate_fiscal_year(store.months(), &FiscalCalendarConfig::new(2026, 4))
            .unwrap()
            .into_iter()
            .map(|mut p| {
                p.child_period_ids.clear();
                p
            })
            .collect::<Vec<_>>();
        store.merge(fiscal);

        assert_eq!(store.years().count(), 3);
        assert_eq!(store.quarters().count(), 12);
        assert_eq!(store.months().count(), 24);

        let year_ids: Vec<&str> = store.years().map(|y| y.id.as_str()).collect();
        assert_eq!(year_ids, vec!["2026", "FY2026", "2027"]);

        assert_eq!(
            store.find_by_id("FY2026-Q2").unwrap().child_period_ids,
            vec!["2026-JUL", "2026-AUG", "2026-SEP"]
        );
        assert_eq!(
            store.find_by_id("2026-JUL").unwrap().parent_period_id.as_deref(),
            Some("2026-Q3")
        );
    }

    #[test]
    fn test_duplicate_id_replaces_earlier_entry() {
        let mut periods = generate_periods(2026, 2026).unwrap();
        let mut renamed = periods[0].clone();
        renamed.name = "Renamed".to_string();
        periods.push(renamed);

        let store = PeriodStore::new(periods);
        assert_eq!(store.len(), 17);
        assert_eq!(store.years().count(), 1);
        assert_eq!(store.find_by_id("2026").unwrap().name, "Renamed");
    }
}
