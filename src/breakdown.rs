use crate::schema::{CalendarType, Granularity, Period, PeriodRange};
use crate::store::PeriodStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unknown IDs and reversed ranges yield an empty list.
pub fn break_down_trade_period_range(store: &PeriodStore, range: &PeriodRange) -> Vec<String> {
    let (start_period, end_period) = match (
        store.find_by_id(&range.start_period_id),
        store.find_by_id(&range.end_period_id),
    ) {
        (Some(start), Some(end)) => (start, end),
        _ => return Vec::new(),
    };

    let range_start = start_period.start_date;
    let range_end = end_period.end_date;
    if range_start > range_end {
        return Vec::new();
    }

    store
        .months()
        .filter(|m| m.start_date >= range_start && m.end_date <= range_end)
        .map(|m| m.id.clone())
        .collect()
}

pub fn break_down_period(store: &PeriodStore, period_id: &str) -> Vec<String> {
    break_down_trade_period_range(store, &PeriodRange::single(period_id))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodLookup {
    pub month_id: Option<String>,
    pub quarter_id: Option<String>,
    pub year_id: Option<String>,
}

/// Months always resolve from the Gregorian calendar.
pub fn find_periods_for_date(
    store: &PeriodStore,
    instant: DateTime<Utc>,
    calendar: CalendarType,
) -> PeriodLookup {
    let containing = |period: &&Period| period.contains_instant(instant);
    let id_of = |period: &Period| period.id.clone();

    PeriodLookup {
        month_id: store
            .months()
            .filter(|m| m.calendar == CalendarType::Gregorian && m.granularity == Granularity::Month)
            .find(containing)
            .map(id_of),
        quarter_id: store
            .quarters()
            .filter(|q| q.calendar == calendar)
            .find(containing)
            .map(id_of),
        year_id: store
            .years()
            .filter(|y| y.calendar == calendar)
            .find(containing)
            .map(id_of),
    }
}
