use crate::error::Result;
use crate::hierarchy::add_child;
use crate::schema::{CalendarType, Granularity, Period};
use crate::utils::{month_id, month_span, month_start, validate_year_range};
use log::debug;

pub fn generate_periods(start_year: i32, end_year: i32) -> Result<Vec<Period>> {
    validate_year_range(start_year, end_year)?;

    let mut periods = Vec::new();

    for year in start_year..=end_year {
        let year_id = year.to_string();
        let (year_start, year_end) = month_span(month_start(year, 1)?, 12)?;

        let mut year_period = Period {
            id: year_id.clone(),
            name: year.to_string(),
            calendar: CalendarType::Gregorian,
            granularity: Granularity::Year,
            parent_period_id: None,
            child_period_ids: Vec::new(),
            start_date: year_start,
            end_date: year_end,
        };

        let year_index = periods.len();
        periods.push(year_period.clone());

        for quarter in 1..=4u32 {
            let quarter_id = format!("{}-Q{}", year, quarter);
            let (quarter_start, quarter_end) =
                month_span(month_start(year, (quarter - 1) * 3 + 1)?, 3)?;

            let mut quarter_period = Period {
                id: quarter_id.clone(),
                name: format!("Q{} {}", quarter, year),
                calendar: CalendarType::Gregorian,
                granularity: Granularity::Quarter,
                parent_period_id: Some(year_id.clone()),
                child_period_ids: Vec::new(),
                start_date: quarter_start,
                end_date: quarter_end,
            };

            for offset in 0..3u32 {
                let (start, end) = month_span(month_start(year, (quarter - 1) * 3 + 1 + offset)?, 1)?;
                let id = month_id(start);

                add_child(&mut quarter_period, &id);
                periods.push(Period {
                    id,
                    name: start.format("%B %Y").to_string(),
                    calendar: CalendarType::Gregorian,
                    granularity: Granularity::Month,
                    parent_period_id: Some(quarter_id.clone()),
                    child_period_ids: Vec::new(),
                    start_date: start,
                    end_date: end,
                });
            }

            add_child(&mut year_period, &quarter_id);
            periods.push(quarter_period);
        }

        periods[year_index] = year_period;
    }

    debug!(
        "Generated {} Gregorian periods for years {}..={}",
        periods.len(),
        start_year,
        end_year
    );

    Ok(periods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PeriodError;
    use crate::utils::next_instant;
    use chrono::{Datelike, TimeZone, Timelike, Utc};

    fn by_granularity(periods: &[Period], granularity: Granularity) -> Vec<&Period> {
        periods
            .iter()
            .filter(|p| p.granularity == granularity)
            .collect()
    }

    #[test]
    fn test_generates_one_year_four_quarters_twelve_months_per_year() {
        let periods = generate_periods(2026, 2027).unwrap();

        assert_eq!(periods.len(), 34);
        assert_eq!(by_granularity(&periods, Granularity::Year).len(), 2);
        assert_eq!(by_granularity(&periods, Granularity::Quarter).len(), 8);
        assert_eq!(by_granularity(&periods, Granularity::Month).len(), 24);
        assert!(periods
            .iter()
            .all(|p| p.calendar == CalendarType::Gregorian));
    }

    #[test]
    fn test_ids_names_and_links() {
        let periods = generate_periods(2026, 2026).unwrap();
        let find = |id: &str| periods.iter().find(|p| p.id == id).unwrap();

        let year = find("2026");
        assert_eq!(year.parent_period_id, None);
        assert_eq!(
            year.child_period_ids,
            vec!["2026-Q1", "2026-Q2", "2026-Q3", "2026-Q4"]
        );

        let q2 = find("2026-Q2");
        assert_eq!(q2.name, "Q2 2026");
        assert_eq!(q2.parent_period_id.as_deref(), Some("2026"));
        assert_eq!(q2.child_period_ids, vec!["2026-APR", "2026-MAY", "2026-JUN"]);

        let feb = find("2026-FEB");
        assert_eq!(feb.name, "February 2026");
        assert_eq!(feb.parent_period_id.as_deref(), Some("2026-Q1"));
        assert_eq!(feb.end_date.day(), 28);
    }

    #[test]
    fn test_year_boundaries() {
        let periods = generate_periods(2026, 2026).unwrap();
        let year = &periods[0];
        assert_eq!(year.start_date, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(year.end_date.month(), 12);
        assert_eq!(year.end_date.day(), 31);
        assert_eq!(year.end_date.hour(), 23);
        assert_eq!(year.end_date.nanosecond(), 999_999_999);
    }

    #[test]
    fn test_months_partition_their_year() {
        let periods = generate_periods(2028, 2028).unwrap();
        let year = &periods[0];
        let months = by_granularity(&periods, Granularity::Month);

        assert_eq!(months.first().unwrap().start_date, year.start_date);
        assert_eq!(months.last().unwrap().end_date, year.end_date);
        for pair in months.windows(2) {
            assert_eq!(next_instant(pair[0].end_date), pair[1].start_date);
        }
    }

    #[test]
    fn test_siblings_never_share_an_instant() {
        let periods = generate_periods(2026, 2027).unwrap();
        for granularity in [Granularity::Quarter, Granularity::Year] {
            let siblings = by_granularity(&periods, granularity);
            for pair in siblings.windows(2) {
                assert!(pair[0].end_date < pair[1].start_date);
                assert_eq!(next_instant(pair[0].end_date), pair[1].start_date);
            }
        }
    }

    #[test]
    fn test_generation_is_idempotent() {
        assert_eq!(
            generate_periods(2026, 2026).unwrap(),
            generate_periods(2026, 2026).unwrap()
        );
    }

    #[test]
    fn test_rejects_reversed_range() {
        assert!(matches!(
            generate_periods(2027, 2026),
            Err(PeriodError::InvalidRange {
                start_year: 2027,
                end_year: 2026
            })
        ));
    }
}
