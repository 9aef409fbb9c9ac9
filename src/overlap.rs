use crate::schema::{CalendarType, Granularity, Period};
use crate::utils::fmt_date;
use log::debug;
use std::collections::BTreeMap;

/// Periods are only compared within the same granularity and calendar.
pub fn detect_overlaps<'a, I>(periods: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Period>,
{
    let mut groups: BTreeMap<(Granularity, CalendarType), Vec<&Period>> = BTreeMap::new();
    for period in periods {
        groups
            .entry((period.granularity, period.calendar))
            .or_default()
            .push(period);
    }

    let mut messages = Vec::new();

    for ((granularity, calendar), mut group) in groups {
        group.sort_by(|a, b| a.start_date.cmp(&b.start_date).then_with(|| a.id.cmp(&b.id)));

        let mut frontier: Option<&Period> = None;
        for current in group {
            if let Some(previous) = frontier {
                if current.start_date < previous.end_date {
                    messages.push(format!(
                        "Overlap detected ({}, {}): {} ({} → {}) overlaps with {} ({} → {})",
                        granularity,
                        calendar,
                        previous.id,
                        fmt_date(previous.start_date),
                        fmt_date(previous.end_date),
                        current.id,
                        fmt_date(current.start_date),
                        fmt_date(current.end_date),
                    ));
                }
                if current.end_date > previous.end_date {
                    frontier = Some(current);
                }
            } else {
                frontier = Some(current);
            }
        }
    }

    debug!("Overlap detection found {} overlaps", messages.len());

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fiscal::generate_fiscal_year;
    use crate::generator::generate_periods;
    use crate::schema::FiscalCalendarConfig;
    use crate::utils::{end_before, month_start};

    fn month(id: &str, start: (i32, u32), end_exclusive: (i32, u32)) -> Period {
        Period {
            id: id.to_string(),
            name: id.to_string(),
            calendar: CalendarType::Gregorian,
            granularity: Granularity::Month,
            parent_period_id: None,
            child_period_ids: Vec::new(),
            start_date: month_start(start.0, start.1).unwrap(),
            end_date: end_before(month_start(end_exclusive.0, end_exclusive.1).unwrap()),
        }
    }

    #[test]
    fn test_generated_calendar_has_no_overlaps() {
        let periods = generate_periods(2026, 2027).unwrap();
        assert!(detect_overlaps(&periods).is_empty());
    }

    #[test]
    fn test_two_overlapping_months() {
        let periods = vec![
            month("2026-MAR", (2026, 3), (2026, 5)),
            month("2026-APR", (2026, 4), (2026, 5)),
        ];
        let messages = detect_overlaps(&periods);

        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("2026-MAR"));
        assert!(messages[0].contains("2026-APR"));
        assert!(messages[0].starts_with("Overlap detected (MONTHLY, CAL)"));
    }

    #[test]
    fn test_nested_overlap_is_detected() {
        let periods = vec![
            month("LONG", (2026, 1), (2026, 7)),
            month("2026-FEB", (2026, 2), (2026, 3)),
            month("2026-MAY", (2026, 5), (2026, 6)),
        ];
        let messages = detect_overlaps(&periods);

        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| m.contains("LONG")));
    }

    #[test]
    fn test_fiscal_and_gregorian_quarters_do_not_collide() {
        let mut periods = generate_periods(2026, 2027).unwrap();
        let fiscal = generate_fiscal_year(&periods, &FiscalCalendarConfig::new(2026, 2)).unwrap();
        periods.extend(fiscal);

        assert!(detect_overlaps(&periods).is_empty());
    }

    #[test]
    fn test_overlapping_fiscal_years() {
        let mut periods = generate_periods(2026, 2028).unwrap();
        let fy2026 = generate_fiscal_year(&periods, &FiscalCalendarConfig::new(2026, 4)).unwrap();
        let fy2027 = generate_fiscal_year(&periods, &FiscalCalendarConfig::new(2027, 1)).unwrap();
        periods.extend(fy2026);
        periods.extend(fy2027);

        let messages = detect_overlaps(&periods);
        assert!(messages
            .iter()
            .any(|m| m.contains("(CALENDAR, FY)") && m.contains("FY2026") && m.contains("FY2027")));
    }
}
