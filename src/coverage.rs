use crate::error::Violation;
use crate::schema::{CalendarType, Granularity, Period};
use crate::store::PeriodStore;
use crate::utils::next_instant;
use log::debug;

const EXPECTED_FISCAL_MONTHS: usize = 12;

/// Months are matched to fiscal years by date containment only.
pub fn validate_fiscal_coverage(store: &PeriodStore) -> Vec<Violation> {
    let mut violations = Vec::new();

    let fiscal_years: Vec<&Period> = store
        .years()
        .filter(|y| y.calendar == CalendarType::Fiscal && y.granularity == Granularity::Year)
        .collect();

    if fiscal_years.is_empty() {
        debug!("No fiscal years configured; skipping fiscal coverage validation");
        return violations;
    }

    for fy in fiscal_years {
        let mut months: Vec<&Period> = store
            .months()
            .filter(|m| m.calendar == CalendarType::Gregorian)
            .filter(|m| fy.contains(m))
            .collect();

        if months.len() != EXPECTED_FISCAL_MONTHS {
            violations.push(Violation::FiscalMonthCount {
                fiscal_year_id: fy.id.clone(),
                found: months.len(),
            });
        }

        months.sort_by(|a, b| a.start_date.cmp(&b.start_date).then_with(|| a.id.cmp(&b.id)));

        for pair in months.windows(2) {
            let (previous, current) = (pair[0], pair[1]);
            if current.start_date != next_instant(previous.end_date) {
                violations.push(Violation::FiscalGap {
                    fiscal_year_id: fy.id.clone(),
                    previous_id: previous.id.clone(),
                    current_id: current.id.clone(),
                });
            }
        }

        if let (Some(first), Some(last)) = (months.first(), months.last()) {
            if first.start_date != fy.start_date {
                violations.push(Violation::FiscalStartMisaligned {
                    fiscal_year_id: fy.id.clone(),
                    first_month_start: first.start_date,
                });
            }
            if last.end_date != fy.end_date {
                violations.push(Violation::FiscalEndMisaligned {
                    fiscal_year_id: fy.id.clone(),
                    last_month_end: last.end_date,
                });
            }
        }
    }

    debug!(
        "Fiscal coverage validation found {} violations",
        violations.len()
    );

    violations
}
