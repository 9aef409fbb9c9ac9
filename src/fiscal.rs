use crate::error::{PeriodError, Result};
use crate::hierarchy::add_child;
use crate::schema::{CalendarType, FiscalCalendarConfig, Granularity, Period};
use crate::utils::month_span;
use log::debug;

const MONTHS_PER_FISCAL_YEAR: usize = 12;
const MONTHS_PER_FISCAL_QUARTER: usize = 3;

/// The months keep their Gregorian parents; fiscal quarters only list them.
pub fn generate_fiscal_year<'a, I>(months: I, cfg: &FiscalCalendarConfig) -> Result<Vec<Period>>
where
    I: IntoIterator<Item = &'a Period>,
{
    cfg.validate()?;

    let (fy_start, fy_end) = month_span(cfg.start_date()?, 12)?;
    let fy_id = cfg.fiscal_year_id();

    let mut fy_months: Vec<&Period> = months
        .into_iter()
        .filter(|m| m.calendar == CalendarType::Gregorian && m.granularity == Granularity::Month)
        .filter(|m| m.start_date >= fy_start && m.end_date <= fy_end)
        .collect();

    if fy_months.len() != MONTHS_PER_FISCAL_YEAR {
        return Err(PeriodError::IncompleteFiscalRange {
            fiscal_year_id: fy_id,
            found: fy_months.len(),
        });
    }

    fy_months.sort_by(|a, b| a.start_date.cmp(&b.start_date).then_with(|| a.id.cmp(&b.id)));

    let mut fiscal_year = Period {
        id: fy_id.clone(),
        name: format!("Fiscal Year {}", cfg.start_year),
        calendar: CalendarType::Fiscal,
        granularity: Granularity::Year,
        parent_period_id: None,
        child_period_ids: Vec::new(),
        start_date: fy_start,
        end_date: fy_end,
    };

    let mut quarters = Vec::with_capacity(4);
    for (index, group) in fy_months.chunks(MONTHS_PER_FISCAL_QUARTER).enumerate() {
        let (first, last) = match (group.first(), group.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => continue,
        };

        let quarter_id = format!("{}-Q{}", fy_id, index + 1);
        let mut quarter = Period {
            id: quarter_id.clone(),
            name: format!("{} Q{}", fy_id, index + 1),
            calendar: CalendarType::Fiscal,
            granularity: Granularity::Quarter,
            parent_period_id: Some(fy_id.clone()),
            child_period_ids: Vec::new(),
            start_date: first.start_date,
            end_date: last.end_date,
        };

        for month in group {
            add_child(&mut quarter, &month.id);
        }

        add_child(&mut fiscal_year, &quarter_id);
        quarters.push(quarter);
    }

    debug!(
        "Generated fiscal year {} ({} -> {}) with {} quarters",
        fy_id,
        fy_start,
        fy_end,
        quarters.len()
    );

    let mut periods = Vec::with_capacity(quarters.len() + 1);
    periods.push(fiscal_year);
    periods.extend(quarters);
    Ok(periods)
}
