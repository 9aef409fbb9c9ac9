use crate::error::Violation;
use crate::schema::{CalendarType, Granularity, Period};
use crate::store::PeriodStore;
use log::debug;

pub fn add_child(parent: &mut Period, child_id: &str) {
    if parent.child_period_ids.iter().any(|existing| existing == child_id) {
        return;
    }
    parent.child_period_ids.push(child_id.to_string());
}

/// A missing parent or a calendar mismatch stops the remaining parent checks
/// for that period.
pub fn validate_hierarchy(store: &PeriodStore) -> Vec<Violation> {
    let mut violations = Vec::new();

    for period in store.years().chain(store.quarters()).chain(store.months()) {
        match period.granularity {
            Granularity::Year => continue,
            Granularity::Month => {
                if period.calendar != CalendarType::Gregorian {
                    violations.push(Violation::MonthNotGregorian {
                        id: period.id.clone(),
                        calendar: period.calendar.to_string(),
                    });
                }
                if let Some(parent_id) = &period.parent_period_id {
                    check_parent(store, period, parent_id, &mut violations);
                }
            }
            Granularity::Quarter => match &period.parent_period_id {
                Some(parent_id) => check_parent(store, period, parent_id, &mut violations),
                None => violations.push(Violation::MissingParentLink {
                    id: period.id.clone(),
                    granularity: period.granularity.to_string(),
                }),
            },
        }
    }

    debug!(
        "Hierarchy validation checked {} periods, found {} violations",
        store.len(),
        violations.len()
    );

    violations
}

fn check_parent(
    store: &PeriodStore,
    child: &Period,
    parent_id: &str,
    violations: &mut Vec<Violation>,
) {
    let parent = match store.find_by_id(parent_id) {
        Some(parent) => parent,
        None => {
            violations.push(Violation::MissingParent {
                id: child.id.clone(),
                parent_id: parent_id.to_string(),
            });
            return;
        }
    };

    if parent.calendar != child.calendar {
        violations.push(Violation::CalendarMismatch {
            id: child.id.clone(),
            calendar: child.calendar.to_string(),
            parent_id: parent.id.clone(),
            parent_calendar: parent.calendar.to_string(),
        });
        return;
    }

    if parent.id == child.id {
        violations.push(Violation::SelfReference {
            id: child.id.clone(),
        });
    }

    if parent.granularity.rank() <= child.granularity.rank() {
        violations.push(Violation::GranularityOrder {
            id: child.id.clone(),
            granularity: child.granularity.to_string(),
            parent_id: parent.id.clone(),
            parent_granularity: parent.granularity.to_string(),
        });
    }

    if parent.start_date > child.start_date {
        violations.push(Violation::StartsBeforeParent {
            id: child.id.clone(),
            parent_id: parent.id.clone(),
        });
    }

    if parent.end_date < child.end_date {
        violations.push(Violation::EndsAfterParent {
            id: child.id.clone(),
            parent_id: parent.id.clone(),
        });
    }
}
