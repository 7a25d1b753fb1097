use super::{Policy, Violation, ViolationKind};
use crate::model::{Employee, EmployeeId, ShiftSlot, WeeklySchedule};
use chrono::Duration;
use std::collections::HashMap;

/// Revérifie un planning contre les invariants de génération.
pub(super) fn audit(
    schedule: &WeeklySchedule,
    employees: &[Employee],
    slots: &[ShiftSlot],
    policy: &Policy,
) -> Vec<Violation> {
    let mut out = Vec::new();
    let people: HashMap<&EmployeeId, &Employee> = employees.iter().map(|e| (&e.id, e)).collect();
    let catalog: HashMap<_, &ShiftSlot> = slots.iter().map(|s| (&s.id, s)).collect();

    let mut worked: HashMap<&EmployeeId, Duration> = HashMap::new();
    let mut closings: HashMap<&EmployeeId, u32> = HashMap::new();

    for daily in &schedule.days {
        let mut seen: HashMap<&EmployeeId, usize> = HashMap::new();

        for assignment in &daily.assignments {
            let slot = catalog.get(&assignment.slot).copied();
            if slot.is_none() {
                out.push(Violation {
                    employee: None,
                    day: Some(daily.day),
                    slot: Some(assignment.slot.clone()),
                    kind: ViolationKind::UnknownSlot,
                });
            }

            for id in &assignment.employees {
                let violation = |kind| Violation {
                    employee: Some(id.clone()),
                    day: Some(daily.day),
                    slot: Some(assignment.slot.clone()),
                    kind,
                };

                let count = seen.entry(id).or_insert(0);
                *count += 1;
                if *count == 2 {
                    out.push(violation(ViolationKind::DoubleBooking));
                }

                let Some(employee) = people.get(id) else {
                    out.push(violation(ViolationKind::UnknownEmployee));
                    continue;
                };

                if schedule.rest_days.get(id) == Some(&daily.day) {
                    out.push(violation(ViolationKind::RestDayWorked));
                }
                let admitted = slot.map_or(employee.availability.covers(daily.day), |s| {
                    employee.availability.admits(daily.day, s.start)
                });
                if !admitted {
                    out.push(violation(ViolationKind::Unavailable));
                }

                let cap = policy.weekly_cap(employee.contract);
                let total = worked.entry(id).or_insert_with(Duration::zero);
                let before = *total;
                *total = before + policy.daily_duration(employee);
                if before <= cap && *total > cap {
                    out.push(violation(ViolationKind::WeeklyCapExceeded));
                }

                if slot.is_some_and(|s| s.is_closing()) {
                    let n = closings.entry(id).or_insert(0);
                    *n += 1;
                    if *n == policy.closing_cap + 1 {
                        out.push(violation(ViolationKind::ClosingCapExceeded));
                    }
                }
            }
        }
    }

    out
}
