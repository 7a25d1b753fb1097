use super::{priority, rest_days, staffing, util, Policy, SchedulingState};
use crate::model::{
    Assignment, DailySchedule, Day, Employee, EmployeeId, Role, ShiftSlot, Shortfall,
    WeeklySchedule,
};
use chrono::Duration;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// Contexte d'un passage (jour, créneau, rôle).
struct Pass<'a> {
    day: Day,
    slot: &'a ShiftSlot,
    role: Role,
}

/// Génère la semaine en un seul passage glouton, sans retour arrière.
pub(super) fn generate<R: Rng + ?Sized>(
    days: &[Day],
    slots: &[ShiftSlot],
    employees: &[Employee],
    policy: &Policy,
    rng: &mut R,
) -> WeeklySchedule {
    let days = util::dedup_days(days);
    let mut state = SchedulingState::new(employees);
    let rest_days = rest_days::preassign(employees, policy, &mut state, rng);
    let ordered = priority::prioritize(slots);

    let mut built: BTreeMap<Day, DailySchedule> = BTreeMap::new();
    let mut shortfalls = Vec::new();

    for day in processing_order(&days, policy) {
        let mut today: HashSet<EmployeeId> = HashSet::new();
        let mut daily = DailySchedule::new(day);

        for slot in ordered.iter().copied() {
            let mut on_slot: Vec<EmployeeId> = Vec::new();

            for &role in slot.required.keys() {
                let required = staffing::required_staff(slot, role, day, policy);
                if required == 0 {
                    continue;
                }
                let pass = Pass { day, slot, role };

                let mut candidates: Vec<&Employee> = employees
                    .iter()
                    .filter(|e| is_eligible(e, &pass, &today, &on_slot, &state, policy))
                    .collect();
                rank(&mut candidates, &pass, &state, rng);

                let mut taken = 0u32;
                for employee in candidates.into_iter().take(required as usize) {
                    let duration = policy.daily_duration(employee);
                    state.commit(&employee.id, slot.kind, duration);
                    today.insert(employee.id.clone());
                    on_slot.push(employee.id.clone());
                    taken += 1;
                    debug!(employee = %employee.id, %day, slot = %slot.id, %role, "assigned");
                }

                if taken < required {
                    warn!(%day, slot = %slot.id, %role, required, assigned = taken, "understaffed");
                    shortfalls.push(Shortfall {
                        day,
                        slot: slot.id.clone(),
                        role,
                        required,
                        assigned: taken,
                    });
                }
            }

            daily.assignments.push(Assignment {
                slot: slot.id.clone(),
                employees: on_slot,
            });
        }

        built.insert(day, daily);
    }

    info!(
        days = days.len(),
        slots = slots.len(),
        employees = employees.len(),
        shortfalls = shortfalls.len(),
        "schedule generated"
    );

    WeeklySchedule {
        days: days.iter().filter_map(|d| built.remove(d)).collect(),
        shortfalls,
        rest_days,
    }
}

/// Génère chaque rôle dans un appel isolé, en parallèle, puis fusionne.
///
/// Les graines des partitions sont tirées de `rng` avant la section
/// parallèle : le résultat ne dépend que de `rng`.
pub(super) fn generate_per_role<R: Rng + ?Sized>(
    days: &[Day],
    slots: &[ShiftSlot],
    employees: &[Employee],
    policy: &Policy,
    rng: &mut R,
) -> WeeklySchedule {
    let partitions: Vec<(Vec<Employee>, Vec<ShiftSlot>, StdRng)> = Role::ALL
        .into_iter()
        .filter(|role| {
            employees.iter().any(|e| e.role == *role)
                || slots.iter().any(|s| s.base_requirement(*role) > 0)
        })
        .map(|role| {
            let staff = employees.iter().filter(|e| e.role == role).cloned().collect();
            let scoped = slots
                .iter()
                .map(|s| {
                    let mut s = s.clone();
                    s.required.retain(|r, _| *r == role);
                    s
                })
                .collect();
            (staff, scoped, StdRng::seed_from_u64(rng.gen()))
        })
        .collect();

    let results: Vec<WeeklySchedule> = partitions
        .into_par_iter()
        .map(|(staff, scoped, mut local)| generate(days, &scoped, &staff, policy, &mut local))
        .collect();

    merge(results)
}

/// Fusionne des plannings de même forme (mêmes jours, mêmes créneaux).
fn merge(results: Vec<WeeklySchedule>) -> WeeklySchedule {
    let mut parts = results.into_iter();
    let Some(mut merged) = parts.next() else {
        return WeeklySchedule::default();
    };
    for part in parts {
        for (into, from) in merged.days.iter_mut().zip(part.days) {
            for (a, b) in into.assignments.iter_mut().zip(from.assignments) {
                a.employees.extend(b.employees);
            }
        }
        merged.shortfalls.extend(part.shortfalls);
        merged.rest_days.extend(part.rest_days);
    }
    merged
}

/// Jours demandés dans l'ordre de priorité ; ceux que la priorité ne cite
/// pas passent ensuite, dans l'ordre reçu.
fn processing_order(days: &[Day], policy: &Policy) -> Vec<Day> {
    let mut order: Vec<Day> = util::dedup_days(&policy.day_priority)
        .into_iter()
        .filter(|d| days.contains(d))
        .collect();
    for d in days {
        if !order.contains(d) {
            order.push(*d);
        }
    }
    order
}

fn is_eligible(
    employee: &Employee,
    pass: &Pass<'_>,
    today: &HashSet<EmployeeId>,
    on_slot: &[EmployeeId],
    state: &SchedulingState,
    policy: &Policy,
) -> bool {
    if employee.role != pass.role {
        return false;
    }
    if !employee.availability.admits(pass.day, pass.slot.start) {
        return false;
    }
    if state.rests_on(&employee.id, pass.day) {
        return false;
    }
    if today.contains(&employee.id) || on_slot.contains(&employee.id) {
        return false;
    }
    if pass.slot.is_closing() && state.closings(&employee.id) >= policy.closing_cap {
        return false;
    }
    let duration = policy.daily_duration(employee);
    if duration <= Duration::zero() {
        return false;
    }
    state.worked(&employee.id) + duration <= policy.weekly_cap(employee.contract)
}

/// Mélange puis trie (stable) : moins de jours affectés d'abord ; pour une
/// fermeture, moins de fermetures ensuite.
fn rank<R: Rng + ?Sized>(
    candidates: &mut [&Employee],
    pass: &Pass<'_>,
    state: &SchedulingState,
    rng: &mut R,
) {
    candidates.shuffle(rng);
    if pass.slot.is_closing() {
        candidates.sort_by_key(|e| (state.days_assigned(&e.id), state.closings(&e.id)));
    } else {
        candidates.sort_by_key(|e| state.days_assigned(&e.id));
    }
}
