use super::{util, Policy, SchedulingState};
use crate::model::{Day, Employee, EmployeeId};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Attribue un jour de repos forcé à chaque employé disponible 7 jours sur 7.
///
/// Chaque rôle est traité indépendamment, dans un ordre aléatoire. Le jour
/// retenu est le candidat le moins utilisé du groupe qui n'a pas encore
/// atteint `policy.rest_day_cap` ; si tous l'ont atteint, le moins utilisé
/// est pris quand même. Les candidats sont mélangés avant le tri stable, ce
/// qui varie le choix entre égalités d'une exécution à l'autre.
///
/// Les employés ayant déjà des jours d'indisponibilité ne reçoivent rien.
pub(super) fn preassign<R: Rng + ?Sized>(
    employees: &[Employee],
    policy: &Policy,
    state: &mut SchedulingState,
    rng: &mut R,
) -> BTreeMap<EmployeeId, Day> {
    let mut chosen = BTreeMap::new();
    if policy.rest_candidates.is_empty() {
        return chosen;
    }

    for (role, mut group) in util::group_by_role(employees) {
        group.shuffle(rng);
        let mut usage: HashMap<Day, u32> =
            policy.rest_candidates.iter().map(|d| (*d, 0)).collect();

        for employee in group.into_iter().filter(|e| e.availability.is_full_week()) {
            let mut candidates = policy.rest_candidates.clone();
            candidates.shuffle(rng);

            let under_cap: Vec<Day> = candidates
                .iter()
                .copied()
                .filter(|d| usage[d] < policy.rest_day_cap)
                .collect();
            let pool = if under_cap.is_empty() {
                candidates
            } else {
                under_cap
            };

            let Some(day) = pool.into_iter().min_by_key(|d| usage[d]) else {
                continue;
            };
            if let Some(count) = usage.get_mut(&day) {
                *count += 1;
            }
            state.add_rest_day(&employee.id, day);
            chosen.insert(employee.id.clone(), day);
            debug!(employee = %employee.id, %role, %day, "forced rest day");
        }
    }

    chosen
}
