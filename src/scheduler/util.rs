use crate::model::{Day, Employee, Role};
use std::collections::BTreeMap;

/// Regroupe les employés par rôle, dans l'ordre des rôles.
pub(super) fn group_by_role(employees: &[Employee]) -> BTreeMap<Role, Vec<&Employee>> {
    let mut groups: BTreeMap<Role, Vec<&Employee>> = BTreeMap::new();
    for e in employees {
        groups.entry(e.role).or_default().push(e);
    }
    groups
}

/// Jours demandés, sans doublon, dans l'ordre reçu.
pub(super) fn dedup_days(days: &[Day]) -> Vec<Day> {
    let mut out = Vec::with_capacity(days.len());
    for d in days {
        if !out.contains(d) {
            out.push(*d);
        }
    }
    out
}
