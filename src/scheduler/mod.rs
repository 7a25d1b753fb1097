mod assignment;
mod audit;
mod priority;
mod rest_days;
mod staffing;
mod state;
mod types;
mod util;

pub use priority::prioritize;
pub use staffing::required_staff;
pub use state::{Ledger, SchedulingState};
pub use types::{Policy, SchedError, StaffingOverride, Violation, ViolationKind};

use crate::catalog::SlotCatalog;
use crate::model::{Day, Employee, EmployeeId, Roster, ShiftSlot, WeeklySchedule};
use rand::Rng;
use std::collections::HashSet;

/// Génère une semaine pour `employees` sur `slots`.
///
/// N'échoue jamais : les besoins non couverts sont rapportés dans
/// `WeeklySchedule::shortfalls`. Le hasard (ordre des groupes, égalités)
/// vient uniquement de `rng`.
pub fn generate_schedule<R: Rng + ?Sized>(
    days: &[Day],
    slots: &[ShiftSlot],
    employees: &[Employee],
    policy: &Policy,
    rng: &mut R,
) -> WeeklySchedule {
    assignment::generate(days, slots, employees, policy, rng)
}

/// Comme [`generate_schedule`], mais un appel isolé par rôle, en parallèle.
pub fn generate_per_role<R: Rng + ?Sized>(
    days: &[Day],
    slots: &[ShiftSlot],
    employees: &[Employee],
    policy: &Policy,
    rng: &mut R,
) -> WeeklySchedule {
    assignment::generate_per_role(days, slots, employees, policy, rng)
}

/// Détecte les violations d'invariants dans un planning existant.
pub fn audit_schedule(
    schedule: &WeeklySchedule,
    employees: &[Employee],
    slots: &[ShiftSlot],
    policy: &Policy,
) -> Vec<Violation> {
    audit::audit(schedule, employees, slots, policy)
}

/// Scheduler : encapsule l'effectif, le catalogue et la politique
#[derive(Debug, Default)]
pub struct Scheduler {
    roster: Roster,
    catalog: SlotCatalog,
    policy: Policy,
}

impl Scheduler {
    pub fn new(catalog: SlotCatalog, policy: Policy) -> Self {
        Self {
            roster: Roster::default(),
            catalog,
            policy,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }
    pub fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }
    pub fn catalog(&self) -> &SlotCatalog {
        &self.catalog
    }
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Ajoute des employés ; refuse un identifiant déjà présent.
    pub fn add_employees(&mut self, employees: Vec<Employee>) -> Result<(), SchedError> {
        let mut ids: HashSet<EmployeeId> =
            self.roster.employees.iter().map(|e| e.id.clone()).collect();
        for e in &employees {
            if !ids.insert(e.id.clone()) {
                return Err(SchedError::DuplicateEmployee(e.id.as_str().to_string()));
            }
        }
        self.roster.employees.extend(employees);
        Ok(())
    }

    pub fn remove_employee(&mut self, id: &EmployeeId) -> Result<Employee, SchedError> {
        let pos = self
            .roster
            .employees
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| SchedError::UnknownEmployee(id.as_str().to_string()))?;
        Ok(self.roster.employees.remove(pos))
    }

    /// Vérifie le catalogue puis génère la semaine.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        days: &[Day],
        rng: &mut R,
    ) -> Result<WeeklySchedule, SchedError> {
        self.catalog.validate()?;
        Ok(generate_schedule(
            days,
            &self.catalog.slots,
            &self.roster.employees,
            &self.policy,
            rng,
        ))
    }

    pub fn generate_per_role<R: Rng + ?Sized>(
        &self,
        days: &[Day],
        rng: &mut R,
    ) -> Result<WeeklySchedule, SchedError> {
        self.catalog.validate()?;
        Ok(generate_per_role(
            days,
            &self.catalog.slots,
            &self.roster.employees,
            &self.policy,
            rng,
        ))
    }

    pub fn audit(&self, schedule: &WeeklySchedule) -> Vec<Violation> {
        audit_schedule(
            schedule,
            &self.roster.employees,
            &self.catalog.slots,
            &self.policy,
        )
    }
}
