use crate::catalog::CatalogError;
use crate::model::{ContractType, Day, Employee, EmployeeId, Role, SlotId, SlotKind};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Surcharge d'effectif : pour `role` sur un créneau de nature `kind`,
/// les jours listés exigent `required` personnes au lieu de la base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingOverride {
    pub role: Role,
    pub kind: SlotKind,
    pub days: BTreeSet<Day>,
    pub required: u32,
}

impl StaffingOverride {
    pub fn new<I: IntoIterator<Item = Day>>(
        role: Role,
        kind: SlotKind,
        days: I,
        required: u32,
    ) -> Self {
        Self {
            role,
            kind,
            days: days.into_iter().collect(),
            required,
        }
    }

    pub fn applies(&self, role: Role, kind: SlotKind, day: Day) -> bool {
        self.role == role && self.kind == kind && self.days.contains(&day)
    }
}

/// Règles de génération
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub full_time_weekly_minutes: u32,
    pub part_time_weekly_minutes: u32,
    /// Un employé disponible 7 jours n'en travaille que `max_working_days`.
    pub max_working_days: u32,
    pub closing_cap: u32,
    pub rest_candidates: Vec<Day>,
    /// Nombre max de repos forcés simultanés dans un même rôle.
    pub rest_day_cap: u32,
    pub tolerance_minutes: u32,
    pub day_priority: Vec<Day>,
    pub overrides: Vec<StaffingOverride>,
}

impl Default for Policy {
    fn default() -> Self {
        use Day::*;
        Self {
            full_time_weekly_minutes: 52 * 60 + 30,
            part_time_weekly_minutes: 23 * 60,
            max_working_days: 6,
            closing_cap: 3,
            rest_candidates: vec![Monday, Tuesday, Wednesday, Thursday, Friday],
            rest_day_cap: 2,
            tolerance_minutes: 1,
            day_priority: vec![Sunday, Saturday, Friday, Monday, Tuesday, Wednesday, Thursday],
            overrides: vec![
                StaffingOverride::new(
                    Role::Production,
                    SlotKind::Closing,
                    [Monday, Tuesday, Wednesday, Thursday, Friday],
                    2,
                ),
                StaffingOverride::new(
                    Role::ModuleStoreService,
                    SlotKind::Closing,
                    [Saturday, Sunday],
                    2,
                ),
                StaffingOverride::new(
                    Role::ModuleStoreService,
                    SlotKind::Closing,
                    [Monday, Tuesday, Wednesday, Thursday, Friday],
                    1,
                ),
            ],
        }
    }
}

impl Policy {
    pub fn weekly_target(&self, contract: ContractType) -> Duration {
        let minutes = match contract {
            ContractType::FullTime => self.full_time_weekly_minutes,
            ContractType::PartTime => self.part_time_weekly_minutes,
        };
        Duration::minutes(i64::from(minutes))
    }

    /// Plafond hebdomadaire effectif (objectif + tolérance).
    pub fn weekly_cap(&self, contract: ContractType) -> Duration {
        self.weekly_target(contract) + Duration::minutes(i64::from(self.tolerance_minutes))
    }

    pub fn working_days(&self, employee: &Employee) -> u32 {
        let available = u32::try_from(employee.availability.day_count()).unwrap_or(u32::MAX);
        available.min(self.max_working_days)
    }

    /// Durée journalière : objectif hebdomadaire / jours travaillés, à la seconde.
    /// Zéro jour disponible donne une durée nulle.
    pub fn daily_duration(&self, employee: &Employee) -> Duration {
        let days = self.working_days(employee);
        if days == 0 {
            return Duration::zero();
        }
        let target = self.weekly_target(employee.contract).num_seconds();
        Duration::seconds(target / i64::from(days))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    DoubleBooking,
    RestDayWorked,
    Unavailable,
    WeeklyCapExceeded,
    ClosingCapExceeded,
    UnknownEmployee,
    UnknownSlot,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::DoubleBooking => "double",
            ViolationKind::RestDayWorked => "rest",
            ViolationKind::Unavailable => "unavailable",
            ViolationKind::WeeklyCapExceeded => "weekly-cap",
            ViolationKind::ClosingCapExceeded => "closing-cap",
            ViolationKind::UnknownEmployee => "unknown-employee",
            ViolationKind::UnknownSlot => "unknown-slot",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Violation {
    pub employee: Option<EmployeeId>,
    pub day: Option<Day>,
    pub slot: Option<SlotId>,
    pub kind: ViolationKind,
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("duplicate employee id: {0}")]
    DuplicateEmployee(String),
    #[error("unknown employee: {0}")]
    UnknownEmployee(String),
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
