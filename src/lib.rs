#![forbid(unsafe_code)]
//! Roulement : génération d'horaires hebdomadaires pour un magasin.
//!
//! - Rôles, contrats, disponibilités par jour ou par plage horaire.
//! - Repos forcé équilibré par rôle, puis affectation gloutonne équitable.
//! - Manques d'effectif rapportés, jamais d'échec de génération.
//! - Hasard injectable (`rand::Rng`) : reproductible avec une graine fixe.

pub mod catalog;
pub mod io;
pub mod model;
pub mod scheduler;
pub mod storage;

pub use catalog::{export_catalog_json, load_catalog_from_file, CatalogError, SlotCatalog};
pub use model::{
    Assignment, Availability, ContractType, DailySchedule, Day, Employee, EmployeeId, Roster,
    Role, ShiftSlot, Shortfall, SlotId, SlotKind, TimeRange, WeeklySchedule,
};
pub use scheduler::{
    audit_schedule, generate_per_role, generate_schedule, Policy, SchedError, Scheduler,
    StaffingOverride, Violation, ViolationKind,
};
pub use storage::{JsonStorage, Storage};
