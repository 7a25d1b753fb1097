use crate::model::{Day, Employee, EmployeeId, SlotKind};
use chrono::Duration;
use std::collections::HashMap;

/// Compteurs d'un employé pour une génération.
#[derive(Debug, Clone)]
pub struct Ledger {
    pub worked: Duration,
    pub closings: u32,
    pub days_assigned: u32,
    pub rest_days: Vec<Day>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            worked: Duration::zero(),
            closings: 0,
            days_assigned: 0,
            rest_days: Vec::new(),
        }
    }
}

impl Ledger {
    pub fn rests_on(&self, day: Day) -> bool {
        self.rest_days.contains(&day)
    }
}

/// État de travail d'un appel de génération. Jamais partagé entre appels.
#[derive(Debug, Default)]
pub struct SchedulingState {
    ledgers: HashMap<EmployeeId, Ledger>,
}

impl SchedulingState {
    pub fn new<'a, I: IntoIterator<Item = &'a Employee>>(employees: I) -> Self {
        Self {
            ledgers: employees
                .into_iter()
                .map(|e| (e.id.clone(), Ledger::default()))
                .collect(),
        }
    }

    pub fn add_rest_day(&mut self, id: &EmployeeId, day: Day) {
        self.ledgers.entry(id.clone()).or_default().rest_days.push(day);
    }

    pub fn rests_on(&self, id: &EmployeeId, day: Day) -> bool {
        self.ledgers.get(id).is_some_and(|l| l.rests_on(day))
    }

    pub fn days_assigned(&self, id: &EmployeeId) -> u32 {
        self.ledgers.get(id).map_or(0, |l| l.days_assigned)
    }

    pub fn closings(&self, id: &EmployeeId) -> u32 {
        self.ledgers.get(id).map_or(0, |l| l.closings)
    }

    pub fn worked(&self, id: &EmployeeId) -> Duration {
        self.ledgers.get(id).map_or_else(Duration::zero, |l| l.worked)
    }

    /// Enregistre une affectation : un jour de plus, `duration` de travail,
    /// et une fermeture de plus si le créneau en est une.
    pub fn commit(&mut self, id: &EmployeeId, kind: SlotKind, duration: Duration) {
        let ledger = self.ledgers.entry(id.clone()).or_default();
        ledger.days_assigned += 1;
        ledger.worked = ledger.worked + duration;
        if kind == SlotKind::Closing {
            ledger.closings += 1;
        }
    }
}
