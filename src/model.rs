use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Erreur de lecture d'une valeur textuelle (jour, rôle, contrat).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown day: {0}")]
    Day(String),
    #[error("unknown role: {0}")]
    Role(String),
    #[error("unknown contract type: {0}")]
    Contract(String),
}

/// Identifiant fort pour Employee
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmployeeId(String);

impl EmployeeId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifiant fort pour ShiftSlot
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotId(String);

impl SlotId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Jour de la semaine, lundi en premier.
///
/// Les noms espagnols (`lunes`, `sábado`...) sont acceptés en entrée,
/// ainsi que l'anglais et le français.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    #[serde(alias = "lunes", alias = "lundi")]
    Monday,
    #[serde(alias = "martes", alias = "mardi")]
    Tuesday,
    #[serde(alias = "miercoles", alias = "miércoles", alias = "mercredi")]
    Wednesday,
    #[serde(alias = "jueves", alias = "jeudi")]
    Thursday,
    #[serde(alias = "viernes", alias = "vendredi")]
    Friday,
    #[serde(alias = "sabado", alias = "sábado", alias = "samedi")]
    Saturday,
    #[serde(alias = "domingo", alias = "dimanche")]
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Day::Monday => "monday",
            Day::Tuesday => "tuesday",
            Day::Wednesday => "wednesday",
            Day::Thursday => "thursday",
            Day::Friday => "friday",
            Day::Saturday => "saturday",
            Day::Sunday => "sunday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let day = match lower.as_str() {
            "lunes" | "lundi" => Day::Monday,
            "martes" | "mardi" => Day::Tuesday,
            "miercoles" | "miércoles" | "mercredi" => Day::Wednesday,
            "jueves" | "jeudi" => Day::Thursday,
            "viernes" | "vendredi" => Day::Friday,
            "sabado" | "sábado" | "samedi" => Day::Saturday,
            "domingo" | "dimanche" => Day::Sunday,
            other => other
                .parse::<Weekday>()
                .map(Day::from)
                .map_err(|_| ParseError::Day(s.to_string()))?,
        };
        Ok(day)
    }
}

impl From<Weekday> for Day {
    fn from(w: Weekday) -> Self {
        match w {
            Weekday::Mon => Day::Monday,
            Weekday::Tue => Day::Tuesday,
            Weekday::Wed => Day::Wednesday,
            Weekday::Thu => Day::Thursday,
            Weekday::Fri => Day::Friday,
            Weekday::Sat => Day::Saturday,
            Weekday::Sun => Day::Sunday,
        }
    }
}

/// Fonction occupée dans le magasin (ensemble fermé).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "produccion")]
    Production,
    #[serde(rename = "servicio-tienda")]
    StoreService,
    #[serde(rename = "servicio-modulo-tienda")]
    ModuleStoreService,
    #[serde(rename = "servicio-modulo-open")]
    ModuleOpenService,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Production,
        Role::StoreService,
        Role::ModuleStoreService,
        Role::ModuleOpenService,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Production => "produccion",
            Role::StoreService => "servicio-tienda",
            Role::ModuleStoreService => "servicio-modulo-tienda",
            Role::ModuleOpenService => "servicio-modulo-open",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == wanted)
            .ok_or_else(|| ParseError::Role(s.to_string()))
    }
}

/// Type de contrat : fixe l'objectif hebdomadaire d'heures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContractType {
    FullTime,
    PartTime,
}

impl ContractType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContractType::FullTime => "full-time",
            ContractType::PartTime => "part-time",
        }
    }
}

impl FromStr for ContractType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full-time" | "ft" | "fulltime" => Ok(ContractType::FullTime),
            "part-time" | "pt" | "parttime" => Ok(ContractType::PartTime),
            _ => Err(ParseError::Contract(s.to_string())),
        }
    }
}

/// Sérialisation `HH:MM` des heures.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(raw.trim(), FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Plage horaire `[start, end)` pendant laquelle une personne est disponible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Journée entière (`00:00`–`23:59`).
    pub fn whole_day() -> Self {
        Self {
            start: NaiveTime::MIN,
            end: NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

/// Disponibilités hebdomadaires.
///
/// Un jour absent est un jour de repos fixe. La variante `Windows` restreint
/// en plus l'heure d'arrivée possible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Availability {
    Days(BTreeSet<Day>),
    Windows(BTreeMap<Day, TimeRange>),
}

impl Availability {
    pub fn full_week() -> Self {
        Availability::Days(Day::ALL.into_iter().collect())
    }

    pub fn covers(&self, day: Day) -> bool {
        match self {
            Availability::Days(days) => days.contains(&day),
            Availability::Windows(map) => map.contains_key(&day),
        }
    }

    /// Vrai si la personne peut commencer un créneau débutant à `slot_start` ce jour-là.
    pub fn admits(&self, day: Day, slot_start: NaiveTime) -> bool {
        match self {
            Availability::Days(days) => days.contains(&day),
            Availability::Windows(map) => map.get(&day).is_some_and(|w| slot_start >= w.start),
        }
    }

    pub fn day_count(&self) -> usize {
        match self {
            Availability::Days(days) => days.len(),
            Availability::Windows(map) => map.len(),
        }
    }

    pub fn is_full_week(&self) -> bool {
        self.day_count() >= Day::ALL.len()
    }
}

impl Default for Availability {
    fn default() -> Self {
        Availability::full_week()
    }
}

/// Employé du magasin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub role: Role,
    pub contract: ContractType,
    #[serde(default)]
    pub availability: Availability,
}

impl Employee {
    pub fn new<N: Into<String>>(name: N, role: Role, contract: ContractType) -> Self {
        Self {
            id: EmployeeId::random(),
            name: name.into(),
            role,
            contract,
            availability: Availability::full_week(),
        }
    }

    pub fn with_id(mut self, id: EmployeeId) -> Self {
        self.id = id;
        self
    }

    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }
}

/// Nature d'un créneau : l'ouverture a une heure de début fixe, la fermeture
/// une heure de fin fixe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Opening,
    Closing,
    #[default]
    Ordinary,
}

impl SlotKind {
    /// Classe un créneau d'après son nom (insensible à la casse).
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("apertura") || lower.contains("opening") {
            SlotKind::Opening
        } else if lower.contains("cierre") || lower.contains("closing") {
            SlotKind::Closing
        } else {
            SlotKind::Ordinary
        }
    }
}

/// Créneau hebdomadaire récurrent avec ses effectifs requis par rôle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SlotRecord")]
pub struct ShiftSlot {
    pub id: SlotId,
    pub name: String,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
    pub high_traffic: bool,
    pub kind: SlotKind,
    pub required: BTreeMap<Role, u32>,
}

impl ShiftSlot {
    /// Crée un créneau ; la nature est déduite du nom.
    pub fn new<I: AsRef<str>, N: Into<String>>(
        id: I,
        name: N,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Self {
        let name = name.into();
        Self {
            id: SlotId::new(id),
            kind: SlotKind::from_name(&name),
            name,
            start,
            end,
            high_traffic: false,
            required: BTreeMap::new(),
        }
    }

    pub fn high_traffic(mut self) -> Self {
        self.high_traffic = true;
        self
    }

    pub fn require(mut self, role: Role, count: u32) -> Self {
        self.required.insert(role, count);
        self
    }

    pub fn is_closing(&self) -> bool {
        self.kind == SlotKind::Closing
    }

    pub fn base_requirement(&self, role: Role) -> u32 {
        self.required.get(&role).copied().unwrap_or(0)
    }
}

/// Forme d'entrée d'un créneau : `kind` est optionnel et déduit du nom.
#[derive(Debug, Clone, Deserialize)]
struct SlotRecord {
    id: SlotId,
    name: String,
    #[serde(with = "hhmm")]
    start: NaiveTime,
    #[serde(with = "hhmm")]
    end: NaiveTime,
    #[serde(default)]
    high_traffic: bool,
    #[serde(default)]
    kind: Option<SlotKind>,
    #[serde(default)]
    required: BTreeMap<Role, u32>,
}

impl From<SlotRecord> for ShiftSlot {
    fn from(r: SlotRecord) -> Self {
        Self {
            kind: r.kind.unwrap_or_else(|| SlotKind::from_name(&r.name)),
            id: r.id,
            name: r.name,
            start: r.start,
            end: r.end,
            high_traffic: r.high_traffic,
            required: r.required,
        }
    }
}

/// Affectation d'un créneau pour un jour donné.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub slot: SlotId,
    pub employees: Vec<EmployeeId>,
}

/// Planning d'une journée
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySchedule {
    pub day: Day,
    pub assignments: Vec<Assignment>,
}

impl DailySchedule {
    pub fn new(day: Day) -> Self {
        Self {
            day,
            assignments: Vec::new(),
        }
    }

    /// Créneau occupé par `employee` ce jour-là, s'il y en a un.
    pub fn slot_of(&self, employee: &EmployeeId) -> Option<&SlotId> {
        self.assignments
            .iter()
            .find(|a| a.employees.contains(employee))
            .map(|a| &a.slot)
    }

    pub fn assignment(&self, slot: &SlotId) -> Option<&Assignment> {
        self.assignments.iter().find(|a| &a.slot == slot)
    }
}

/// Besoin non couvert pour un triplet (jour, créneau, rôle).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub day: Day,
    pub slot: SlotId,
    pub role: Role,
    pub required: u32,
    pub assigned: u32,
}

impl Shortfall {
    pub fn missing(&self) -> u32 {
        self.required.saturating_sub(self.assigned)
    }
}

/// Résultat d'une génération : planning, manques et repos forcés.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub days: Vec<DailySchedule>,
    #[serde(default)]
    pub shortfalls: Vec<Shortfall>,
    #[serde(default)]
    pub rest_days: BTreeMap<EmployeeId, Day>,
}

impl WeeklySchedule {
    pub fn day(&self, day: Day) -> Option<&DailySchedule> {
        self.days.iter().find(|d| d.day == day)
    }

    /// Jours travaillés par `employee`.
    pub fn days_worked(&self, employee: &EmployeeId) -> Vec<Day> {
        self.days
            .iter()
            .filter(|d| d.slot_of(employee).is_some())
            .map(|d| d.day)
            .collect()
    }

    pub fn is_fully_staffed(&self) -> bool {
        self.shortfalls.is_empty()
    }
}

/// Effectif complet
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Roster {
    pub employees: Vec<Employee>,
}

impl Roster {
    pub fn find_employee_by_id<'a>(&'a self, id: &EmployeeId) -> Option<&'a Employee> {
        self.employees.iter().find(|e| &e.id == id)
    }
}
