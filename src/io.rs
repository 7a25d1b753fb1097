use crate::model::{Availability, Day, TimeRange, WeeklySchedule};
use crate::scheduler::Policy;
use anyhow::{bail, Context};
use chrono::NaiveTime;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

#[cfg(feature = "csv")]
use crate::model::{Employee, EmployeeId, Roster, ShiftSlot};
#[cfg(feature = "csv")]
use csv::{ReaderBuilder, WriterBuilder};

/// Import d'employés depuis CSV: header `id,name,role,contract,availability`.
///
/// `id` vide → identifiant aléatoire ; `availability` vide → 7 jours.
#[cfg(feature = "csv")]
pub fn import_employees_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Employee>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let id = rec.get(0).context("missing id")?.trim();
        let name = rec.get(1).context("missing name")?.trim();
        if name.is_empty() {
            bail!("invalid employee row (empty name)");
        }
        let role = rec
            .get(2)
            .context("missing role")?
            .parse()
            .with_context(|| format!("invalid role for {name}"))?;
        let contract = rec
            .get(3)
            .context("missing contract")?
            .parse()
            .with_context(|| format!("invalid contract for {name}"))?;
        let mut employee = Employee::new(name, role, contract);
        if !id.is_empty() {
            employee.id = EmployeeId::new(id);
        }
        if let Some(raw) = rec.get(4) {
            if !raw.trim().is_empty() {
                employee.availability = parse_availability(raw)
                    .with_context(|| format!("invalid availability for {name}"))?;
            }
        }
        out.push(employee);
    }
    Ok(out)
}

/// Lit une disponibilité `lunes;martes@15:00-23:59;...`.
///
/// Sans aucune plage horaire on obtient la variante par jours ; dès qu'une
/// plage apparaît, les jours sans plage valent la journée entière.
pub fn parse_availability(raw: &str) -> anyhow::Result<Availability> {
    let mut days = BTreeSet::new();
    let mut windows = BTreeMap::new();
    for chunk in raw.split(';').map(str::trim).filter(|c| !c.is_empty()) {
        match chunk.split_once('@') {
            Some((day, range)) => {
                let day: Day = day.parse()?;
                windows.insert(day, parse_range(range.trim())?);
                days.insert(day);
            }
            None => {
                days.insert(chunk.parse::<Day>()?);
            }
        }
    }
    if windows.is_empty() {
        return Ok(Availability::Days(days));
    }
    for day in days {
        windows.entry(day).or_insert_with(TimeRange::whole_day);
    }
    Ok(Availability::Windows(windows))
}

/// Liste de jours séparés par des virgules ; vide → semaine complète.
pub fn parse_days(raw: &str) -> anyhow::Result<Vec<Day>> {
    let days: Vec<Day> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()?;
    if days.is_empty() {
        return Ok(Day::ALL.to_vec());
    }
    Ok(days)
}

fn parse_range(raw: &str) -> anyhow::Result<TimeRange> {
    let (start, end) = raw
        .split_once('-')
        .with_context(|| format!("expected HH:MM-HH:MM, got {raw}"))?;
    let start = parse_hhmm(start)?;
    let end = parse_hhmm(end)?;
    if end <= start {
        bail!("range end must be after start: {raw}");
    }
    Ok(TimeRange::new(start, end))
}

fn parse_hhmm(raw: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").with_context(|| format!("invalid time: {raw}"))
}

/// Export JSON du planning (jolie mise en forme)
pub fn export_schedule_json<P: AsRef<Path>>(
    path: P,
    schedule: &WeeklySchedule,
) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(schedule)?;
    fs::write(path, s)?;
    Ok(())
}

pub fn load_schedule_json<P: AsRef<Path>>(path: P) -> anyhow::Result<WeeklySchedule> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing schedule {}", path.display()))
}

/// Écrit le planning en CSV: header `day,slot_id,slot_name,employee_id,employee_name`.
///
/// Une ligne par personne affectée ; les personnes absentes sont en repos.
#[cfg(feature = "csv")]
pub fn write_schedule_csv<W: std::io::Write>(
    out: W,
    schedule: &WeeklySchedule,
    roster: &Roster,
    slots: &[ShiftSlot],
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(out);
    w.write_record(["day", "slot_id", "slot_name", "employee_id", "employee_name"])?;
    for daily in &schedule.days {
        for a in &daily.assignments {
            let slot_name = slots
                .iter()
                .find(|s| s.id == a.slot)
                .map(|s| s.name.as_str())
                .unwrap_or("");
            for id in &a.employees {
                let name = roster
                    .find_employee_by_id(id)
                    .map(|e| e.name.as_str())
                    .unwrap_or("");
                w.write_record([
                    daily.day.as_str(),
                    a.slot.as_str(),
                    slot_name,
                    id.as_str(),
                    name,
                ])?;
            }
        }
    }
    w.flush()?;
    Ok(())
}

#[cfg(feature = "csv")]
pub fn export_schedule_csv<P: AsRef<Path>>(
    path: P,
    schedule: &WeeklySchedule,
    roster: &Roster,
    slots: &[ShiftSlot],
) -> anyhow::Result<()> {
    let file = fs::File::create(path)?;
    write_schedule_csv(file, schedule, roster, slots)
}

/// Export CSV des manques: header `day,slot_id,role,required,assigned`
#[cfg(feature = "csv")]
pub fn export_shortfalls_csv<P: AsRef<Path>>(
    path: P,
    schedule: &WeeklySchedule,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["day", "slot_id", "role", "required", "assigned"])?;
    let mut required = itoa::Buffer::new();
    let mut assigned = itoa::Buffer::new();
    for s in &schedule.shortfalls {
        w.write_record([
            s.day.as_str(),
            s.slot.as_str(),
            s.role.as_str(),
            required.format(s.required),
            assigned.format(s.assigned),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Politique JSON ; les champs absents gardent leur valeur par défaut.
pub fn load_policy_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Policy> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing policy {}", path.display()))
}
