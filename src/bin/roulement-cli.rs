#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use roulement::{
    catalog::{export_catalog_json, load_catalog_from_file, SlotCatalog},
    io,
    model::{ContractType, Employee, EmployeeId, Role},
    scheduler::{Policy, Scheduler},
    storage::{JsonStorage, Storage},
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de génération d'horaires hebdomadaires
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON de l'effectif
    #[arg(long, global = true, default_value = "roster.json")]
    roster: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Importer des employés depuis un CSV
    ImportEmployees {
        #[arg(long)]
        csv: String,
    },

    /// Ajouter un employé
    AddEmployee {
        #[arg(long)]
        name: String,
        /// produccion, servicio-tienda, servicio-modulo-tienda, servicio-modulo-open
        #[arg(long)]
        role: String,
        /// full-time | part-time
        #[arg(long, default_value = "full-time")]
        contract: String,
        /// "lunes;martes@15:00-23:59;..." (vide = 7 jours)
        #[arg(long)]
        availability: Option<String>,
        #[arg(long)]
        id: Option<String>,
    },

    /// Retirer un employé par identifiant
    RemoveEmployee {
        #[arg(long)]
        id: String,
    },

    /// Lister l'effectif
    List,

    /// Écrire le catalogue standard de créneaux
    Catalog {
        #[arg(long)]
        out: String,
    },

    /// Générer la semaine
    Generate {
        /// Catalogue JSON (défaut : catalogue standard)
        #[arg(long)]
        catalog: Option<String>,
        /// liste "domingo,sabado,..." (défaut : semaine complète)
        #[arg(long)]
        days: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
        /// Un appel isolé par rôle, en parallèle
        #[arg(long)]
        per_role: bool,
        /// Politique JSON (champs absents = valeurs par défaut)
        #[arg(long)]
        policy: Option<String>,
        #[arg(long)]
        closing_cap: Option<u32>,
        #[arg(long)]
        rest_day_cap: Option<u32>,
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
        #[arg(long)]
        shortfalls_csv: Option<String>,
    },

    /// Vérifier un planning exporté
    Check {
        #[arg(long)]
        schedule: String,
        #[arg(long)]
        catalog: Option<String>,
        #[arg(long)]
        policy: Option<String>,
    },
}

fn load_catalog(path: Option<&str>) -> Result<SlotCatalog> {
    match path {
        Some(p) => load_catalog_from_file(p),
        None => Ok(SlotCatalog::standard()),
    }
}

fn load_policy(path: Option<&str>) -> Result<Policy> {
    match path {
        Some(p) => io::load_policy_json(p),
        None => Ok(Policy::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.roster);
    let roster = storage.load_or_default()?;

    let code = match cli.cmd {
        Commands::ImportEmployees { csv } => {
            let employees = io::import_employees_csv(&csv)?;
            let count = employees.len();
            let mut scheduler = Scheduler::default();
            *scheduler.roster_mut() = roster;
            scheduler.add_employees(employees)?;
            storage.save(scheduler.roster())?;
            println!("Imported {count} employee(s)");
            0
        }
        Commands::AddEmployee {
            name,
            role,
            contract,
            availability,
            id,
        } => {
            let role: Role = role.parse()?;
            let contract: ContractType = contract.parse()?;
            let mut employee = Employee::new(name, role, contract);
            if let Some(id) = id {
                employee.id = EmployeeId::new(id);
            }
            if let Some(raw) = availability {
                employee.availability = io::parse_availability(&raw)?;
            }
            let mut scheduler = Scheduler::default();
            *scheduler.roster_mut() = roster;
            let id = employee.id.clone();
            scheduler.add_employees(vec![employee])?;
            storage.save(scheduler.roster())?;
            println!("{id}");
            0
        }
        Commands::RemoveEmployee { id } => {
            let mut scheduler = Scheduler::default();
            *scheduler.roster_mut() = roster;
            let removed = scheduler.remove_employee(&EmployeeId::new(id))?;
            storage.save(scheduler.roster())?;
            println!("Removed {} ({})", removed.name, removed.id);
            0
        }
        Commands::List => {
            for e in &roster.employees {
                println!(
                    "{} | {} | {} | {} | {} day(s)",
                    e.id,
                    e.name,
                    e.role,
                    e.contract.as_str(),
                    e.availability.day_count()
                );
            }
            0
        }
        Commands::Catalog { out } => {
            export_catalog_json(&out, &SlotCatalog::standard())?;
            0
        }
        Commands::Generate {
            catalog,
            days,
            seed,
            per_role,
            policy,
            closing_cap,
            rest_day_cap,
            out_json,
            out_csv,
            shortfalls_csv,
        } => {
            let catalog = load_catalog(catalog.as_deref())?;
            let mut policy = load_policy(policy.as_deref())?;
            if let Some(cap) = closing_cap {
                policy.closing_cap = cap;
            }
            if let Some(cap) = rest_day_cap {
                policy.rest_day_cap = cap;
            }
            let days = io::parse_days(days.as_deref().unwrap_or(""))?;
            if roster.employees.is_empty() {
                bail!("aucun employé dans {}", storage.path().display());
            }

            let mut rng = match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_entropy(),
            };
            let mut scheduler = Scheduler::new(catalog, policy);
            *scheduler.roster_mut() = roster;
            let week = if per_role {
                scheduler.generate_per_role(&days, &mut rng)?
            } else {
                scheduler.generate(&days, &mut rng)?
            };

            if let Some(path) = out_json {
                io::export_schedule_json(path, &week)?;
            }
            if let Some(path) = out_csv {
                io::export_schedule_csv(
                    path,
                    &week,
                    scheduler.roster(),
                    &scheduler.catalog().slots,
                )?;
            }
            if let Some(path) = shortfalls_csv {
                io::export_shortfalls_csv(path, &week)?;
            }

            // impression compacte
            for daily in &week.days {
                for a in &daily.assignments {
                    let names: Vec<&str> = a
                        .employees
                        .iter()
                        .filter_map(|id| scheduler.roster().find_employee_by_id(id))
                        .map(|e| e.name.as_str())
                        .collect();
                    println!("{} | {} | {}", daily.day, a.slot, names.join(", "));
                }
            }

            if week.shortfalls.is_empty() {
                0
            } else {
                let missing: u32 = week.shortfalls.iter().map(|s| s.missing()).sum();
                eprintln!(
                    "Understaffed: {} requirement(s), {} missing position(s)",
                    week.shortfalls.len(),
                    missing
                );
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Check {
            schedule,
            catalog,
            policy,
        } => {
            let week = io::load_schedule_json(&schedule)
                .with_context(|| format!("loading schedule {schedule}"))?;
            let mut scheduler =
                Scheduler::new(load_catalog(catalog.as_deref())?, load_policy(policy.as_deref())?);
            *scheduler.roster_mut() = roster;
            let violations = scheduler.audit(&week);
            if violations.is_empty() {
                println!("OK: no violations");
                0
            } else {
                eprintln!("Found {} violation(s)", violations.len());
                for v in &violations {
                    eprintln!(
                        "{} | {} | {} | {}",
                        v.kind.as_str(),
                        v.day.map(|d| d.as_str()).unwrap_or("-"),
                        v.slot.as_ref().map(|s| s.as_str()).unwrap_or("-"),
                        v.employee.as_ref().map(|e| e.as_str()).unwrap_or("-"),
                    );
                }
                2
            }
        }
    };

    std::process::exit(code);
}
