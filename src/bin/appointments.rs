//! Appointment booking command-line front end.
//!
//! # Usage
//!
//! ```bash
//! appointments add "Dr. A" "Jane Doe" 555-123-4567 "2024-01-10 09:00" 30
//! appointments list
//! appointments list --json
//! appointments remove 0
//! appointments check "Dr. A" "2024-01-10 09:15" 30
//! appointments providers
//! ```
//!
//! # Environment Variables
//!
//! - `APPOINTMENTS_CONFIG`, `APPOINTMENTS_DB`, `APPOINTMENTS_LOG`: see `u_appointment::config`
//! - `RUST_LOG`: log filter (takes precedence over the configured one)

use anyhow::{bail, Context};
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use u_appointment::config::Config;
use u_appointment::models::{Appointment, Urgency, TIME_FORMAT};
use u_appointment::scheduler::Scheduler;
use u_appointment::store::SqliteStore;
use u_appointment::validation::BookingRequest;

const USAGE: &str = "\
usage:
  appointments add <provider> <patient-name> <contact> <YYYY-MM-DD HH:MM> [minutes]
  appointments list [--json]
  appointments remove <index>
  appointments check <provider> <YYYY-MM-DD HH:MM> [minutes]
  appointments providers";

#[derive(Debug, PartialEq)]
enum Command {
    Add {
        provider: String,
        patient_name: String,
        contact: String,
        start: NaiveDateTime,
        minutes: Option<i64>,
    },
    List {
        json: bool,
    },
    Remove {
        index: i64,
    },
    Check {
        provider: String,
        start: NaiveDateTime,
        minutes: Option<i64>,
    },
    Providers,
    Help,
}

fn parse_time(s: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), TIME_FORMAT)
        .with_context(|| format!("invalid time '{s}', expected YYYY-MM-DD HH:MM"))
}

fn parse_minutes(s: Option<&String>) -> anyhow::Result<Option<i64>> {
    s.map(|m| {
        m.parse::<i64>()
            .with_context(|| format!("invalid duration '{m}', expected whole minutes"))
    })
    .transpose()
}

fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let Some((name, rest)) = args.split_first() else {
        return Ok(Command::Help);
    };

    match (name.as_str(), rest) {
        ("add", [provider, patient_name, contact, start, tail @ ..]) if tail.len() <= 1 => {
            Ok(Command::Add {
                provider: provider.clone(),
                patient_name: patient_name.clone(),
                contact: contact.clone(),
                start: parse_time(start)?,
                minutes: parse_minutes(tail.first())?,
            })
        }
        ("list", []) => Ok(Command::List { json: false }),
        ("list", [flag]) if flag == "--json" => Ok(Command::List { json: true }),
        ("remove", [index]) => Ok(Command::Remove {
            index: index
                .parse()
                .with_context(|| format!("invalid index '{index}'"))?,
        }),
        ("check", [provider, start, tail @ ..]) if tail.len() <= 1 => Ok(Command::Check {
            provider: provider.clone(),
            start: parse_time(start)?,
            minutes: parse_minutes(tail.first())?,
        }),
        ("providers", []) => Ok(Command::Providers),
        ("help" | "--help" | "-h", _) => Ok(Command::Help),
        _ => bail!("unrecognized arguments: {}\n{USAGE}", args.join(" ")),
    }
}

#[derive(Serialize)]
struct ListedAppointment<'a> {
    index: usize,
    urgency: Urgency,
    #[serde(flatten)]
    appointment: &'a Appointment,
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args)?;

    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if command == Command::Help {
        println!("{USAGE}");
        return Ok(());
    }
    if command == Command::Providers {
        for provider in &config.providers {
            println!("{provider}");
        }
        return Ok(());
    }

    let store = SqliteStore::open(&config.database_path).with_context(|| {
        format!("failed to open database {}", config.database_path.display())
    })?;
    let mut scheduler = Scheduler::open(store)?;
    info!(db = %config.database_path.display(), "scheduler ready");

    match command {
        Command::Add {
            provider,
            patient_name,
            contact,
            start,
            minutes,
        } => {
            let minutes = minutes.unwrap_or(config.default_duration_minutes);
            let request = BookingRequest::new(patient_name, contact, provider, start, minutes);
            let booked = scheduler.add_validated(&request, &config.validation_rules())?;
            println!("Booked {booked}");
        }
        Command::List { json } => {
            let now = Local::now().naive_local();
            let appointments = scheduler.list()?;
            if json {
                let listed: Vec<_> = appointments
                    .iter()
                    .enumerate()
                    .map(|(index, appointment)| ListedAppointment {
                        index,
                        urgency: Urgency::of(appointment, now),
                        appointment,
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&listed)?);
            } else if appointments.is_empty() {
                println!("No appointments.");
            } else {
                for (index, appointment) in appointments.iter().enumerate() {
                    let urgency = Urgency::of(appointment, now);
                    println!("{index:>3}  {:<8}  {appointment}", urgency.label());
                }
            }
        }
        Command::Remove { index } => {
            let removed = match usize::try_from(index) {
                Ok(index) => scheduler.remove_at(index)?,
                Err(_) => None,
            };
            match removed {
                Some(appointment) => println!("Removed {appointment}"),
                None => println!("No appointment at index {index}; nothing removed."),
            }
        }
        Command::Check {
            provider,
            start,
            minutes,
        } => {
            let minutes = minutes.unwrap_or(config.default_duration_minutes);
            let minutes = u32::try_from(minutes)
                .ok()
                .filter(|&m| m > 0)
                .with_context(|| format!("duration must be positive, got {minutes}"))?;
            if scheduler.check(&provider, start, minutes)? {
                println!("Conflict: {provider} is already booked during that time.");
            } else {
                println!("Free: {provider} is available.");
            }
        }
        Command::Providers | Command::Help => {}
    }

    scheduler.close()?;
    Ok(())
}
