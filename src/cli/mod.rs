pub mod report;

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use chrono_english::{parse_date_string, Dialect};
use clap::{CommandFactory, Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::{
    habits::{habit::Periodicity, registry::HabitRegistry},
    storage::habit_store::{HabitStore, HabitStoreImpl},
    utils::{
        clock::{Clock, DefaultClock},
        dir::create_application_default_path,
        logging::enable_logging,
    },
};

use report::{format_streak, print_habits};

#[derive(Parser, Debug)]
#[command(name = "Habitrack", version, long_about = None)]
#[command(about = "Command line tracker for daily and weekly habits", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Start tracking a new habit")]
    Add {
        name: String,
        #[arg(short, long, help = "How often the habit is expected to recur")]
        periodicity: Periodicity,
    },
    #[command(about = "Mark a habit as completed")]
    Done {
        name: String,
        #[arg(
            long,
            help = "Moment of completion, defaults to now. Examples are \"yesterday\", \"2 hours ago\", \"15/03/2025\""
        )]
        at: Option<String>,
    },
    #[command(about = "Stop tracking a habit and drop its history")]
    Delete { name: String },
    #[command(about = "Clear completion history. Clears every habit when no name is given")]
    Reset { name: Option<String> },
    #[command(about = "Display tracked habits with their streaks and completion rates")]
    List {
        #[arg(short, long, help = "Only show habits with this periodicity")]
        periodicity: Option<Periodicity>,
    },
    #[command(about = "Display the habit with the longest current streak")]
    Best {},
}

pub fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    let application_dir = match args.dir {
        Some(dir) => dir,
        None => create_application_default_path()?,
    };
    enable_logging(&application_dir, logging_level, args.log)?;

    let store = HabitStoreImpl::new(application_dir.join("habits.json"))?;
    process_command(args.commands, &store, &DefaultClock)
}

/// Runs a single command against the stored state. Mutating commands hand
/// the full registry contents back to the store before reporting success.
fn process_command(command: Commands, store: &impl HabitStore, clock: &impl Clock) -> Result<()> {
    let mut registry = HabitRegistry::from_habits(store.load_all()?);

    match command {
        Commands::Add { name, periodicity } => {
            let added = registry.add_habit(&name, periodicity, clock.time())?;
            let message = format!("Tracking {} ({})", added.name(), added.periodicity());
            store.save_all(registry.list_habits())?;
            println!("{message}");
        }
        Commands::Done { name, at } => {
            let at = parse_completion_moment(at, clock)?;
            registry.mark_completed(&name, at)?;
            store.save_all(registry.list_habits())?;
            let habit = registry.find_habit(&name).expect("just marked");
            println!(
                "Completed {}, streak is {}",
                habit.name(),
                format_streak(habit.current_streak(), habit.periodicity())
            );
        }
        Commands::Delete { name } => {
            let removed = registry.delete_habit(&name)?;
            store.save_all(registry.list_habits())?;
            println!("Deleted {}", removed.name());
        }
        Commands::Reset { name: Some(name) } => {
            registry.reset_habit(&name)?;
            store.save_all(registry.list_habits())?;
            println!("Cleared completions of {name}");
        }
        Commands::Reset { name: None } => {
            registry.reset_all();
            store.save_all(registry.list_habits())?;
            println!("Cleared completions of {} habits", registry.len());
        }
        Commands::List { periodicity } => {
            let printed = match periodicity {
                Some(periodicity) => {
                    print_habits(registry.habits_by_periodicity(periodicity), clock.time())
                }
                None => print_habits(registry.list_habits(), clock.time()),
            };
            if printed == 0 {
                println!("No habits tracked yet");
            }
        }
        Commands::Best {} => match registry.longest_streak_habit() {
            Some(habit) => println!(
                "{}\t{}",
                habit.name(),
                format_streak(habit.current_streak(), habit.periodicity())
            ),
            None => println!("No habits tracked yet"),
        },
    }
    Ok(())
}

/// Completions can be marked retroactively with human readable dates, the
/// same way timeline ranges are usually given to cli tools.
fn parse_completion_moment(at: Option<String>, clock: &impl Clock) -> Result<DateTime<Utc>> {
    let Some(at) = at else {
        return Ok(clock.time());
    };
    let now = clock.time().with_timezone(&Local);
    match parse_date_string(&at, now, Dialect::Uk) {
        Ok(v) => Ok(v.with_timezone(&Utc)),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate completion date {e}"),
            )
            .into()),
    }
}
