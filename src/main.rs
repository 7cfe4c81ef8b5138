use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use ovula::*;

#[derive(Parser)]
#[command(name = "ovula")]
#[command(about = "Private cycle phase and fertility tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Passphrase for the encrypted store
    #[arg(long, global = true, env = "OVULA_PASSPHRASE", hide_env_values = true)]
    passphrase: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new encrypted store
    Init,

    /// Log a period start
    Period {
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
        /// Remove the entry instead
        #[arg(long)]
        remove: bool,
    },

    /// Log intercourse on a date
    Intimacy {
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
        /// Remove the entry instead
        #[arg(long)]
        remove: bool,
    },

    /// Show or change settings
    Settings {
        /// Average cycle length in days (21-45)
        #[arg(long)]
        cycle_length: Option<u32>,
        /// Age in years
        #[arg(long)]
        age: Option<u32>,
        /// Show the fertility window in month views
        #[arg(long)]
        fertility: Option<Toggle>,
    },

    /// Cycle day and phase for a date (default: today)
    Today {
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Classify every day of a month
    Month { year: i32, month: u32 },

    /// Cycle-health verdict from the period log
    Health,

    /// Two-week-wait conception check (default: today)
    Conception {
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Predict the next period
    Predict,

    /// Cycle statistics
    Stats,

    /// Print all data as JSON
    Export,

    /// Delete all data permanently
    Wipe {
        #[arg(long, required = true)]
        yes: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The subscriber needs the configured level, so the config source is
    // logged once it is installed.
    let (config, source) = match &cli.config {
        Some(path) => (Config::load_from(path)?, Some(path.clone())),
        None => (
            Config::load()?,
            Config::default_config_path().filter(|p| p.exists()),
        ),
    };
    ovula::logging::init_with_level(&config.logging.level);
    match &source {
        Some(path) => tracing::info!(?path, "loaded config"),
        None => tracing::info!("no config file found, using defaults"),
    }

    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());
    let mut tracker = Tracker::new(Store::new(data_dir), config.cycle.period_length_days);

    match &cli.command {
        Commands::Init => {
            tracker.setup(passphrase(&cli)?)?;
            println!("Tracker created.");
            Ok(())
        }
        Commands::Wipe { .. } => {
            tracker.wipe_all_data()?;
            println!("All data wiped.");
            Ok(())
        }
        command => {
            open(&mut tracker, passphrase(&cli)?)?;
            run(&mut tracker, command, cli.json)
        }
    }
}

fn passphrase(cli: &Cli) -> Result<&str> {
    cli.passphrase
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or(Error::PassphraseRequired)
}

fn open(tracker: &mut Tracker, passphrase: &str) -> Result<()> {
    if !tracker.is_setup() {
        return Err(Error::NotSetup);
    }
    if !tracker.unlock(passphrase)? {
        return Err(Error::WrongPassphrase);
    }
    Ok(())
}

fn today() -> NaiveDate {
    to_local_date(&chrono::Local::now())
}

fn run(tracker: &mut Tracker, command: &Commands, json: bool) -> Result<()> {
    match *command {
        Commands::Period { date, remove } => {
            if remove {
                tracker.remove_period_start(date)?;
                println!("Removed period start {date}.");
            } else {
                tracker.log_period_start(date)?;
                println!("Logged period start {date}.");
            }
        }
        Commands::Intimacy { date, remove } => {
            if remove {
                tracker.remove_intercourse(date)?;
                println!("Removed entry {date}.");
            } else {
                tracker.log_intercourse(date)?;
                println!("Logged {date}.");
            }
        }
        Commands::Settings {
            cycle_length,
            age,
            fertility,
        } => {
            if cycle_length.is_some() || age.is_some() {
                tracker.update_settings(cycle_length, age)?;
            }
            if let Some(toggle) = fertility {
                tracker.toggle_fertility(matches!(toggle, Toggle::On))?;
            }
            let settings = tracker.settings()?;
            emit(json, &settings, || {
                println!("Cycle length:   {} days", settings.cycle_length_days);
                match settings.age_years {
                    Some(age) => println!("Age:            {age}"),
                    None => println!("Age:            not set"),
                }
                println!(
                    "Fertility view: {}",
                    if settings.show_fertility { "on" } else { "off" }
                );
            })?;
        }
        Commands::Today { date } => {
            let summary = tracker.day_summary(date.unwrap_or_else(today))?;
            emit(json, &summary, || print_day(&summary))?;
        }
        Commands::Month { year, month } => {
            let data = tracker.month(year, month)?;
            emit(json, &data, || {
                println!("{year}-{month:02}");
                for day in &data.days {
                    print_day(day);
                }
                if let Some(fertility) = &data.fertility {
                    println!(
                        "\nFertile window: {} to {} (ovulation {})",
                        fertility.fertile_start, fertility.fertile_end, fertility.ovulation_day
                    );
                }
            })?;
        }
        Commands::Health => {
            let verdict = tracker.cycle_health()?;
            emit(json, &verdict, || {
                println!("Status:    {}", verdict.status.label());
                if verdict.status != CycleHealthStatus::InsufficientData {
                    println!("Average:   {} days", verdict.average_length_days);
                    println!("Variation: {} days", verdict.variation_days);
                }
                for cause in &verdict.probable_causes {
                    println!("  - {cause}");
                }
            })?;
        }
        Commands::Conception { date } => {
            let status = tracker.conception_status(date.unwrap_or_else(today))?;
            emit(json, &status, || {
                if status.detected {
                    println!("Possible conception ({} DPO)", status.days_past_ovulation);
                    if let Some(test) = status.recommended_test_date {
                        println!("Test on or after: {test}");
                    }
                    if let Some(due) = status.estimated_due_date {
                        println!("Estimated due date if pregnant: {due}");
                    }
                } else {
                    println!("No conception window detected.");
                }
            })?;
        }
        Commands::Predict => {
            let prediction = tracker.prediction()?;
            emit(json, &prediction, || match &prediction {
                Some(p) => println!(
                    "Next period: {} to {} (confidence {:.0}%)",
                    p.predicted_start,
                    p.predicted_end,
                    p.confidence * 100.0
                ),
                None => println!("Log at least two period starts to predict."),
            })?;
        }
        Commands::Stats => {
            let stats = tracker.stats()?;
            emit(json, &stats, || {
                println!("Logged periods: {}", stats.total_cycles);
                if let Some(avg) = stats.avg_cycle_length {
                    println!("Average cycle:  {avg:.1} days");
                }
                if let (Some(short), Some(long)) = (stats.shortest_cycle, stats.longest_cycle) {
                    println!("Range:          {short}-{long} days");
                }
                if let Some(last) = stats.last_period_start {
                    println!("Last period:    {last}");
                }
            })?;
        }
        Commands::Export => println!("{}", tracker.export_data()?),
        Commands::Init | Commands::Wipe { .. } => {}
    }
    Ok(())
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce()) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text();
    }
    Ok(())
}

fn print_day(day: &DaySummary) {
    println!(
        "{}  day {:>2}  {:<18} {}",
        day.date,
        day.cycle_day,
        day.result.label,
        day.result.probability_label()
    );
}
