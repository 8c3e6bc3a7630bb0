use std::path::PathBuf;
use structopt::StructOpt;

use rsecurity::config::Config;
use rsecurity::Playbook;

/// RSecurity authentication log analyzer
#[derive(StructOpt, Debug)]
#[structopt(name = "rsec", about = "Authentication log anomaly detection")]
pub enum Cli {
    /// Analyze a log file and write the anomaly report
    Analyze {
        /// Path to configuration file (defaults are used when absent)
        #[structopt(short, long)]
        config: Option<PathBuf>,
        /// CSV log file, overrides the configured input
        #[structopt(short, long)]
        input: Option<PathBuf>,
        /// Report path, overrides the configured output
        #[structopt(short, long)]
        output: Option<PathBuf>,
        /// Report format: json, jsonl or console
        #[structopt(short, long)]
        format: Option<String>,
        /// Also save the run to the report database
        #[structopt(long)]
        store: bool,
    },
    /// Generate a default configuration file
    Config {
        /// Output path for the configuration file
        #[structopt(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
    /// Parse and display log events from a file
    Parse {
        /// Path to the CSV log file
        #[structopt(short, long)]
        file: PathBuf,
        /// Number of events to display
        #[structopt(short, long, default_value = "10")]
        lines: usize,
    },
    /// Suggest severity and mitigation for a free-text finding
    Triage {
        /// Description of the finding
        reason: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::from_args();

    match cli {
        Cli::Analyze {
            config,
            input,
            output,
            format,
            store,
        } => {
            let mut config = match config {
                Some(path) => Config::from_file(&path)?,
                None => Config::default(),
            };
            if let Some(input) = input {
                config.input.file_path = input;
            }
            if let Some(output) = output {
                config.output.file_path = output;
            }
            if let Some(format) = format {
                config.output.format = format;
            }
            config.output.store_report |= store;

            let summary = rsecurity::run(&config)?;
            println!("{}", summary.message);
            if let Some(id) = summary.stored_report_id {
                println!("Stored as report {}.", id);
            }
        }
        Cli::Config { output } => {
            let config = Config::default();
            config.to_file(&output)?;
            println!("Default configuration written to: {:?}", output);
        }
        Cli::Parse { file, lines } => {
            let events = rsecurity::input::load_events(&file)?;
            let display_count = std::cmp::min(lines, events.len());

            println!("Parsed {} event(s) (showing {}):\n", events.len(), display_count);
            for event in events.iter().take(display_count) {
                println!(
                    "  {} User: {}, IP: {}{}, Action: {}",
                    event.timestamp,
                    event.user_id,
                    event.ip_address,
                    if rsecurity::is_internal(&event.ip_address) { " (internal)" } else { "" },
                    event.action
                );
            }
        }
        Cli::Triage { reason } => {
            let playbook = Playbook::from_reason(&reason);
            println!("Severity: {}", playbook.severity);
            for (i, step) in playbook.steps.iter().enumerate() {
                println!("  {}. {}", i + 1, step);
            }
        }
    }

    Ok(())
}
