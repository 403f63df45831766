use anyhow::Result;
use clap::Parser;
use photokeep::photokeep_core::{Cli, Commands, Config, Organizer};
use simplelog::{CombinedLogger, LevelFilter, SharedLogger, TermLogger, WriteLogger};
use std::fs::File;
use std::io::{self, Write};
use time::OffsetDateTime;
use time::macros::format_description;

const LOG_FILE_DATE_FORMAT: &[time::format_description::FormatItem] =
    format_description!("[year][month][day]_[hour][minute][second]");

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    // Per-run log file under <workingDir>/logs/<timestamp>_<command>.log
    let logs_dir = config.working_dir.join("logs");
    std::fs::create_dir_all(&logs_dir)?;
    let stamp = OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .format(LOG_FILE_DATE_FORMAT)?;
    let log_path = logs_dir.join(format!("{}_{}.log", stamp, cli.command.name()));

    let term_level = if cli.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let loggers: Vec<Box<dyn SharedLogger>> = vec![
        TermLogger::new(
            term_level,
            simplelog::Config::default(),
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        ),
        WriteLogger::new(
            LevelFilter::Debug,
            simplelog::Config::default(),
            File::create(&log_path)?,
        ),
    ];
    CombinedLogger::init(loggers)?;

    log::info!("Running command {}", cli.command.name());
    let mut organizer = Organizer::new(config)?;

    match cli.command {
        Commands::Setup => {
            organizer.setup()?;
            println!("Setup complete");
        }

        Commands::Audit => {
            organizer.audit()?;
            println!("Audit passed");
        }

        Commands::Merge { preview } => {
            let report = organizer.merge(preview, |report| {
                print!(
                    "Move {} file(s) into the library? [y/N] ",
                    report.planned.len()
                );
                let _ = io::stdout().flush();
                let mut input = String::new();
                if io::stdin().read_line(&mut input).is_err() {
                    return false;
                }
                matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
            })?;

            if preview {
                println!("\nPreview: {} file(s) would be moved", report.planned.len());
                for planned in &report.planned {
                    println!("  {} -> {}", planned.from, planned.to);
                }
            } else if report.aborted {
                println!("\nMerge aborted");
            } else {
                println!("\nMerge complete!");
                println!("  {} files moved", report.moved);
            }
            if report.duplicates_skipped > 0 {
                println!("  {} duplicates skipped", report.duplicates_skipped);
            }
            if report.unable_to_rename > 0 {
                println!("  {} files could not be renamed", report.unable_to_rename);
            }
            if report.failed > 0 {
                println!("  {} files failed", report.failed);
            }
        }
    }

    Ok(())
}
