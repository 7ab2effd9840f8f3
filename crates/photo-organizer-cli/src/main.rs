use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{info, warn};
use photo_organizer_core::config::CONFIG_FILE_NAME;
use photo_organizer_core::{logging, Config, DateRange, PhotoOrganizer};
use std::path::{Path, PathBuf};

mod menu;
mod report;

#[derive(Parser)]
#[command(name = "photo-organizer")]
#[command(about = "Download photos, drop duplicates and thumbnails, and name them by date")]
#[command(version)]
struct Cli {
    /// Path to the settings file
    #[arg(short, long, global = true, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    /// Directory for log files
    #[arg(long, global = true, default_value = "logs")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download every URL of a list into the raw directory
    Download {
        /// Text file with one URL per line
        url_file: PathBuf,
    },

    /// Filter, date and organize what is in the raw directory
    Organize {
        #[command(flatten)]
        dates: DateArgs,
    },

    /// Download and organize in one go
    Run {
        /// Text file with one URL per line
        url_file: PathBuf,

        #[command(flatten)]
        dates: DateArgs,
    },

    /// Inspect or change settings
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },

    /// Explain how to collect image URLs in the browser
    Instructions,

    /// Interactive menu (the default)
    Menu,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the current settings
    Show,

    /// Change a single setting
    Set { key: String, value: String },

    /// Write the default settings file
    Init,
}

#[derive(clap::Args)]
struct DateArgs {
    /// Earliest date (YYYY-MM-DD); photos stay undated without a range
    #[arg(long, requires = "end")]
    start: Option<String>,

    /// Latest date (YYYY-MM-DD)
    #[arg(long, requires = "start")]
    end: Option<String>,
}

impl DateArgs {
    fn range(&self) -> photo_organizer_core::Result<Option<DateRange>> {
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => DateRange::parse(start, end).map(Some),
            _ => Ok(None),
        }
    }
}

fn init_logging(log_dir: &Path) {
    if let Err(e) = logging::init_logger(log_dir) {
        eprintln!("File logging unavailable ({}), logging to stderr", e);
        env_logger::init();
    }
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    init_logging(&cli.log_dir);

    let mut config = Config::load_or_init(&cli.config)
        .with_context(|| format!("Failed to prepare settings at {}", cli.config.display()))?;

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Download { url_file } => {
            let organizer = PhotoOrganizer::new(config);
            let urls = organizer.load_urls(&url_file)?;
            report::print_url_list(&urls);
            let summary = organizer.download(&urls.urls)?;
            report::print_download_summary(&summary);
        }

        Commands::Organize { dates } => {
            let range = dates.range()?;
            let organizer = PhotoOrganizer::new(config);
            let outcome = organizer.organize_staged(range.as_ref())?;
            report::print_pipeline_report(&outcome);
        }

        Commands::Run { url_file, dates } => {
            let range = dates.range()?;
            let organizer = PhotoOrganizer::new(config);
            info!("Starting full run from {}", url_file.display());
            let outcome = organizer.run(&url_file, range.as_ref())?;
            report::print_pipeline_report(&outcome);
        }

        Commands::Config { action } => match action {
            ConfigCommand::Show => report::print_config(&config),
            ConfigCommand::Set { key, value } => {
                config.set(&key, &value)?;
                config.save_to_file(&cli.config)?;
                println!("{} updated in {}", key, cli.config.display());
            }
            ConfigCommand::Init => {
                if cli.config.exists() {
                    warn!("Overwriting settings at {}", cli.config.display());
                }
                Config::default().save_to_file(&cli.config)?;
                println!("Configuration file generated at: {}", cli.config.display());
            }
        },

        Commands::Instructions => println!("{}", menu::INSTRUCTIONS),

        Commands::Menu => menu::main_menu(config, &cli.config)?,
    }

    Ok(())
}
