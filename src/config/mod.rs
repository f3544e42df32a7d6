pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "ew2landers")]
#[command(about = "Builds the 910CPR static site from an Enrollware schedule snapshot")]
pub struct CliConfig {
    /// Path to the site configuration, relative to --root
    #[arg(short, long, default_value = "site.toml")]
    pub config: String,

    /// Repository root every configured path is resolved against
    #[arg(long, default_value = ".")]
    pub root: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log JSON lines instead of human-readable output")]
    pub log_json: bool,

    #[arg(long, help = "Log CPU/memory after each pipeline stage")]
    pub monitor: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Download the live Enrollware schedule page into the snapshot path
    Fetch {
        #[arg(long)]
        url: Option<String>,
    },
    /// Parse the snapshot into schedule.json
    Scrape {
        #[arg(long)]
        snapshot: Option<String>,
        #[arg(long)]
        out: Option<String>,
    },
    /// Check schedule.json for orphaned sessions and misnumbered sections
    Check {
        #[arg(long)]
        schedule: Option<String>,
    },
    /// Scrape session prices from Enrollware enroll pages into schedule.json
    Prices,
    /// Render the schedule page, session landers, course images and derived data files
    Site {
        #[arg(long, help = "Skip the per-session lander pages")]
        no_landers: bool,
        #[arg(long, help = "Skip the course thumbnail images")]
        no_images: bool,
    },
    /// Splice the snapshot's schedule panel into the homepage template
    Homepage {
        #[arg(long)]
        template: Option<String>,
        #[arg(long)]
        out: Option<String>,
    },
    /// Render course router landers from landers.config.json
    RouterLanders {
        #[arg(long)]
        landers_config: Option<String>,
    },
    /// Write docs/data/status.json describing the pipeline inputs
    Status {
        #[arg(long)]
        out: Option<String>,
        #[arg(long, help = "Succeed even when an input is missing or empty")]
        soft: bool,
    },
    /// Zip the output directory for deployment
    Bundle {
        #[arg(long, default_value = "site.zip")]
        out: String,
    },
    /// scrape + check + site + homepage
    Build,
}
