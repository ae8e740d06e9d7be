// ndmigrate CLI binary

use std::path::PathBuf;
use clap::{Args, Parser, Subcommand};
use anyhow::Result;

use ndmigrate_lib::config::{MigrationConfig, Operation, SeparatorRewrite, ValidationMode};
use ndmigrate_lib::constants::DEFAULT_LOG_FILTER;
use ndmigrate_lib::migrate::{migrate_database, MigrationReport};

#[derive(Parser)]
#[command(name = "ndmigrate")]
#[command(about = "Move a Navidrome music library without losing play counts, ratings or playlists", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to navidrome.db
    db_path: PathBuf,

    /// Run everything inside a transaction that is always rolled back
    #[arg(short = 'd', short_alias = 'n', long, global = true)]
    dry_run: bool,

    /// Print the run report as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Files were already moved: point the database at the new location
    Migrate {
        /// Library root as stored in the database
        old: String,
        /// Where the files are now
        new: String,
        #[command(flatten)]
        checks: CheckArgs,
        #[command(flatten)]
        separators: SeparatorArgs,
    },

    /// Move the files, then point the database at them
    Move {
        /// Library root to move
        old: String,
        /// Destination; an existing directory receives the library under its own name
        new: String,
        #[command(flatten)]
        checks: CheckArgs,
        #[command(flatten)]
        separators: SeparatorArgs,
    },

    /// Rewrite stored paths without looking at the disk
    #[command(alias = "changeLink")]
    ChangeLink {
        old: String,
        new: String,
        #[command(flatten)]
        checks: CheckArgs,
        #[command(flatten)]
        separators: SeparatorArgs,
    },

    /// Recompute media file ids only; annotations and playlists are left alone
    Relink {
        old: String,
        new: String,
        #[command(flatten)]
        separators: SeparatorArgs,
    },
}

#[derive(Args)]
struct CheckArgs {
    /// How many destination files to check before writing
    #[arg(short = 'v', long, value_enum)]
    validation: Option<ValidationMode>,

    /// The old path covers only part of the library
    #[arg(long)]
    partial: bool,
}

#[derive(Args)]
struct SeparatorArgs {
    /// Rewrite `\` to `/` in every changed path
    #[arg(long, alias = "replace-slashes")]
    to_forward_slashes: bool,

    /// Rewrite `/` to `\` in every changed path
    #[arg(long)]
    to_backslashes: bool,
}

impl SeparatorArgs {
    fn resolve(&self) -> Result<SeparatorRewrite> {
        Ok(SeparatorRewrite::from_flags(self.to_forward_slashes, self.to_backslashes)?)
    }
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER));

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let report = migrate_database(&config)?;

    print_report(&report, cli.json)
}

fn build_config(cli: &Cli) -> Result<MigrationConfig> {
    let (operation, old, new, checks, separators) = match &cli.command {
        Commands::Migrate { old, new, checks, separators } => (Operation::Migrate, old, new, Some(checks), separators),
        Commands::Move { old, new, checks, separators } => (Operation::Move, old, new, Some(checks), separators),
        Commands::ChangeLink { old, new, checks, separators } => {
            (Operation::ChangeLink, old, new, Some(checks), separators)
        }
        Commands::Relink { old, new, separators } => (Operation::Relink, old, new, None, separators),
    };

    let mut config = MigrationConfig::new(&cli.db_path, operation, old.as_str(), new.as_str())
        .with_dry_run(cli.dry_run)
        .with_separators(separators.resolve()?);

    if let Some(checks) = checks {
        if let Some(validation) = checks.validation {
            config = config.with_validation(validation);
        }
        config = config.with_partial(checks.partial);
    }

    Ok(config)
}

fn print_report(report: &MigrationReport, json: bool) -> Result<()> {
    if json {
        println!("{}", report.status_line());
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    if let Some(moved_to) = &report.moved_to {
        println!("Moved {} to {}", report.old_prefix, moved_to.display());
    }
    println!("  Files checked:      {}", report.files_checked);
    println!("  Media files:        {}", report.media_files);
    println!("  Annotations:        {}", report.annotations);
    println!("  Genres:             {}", report.media_file_genres);
    println!("  Playlist tracks:    {}", report.playlist_tracks);
    println!("  Scrobbles:          {}", report.scrobble_buffer);
    println!("  Albums:             {}", report.albums);
    println!("  Playlists:          {}", report.playlists);
    println!("  Smart playlists:    {}", report.smart_playlists);
    println!("  Properties:         {}", report.properties);
    println!();
    println!("{}", report.status_line());

    Ok(())
}
