mod commands;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use imagescrap_core::config::Config;
use imagescrap_core::Library;
use tracing_subscriber::EnvFilter;

/// Imagescrap: import, deduplicate and reorganize a media tree
#[derive(Parser)]
#[command(name = "imagescrap", version, about)]
struct Cli {
    /// Catalog file (defaults to <SOURCE>/.imagescrap/catalog.db)
    #[arg(long, global = true, env = "IMAGESCRAP_CATALOG")]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register every file under the source directory
    Scan {
        source: PathBuf,
    },
    /// Detect MIME types from file content
    Mimetype {
        source: PathBuf,
        /// Redo records that already have a type
        #[arg(long)]
        force: bool,
    },
    /// Hash file contents and group identical files
    Checksum {
        source: PathBuf,
        /// Re-hash records that already have a checksum
        #[arg(long)]
        force: bool,
    },
    /// Resolve creation dates from EXIF or the file name
    Dates {
        source: PathBuf,
        /// Redo records that already have a date
        #[arg(long)]
        force: bool,
    },
    /// Copy one file per checksum group into DEST/YYYY/MM
    Organize {
        source: PathBuf,
        dest: PathBuf,
        /// Keep going after a failed copy
        #[arg(long)]
        continue_on_error: bool,
    },
    /// Scan, then run every enrichment pass
    Run {
        source: PathBuf,
        #[arg(long)]
        force: bool,
    },
    /// Show catalog summary
    Info {
        source: PathBuf,
        /// Show the full files table
        #[arg(long)]
        files: bool,
        /// Show the checksum groups table
        #[arg(long)]
        groups: bool,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_library(source: &Path, catalog: Option<&Path>) -> Result<Library> {
    let mut config = Config::for_source(source);
    if let Some(path) = catalog {
        config = config.with_catalog_path(path);
    }
    Ok(Library::open_with_config(config)?)
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let catalog = cli.catalog.as_deref();

    match cli.command {
        Commands::Scan { source } => {
            commands::passes::scan(&mut open_library(&source, catalog)?)?
        }
        Commands::Mimetype { source, force } => {
            commands::passes::mimetype(&mut open_library(&source, catalog)?, force)?
        }
        Commands::Checksum { source, force } => {
            commands::passes::checksum(&mut open_library(&source, catalog)?, force)?
        }
        Commands::Dates { source, force } => {
            commands::passes::dates(&mut open_library(&source, catalog)?, force)?
        }
        Commands::Organize {
            source,
            dest,
            continue_on_error,
        } => commands::passes::organize(
            &mut open_library(&source, catalog)?,
            &dest,
            continue_on_error,
        )?,
        Commands::Run { source, force } => {
            commands::passes::run(&mut open_library(&source, catalog)?, force)?
        }
        Commands::Info {
            source,
            files,
            groups,
        } => commands::info::run(&mut open_library(&source, catalog)?, files, groups)?,
    }

    Ok(())
}
