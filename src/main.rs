//! `dtx`: edit a datatext archive or serve it over HTTP

use anyhow::Context;
use clap::{Parser, Subcommand};
use datatext::{
    config::DEFAULT_CONFIG_NAME, editor::Editor, logging, viewer, DtxArchive, DtxConfig, LogLevel,
};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dtx")]
#[command(version, about = "Store files in a zip archive indexed by sequential ids", long_about = None)]
struct Cli {
    /// Archive file (default: data.dtx)
    #[arg(short = 'a', long = "archive", value_name = "PATH", global = true)]
    archive: Option<PathBuf>,

    /// TOML configuration file (default: dtx.toml when present)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Minimum log level
    #[arg(long = "log-level", value_enum, global = true)]
    log_level: Option<LogLevel>,

    /// Write JSON logs to a file instead of stderr
    #[arg(long = "log-file", value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    /// Debug logging
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive menu (default)
    Edit,

    /// Create an empty archive
    Create,

    /// Add files under their base names
    Add {
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },

    /// Remove a file by exact name
    Remove { name: String },

    /// Save the text of a file, by id, to OUTPUT
    Save { id: u32, output: PathBuf },

    /// List stored files with their sizes
    List,

    /// Print the id manifest
    Ids,

    /// Renumber the manifest
    Reindex,

    /// Serve the web viewer
    Serve {
        /// Listen address (default: 127.0.0.1:5000)
        #[arg(short = 'b', long = "bind", value_name = "ADDR")]
        bind: Option<SocketAddr>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    logging::init_logging(&config, cli.verbose)?;
    tracing::debug!(?config, "Loaded configuration");

    run(cli.command.unwrap_or(Command::Edit), config)
}

fn load_config(cli: &Cli) -> anyhow::Result<DtxConfig> {
    let mut config = match &cli.config {
        Some(path) => DtxConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_NAME);
            if default_path.exists() {
                DtxConfig::from_file(&default_path)
                    .with_context(|| format!("Failed to load config {}", default_path.display()))?
            } else {
                DtxConfig::default()
            }
        }
    };

    if let Some(archive) = &cli.archive {
        config.archive = archive.clone();
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(log_file) = &cli.log_file {
        config.log_file = Some(log_file.clone());
    }
    if let Some(Command::Serve { bind: Some(bind) }) = &cli.command {
        config.bind = *bind;
    }

    Ok(config)
}

fn run(command: Command, config: DtxConfig) -> anyhow::Result<()> {
    let path = config.archive.clone();

    match command {
        Command::Edit => {
            let archive = DtxArchive::open_or_create(&path)?;
            let stdin = io::stdin();
            let mut editor = Editor::new(archive, stdin.lock(), io::stdout());
            editor.run()?;
        }
        Command::Create => {
            DtxArchive::new(&path).create()?;
            println!("Created {}", path.display());
        }
        Command::Add { files } => {
            let archive = DtxArchive::open_or_create(&path)?;
            for file in files {
                let added = archive
                    .add_file(&file)
                    .with_context(|| format!("Failed to add {}", file.display()))?;
                println!("{}: {}", added.id, added.name);
            }
        }
        Command::Remove { name } => {
            if !DtxArchive::new(&path).remove(&name)? {
                anyhow::bail!("File '{}' not found in {}", name, path.display());
            }
            println!("File '{}' removed successfully.", name);
        }
        Command::Save { id, output } => {
            let name = DtxArchive::new(&path).save(id, &output)?;
            println!("Saved {} to {}", name, output.display());
        }
        Command::List => {
            for file in DtxArchive::new(&path).list()? {
                println!("{}", file);
            }
        }
        Command::Ids => {
            print!("{}", DtxArchive::new(&path).manifest()?.to_text());
        }
        Command::Reindex => {
            let manifest = DtxArchive::new(&path).reindex()?;
            println!("Reindexed {} files", manifest.len());
        }
        Command::Serve { .. } => {
            println!("Serving {} on http://{}", path.display(), config.bind);
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("Failed to start async runtime")?;
            runtime.block_on(viewer::serve(path, config.bind))?;
        }
    }

    Ok(())
}
