mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use quire_config::Config;
use quire_engine::{FsStore, ParseOptions};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

/// Work with quire documents from the command line
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Store directory, overriding `store_path` from the config file
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Ignore inline `style` attributes when reading markup
    #[arg(long, global = true)]
    no_sniff: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse markup and print the document as JSON
    Parse {
        /// Markup file, `-` for stdin
        input: PathBuf,

        /// Print on a single line
        #[arg(long)]
        compact: bool,
    },

    /// Render a JSON document back to markup
    Render {
        /// JSON document file, `-` for stdin
        input: PathBuf,
    },

    /// Parse markup and render it again in canonical form
    Normalize {
        /// Markup file, `-` for stdin
        input: PathBuf,
    },

    /// Compare the text of two markup files
    Diff {
        before: PathBuf,
        after: PathBuf,

        /// Print the full diff as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Apply a file of JSON actions to a markup file through an edit session
    Edit {
        /// Markup file, `-` for stdin
        input: PathBuf,

        /// JSON file holding one action or an array of actions
        #[arg(short, long)]
        actions: PathBuf,
    },

    /// Store markup as the next revision of a document
    Save {
        doc_id: String,

        /// Markup file, `-` for stdin
        input: PathBuf,
    },

    /// Print a stored revision, the latest by default
    Show {
        doc_id: String,

        #[arg(short, long)]
        revision: Option<u64>,
    },

    /// List stored revisions with what changed in each
    History { doc_id: String },
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load_or_default()?;
    let options = ParseOptions {
        sniff_styles: config.editor.sniff_styles && !cli.no_sniff,
    };
    let store_path = cli.store.unwrap_or(config.store_path);
    log::debug!("Store path: {}", store_path.display());

    let output = match cli.command {
        Command::Parse { input, compact } => {
            commands::parse(&read_input(&input)?, &options, compact)?
        }
        Command::Render { input } => commands::render(&read_input(&input)?)?,
        Command::Normalize { input } => commands::normalize(&read_input(&input)?, &options),
        Command::Diff {
            before,
            after,
            json,
        } => commands::diff(&read_input(&before)?, &read_input(&after)?, &options, json)?,
        Command::Edit { input, actions } => {
            commands::edit(&read_input(&input)?, &read_input(&actions)?, options)?
        }
        Command::Save { doc_id, input } => {
            let mut store = FsStore::new(store_path);
            let revision = commands::save(&mut store, &doc_id, &read_input(&input)?, &options)?;
            log::info!("Saved {doc_id} revision {revision}");
            revision.to_string()
        }
        Command::Show { doc_id, revision } => {
            commands::show(&FsStore::new(store_path), &doc_id, revision)?
        }
        Command::History { doc_id } => {
            commands::history(&FsStore::new(store_path), &doc_id, &options)?
        }
    };

    println!("{output}");
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        io::stdin().read_to_string(&mut content)?;
        return Ok(content);
    }
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))
}
