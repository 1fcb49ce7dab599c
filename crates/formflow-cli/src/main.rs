//! `formflow` command line tool
//!
//! Scaffolds flow definition files, checks them, and runs them offline.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;

mod commands;
mod config;
mod generator;
mod logging;

use config::CliConfig;
use generator::FlowScaffold;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a new `<name>.flow.yaml` file
    Generate {
        /// Flow name (snake_case)
        name: String,

        /// Step ids in order (snake_case)
        #[arg(required = true)]
        steps: Vec<String>,

        /// Description written into the file
        #[arg(long)]
        description: Option<String>,

        /// Directory to write into
        #[arg(long, short, default_value = ".")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate flow files or directories of flow files
    Check {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Print the step following `--step` for the given data
    Next {
        #[arg(long)]
        file: PathBuf,

        #[arg(long)]
        flow: String,

        #[arg(long)]
        step: String,

        /// Submission data as a JSON object of step objects
        #[arg(long)]
        data: Option<String>,
    },

    /// Post a list of answers through a flow with an in-memory store
    Simulate {
        #[arg(long)]
        file: PathBuf,

        #[arg(long)]
        flow: String,

        /// JSON array of `{"step": ..., "values": {...}}`
        #[arg(long)]
        answers: PathBuf,

        #[arg(long, default_value = "simulation")]
        session: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load();

    logging::init_logging(&config).context("Failed to initialize logging")?;
    config.warn_rejected();

    let mut stdout = io::stdout().lock();

    match cli.command {
        Command::Generate {
            name,
            steps,
            description,
            output,
            force,
        } => {
            let mut scaffold = FlowScaffold::new(name, steps);
            if let Some(description) = description {
                scaffold = scaffold.with_description(description);
            }
            commands::generate(&mut stdout, &scaffold, &output, force)?;
        }
        Command::Check { paths } => {
            commands::check(&mut stdout, &paths)?;
        }
        Command::Next {
            file,
            flow,
            step,
            data,
        } => {
            commands::next(&mut stdout, &file, &flow, &step, data.as_deref())?;
        }
        Command::Simulate {
            file,
            flow,
            answers,
            session,
        } => {
            let answers = commands::read_answers(&answers)?;
            commands::simulate(&mut stdout, &file, &flow, &answers, &session, config.progression)
                .await?;
        }
    }

    Ok(())
}
