use anyhow::Result;
use clap::{Parser, Subcommand};
use docflow::cli::{self, OutputMode, RunOptions};
use docflow::config::DocflowConfig;
use docflow::logging;
use docflow::workflow::CancellationToken;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docflow")]
#[command(about = "Run declarative document-processing workflows")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project directory (defaults to current)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Suppress normal output
    #[arg(long, global = true)]
    quiet: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a workflow
    Run {
        /// Workflow name or path
        workflow: String,

        /// Skip ai.* actions and record what they would have done
        #[arg(long)]
        dry_run: bool,

        /// Show a preview of each step's output
        #[arg(long)]
        verbose: bool,

        /// Output mode: console, json or quiet
        #[arg(long)]
        output: Option<OutputMode>,
    },

    /// Validate a workflow without running
    Validate {
        /// Workflow name or path
        workflow: String,
    },

    /// List available actions
    Actions,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let project_dir = cli.dir.as_deref();
    let config = DocflowConfig::load(project_dir)?;

    let log_file = cli.log_file.clone().or_else(|| config.defaults.log_file.clone());
    logging::init_logging(cli.debug, cli.quiet, log_file)?;

    let code = match cli.command {
        Commands::Run {
            workflow,
            dry_run,
            verbose,
            output,
        } => {
            let output = match output {
                Some(mode) => mode,
                None if cli.quiet => OutputMode::Quiet,
                None => config
                    .defaults
                    .output
                    .as_deref()
                    .map(str::parse::<OutputMode>)
                    .transpose()
                    .map_err(anyhow::Error::msg)?
                    .unwrap_or_default(),
            };
            let options = RunOptions {
                dry_run: dry_run || config.defaults.dry_run(),
                verbose: verbose || config.defaults.verbose(),
                output,
            };

            let token = CancellationToken::new();
            let signal_token = token.clone();
            tokio::spawn(async move {
                if let Err(e) = cli::setup_signal_handlers(signal_token).await {
                    tracing::warn!(error = %e, "Failed to install signal handlers");
                }
            });

            let handler = cli::create_handler(output, cli.debug);
            match cli::run_workflow(&workflow, project_dir, options, &config, handler, token)
                .await
            {
                Ok(code) => code,
                Err(e) => {
                    eprintln!("Error: {:#}", e);
                    1
                }
            }
        }

        Commands::Validate { workflow } => {
            let mode = if cli.quiet {
                OutputMode::Quiet
            } else {
                OutputMode::Console
            };
            let handler = cli::create_handler(mode, cli.debug);
            cli::validate_workflow(&workflow, project_dir, handler.as_ref())
        }

        Commands::Actions => {
            let handler = cli::create_handler(OutputMode::Console, cli.debug);
            cli::list_actions(&config, handler.as_ref());
            0
        }
    };

    std::process::exit(code);
}
