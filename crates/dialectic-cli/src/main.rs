//! Dialectic CLI - run, list and replay multi-agent debates

mod demo;
mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dialectic_core::{DebateConfig, DebateOrchestrator, ScriptedJudge};
use dialectic_store::DirectoryStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dialectic")]
#[command(about = "Dialectic - multi-agent debates settled by ranked-choice consensus")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Check configuration validity
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "config/debate.toml")]
        config: PathBuf,
    },
    /// Run a scripted debate that converges on consensus
    Demo {
        /// Configuration file path (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Question to debate
        #[arg(short, long, default_value = demo::DEFAULT_QUESTION)]
        question: String,
        /// Save directory, overriding the configuration
        #[arg(long)]
        save_dir: Option<PathBuf>,
    },
    /// List saved debates, most recent first
    List {
        /// Save directory
        #[arg(short, long, default_value = "debates")]
        dir: PathBuf,
        /// Maximum number of debates to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Replay a saved debate
    Show {
        /// Save file name or path
        file: PathBuf,
        /// Save directory for bare file names
        #[arg(short, long, default_value = "debates")]
        dir: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<DebateConfig> {
    let mut config = match path {
        Some(path) => DebateConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => DebateConfig::default(),
    };
    config.apply_env().context("applying DEBATE_* overrides")?;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

async fn run_demo(
    config: Option<PathBuf>,
    question: String,
    save_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut config = load_config(config.as_deref())?;
    if let Some(dir) = save_dir {
        config.save.directory = dir;
    }

    print!("{}", render::config_summary(&config));
    println!();

    let panel = demo::panel(config.voting.voting_start_iteration, config.round_limit());
    let store = Arc::new(DirectoryStore::new(&config.save.directory));
    let mut orchestrator = DebateOrchestrator::new(config.clone(), panel)?
        .with_judge(Arc::new(ScriptedJudge::new()))
        .with_persister(store.clone());

    let cancel = orchestrator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, finishing the current step");
            cancel.cancel();
        }
    });

    let outcome = orchestrator.run(&question).await?;

    print!("{}", render::debate(&outcome.state)?);
    println!("\nOutcome: {}", outcome.reason);

    if outcome.persistence_failures > 0 {
        eprintln!(
            "warning: {} save attempts failed",
            outcome.persistence_failures
        );
    }
    if config.save.enabled {
        println!("Saved to {}", store.path_for(&outcome.state).display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Check { config }) => {
            let config = load_config(Some(&config))?;
            println!("Configuration OK\n");
            print!("{}", render::config_summary(&config));
        }
        Some(Commands::Demo {
            config,
            question,
            save_dir,
        }) => {
            run_demo(config, question, save_dir).await?;
        }
        Some(Commands::List { dir, limit }) => {
            let store = DirectoryStore::new(dir);
            let summaries = store.list(limit)?;
            print!("{}", render::debate_list(&summaries));
        }
        Some(Commands::Show { file, dir }) => {
            let store = DirectoryStore::new(dir);
            let state = store
                .load(&file)
                .with_context(|| format!("loading {}", file.display()))?;
            print!("{}", render::debate(&state)?);
        }
        None => {
            println!("Dialectic v{} - Use --help for commands", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
