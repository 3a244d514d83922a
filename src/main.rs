use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pncompliance::{
    check_compliance, loader,
    reachability_graph::{build_reachability_graph_from, ReachabilityGraph},
    ExplorerConfig,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log exploration details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check every execution of a net against the goal model
    Check {
        /// Process model (textual net or .json)
        #[arg(short, long)]
        net: PathBuf,
        /// Goal model (.json)
        #[arg(short, long)]
        goals: PathBuf,
        /// Transition to goal element mapping (lines or .json)
        #[arg(short, long)]
        mapping: PathBuf,
        /// Explorer configuration (.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        max_depth: Option<usize>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the reachability graph of a net
    Graph {
        #[arg(short, long)]
        net: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        max_states: Option<usize>,
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .init();
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ExplorerConfig> {
    match path {
        Some(path) => ExplorerConfig::load(path).context("loading configuration"),
        None => Ok(ExplorerConfig::default()),
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Check {
            net,
            goals,
            mapping,
            config,
            max_depth,
            json,
        } => {
            let mut config = load_config(config.as_ref())?;
            if let Some(max_depth) = max_depth {
                config.max_depth = max_depth;
            }
            let process_model = loader::load_process_model(&net)
                .with_context(|| format!("loading process model {}", net.display()))?;
            let goal_model = loader::load_goal_model(&goals)
                .with_context(|| format!("loading goal model {}", goals.display()))?;
            let mapping = loader::load_mapping(&mapping)
                .with_context(|| format!("loading mapping {}", mapping.display()))?;

            let result = check_compliance(&goal_model, &process_model, &mapping, config);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", result);
            }
            Ok(if result.is_compliant {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Graph {
            net,
            config,
            max_states,
            json,
        } => {
            let config = load_config(config.as_ref())?;
            let process_model = loader::load_process_model(&net)
                .with_context(|| format!("loading process model {}", net.display()))?;
            let initial = process_model.initial_marking_with(config.initial_marking);
            let graph: ReachabilityGraph = build_reachability_graph_from(
                &process_model,
                initial,
                max_states.or(config.max_graph_states),
            )?;
            if json {
                println!("{}", serde_json::to_string_pretty(&graph)?);
            } else {
                print!("{}", graph);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
