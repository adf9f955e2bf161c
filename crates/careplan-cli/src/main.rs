mod client;
mod config;
mod output;
mod plan_cmd;
mod serve_cmd;
mod submit_cmd;
#[cfg(test)]
mod test_util;

use std::sync::Arc;

use anyhow::bail;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};

use careplan_core::{ChatCompletionsAgent, PlanRequest, PlanningPipeline};

use config::{CareplanConfig, Overrides};

#[derive(Parser)]
#[command(name = "careplan", about = "LLM-backed healthcare care-plan generator")]
struct Cli {
    /// Model identifier (overrides CAREPLAN_MODEL and the config file)
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a careplan config file with default settings
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
        /// Port to store for `careplan serve`
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run the HTTP planning API
    Serve {
        /// Address to bind to
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },
    /// Generate a plan locally (prompts for a goal when none is given)
    Plan {
        /// Planning goal, e.g. "hypertension management plan"
        goal: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Send a plan request to a running server
    Submit {
        /// Planning goal / requirements
        goal: String,
        /// Server base URL
        #[arg(long, default_value = client::DEFAULT_SERVER_URL)]
        server: String,
        /// Patient name
        #[arg(long)]
        patient_name: String,
        /// Patient age
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=120))]
        age: Option<u32>,
        /// Medical condition
        #[arg(long)]
        condition: String,
        /// Request priority
        #[arg(long, value_enum, ignore_case = true)]
        priority: Option<Priority>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check whether a server is reachable
    Ping {
        /// Server base URL
        #[arg(long, default_value = client::DEFAULT_SERVER_URL)]
        server: String,
    },
    /// Print shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// Execute the `careplan init` command: write config file.
fn cmd_init(force: bool, model: Option<&str>, port: Option<u16>) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let mut cfg = config::ConfigFile::default();
    if let Some(model) = model {
        cfg.model.model = model.to_string();
    }
    if let Some(port) = port {
        cfg.server.port = port;
    }

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  model.model = {}", cfg.model.model);
    println!("  model.api_key_env = {}", cfg.model.api_key_env);
    println!("  server = {}:{}", cfg.server.bind, cfg.server.port);
    println!();
    println!(
        "Next: export {} and run `careplan serve` or `careplan plan`.",
        cfg.model.api_key_env
    );

    Ok(())
}

/// Build the pipeline from resolved configuration.
///
/// The taxonomy is loaded here, once, and shared by every request.
fn build_pipeline(resolved: &CareplanConfig) -> anyhow::Result<PlanningPipeline> {
    let agent_config = resolved.agent_config()?;
    let taxonomy = resolved.taxonomy()?;
    tracing::info!(
        model = %agent_config.model,
        categories = taxonomy.categories().len(),
        keywords = taxonomy.keyword_count(),
        "pipeline configured"
    );
    let agent = Arc::new(ChatCompletionsAgent::new(agent_config));
    Ok(PlanningPipeline::new(agent, taxonomy))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force, port } => {
            cmd_init(force, cli.model.as_deref(), port)?;
        }
        Commands::Serve { bind, port } => {
            let resolved = CareplanConfig::resolve(Overrides {
                model: cli.model.as_deref(),
                bind: bind.as_deref(),
                port,
            })?;
            let pipeline = build_pipeline(&resolved)?;
            serve_cmd::run_serve(pipeline, &resolved.bind, resolved.port).await?;
        }
        Commands::Plan { goal, json } => {
            let resolved = CareplanConfig::resolve(Overrides {
                model: cli.model.as_deref(),
                ..Overrides::default()
            })?;
            let pipeline = build_pipeline(&resolved)?;
            plan_cmd::run_plan(&pipeline, goal, json).await?;
        }
        Commands::Submit {
            goal,
            server,
            patient_name,
            age,
            condition,
            priority,
            json,
        } => {
            let request = PlanRequest {
                patient_name: Some(patient_name),
                age: age.map(i64::from),
                condition: Some(condition),
                priority: priority.map(|p| p.as_str().to_string()),
                requirements: Some(goal),
            };
            submit_cmd::run_submit(&server, &request, json).await?;
        }
        Commands::Ping { server } => {
            submit_cmd::run_ping(&server).await?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "careplan", &mut std::io::stdout());
        }
    }

    Ok(())
}
