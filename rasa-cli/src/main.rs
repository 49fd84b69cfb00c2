//! RASA CLI - drive the knowledge bank, tools, and router from a terminal

mod repl;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rasa_core::config::RasaConfig;
use rasa_core::knowledge::KnowledgeBank;
use rasa_core::tools::{knowledge_registry, CapabilityPolicy, ToolRegistry, ToolRuntime};
use rasa_core::workflow::{AssistantState, IntentRouter};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "rasa")]
#[command(about = "Research And Study Assistant CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to rasa.toml and RASA_* variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Version information
    Version,
    /// Print the knowledge tools and their schemas as JSON
    Tools,
    /// Show how a message would be routed
    Route {
        /// The user message
        message: String,
    },
    /// Save two findings on mitosis and print the summary
    Demo,
    /// Interactive session against an in-memory bank
    Repl {
        /// User the session belongs to
        #[arg(short, long, env = "RASA_USER", default_value = "student")]
        user: String,
    },
}

/// Everything a command needs, built once from configuration
pub(crate) struct App {
    pub bank: Arc<KnowledgeBank>,
    pub registry: ToolRegistry,
    pub router: IntentRouter,
    pub research: ToolRuntime,
    pub study: ToolRuntime,
}

impl App {
    fn new(config: &RasaConfig) -> Result<Self> {
        let bank = Arc::new(
            KnowledgeBank::from_config(&config.knowledge)
                .context("failed to build knowledge bank")?,
        );
        let registry = knowledge_registry(Arc::clone(&bank))?;
        let router = IntentRouter::new(&config.router)?;

        Ok(Self {
            bank,
            registry,
            router,
            research: ToolRuntime::with_config(CapabilityPolicy::research_agent(), &config.tools),
            study: ToolRuntime::with_config(CapabilityPolicy::study_agent(), &config.tools),
        })
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<RasaConfig> {
    let config = match path {
        Some(path) => RasaConfig::from_file(path)?,
        None => RasaConfig::load()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("rasa {}", env!("CARGO_PKG_VERSION"));
        println!("rasa-core {}", rasa_core::VERSION);
        return Ok(());
    }

    let config = load_config(cli.config.as_ref())?;
    let app = App::new(&config)?;

    match cli.command {
        Commands::Version => {}
        Commands::Tools => {
            println!("{}", serde_json::to_string_pretty(&app.registry.list())?);
        }
        Commands::Route { message } => {
            let mut state = AssistantState::new("cli");
            state.push_user(message);
            let decision = app.router.route(&mut state)?;
            println!("{}", serde_json::to_string_pretty(&decision)?);
        }
        Commands::Demo => {
            let summary = repl::demo(&app).await?;
            println!("{}", summary);
        }
        Commands::Repl { user } => {
            repl::run(&app, &user).await?;
        }
    }

    app.bank.shutdown()?;
    Ok(())
}
