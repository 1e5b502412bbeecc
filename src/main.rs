use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bishforge::{
    assessment::AssessmentClient,
    cli::{self, CliResult, Commands},
    config::{Config, LogFormat},
    error::AppResult,
    session::SessionOrchestrator,
    storage::{HistoryStore, SqliteStorage},
};

/// Analyze ML predictions for causality, common sense, generalization and safety.
#[derive(Parser, Debug)]
#[command(name = "bishforge", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    info!(version = env!("CARGO_PKG_VERSION"), "bishforge starting");

    let result = run(cli.command, config).await?;
    if result.exit_code == 0 {
        println!("{}", result.message);
    } else {
        eprintln!("{}", result.message);
    }
    std::process::exit(result.exit_code);
}

async fn run(command: Commands, config: Config) -> AppResult<CliResult> {
    match command {
        Commands::SetKey { api_key } => Ok(cli::execute_set_key(&api_key, &config.env_file)),
        Commands::Analyze(args) => {
            let history = open_history(&config).await?;
            let client = match AssessmentClient::new(&config.agent, config.request.clone()) {
                Ok(c) => {
                    info!(base_url = %c.base_url(), "Assessment client initialized");
                    c
                }
                Err(e) => {
                    error!(error = %e, "Failed to initialize assessment client");
                    return Err(e.into());
                }
            };
            let orchestrator = SessionOrchestrator::new(client, history, &config.agent.agent_id);
            Ok(cli::execute_analyze(&orchestrator, args).await)
        }
        Commands::History { command } => {
            let mut history = open_history(&config).await?;
            Ok(cli::execute_history(command, &mut history).await)
        }
    }
}

async fn open_history(config: &Config) -> AppResult<HistoryStore<SqliteStorage>> {
    let storage = match SqliteStorage::new(&config.database).await {
        Ok(s) => {
            info!(path = %config.database.path.display(), "Database initialized");
            s
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize database");
            return Err(e.into());
        }
    };
    Ok(HistoryStore::open(storage).await)
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
