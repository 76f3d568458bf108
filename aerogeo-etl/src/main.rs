//! Point d'entrée CLI pour aerogeo-etl

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use aerogeo_etl::cli::{self, Commands};

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

/// Normaliser le registre des aérogénérateurs de l'ANEEL
#[derive(Parser)]
#[command(name = "aerogeo-etl")]
#[command(author, version)]
#[command(about = "Collecter, normaliser et exporter le registre des aérogénérateurs de l'ANEEL")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Run { common, snapshot } => {
            info!(config = %common.config, "Exécution complète de l'ETL");
            cli::cmd_run(&common, snapshot.as_deref()).await?;
        }
        Commands::Fetch { config, output } => {
            info!(config = %config, output = %output.display(), "Collecte vers un instantané");
            cli::cmd_fetch(&config, &output).await?;
        }
        Commands::Process { input, common } => {
            info!(input = %input.display(), "Traitement d'un instantané");
            cli::cmd_process(&input, &common)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
