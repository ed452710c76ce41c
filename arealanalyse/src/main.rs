//! Point d'entrée CLI pour arealanalyse

use anyhow::Result;
use arealanalyse::Config;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

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

mod cli;

use cli::{Commands, ServeArgs};

/// Surface d'occupation du sol AR5 à l'intérieur d'un polygone
#[derive(Parser)]
#[command(name = "arealanalyse")]
#[command(author, version)]
#[command(about = "Compute AR5 land-cover areas inside a polygon, over HTTP (default) or in batch")]
#[command(long_about = "Loads an AR5 land-resource dataset once and reports, for a WGS84 polygon, the area in m² of each land-cover category it overlaps.\n\nBy default, serves the HTTP API (POST /analyze). Use 'analyze' for a one-off analysis and 'info' for dataset metadata.")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Sous-commande (défaut: serve)
    #[command(subcommand)]
    command: Option<Commands>,

    /// Arguments du serveur (commande par défaut)
    #[command(flatten)]
    serve: ServeArgs,
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    let mut config = Config::from_env();

    match cli.command {
        Some(Commands::Serve(args)) => {
            cli::apply_serve_overrides(&mut config, &args);
            cli::cmd_serve(&config).await?;
        }
        Some(Commands::Analyze {
            dataset,
            polygon,
            json,
            overlaps,
            report,
        }) => {
            cli::apply_dataset_overrides(&mut config, &dataset);
            info!(path = %config.dataset_path.display(), polygon = ?polygon, "Batch analysis");
            cli::cmd_analyze(
                &config,
                polygon.as_deref(),
                json,
                overlaps.as_deref(),
                report.as_deref(),
            )?;
        }
        Some(Commands::Info { dataset, json }) => {
            cli::apply_dataset_overrides(&mut config, &dataset);
            cli::cmd_info(&config, json)?;
        }
        None => {
            // Commande par défaut: serve
            cli::apply_serve_overrides(&mut config, &cli.serve);
            cli::cmd_serve(&config).await?;
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

    // stdout reste réservé aux résultats (--json)
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
