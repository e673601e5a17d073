//! Point d'entrée CLI pour dem-coverage

use anyhow::Result;
use clap::Parser;
use tracing::Level;
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

use cli::{Commands, RunArgs, Stage};

/// Contour de couverture d'un MNT et géométries hors couverture
#[derive(Parser)]
#[command(name = "dem-coverage")]
#[command(author, version)]
#[command(about = "Derive a DEM coverage boundary and report vector features outside it")]
#[command(long_about = "Builds a +1/-1 coverage mask from the valid pixels of a DEM, traces and reprojects its boundary, then writes the part of each candidate GeoJSON file that lies outside the boundary.\n\nWithout a subcommand, runs the whole pipeline ('run').")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Augmenter la verbosité (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Sous-commande (défaut: run)
    #[command(subcommand)]
    command: Option<Commands>,

    /// Arguments du run complet (commande par défaut)
    #[command(flatten)]
    run: RunArgs,
}

fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Some(Commands::Run(args)) => cli::cmd_run(&args, Stage::All),
        Some(Commands::Boundary(args)) => cli::cmd_run(&args, Stage::Boundary),
        Some(Commands::Report(args)) => cli::cmd_run(&args, Stage::Report),
        None => cli::cmd_run(&cli.run, Stage::All),
    }
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
