//! fmaportal - terminal client for the FMA portal

use clap::{CommandFactory, Parser};

mod cache;
mod cli;
mod client;
mod config;
mod data;
mod error;
mod output;
mod router;
mod storage;

use cli::args::GlobalOptions;
use cli::{Cli, Commands};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise warnings, or our own debug output with `--debug`
fn init_logging(debug: bool) {
    let default = if debug { "fmaportal=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Init => cli::init::run(&opts).await,
        Commands::Status => cli::status::run(&opts),
        Commands::Version => {
            println!("fmaportal version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Open { fragment } => cli::open::run(&opts, &fragment).await,
        Commands::Browse { fragment } => cli::browse::run(&opts, fragment.as_deref()).await,
        Commands::Stats => cli::stats::run(&opts).await,
        Commands::Directory { kind, export } => {
            cli::directory::run(&opts, &kind, export.as_deref()).await
        }
        Commands::Search { query } => cli::search::run(&opts, &query).await,
        Commands::Recent { clear } => cli::recent::run(&opts, clear),
        Commands::Sheet { name } => cli::sheet::run(&opts, &name).await,
        Commands::Completion { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "fmaportal",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}
