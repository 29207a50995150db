//! Status command implementation

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::config::{Config, DEFAULT_API_BASE};
use crate::error::Result;
use crate::storage::{Session, SqliteStore};

/// Run the status command to display configuration status
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "fmaportal Configuration Status".bold());

    match Config::load_at(opts.config_ref()) {
        Ok(mut config) => {
            config.apply_env_overrides();
            if let Some(site) = opts.site_url_ref() {
                config.site_url = Some(site.to_string());
            }

            let config_path = Config::resolve_path(opts.config_ref())?;
            println!("Config file: {}", config_path.display().to_string().cyan());
            println!();

            if config.api_key.as_deref().is_some_and(|k| !k.is_empty()) {
                println!("{} API key configured", "✓".green());
            } else {
                println!("{} API key not configured", "✗".red());
                println!("  → Run 'fmaportal init' to configure");
            }

            match config.spreadsheet_id.as_deref().filter(|s| !s.is_empty()) {
                Some(id) => println!("{} Spreadsheet: {}", "✓".green(), id),
                None => {
                    println!("{} Spreadsheet not configured", "✗".red());
                    println!("  → Run 'fmaportal init' to choose one");
                }
            }

            if config.api_base != DEFAULT_API_BASE {
                println!("{} Custom API host: {}", "○".dimmed(), config.api_base.cyan());
            }

            match &config.site_url {
                Some(site) => println!("{} Page partials from: {}", "○".dimmed(), site.cyan()),
                None => println!("{} Page partials: bundled", "○".dimmed()),
            }

            println!(
                "{} Cache lifetime: {}s",
                "○".dimmed(),
                config.cache_ttl_secs
            );
        }
        Err(_) => {
            println!("{} Configuration not found", "✗".red());
            println!();
            println!(
                "Run {} to create a configuration file.",
                "fmaportal init".cyan()
            );
        }
    }

    println!();
    match SqliteStore::data_dir() {
        Ok(dir) => println!("Local storage: {}", dir.display().to_string().cyan()),
        Err(e) => println!("{} Local storage unavailable: {}", "⚠".yellow(), e),
    }

    let session = Session::open_default();
    if let Some(page) = session.last_page() {
        println!("{} Last page: {}", "○".dimmed(), page);
    }
    let recent = session.recent_searches();
    if !recent.is_empty() {
        println!("{} Recent searches: {}", "○".dimmed(), recent.join(", ").dimmed());
    }
    println!();

    Ok(())
}
