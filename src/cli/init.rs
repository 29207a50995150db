//! Init command implementation

use colored::Colorize;
use dialoguer::{Input, Password, theme::ColorfulTheme};

use crate::cli::args::GlobalOptions;
use crate::client::{SheetSource, SheetsClient};
use crate::config::Config;
use crate::error::Result;

/// Run the init command
///
/// Prompts for the API key, spreadsheet and optional partial site, checks
/// that the spreadsheet can be read and saves the configuration. An existing
/// file keeps its sheet names and cache settings.
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}", "Welcome to fmaportal!".bold().green());
    println!("Let's connect to the portal spreadsheet.\n");

    let mut config = Config::load_at(opts.config_ref()).unwrap_or_default();
    let theme = ColorfulTheme::default();

    let api_key: String = Password::with_theme(&theme)
        .with_prompt("Enter your Sheets API key")
        .interact()?;

    let mut spreadsheet = Input::<String>::with_theme(&theme).with_prompt("Spreadsheet ID");
    if let Some(existing) = &config.spreadsheet_id {
        spreadsheet = spreadsheet.default(existing.clone());
    }
    let spreadsheet_id = spreadsheet.interact_text()?;

    let site_url: String = Input::with_theme(&theme)
        .with_prompt("Site URL for page partials (blank for the bundled pages)")
        .allow_empty(true)
        .default(config.site_url.clone().unwrap_or_default())
        .interact_text()?;

    config.api_key = Some(api_key.trim().to_string());
    config.spreadsheet_id = Some(spreadsheet_id.trim().to_string());
    config.site_url = match site_url.trim() {
        "" => None,
        site => Some(site.to_string()),
    };
    config.validate()?;

    println!("\n{}", "Checking spreadsheet access...".cyan());
    let client = SheetsClient::from_config(&config)?;
    let sheet = config.sheets.implementation_structure.clone();
    match client.fetch_table(&sheet).await {
        Ok(rows) => println!(
            "{} Read {} rows from {}",
            "✓".green(),
            rows.len(),
            sheet.bold()
        ),
        Err(e) => {
            println!("{} Could not read {}: {}", "⚠".yellow(), sheet, e);
            println!("  Saving anyway; check the key and the sheet names in the config file.");
        }
    }

    config.save_at(opts.config_ref())?;

    let config_path = Config::resolve_path(opts.config_ref())?;
    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Show configuration status", "fmaportal status".cyan());
    println!("  {} - Show the home page counters", "fmaportal stats".cyan());
    println!("  {} - Browse the portal", "fmaportal browse".cyan());

    Ok(())
}
