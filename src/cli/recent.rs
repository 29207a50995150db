//! Recent searches command

use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::error::Result;
use crate::output::Formattable;
use crate::storage::Session;

#[derive(Tabled, Serialize)]
struct RecentDisplay {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "QUERY")]
    query: String,
}

/// Run the recent command. Needs no configuration.
pub fn run(opts: &GlobalOptions, clear: bool) -> Result<()> {
    let session = Session::open_default();

    if clear {
        session.clear_recent_searches();
        println!("{} Recent searches cleared", "✓".green());
        return Ok(());
    }

    let recent = session.recent_searches();
    match opts.format {
        OutputFormat::Pretty if recent.is_empty() => {
            println!("{}", "No recent searches.".dimmed());
        }
        OutputFormat::Pretty => {
            println!("{}\n", "Recent searches".bold());
            for query in &recent {
                println!("  {}", query.cyan());
            }
        }
        format => {
            let display: Vec<RecentDisplay> = recent
                .into_iter()
                .enumerate()
                .map(|(i, query)| RecentDisplay {
                    position: i + 1,
                    query,
                })
                .collect();
            display.print(format)?;
        }
    }

    Ok(())
}
