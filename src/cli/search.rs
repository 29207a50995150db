//! Search command implementation

use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::args::GlobalOptions;
use crate::cli::open::print_page;
use crate::cli::{CommandContext, OutputFormat};
use crate::data::SearchHit;
use crate::error::Result;
use crate::output::{Formattable, json, progress};
use crate::storage::Session;

/// Search hit for table display
#[derive(Tabled, Serialize)]
struct HitDisplay {
    #[tabled(rename = "SHEET")]
    sheet: String,
    #[tabled(rename = "TITLE")]
    title: String,
    #[tabled(rename = "MATCHED")]
    matched: String,
    #[tabled(rename = "SCORE")]
    score: u32,
}

impl From<SearchHit> for HitDisplay {
    fn from(hit: SearchHit) -> Self {
        let title = hit.row.iter().next().map(|(_, v)| v.to_string()).unwrap_or_default();
        let matched = format!("{}: {}", hit.field, hit.matched_value());
        Self {
            sheet: hit.sheet,
            title,
            matched,
            score: hit.score,
        }
    }
}

/// Run the search command.
///
/// The query is remembered among the recent searches. HTML output renders
/// the portal's search page; the other formats list the hits.
pub async fn run(opts: &GlobalOptions, words: &[String]) -> Result<()> {
    let query = words.join(" ");
    let ctx = CommandContext::new(opts)?;

    if ctx.format == OutputFormat::Html {
        let mut router = ctx.router()?;
        let result = router.global_search(&query).await;
        print_page(&router, ctx.format)?;
        return result.map(|_| ());
    }

    let data = ctx.data_service()?;
    if !query.trim().is_empty() {
        Session::open_default().record_search(&query);
    }

    let bar = progress::spinner(ctx.format, format!("Searching for '{}'...", query));
    let results = data.search_all(&query).await;
    bar.finish_and_clear();
    let results = results?;

    match ctx.format {
        OutputFormat::Json => println!("{}", json::format_json(&results)?),
        format => {
            if format == OutputFormat::Pretty {
                println!(
                    "Search results for: {} ({})\n",
                    query.bold(),
                    results.results.len()
                );
                if !results.suggestions.is_empty() {
                    println!("{} {}\n", "Suggestions:".dimmed(), results.suggestions.join(", "));
                }
            }
            let display: Vec<HitDisplay> = results.results.into_iter().map(HitDisplay::from).collect();
            display.print(format)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SheetRow;

    #[test]
    fn test_display_uses_first_column_as_title() {
        let row: SheetRow = [("TITLE", "Coastal Plan"), ("LOCATION", "Lucena")]
            .into_iter()
            .collect();
        let hit = SearchHit {
            row,
            sheet: "Activities".to_string(),
            score: 1,
            field: "LOCATION".to_string(),
        };

        let display = HitDisplay::from(hit);

        assert_eq!(display.title, "Coastal Plan");
        assert_eq!(display.matched, "LOCATION: Lucena");
        assert_eq!(display.sheet, "Activities");
    }
}
