//! Sheet command: raw rows of any sheet

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::client::SheetRow;
use crate::error::Result;
use crate::output::{html, json, progress, table};

/// Column names in first-seen order across all rows
fn headers(rows: &[SheetRow]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.to_string());
            }
        }
    }
    headers
}

fn records(headers: &[String], rows: &[SheetRow]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| headers.iter().map(|h| row.value(h).to_string()).collect())
        .collect()
}

/// Run the sheet command
pub async fn run(opts: &GlobalOptions, name: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let data = ctx.data_service()?;

    let bar = progress::spinner(ctx.format, format!("Fetching {}...", name));
    let rows = data.get_sheet(name).await;
    bar.finish_and_clear();
    let rows = rows?;

    let headers = headers(&rows);
    let output = match ctx.format {
        OutputFormat::Json => json::format_json(&rows)?,
        OutputFormat::Html => html::format_html_records(&headers, &records(&headers, &rows)),
        OutputFormat::Pretty | OutputFormat::Table => {
            table::format_records(&headers, &records(&headers, &rows))
        }
    };
    println!("{}", output);

    Ok(())
}
