//! Directory command implementation

use std::path::Path;

use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::data::{DirectoryEntry, DirectoryKind, to_delimited_text};
use crate::error::Result;
use crate::output::{Formattable, json, progress};

/// Directory entry for table display
#[derive(Tabled, Serialize)]
struct EntryDisplay {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "POSITION")]
    position: String,
    #[tabled(rename = "AFFILIATION")]
    affiliation: String,
    #[tabled(rename = "EMAIL")]
    email: String,
}

impl From<DirectoryEntry> for EntryDisplay {
    fn from(entry: DirectoryEntry) -> Self {
        Self {
            name: entry.full_name(),
            affiliation: entry.affiliation().to_string(),
            position: entry.position,
            email: entry.email,
        }
    }
}

/// Run the directory command
pub async fn run(opts: &GlobalOptions, kind: &str, export: Option<&Path>) -> Result<()> {
    let kind: DirectoryKind = kind.parse()?;
    let ctx = CommandContext::new(opts)?;
    let data = ctx.data_service()?;

    if let Some(path) = export {
        let bar = progress::spinner(ctx.format, format!("Exporting {}...", kind.title()));
        let rows = data.get_directory_rows(kind).await;
        bar.finish_and_clear();
        let rows = rows?;

        std::fs::write(path, to_delimited_text(&rows))?;
        println!(
            "{} Exported {} {} entries to {}",
            "✓".green(),
            rows.len(),
            kind,
            path.display()
        );
        return Ok(());
    }

    let bar = progress::spinner(ctx.format, format!("Loading {}...", kind.title()));
    let entries = data.get_directory(kind.as_str()).await;
    bar.finish_and_clear();
    let entries = entries?;

    match ctx.format {
        OutputFormat::Json => println!("{}", json::format_json(&entries)?),
        OutputFormat::Pretty => {
            println!("{} ({})\n", kind.title().bold(), entries.len());
            let display: Vec<EntryDisplay> = entries.into_iter().map(EntryDisplay::from).collect();
            display.print(OutputFormat::Table)?;
        }
        format => {
            let display: Vec<EntryDisplay> = entries.into_iter().map(EntryDisplay::from).collect();
            display.print(format)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_from_entry() {
        let entry = DirectoryEntry {
            given_name: "Ann".to_string(),
            middle_initial: "B".to_string(),
            last_name: "Cruz".to_string(),
            position: "Planner".to_string(),
            email: "ann@example.org".to_string(),
            component: "TWG".to_string(),
            office: String::new(),
            employment_type: String::new(),
            fma_lead: String::new(),
        };
        let affiliation = entry.affiliation().to_string();

        let display = EntryDisplay::from(entry);

        assert_eq!(display.name, "Ann B. Cruz");
        assert_eq!(display.position, "Planner");
        assert_eq!(display.email, "ann@example.org");
        assert_eq!(display.affiliation, affiliation);
    }
}
