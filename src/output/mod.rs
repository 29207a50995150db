//! Output formatting for CLI results

use serde::Serialize;
use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::error::Result;

pub mod html;
pub mod json;
pub mod progress;
pub mod table;

/// Trait for types that can be formatted for output
pub trait Formattable {
    /// Format the data according to the specified format
    fn format(&self, format: OutputFormat) -> Result<String>;

    /// Format and print to stdout
    fn print(&self, format: OutputFormat) -> Result<()> {
        println!("{}", self.format(format)?);
        Ok(())
    }
}

/// Lists of display rows print as a table, a JSON envelope or an HTML table
impl<T: Tabled + Serialize> Formattable for Vec<T> {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Pretty | OutputFormat::Table => Ok(table::format_table(self)),
            OutputFormat::Json => Ok(json::format_json(self)?),
            OutputFormat::Html => Ok(html::format_html_table(self)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Tabled, Serialize)]
    struct Row {
        #[tabled(rename = "QUERY")]
        query: String,
    }

    #[test]
    fn test_vec_formats() {
        let rows = vec![Row {
            query: "mangrove".to_string(),
        }];

        assert!(rows.format(OutputFormat::Table).unwrap().contains("╭"));
        assert!(
            rows.format(OutputFormat::Json)
                .unwrap()
                .contains("\"query\": \"mangrove\"")
        );
        assert!(
            rows.format(OutputFormat::Html)
                .unwrap()
                .contains("<td>mangrove</td>")
        );
    }
}
