//! Table output formatting

use tabled::{
    Table, Tabled,
    builder::Builder,
    settings::{Alignment, Modify, Style, object::Rows},
};

/// Format data as a table
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    if data.is_empty() {
        return "No results found.".to_string();
    }

    let mut table = Table::new(data);
    style(&mut table);
    table.to_string()
}

/// Format rows whose columns are only known at runtime
pub fn format_records(headers: &[String], records: &[Vec<String>]) -> String {
    if records.is_empty() {
        return "No results found.".to_string();
    }

    let mut builder = Builder::default();
    builder.push_record(headers.iter().cloned());
    for record in records {
        builder.push_record(record.iter().cloned());
    }

    let mut table = builder.build();
    style(&mut table);
    table.to_string()
}

fn style(table: &mut Table) {
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Tabled)]
    struct TestRow {
        #[tabled(rename = "SHEET")]
        sheet: String,
        #[tabled(rename = "MATCH")]
        matched: String,
    }

    #[test]
    fn test_format_table_empty() {
        let items: Vec<TestRow> = vec![];
        assert_eq!(format_table(&items), "No results found.");
    }

    #[test]
    fn test_format_table_rows() {
        let items = vec![
            TestRow {
                sheet: "Activities".to_string(),
                matched: "Coastal Plan".to_string(),
            },
            TestRow {
                sheet: "Reference_Files".to_string(),
                matched: "Plan Template".to_string(),
            },
        ];

        let result = format_table(&items);

        assert!(result.contains("SHEET"));
        assert!(result.contains("Coastal Plan"));
        assert!(result.contains("Plan Template"));
        // Rounded style uses ╭ for top-left corner
        assert!(result.contains("╭"));
        assert!(result.contains("╰"));
    }

    #[test]
    fn test_format_records() {
        let headers = vec!["FMA_ID".to_string(), "PROVINCE".to_string()];
        let records = vec![vec!["FMA 06".to_string(), "Quezon".to_string()]];

        let result = format_records(&headers, &records);

        assert!(result.contains("FMA_ID"));
        assert!(result.contains("Quezon"));
        assert!(result.contains("╭"));
        assert_eq!(format_records(&headers, &[]), "No results found.");
    }
}
