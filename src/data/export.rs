//! Delimited-text export of sheet rows

use crate::client::SheetRow;

/// Render rows as comma-separated text.
///
/// The header line lists the keys of the first row, skipping any that start
/// with `_`, unquoted. Each data line quotes every one of those fields and
/// doubles embedded quotes. No rows gives an empty string.
pub fn to_delimited_text(rows: &[SheetRow]) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };

    let headers: Vec<&str> = first.keys().filter(|k| !k.starts_with('_')).collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(headers.join(","));
    lines.extend(rows.iter().map(|row| {
        headers
            .iter()
            .map(|h| format!("\"{}\"", row.value(h).replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(",")
    }));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> SheetRow {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(to_delimited_text(&[]), "");
    }

    #[test]
    fn test_quotes_are_doubled() {
        let rows = vec![row(&[("A", "x\"y"), ("B", "z")])];

        assert_eq!(to_delimited_text(&rows), "A,B\n\"x\"\"y\",\"z\"");
    }

    #[test]
    fn test_underscore_keys_are_excluded() {
        let rows = vec![
            row(&[("NAME", "Ann"), ("_sheet", "People"), ("_score", "10")]),
            row(&[("NAME", "Ben"), ("_sheet", "People"), ("_score", "1")]),
        ];

        assert_eq!(to_delimited_text(&rows), "NAME\n\"Ann\"\n\"Ben\"");
    }

    #[test]
    fn test_columns_follow_first_row() {
        let rows = vec![
            row(&[("A", "1"), ("B", "2")]),
            row(&[("B", "3"), ("C", "4")]),
        ];

        assert_eq!(to_delimited_text(&rows), "A,B\n\"1\",\"2\"\n\"\",\"3\"");
    }

    #[test]
    fn test_commas_and_newlines_stay_inside_quotes() {
        let rows = vec![row(&[("NOTE", "a, b\nc")])];

        assert_eq!(to_delimited_text(&rows), "NOTE\n\"a, b\nc\"");
    }
}
