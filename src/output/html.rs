//! HTML table output

use tabled::Tabled;

use crate::router::render::escape_html;

/// Format display rows as an HTML table
pub fn format_html_table<T: Tabled>(data: &[T]) -> String {
    let headers: Vec<String> = T::headers().into_iter().map(|h| h.into_owned()).collect();
    let records: Vec<Vec<String>> = data
        .iter()
        .map(|row| row.fields().into_iter().map(|f| f.into_owned()).collect())
        .collect();
    format_html_records(&headers, &records)
}

/// Format runtime columns as an HTML table
pub fn format_html_records(headers: &[String], records: &[Vec<String>]) -> String {
    let head: String = headers
        .iter()
        .map(|h| format!("<th>{}</th>", escape_html(h)))
        .collect();
    let body: String = records
        .iter()
        .map(|record| {
            let cells: String = record
                .iter()
                .map(|c| format!("<td>{}</td>", escape_html(c)))
                .collect();
            format!("<tr>{}</tr>", cells)
        })
        .collect();

    format!(
        "<table class=\"table\"><thead><tr>{}</tr></thead><tbody>{}</tbody></table>",
        head, body
    )
}
