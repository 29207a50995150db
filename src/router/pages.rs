//! Page initializers
//!
//! Each initializer loads its data through the [`DataService`] and fills the
//! regions of the partial just injected. Load failures are rendered into the
//! initializer's own region and never abort the navigation. A missing region
//! means the partial does not show that data and the initializer does nothing.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use super::AppState;
use super::document::HtmlDocument;
use super::render::{alert, empty_state, escape_html, format_date, or_placeholder};
use super::routes::{Page, Route, search_fragment};
use crate::client::SheetSource;
use crate::config::SheetNames;
use crate::data::{
    Activity, DataService, DirectoryEntry, DirectoryKind, ProfileCharacteristic, SearchHit,
};

const NOT_SPECIFIED: &str = "Not Specified";

/// Recent activities shown on the home page
const RECENT_ACTIVITIES: usize = 3;

/// Run the initializer of `page`
pub async fn init_page<S: SheetSource>(
    page: Page,
    route: &Route,
    data: &DataService<S>,
    doc: &mut HtmlDocument,
    state: &mut AppState,
) {
    doc.set_active_nav(page);
    match page {
        Page::Home => {
            load_quick_stats(data, doc).await;
            load_recent_activities(data, doc).await;
        }
        Page::Structure => load_structure(data, doc).await,
        Page::Municipalities => load_municipalities(data, doc).await,
        Page::Activities => load_activities(data, doc).await,
        Page::Directory => {
            let kind = route
                .param("type")
                .unwrap_or_else(|| DirectoryKind::default().to_string());
            load_directory(data, doc, state, &kind).await;
        }
        Page::References => load_references(data, doc).await,
        Page::Search => load_search_results(data, doc, route).await,
        Page::FmaProfile => load_fma_profile(data, doc).await,
        Page::About | Page::LearnMore => {}
    }
}

async fn load_quick_stats<S: SheetSource>(data: &DataService<S>, doc: &mut HtmlDocument) {
    match data.get_quick_stats().await {
        Ok(stats) => {
            doc.set_text("stat-internal", &stats.internal_count.to_string());
            doc.set_text("stat-activities", &stats.activities_count.to_string());
            doc.set_text("stat-files", &stats.files_count.to_string());
        }
        Err(e) => {
            log::error!("Error loading quick stats: {}", e);
            for id in ["stat-internal", "stat-activities", "stat-files"] {
                doc.set_text(id, "-");
            }
        }
    }
}

/// Activities ordered most recent first; undated ones last
pub fn most_recent_first(mut activities: Vec<Activity>) -> Vec<Activity> {
    activities.sort_by_key(|a| Reverse(a.date()));
    activities
}

async fn load_recent_activities<S: SheetSource>(data: &DataService<S>, doc: &mut HtmlDocument) {
    if !doc.has_region("recent-activities") {
        return;
    }

    let html = match data.get_activities().await {
        Ok(activities) => {
            let recent: Vec<Activity> = most_recent_first(activities)
                .into_iter()
                .take(RECENT_ACTIVITIES)
                .collect();
            if recent.is_empty() {
                format!(
                    r#"<div class="col-12">{}</div>"#,
                    empty_state("calendar-x", "No activities recorded yet", Some("Check back soon for updates!"))
                )
            } else {
                recent.iter().map(activity_card).collect()
            }
        }
        Err(e) => {
            log::error!("Load recent activities error: {}", e);
            format!(
                r#"<div class="col-12">{}</div>"#,
                alert("warning", "Failed to load activities.", None)
            )
        }
    };

    doc.set_region("recent-activities", &html);
}

fn activity_card(activity: &Activity) -> String {
    let reference = if activity.reference_doc.is_empty() {
        r#"<span class="text-muted small">No reference document available</span>"#.to_string()
    } else {
        format!(
            r#"<a href="{}" target="_blank" class="btn btn-sm w-100 rounded-pill">View Reference Document</a>"#,
            escape_html(&activity.reference_doc)
        )
    };

    format!(
        r#"<div class="col-md-6 col-lg-4"><div class="card h-100 recent-activity-card"><div class="card-body d-flex flex-column"><span class="badge rounded-pill">{}</span><h5 class="card-title fw-bold">{}</h5><div class="text-muted small">Location: {}</div><div class="text-muted small">Resource Person: {}</div><div class="mt-auto pt-3 border-top">{}</div></div></div></div>"#,
        escape_html(&format_date(&activity.date_conducted)),
        escape_html(&activity.title),
        escape_html(or_placeholder(&activity.location, "Location not specified")),
        escape_html(or_placeholder(&activity.resource_person, "Not specified")),
        reference
    )
}

async fn load_structure<S: SheetSource>(data: &DataService<S>, doc: &mut HtmlDocument) {
    if !doc.has_region("structure-container") {
        return;
    }

    let html = match data.get_implementation_structure().await {
        Ok(components) if components.is_empty() => format!(
            r#"<div class="col-12">{}</div>"#,
            empty_state("diagram-3", "No implementation structure data available.", None)
        ),
        Ok(components) => components
            .iter()
            .map(|c| {
                format!(
                    r#"<div class="col-md-6 col-lg-4"><div class="card h-100 structure-card"><div class="card-body"><span class="badge rounded-pill">{}</span><h5 class="card-title fw-bold">{}</h5><p class="text-muted">{}</p><div class="small"><strong>Head:</strong> {}</div><div class="small"><strong>Composition:</strong> {}</div></div></div></div>"#,
                    escape_html(or_placeholder(&c.level, NOT_SPECIFIED)),
                    escape_html(&c.component),
                    escape_html(&c.full_name),
                    escape_html(or_placeholder(&c.head, NOT_SPECIFIED)),
                    escape_html(or_placeholder(&c.composition, NOT_SPECIFIED)),
                )
            })
            .collect(),
        Err(e) => {
            log::error!("Load structure error: {}", e);
            format!(
                r#"<div class="col-12">{}</div>"#,
                alert("danger", "Failed to load implementation structure.", Some(&format!("Error: {}", e)))
            )
        }
    };

    doc.set_region("structure-container", &html);
}

async fn load_municipalities<S: SheetSource>(data: &DataService<S>, doc: &mut HtmlDocument) {
    if !doc.has_region("municipalities-table") {
        return;
    }

    let rows = match data.get_municipalities().await {
        Ok(list) if list.is_empty() => {
            r#"<tr><td colspan="4" class="text-center text-muted py-4">No municipalities found.</td></tr>"#
                .to_string()
        }
        Ok(list) => list
            .iter()
            .map(|m| {
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape_html(&m.fma_id),
                    escape_html(&m.region),
                    escape_html(&m.province),
                    escape_html(&m.municipality)
                )
            })
            .collect(),
        Err(e) => {
            log::error!("Load municipalities error: {}", e);
            format!(
                r#"<tr><td colspan="4">{}</td></tr>"#,
                alert("danger", "Failed to load municipalities.", Some(&format!("Error: {}", e)))
            )
        }
    };

    doc.set_table_body("municipalities-table", &rows);
}

async fn load_activities<S: SheetSource>(data: &DataService<S>, doc: &mut HtmlDocument) {
    if !doc.has_region("activities-timeline") {
        return;
    }

    let html = match data.get_activities().await {
        Ok(list) if list.is_empty() => {
            empty_state("calendar-x", "No activities recorded yet", Some("Check back soon for updates!"))
        }
        Ok(list) => most_recent_first(list)
            .iter()
            .map(|a| {
                let reference = if a.reference_doc.is_empty() {
                    String::new()
                } else {
                    format!(
                        r#"<a href="{}" target="_blank" class="small">Reference document</a>"#,
                        escape_html(&a.reference_doc)
                    )
                };
                format!(
                    r#"<div class="timeline-item"><span class="timeline-date badge rounded-pill">{}</span><div class="timeline-content"><h5 class="fw-bold">{}</h5><div class="text-muted small">{}</div><div class="text-muted small">{}</div>{}</div></div>"#,
                    escape_html(&format_date(&a.date_conducted)),
                    escape_html(&a.title),
                    escape_html(or_placeholder(&a.location, "Location not specified")),
                    escape_html(&a.resource_person),
                    reference
                )
            })
            .collect(),
        Err(e) => {
            log::error!("Load activities error: {}", e);
            alert("danger", "Failed to load activities.", Some(&format!("Error: {}", e)))
        }
    };

    doc.set_region("activities-timeline", &html);
}

/// Column headings of a directory table after the name
fn directory_columns(kind: DirectoryKind) -> [&'static str; 4] {
    match kind {
        DirectoryKind::Internal => ["Position", "Component", "Employment Type", "Email"],
        DirectoryKind::External => ["Position", "Office", "FMA Lead", "Email"],
        DirectoryKind::Npmo => ["Position", "Office", "Component", "Email"],
    }
}

fn directory_cell<'a>(entry: &'a DirectoryEntry, heading: &str) -> &'a str {
    match heading {
        "Position" => &entry.position,
        "Component" => &entry.component,
        "Employment Type" => &entry.employment_type,
        "Office" => &entry.office,
        "FMA Lead" => &entry.fma_lead,
        "Email" => &entry.email,
        _ => "",
    }
}

async fn load_directory<S: SheetSource>(
    data: &DataService<S>,
    doc: &mut HtmlDocument,
    state: &mut AppState,
    kind: &str,
) {
    if !doc.has_region("dir-table") {
        return;
    }

    let entries = data.get_directory(kind).await;
    let kind = match kind.parse::<DirectoryKind>() {
        Ok(kind) => {
            state.directory_kind = kind;
            doc.set_text("dir-title", kind.title());
            kind
        }
        Err(_) => state.directory_kind,
    };
    let columns = directory_columns(kind);

    let head: String = std::iter::once("Name")
        .chain(columns)
        .map(|h| format!("<th>{}</th>", h))
        .collect();

    let body = match entries {
        Ok(list) if list.is_empty() => format!(
            r#"<tr><td colspan="5" class="text-center text-muted py-4">No entries in the {}.</td></tr>"#,
            kind.title()
        ),
        Ok(list) => list
            .iter()
            .map(|entry| {
                let cells: String = columns
                    .iter()
                    .map(|heading| {
                        let value = directory_cell(entry, heading);
                        if *heading == "Email" && !value.is_empty() {
                            format!(
                                r#"<td><a href="mailto:{0}">{0}</a></td>"#,
                                escape_html(value)
                            )
                        } else {
                            format!("<td>{}</td>", escape_html(value))
                        }
                    })
                    .collect();
                format!(
                    r#"<tr><td class="fw-semibold">{}</td>{}</tr>"#,
                    escape_html(&entry.full_name()),
                    cells
                )
            })
            .collect(),
        Err(e) => {
            log::error!("Load directory error: {}", e);
            format!(
                r#"<tr><td colspan="5">{}</td></tr>"#,
                alert("danger", "Failed to load directory.", Some(&format!("Error: {}", e)))
            )
        }
    };

    doc.set_region(
        "dir-table",
        &format!("<thead><tr>{}</tr></thead><tbody>{}</tbody>", head, body),
    );
}

async fn load_references<S: SheetSource>(data: &DataService<S>, doc: &mut HtmlDocument) {
    if !doc.has_region("references-list") {
        return;
    }

    let html = match data.get_reference_files().await {
        Ok(files) if files.is_empty() => {
            empty_state("folder2-open", "No reference files available.", None)
        }
        Ok(files) => {
            let mut by_category: BTreeMap<&str, Vec<_>> = BTreeMap::new();
            for file in &files {
                by_category
                    .entry(or_placeholder(&file.category, "Uncategorized"))
                    .or_default()
                    .push(file);
            }

            by_category
                .into_iter()
                .map(|(category, files)| {
                    let items: String = files
                        .iter()
                        .map(|f| {
                            format!(
                                r#"<li class="list-group-item"><a href="{}" target="_blank">{}</a></li>"#,
                                escape_html(&f.url),
                                escape_html(&f.title)
                            )
                        })
                        .collect();
                    format!(
                        r#"<div class="mb-4"><h5 class="fw-bold">{}</h5><ul class="list-group">{}</ul></div>"#,
                        escape_html(category),
                        items
                    )
                })
                .collect()
        }
        Err(e) => {
            log::error!("Load references error: {}", e);
            alert("danger", "Failed to load reference files.", Some(&format!("Error: {}", e)))
        }
    };

    doc.set_region("references-list", &html);
}

/// Fragment of the page that lists a sheet's rows
pub fn page_for_sheet(sheets: &SheetNames, sheet: &str) -> String {
    if sheet == sheets.implementation_structure {
        Page::Structure.fragment()
    } else if sheet == sheets.municipalities {
        Page::Municipalities.fragment()
    } else if sheet == sheets.activities {
        Page::Activities.fragment()
    } else if sheet == sheets.reference_files {
        Page::References.fragment()
    } else if sheet == sheets.fma_profile {
        Page::FmaProfile.fragment()
    } else if let Some(kind) = DirectoryKind::ALL
        .into_iter()
        .find(|k| k.sheet(sheets) == sheet)
    {
        format!("#directory?type={}", kind)
    } else {
        Page::Home.fragment()
    }
}

fn search_hit(hit: &SearchHit, sheets: &SheetNames) -> String {
    // First column names the row (title, given name, component...)
    let title = hit.row.iter().next().map(|(_, v)| v).unwrap_or_default();
    format!(
        r#"<a href="{}" class="list-group-item list-group-item-action"><span class="badge rounded-pill me-2">{}</span><strong>{}</strong><small class="text-muted ms-2">{}: {}</small></a>"#,
        escape_html(&page_for_sheet(sheets, &hit.sheet)),
        escape_html(&hit.sheet.replace('_', " ")),
        escape_html(title),
        escape_html(&hit.field),
        escape_html(hit.matched_value())
    )
}

async fn load_search_results<S: SheetSource>(
    data: &DataService<S>,
    doc: &mut HtmlDocument,
    route: &Route,
) {
    let query = route.param("q").unwrap_or_default();

    if query.trim().is_empty() {
        doc.set_region("search-query", "Enter a search term to find relevant pages.");
        doc.set_region(
            "search-results",
            &empty_state("search", "Start typing to search for pages and content.", None),
        );
        return;
    }

    doc.set_region(
        "search-query",
        &format!("Search results for: <strong>{}</strong>", escape_html(&query)),
    );

    let html = match data.search_all(&query).await {
        Ok(found) if found.is_empty() => empty_state(
            "search",
            &format!("No results found for \"{}\".", query.trim()),
            Some("Try a different keyword."),
        ),
        Ok(found) => {
            let suggestions = if found.suggestions.is_empty() {
                String::new()
            } else {
                let links: String = found
                    .suggestions
                    .iter()
                    .map(|s| {
                        format!(
                            r#"<a href="{}" class="badge rounded-pill me-1">{}</a>"#,
                            escape_html(&search_fragment(s)),
                            escape_html(s)
                        )
                    })
                    .collect();
                format!(
                    r#"<div class="search-suggestions mb-3"><span class="text-muted small me-2">Suggestions:</span>{}</div>"#,
                    links
                )
            };
            let hits: String = found
                .results
                .iter()
                .map(|hit| search_hit(hit, data.sheets()))
                .collect();
            format!(
                r#"{}<p class="text-muted small">{} result(s)</p><div class="list-group">{}</div>"#,
                suggestions,
                found.results.len(),
                hits
            )
        }
        Err(e) => {
            log::error!("Search error: {}", e);
            alert("danger", "Search failed. Please try again.", Some(&format!("Error: {}", e)))
        }
    };

    doc.set_region("search-results", &html);
}

/// Profile rows grouped by key characteristic
pub struct ProfileGroup {
    pub key_characteristic: String,
    pub rows: Vec<ProfileCharacteristic>,
}

/// Group rows by key characteristic, compared trimmed and case-insensitively,
/// in order of the lowercased key. Blank values read as "Not Specified".
pub fn group_profile(rows: Vec<ProfileCharacteristic>) -> Vec<ProfileGroup> {
    let mut groups: BTreeMap<String, ProfileGroup> = BTreeMap::new();
    for row in rows {
        let key = row.key_characteristic.trim().to_string();
        let group = groups
            .entry(key.to_lowercase())
            .or_insert_with(|| ProfileGroup {
                key_characteristic: or_placeholder(&key, NOT_SPECIFIED).to_string(),
                rows: Vec::new(),
            });
        group.rows.push(ProfileCharacteristic {
            key_characteristic: group.key_characteristic.clone(),
            measurement: or_placeholder(&row.measurement, NOT_SPECIFIED).to_string(),
            fma_06: or_placeholder(&row.fma_06, NOT_SPECIFIED).to_string(),
            fma_09: or_placeholder(&row.fma_09, NOT_SPECIFIED).to_string(),
        });
    }
    groups.into_values().collect()
}

async fn load_fma_profile<S: SheetSource>(data: &DataService<S>, doc: &mut HtmlDocument) {
    if !doc.has_region("fma-profile-container") {
        log::error!("FMA profile container not found");
        return;
    }

    let html = match data.get_fma_profile().await {
        Ok(rows) if rows.is_empty() => empty_state(
            "inbox",
            "No FMA profile data available.",
            Some("Please check that the FMA_Profile sheet exists and has data."),
        ),
        Ok(rows) => {
            let body: String = group_profile(rows)
                .iter()
                .flat_map(|group| {
                    let span = group.rows.len();
                    group.rows.iter().enumerate().map(move |(i, row)| {
                        let key_cell = if i == 0 {
                            format!(
                                r#"<td class="fw-semibold" rowspan="{}">{}</td>"#,
                                span,
                                escape_html(&group.key_characteristic)
                            )
                        } else {
                            String::new()
                        };
                        format!(
                            r#"<tr>{}<td>{}</td><td class="fw-semibold">{}</td><td class="fw-semibold">{}</td></tr>"#,
                            key_cell,
                            escape_html(&row.measurement),
                            escape_html(&row.fma_06),
                            escape_html(&row.fma_09)
                        )
                    })
                })
                .collect();
            format!(
                r#"<div class="table-responsive"><table class="table table-hover mb-0 align-middle"><thead><tr><th>Key Characteristics</th><th>Measurement</th><th>FMA 06</th><th>FMA 09</th></tr></thead><tbody>{}</tbody></table></div>"#,
                body
            )
        }
        Err(e) => {
            log::error!("Load FMA Profile error: {}", e);
            alert(
                "danger",
                "Failed to load FMA profile data. Please try again.",
                Some(&format!("Error: {}", e)),
            )
        }
    };

    doc.set_region("fma-profile-container", &html);
}
