//! Plain text rendering of a table view

use std::io;
use std::io::Write;

use datatable_lib::model::Column;
use datatable_lib::table::SortDirection;
use datatable_lib::table::TableStatus;
use datatable_lib::table::TableView;
use tabwriter::TabWriter;

const SKELETON: &str = "...";

/// Renders the visible page followed by a footer line.
pub fn render<T>(view: &TableView<'_, T>, columns: &[Column<T>]) -> io::Result<String> {
    match view.status {
        TableStatus::Error => {
            let message = view.error.as_ref().map(|e| e.to_string()).unwrap_or_default();
            return Ok(format!("Error: {}\n", message));
        }
        TableStatus::Loading => return Ok("Loading...\n".to_string()),
        TableStatus::Empty => return Ok("No results.\n".to_string()),
        TableStatus::Ready => {}
    }

    let mut out = String::new();
    if view.busy {
        out.push_str("Loading...\n");
    }

    let mut buf = Vec::new();
    let mut writer = TabWriter::new(&mut buf).padding(2);
    let headers: Vec<String> = columns.iter().map(|c| header(c, view)).collect();
    writeln!(writer, "{}", headers.join("\t"))?;
    for row in &view.rows {
        let cells: Vec<String> = columns.iter().map(|c| single_line(&c.display_text(row))).collect();
        writeln!(writer, "{}", cells.join("\t"))?;
    }
    for _ in 0..view.placeholder_rows {
        writeln!(writer, "{}", vec![SKELETON; columns.len()].join("\t"))?;
    }
    writer.flush()?;
    drop(writer);

    for line in String::from_utf8_lossy(&buf).lines() {
        out.push_str(line.trim_end());
        out.push('\n');
    }

    if view.show_page_controls
        && let Some(controls) = &view.controls
    {
        out.push('\n');
        let mut footer = Vec::new();
        if let Some(pages) = controls.total_pages {
            footer.push(format!("page {}/{}", controls.page, pages));
        }
        if let Some(range) = controls.range {
            footer.push(range.to_string());
        }
        footer.push(format!("prev: {}", yes_no(controls.has_previous)));
        footer.push(format!("next: {}", yes_no(controls.has_next)));
        out.push_str(&footer.join("  "));
        out.push('\n');
    }

    Ok(out)
}

fn header<T>(column: &Column<T>, view: &TableView<'_, T>) -> String {
    match &view.sort {
        Some(sort) if sort.column_id == column.id => {
            let arrow = match sort.direction {
                SortDirection::Asc => '\u{2191}',
                SortDirection::Desc => '\u{2193}',
            };
            format!("{} {}", column.header, arrow)
        }
        _ => column.header.clone(),
    }
}

fn single_line(s: &str) -> String {
    s.replace(['\n', '\r'], " ")
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use datatable_lib::model::Column;
    use datatable_lib::table::{DataTable, DataTableConfig, LoadState, Pagination};
    use serde_json::{Value, json};

    use super::*;

    fn table() -> DataTable<Value> {
        DataTable::new(
            DataTableConfig::new(vec![Column::field("name", "Name"), Column::field("age", "Age")])
                .with_pagination(Pagination::client(2.0)),
        )
    }

    #[test]
    fn test_render_page() {
        let rows = vec![
            json!({"name": "Ada", "age": 36}),
            json!({"name": "Grace", "age": 85}),
            json!({"name": "Bob", "age": null}),
        ];
        let table = table();
        table.toggle_sort("name");
        let view = table.view(&rows, &LoadState::default());
        let text = render(&view, table.columns()).unwrap();

        assert_eq!(
            text,
            "Name \u{2191}  Age\nAda     36\nBob\n\npage 1/2  1\u{2013}2 of 3  prev: no  next: yes\n"
        );
    }

    #[test]
    fn test_render_busy_and_placeholders() {
        let rows = vec![json!({"name": "Ada", "age": 36})];
        let table = DataTable::new(
            DataTableConfig::new(vec![Column::field("name", "Name"), Column::field("age", "Age")])
                .with_loading_overlay(true)
                .with_skeleton_rows(1),
        );

        let busy = table.view(&rows, &LoadState::loading());
        assert_eq!(render(&busy, table.columns()).unwrap(), "Loading...\nName  Age\nAda   36\n");

        let more = table.view(&rows, &LoadState::default().with_loading_more(true));
        assert_eq!(render(&more, table.columns()).unwrap(), "Name  Age\nAda   36\n...   ...\n");
    }

    #[test]
    fn test_render_statuses() {
        let table = table();
        let empty = table.view(&[], &LoadState::default());
        assert_eq!(render(&empty, table.columns()).unwrap(), "No results.\n");

        let loading = table.view(&[], &LoadState::loading());
        assert_eq!(render(&loading, table.columns()).unwrap(), "Loading...\n");
    }
}
