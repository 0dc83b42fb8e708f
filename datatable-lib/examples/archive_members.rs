//! Selecting rows from a connection response and running a bulk action.
//!
//! Run with: cargo run --example archive_members

use std::time::Duration;

use datatable_lib::connection::{DataPath, QueryResult, TableDataSource};
use datatable_lib::error::BulkActionError;
use datatable_lib::model::{Column, RowKey, RowKeySource};
use datatable_lib::table::{BulkAction, BulkOutcome, DataTable, DataTableConfig, LoadState, Pagination};
use serde_json::{Value, json};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let response = json!({
        "organization": {"members": {
            "edges": [
                {"node": {"id": "u1", "login": "ada"}},
                {"node": {"id": "u2", "login": "bob"}},
                {"node": {"id": "u3", "login": "cyd"}}
            ],
            "pageInfo": {"hasNextPage": false, "hasPreviousPage": false}
        }}
    });

    let source = TableDataSource::new(DataPath::parse("organization.members")?);
    let data = source.read(&QueryResult::ready(response))?;

    let archive = BulkAction::new("archive", "Archive", |rows: Vec<Value>, _keys| async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        println!("Archived {} members", rows.len());
        Ok::<(), BulkActionError>(())
    })
    .disabled_when(|rows, _| rows.is_empty());

    let table = DataTable::new(
        DataTableConfig::new(vec![Column::field("login", "Login")])
            .with_row_key(RowKeySource::field("id"))
            .with_pagination(Pagination::client(2.0))
            .with_selectable(true)
            .with_bulk_action(archive),
    );

    table.view(&data.rows, &LoadState::from(&data));
    table.toggle_row(RowKey::from("u1"));
    table.toggle_row(RowKey::from("u2"));

    let view = table.view(&data.rows, &LoadState::from(&data));
    println!("Selected on page: {:?}", view.selected_keys);
    if let Some(controls) = &view.controls
        && let Some(range) = controls.range
    {
        println!("Showing {}", range);
    }

    match table.run_bulk_action("archive", &view) {
        Some(BulkOutcome::Spawned(handle)) => handle.await?,
        Some(outcome) => println!("Bulk action finished: {:?}", outcome),
        None => println!("No such action"),
    }

    Ok(())
}
