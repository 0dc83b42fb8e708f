use std::sync::Arc;

use datatable_lib::connection::{DataPath, PageInfo, QueryResult, TableDataSource};
use datatable_lib::model::{Column, RowKey, RowKeySource};
use datatable_lib::store::InternalStore;
use datatable_lib::table::{
    ClientPagination, ColumnFilters, DataTable, DataTableConfig, FilterOptions, LoadState,
    Pagination, SelectionController, SelectionSet, TableStatus, filter_rows, reconcile,
};
use serde_json::{Value, json};

fn people(n: i64) -> Vec<Value> {
    (1..=n)
        .map(|i| json!({"id": i, "name": format!("person {:02}", i), "team": if i % 2 == 0 { "red" } else { "blue" }}))
        .collect()
}

fn columns() -> Vec<Column<Value>> {
    vec![
        Column::field("id", "Id"),
        Column::field("name", "Name"),
        Column::field("team", "Team"),
    ]
}

#[test]
fn test_global_search_is_case_insensitive() {
    let rows = vec![json!({"name": "Ada"}), json!({"name": "Bob"})];
    let table = DataTable::new(DataTableConfig::new(vec![Column::field("name", "Name")]));
    table.set_global_search("ada");

    let view = table.view(&rows, &LoadState::default());
    assert_eq!(view.rows, vec![&json!({"name": "Ada"})]);
    assert_eq!(view.filtered_count, 1);
}

#[test]
fn test_last_client_page() {
    let rows = people(50);
    let table = DataTable::new(
        DataTableConfig::new(columns())
            .with_row_key(RowKeySource::field("id"))
            .with_pagination(Pagination::client(10.0))
            .with_initial_page(5),
    );

    let view = table.view(&rows, &LoadState::default());
    assert_eq!(view.rows, rows[40..50].iter().collect::<Vec<_>>());
    assert_eq!(view.start_index, 40);

    let controls = view.controls.unwrap();
    assert_eq!(controls.range.unwrap().to_string(), "41\u{2013}50 of 50");
    assert!(!controls.has_next);
    assert!(controls.has_previous);
    assert!(view.show_page_controls);
}

#[test]
fn test_zero_page_size_clamps_to_one() {
    let pagination = Pagination::Client(ClientPagination::new(0.0).with_total_items(50.0));
    let window = reconcile(&pagination, 1, 50);
    assert_eq!((window.start, window.end), (0, 1));

    let controls = window.controls.unwrap();
    assert_eq!(controls.page_size, 1);
    assert_eq!(controls.range.unwrap().to_string(), "1\u{2013}1 of 50");
}

#[test]
fn test_malformed_page_sizes_never_panic() {
    for raw in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -3.0, 0.4, 2.9] {
        let window = reconcile(&Pagination::client(raw), 3, 10);
        let controls = window.controls.unwrap();
        assert!(controls.page_size >= 1);
        assert!(window.end <= 10);
    }
}

#[test]
fn test_null_edges_keep_page_info() {
    let source = TableDataSource::new(DataPath::parse("members").unwrap());
    let result = QueryResult::ready(json!({
        "members": {"edges": null, "pageInfo": {"hasNextPage": false, "hasPreviousPage": true}}
    }));

    let data = source.read(&result).unwrap();
    assert!(data.rows.is_empty());
    assert_eq!(data.page_info, Some(PageInfo::new(false, true)));
}

#[test]
fn test_missing_edges_rejects_connection() {
    let source = TableDataSource::new(DataPath::parse("members").unwrap());
    let result = QueryResult::ready(json!({
        "members": {"pageInfo": {"hasNextPage": true, "hasPreviousPage": false}}
    }));

    let data = source.read(&result).unwrap();
    assert!(data.rows.is_empty());
    assert_eq!(data.page_info, None);
}

#[test]
fn test_page_change_prunes_selection() {
    let store: SelectionSet = [RowKey::from(1), RowKey::from(2)].into_iter().collect();
    let selection = SelectionController::new(Arc::new(InternalStore::new(store)), true);

    selection.sync_page_keys(&[RowKey::from(1), RowKey::from(2)]);
    selection.sync_page_keys(&[RowKey::from(1)]);

    let expected: SelectionSet = [RowKey::from(1)].into_iter().collect();
    assert_eq!(selection.current(), expected);
}

#[test]
fn test_filtering_is_idempotent() {
    let rows = people(20);
    let cols = columns();
    let mut filters = ColumnFilters::new();
    filters.insert("team".to_string(), "RED".into());

    let once = filter_rows(&rows, &cols, &filters, "person 1", FilterOptions::default());
    let twice = filter_rows(once.iter().copied(), &cols, &filters, "person 1", FilterOptions::default());
    assert_eq!(once, twice);
    assert_eq!(once.len(), 5);
}

#[test]
fn test_client_pages_partition_rows() {
    for total in 0..25 {
        for size in 1..7 {
            let pagination = Pagination::client(size as f64);
            let first = reconcile(&pagination, 1, total);
            let pages = first.controls.unwrap().total_pages.unwrap();

            let mut next = 0;
            for page in 1..=pages {
                let window = reconcile(&pagination, page, total);
                assert_eq!(window.start, next, "total {} size {} page {}", total, size, page);
                assert!(window.end - window.start <= size);
                next = window.end;
            }
            assert_eq!(next, total);
        }
    }
}

#[test]
fn test_toggle_twice_is_identity() {
    let rows = people(6);
    let table = DataTable::new(
        DataTableConfig::new(columns())
            .with_row_key(RowKeySource::field("id"))
            .with_selectable(true)
            .with_initial_selection([3i64]),
    );
    table.view(&rows, &LoadState::default());
    let before = table.selection();

    for id in 1..=6i64 {
        table.toggle_row(RowKey::from(id));
        table.toggle_row(RowKey::from(id));
        assert_eq!(table.selection(), before);
    }
}

#[test]
fn test_identity_extraction_returns_nodes_in_order() {
    let source = TableDataSource::new(DataPath::default());
    let result = QueryResult::ready(json!({
        "edges": [
            {"node": {"id": "a"}},
            null,
            {"node": {"id": "b"}},
            {"cursor": "x", "node": null},
            {"node": {"id": "c"}}
        ]
    }));

    let data = source.read(&result).unwrap();
    let ids: Vec<&str> = data.rows.iter().filter_map(|r| r["id"].as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[test]
fn test_navigating_pages_with_selection() {
    let rows = people(9);
    let table = DataTable::new(
        DataTableConfig::new(columns())
            .with_row_key(RowKeySource::field("id"))
            .with_pagination(Pagination::client(3.0))
            .with_selectable(true),
    );

    let view = table.view(&rows, &LoadState::default());
    assert_eq!(view.status, TableStatus::Ready);
    table.select_all_on_page(true);
    let view = table.view(&rows, &LoadState::default());
    assert!(view.all_selected_on_page);
    assert_eq!(view.selected_rows.len(), 3);

    table.set_page(2);
    let view = table.view(&rows, &LoadState::default());
    assert!(table.selection().is_empty());
    assert!(!view.some_selected_on_page);
    assert_eq!(view.keys, vec![RowKey::from(4), RowKey::from(5), RowKey::from(6)]);
}

#[test]
fn test_page_beyond_end_clamps() {
    let rows = people(4);
    let table = DataTable::new(
        DataTableConfig::new(columns())
            .with_pagination(Pagination::client(3.0))
            .with_initial_page(9),
    );
    let view = table.view(&rows, &LoadState::default());
    assert_eq!(view.controls.unwrap().page, 2);
    assert_eq!(view.rows, vec![&rows[3]]);
}

#[test]
fn test_record_rows_with_typed_values() {
    use chrono::{TimeZone, Utc};
    use datatable_lib::model::{CellValue, Record};
    use datatable_lib::table::SortState;

    let joined = |day: u32| Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap();
    let rows = vec![
        Record::new().set("id", 1i64).set("level", 2i64).set("joined", joined(9)),
        Record::new().set("id", 2i64).set("level", 3i64).set("joined", joined(1)),
        Record::new().set("id", 3i64).set("level", 2i64).set("joined", CellValue::Null),
        Record::new().set("id", 4i64).set("level", 2i64).set("joined", joined(4)),
    ];
    let table = DataTable::new(
        DataTableConfig::new(vec![Column::field("level", "Level"), Column::field("joined", "Joined")])
            .with_row_key(RowKeySource::field("id"))
            .with_initial_sort(SortState::desc("joined")),
    );
    table.set_column_filter("level", 2i64);

    let view = table.view(&rows, &LoadState::default());
    assert_eq!(view.keys, vec![RowKey::from(1), RowKey::from(4), RowKey::from(3)]);
}
