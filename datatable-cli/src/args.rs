//! Command line arguments

use std::path::PathBuf;

use clap::Parser;
use datatable_lib::table::SortDirection;
use datatable_lib::table::SortState;

/// Print one page of a paginated JSON response as a table.
#[derive(Debug, Parser)]
#[command(name = "datatable-cli", version)]
pub struct Args {
    /// Raw JSON response holding the connection.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Table definition. Defaults to `table.json` in the config directory.
    #[arg(short, long)]
    pub definition: Option<PathBuf>,

    /// Global search query.
    #[arg(short, long)]
    pub search: Option<String>,

    /// Column filter as `column=value`. Repeatable.
    #[arg(short, long = "filter", value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,

    /// Sort as `column` or `column:asc|desc`.
    #[arg(long, value_parser = parse_sort)]
    pub sort: Option<SortState>,

    /// One-based page to show.
    #[arg(short, long)]
    pub page: Option<usize>,

    /// Page size. Switches to client pagination when the definition has none.
    #[arg(long)]
    pub page_size: Option<f64>,

    /// Log to stderr instead of the log file.
    #[arg(short, long)]
    pub verbose: bool,

    /// Log file. Defaults to `latest.log` in the cache directory.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((column, value)) if !column.trim().is_empty() => {
            Ok((column.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected column=value, got {:?}", raw)),
    }
}

fn parse_sort(raw: &str) -> Result<SortState, String> {
    let (column, direction) = match raw.rsplit_once(':') {
        Some((column, direction)) => (column, direction.parse::<SortDirection>()?),
        None => (raw, SortDirection::Asc),
    };
    if column.trim().is_empty() {
        return Err("missing sort column".to_string());
    }
    Ok(SortState::new(column.trim(), direction))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!(parse_filter("team=red"), Ok(("team".to_string(), "red".to_string())));
        assert_eq!(parse_filter("note=a=b"), Ok(("note".to_string(), "a=b".to_string())));
        assert!(parse_filter("team").is_err());
        assert!(parse_filter("=red").is_err());
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(parse_sort("name"), Ok(SortState::asc("name")));
        assert_eq!(parse_sort("name:desc"), Ok(SortState::desc("name")));
        assert!(parse_sort("name:sideways").is_err());
        assert!(parse_sort(":asc").is_err());
    }

    #[test]
    fn test_args() {
        let args = Args::try_parse_from([
            "datatable-cli",
            "--input",
            "response.json",
            "-f",
            "team=red",
            "--filter",
            "name=a",
            "--sort",
            "name:desc",
            "--page",
            "2",
        ])
        .unwrap();
        assert_eq!(args.filters.len(), 2);
        assert_eq!(args.sort, Some(SortState::desc("name")));
        assert_eq!(args.page, Some(2));
        assert!(args.definition.is_none());
    }
}
