mod args;
mod error;
mod paths;
mod render;

use std::fs;
use std::fs::File;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use datatable_lib::connection::QueryResult;
use datatable_lib::error::ConfigError;
use datatable_lib::model::find_column;
use datatable_lib::table::DataTable;
use datatable_lib::table::LoadState;
use datatable_lib::table::Pagination;
use datatable_lib::table::TableDefinition;
use serde::de::DeserializeOwned;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode, WriteLogger};

use crate::args::Args;
use crate::error::CliError;

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(&args) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(args: &Args) -> Result<(), CliError> {
    if args.verbose {
        TermLogger::init(
            LevelFilter::Debug,
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        )?;
        return Ok(());
    }

    let Some(path) = args.log_file.clone().or_else(paths::log_file) else {
        return Ok(());
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| CliError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let file = File::create(&path).map_err(|source| CliError::Io {
        path: path.clone(),
        source,
    })?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), file)?;
    Ok(())
}

/// Loads the response and definition, applies the arguments and renders
/// the resulting page.
fn run(args: &Args) -> Result<String, CliError> {
    let definition = load_definition(args)?;
    let response: serde_json::Value = read_json(&args.input)?;

    let (mut config, data) = definition.open(&QueryResult::ready(response))?;
    log::info!("Read {} rows from {}", data.rows.len(), args.input.display());

    if let Some(size) = args.page_size {
        config.pagination = with_page_size(config.pagination, size);
    }
    if let Some(sort) = &args.sort {
        if find_column(&config.columns, &sort.column_id).is_none() {
            return Err(ConfigError::UnknownColumn(sort.column_id.clone()).into());
        }
        config = config.with_initial_sort(sort.clone());
    }
    for (column, _) in &args.filters {
        if find_column(&config.columns, column).is_none() {
            return Err(ConfigError::UnknownColumn(column.clone()).into());
        }
    }

    let table = DataTable::new(config);
    table.set_page_info(data.page_info.clone());
    if let Some(query) = &args.search {
        table.set_global_search(query.as_str());
    }
    for (column, value) in &args.filters {
        table.set_column_filter(column.as_str(), value.as_str());
    }
    if let Some(page) = args.page {
        table.set_page(page);
    }

    let view = table.view(&data.rows, &LoadState::from(&data));
    render::render(&view, table.columns()).map_err(CliError::from)
}

fn load_definition(args: &Args) -> Result<TableDefinition, CliError> {
    let path = match &args.definition {
        Some(path) => path.clone(),
        None => {
            let path = paths::definition_file().ok_or(CliError::NoConfigDir)?;
            if !path.exists() {
                return Err(CliError::MissingDefinition(path));
            }
            path
        }
    };
    let definition: TableDefinition = read_json(&path)?;
    log::debug!("Loaded table definition from {}", path.display());
    Ok(definition)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Applies a page size override. Unpaginated tables become client paginated.
fn with_page_size(pagination: Pagination, size: f64) -> Pagination {
    match pagination {
        Pagination::None => Pagination::client(size),
        Pagination::Client(mut client) => {
            client.page_size = size;
            Pagination::Client(client)
        }
        Pagination::Server(mut server) => {
            server.page_size = size;
            Pagination::Server(server)
        }
    }
}
