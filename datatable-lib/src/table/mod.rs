//! Table state engine
//!
//! [`DataTable`] owns the per-table state and derives a [`TableView`] from
//! the current rows. The pieces are usable on their own:
//!
//! - [`FilterController`] for global search and column filters
//! - [`SortController`] for the single-column sort
//! - [`reconcile`] and [`PageController`] for pagination
//! - [`SelectionController`] for page-scoped selection
//! - [`BulkActionRunner`] for actions over the selection

mod bulk;
mod config;
mod diagnostics;
mod engine;
mod filter;
mod pagination;
mod selection;
mod sort;

pub use bulk::*;
pub use config::*;
pub use diagnostics::*;
pub use engine::*;
pub use filter::*;
pub use pagination::*;
pub use selection::*;
pub use sort::*;
