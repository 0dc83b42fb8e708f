//! Tabular data state engine
//!
//! Reads rows out of paginated connection responses and derives what a
//! data table shows: filtered, sorted and paginated rows, page controls,
//! selection and bulk actions.

pub mod connection;
pub mod error;
pub mod model;
pub mod store;
pub mod table;

pub use error::Error;
