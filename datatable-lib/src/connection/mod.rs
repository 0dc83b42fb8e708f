//! Connection adapter
//!
//! Turns a raw paginated response into table rows:
//!
//! 1. [`DataPath`] locates a candidate value inside the response.
//! 2. [`Connection`] validates it (`edges` must be null or an array).
//! 3. [`extract_rows`] collects non-null nodes and applies a [`NodeTransform`],
//!    dropping null results.
//! 4. [`TableDataSource`] ties these together and memoizes the result by
//!    identity.

mod extract;
mod memo;
mod path;
mod shape;
mod simple;
mod source;

pub use extract::*;
pub use memo::*;
pub use path::*;
pub use shape::*;
pub use simple::*;
pub use source::*;
