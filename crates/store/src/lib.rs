//! `vendorbook-store`: the suppliers table.
//!
//! One SQLite table, plain statements, no migrations. Everything that reads
//! or writes supplier rows goes through [`Store`].

pub mod batch;
pub mod error;
pub mod query;
pub mod stats;
pub mod store;

pub use batch::{BatchOp, BatchOutcome};
pub use error::StoreError;
pub use query::{ListQuery, Page, SortKey};
pub use stats::{QuickFilter, Stats, StatsFilter};
pub use store::Store;
