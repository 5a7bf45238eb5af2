#![deny(clippy::all, warnings)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod access;
pub mod catalog;
pub mod install;
pub mod lifecycle;
pub mod snapshot;

pub use access::{AccessList, EVERYONE};
pub use catalog::{columns, CatalogEntry, Environment, RawRow, CATALOG_COLUMNS};
pub use install::{InstallRecord, VERSION_MARKER};
pub use lifecycle::{
    days_remaining, expiry_date, is_expired, order_catalog, parse_release_date, update_available,
    TileState,
};
pub use snapshot::{load_snapshot, store_snapshot, SNAPSHOT_FILE};
