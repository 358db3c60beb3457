//! Document store module
//!
//! A generic async document store on SQLite. Documents are JSON bodies
//! grouped into named collections and reached through `DocumentStore::collection`.

pub mod collection;
pub mod db;
pub mod error;

pub use collection::{Collection, Filter, Sort, Update};
pub use db::DocumentStore;
pub use error::StoreError;
