//! SQLite backend for the Kawan social-graph store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! connection thread without blocking the async runtime. That single
//! serialised connection also means a multi-statement closure (insert,
//! then read back on conflict) executes without interleaving from other
//! store calls.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
