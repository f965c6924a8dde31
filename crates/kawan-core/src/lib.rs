//! Core types and trait definitions for the Kawan social-graph core.
//!
//! This crate owns the friendship state machine, the mention scanner, the
//! notification pipeline, and the retention sweep. It is deliberately free
//! of HTTP and database dependencies; storage backends and transport layers
//! depend on it, never the other way around.

pub mod error;
pub mod identity;
pub mod mention;
pub mod notification;
pub mod notifier;
pub mod relationship;
pub mod retention;
pub mod store;

pub use error::{Error, Result};
