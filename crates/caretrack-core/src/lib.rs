//! Core types and trait definitions for the CareTrack case store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod assessment;
pub mod client;
pub mod contact;
pub mod error;
pub mod lifecycle;
pub mod plan;
pub mod service_log;
pub mod staff;
pub mod store;

mod text_enum;

pub use error::{Error, Result};

/// Row identifier shared by every table (`INTEGER PRIMARY KEY AUTOINCREMENT`).
pub type Id = i64;
