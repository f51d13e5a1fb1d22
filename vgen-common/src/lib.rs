//! Shared library for the vgen view generator.
//!
//! Holds the pieces both the generator binary and its tests lean on:
//! the common error type and the typed schema-access layer for the two
//! SQLite stores (the read/write project file and the read-only template
//! file).

pub mod db;
pub mod error;

pub use error::{Error, Result};
