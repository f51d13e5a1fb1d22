//! Database access for vgen
//!
//! The tool works against two SQLite stores: the read/write project file
//! and a read-only template file. Both are opened through a single-connection
//! pool; every operation is a sequential read-then-write against the same
//! connection.

pub mod controls;
pub mod groups;
pub mod project;
pub mod views;

use crate::{Error, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;

/// Open a project file for read/write access.
///
/// The file must already exist; the tool never creates project databases.
pub async fn open_project(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.is_file() {
        return Err(Error::NotFound(format!(
            "Project file not found: {}",
            db_path.display()
        )));
    }

    let db_url = format!("sqlite://{}?mode=rw", db_path.display());
    tracing::debug!("Opening project database: {}", db_url);

    // One connection for the whole run; all work is sequential.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&db_url)
        .await?;

    Ok(pool)
}

/// Open a template file in read-only mode.
///
/// mode=ro keeps the template store untouched even if a write slips in.
pub async fn open_templates(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.is_file() {
        return Err(Error::NotFound(format!(
            "Template file not found: {}",
            db_path.display()
        )));
    }

    let db_url = format!("sqlite://{}?mode=ro", db_path.display());
    tracing::debug!("Opening template database: {}", db_url);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&db_url)
        .await?;

    Ok(pool)
}
