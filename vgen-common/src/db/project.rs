//! Project baseline introspection
//!
//! The host tool's own initial setup creates the root group tree and one
//! view per loudspeaker position. The generator refuses to touch a project
//! where that baseline is missing.

use super::controls;
use crate::{Error, Result};
use sqlx::SqlitePool;

/// Root group id assigned by the host tool.
pub const ROOT_GROUP_ID: i64 = 1;

/// Name of the host tool's master group under the root.
pub const MASTER_GROUP_NAME: &str = "Master";

async fn table_exists(pool: &SqlitePool, name: &str) -> Result<bool> {
    let row: Option<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE name = ? AND type = 'table'",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

/// Check whether the host tool's initial setup has been performed.
///
/// Requires the Groups and Views tables plus the baseline rows under the
/// root group (the root itself, Master and at least one more).
pub async fn is_initialised(pool: &SqlitePool) -> Result<bool> {
    if !table_exists(pool, "Groups").await? || !table_exists(pool, "Views").await? {
        return Ok(false);
    }

    let baseline: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM Groups WHERE GroupId = ? OR ParentId = ?",
    )
    .bind(ROOT_GROUP_ID)
    .bind(ROOT_GROUP_ID)
    .fetch_one(pool)
    .await?;

    Ok(baseline >= 3)
}

/// GroupId of the host tool's Master group.
pub async fn master_group_id(pool: &SqlitePool) -> Result<i64> {
    let id: Option<i64> =
        sqlx::query_scalar("SELECT GroupId FROM Groups WHERE ParentId = ? AND Name = ?")
            .bind(ROOT_GROUP_ID)
            .bind(MASTER_GROUP_NAME)
            .fetch_optional(pool)
            .await?;

    id.ok_or_else(|| Error::ProjectNotInitialised("Master group not found".to_string()))
}

/// Next free JoinedId for generated controls.
///
/// A project without any controls has not been through initial setup.
pub async fn next_joined_id(pool: &SqlitePool) -> Result<i64> {
    match controls::max_joined_id(pool).await? {
        Some(id) => Ok(id + 1),
        None => Err(Error::ProjectNotInitialised(
            "Views have not been generated; run the host tool's initial setup first".to_string(),
        )),
    }
}
