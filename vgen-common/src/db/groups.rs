//! Groups table operations
//!
//! The Groups table is a self-referential tree: container rows (`Type` 0)
//! hold other rows, device rows (`Type` 1) are leaves carrying an amplifier
//! device id and channel. Every tree walk here is iterative with a visited
//! set and a depth bound; the table is assumed acyclic but a corrupt file
//! must fail with an error rather than loop.

use crate::{Error, Result};
use sqlx::SqlitePool;
use std::collections::HashSet;

/// Container group row kind
pub const GROUP_KIND_CONTAINER: i64 = 0;
/// Device-channel leaf row kind
pub const GROUP_KIND_DEVICE: i64 = 1;

/// Group tree walks refuse to descend past this depth.
pub const MAX_TREE_DEPTH: usize = 32;

/// Insert a group or a device channel into the Groups table.
///
/// Returns the GroupId of the new row.
pub async fn create_group(
    pool: &SqlitePool,
    name: &str,
    parent_id: i64,
    target_id: i64,
    target_channel: i64,
    kind: i64,
    flags: i64,
) -> Result<i64> {
    if parent_id < 1 {
        return Err(Error::NotFound(format!(
            "Parent group {} does not exist",
            parent_id
        )));
    }

    sqlx::query(
        r#"
        INSERT INTO Groups (Name, ParentId, TargetId, TargetChannel, Type, Flags)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(name)
    .bind(parent_id)
    .bind(target_id)
    .bind(target_channel)
    .bind(kind)
    .bind(flags)
    .execute(pool)
    .await?;

    let group_id: i64 = sqlx::query_scalar("SELECT max(GroupId) FROM Groups")
        .fetch_one(pool)
        .await?;

    tracing::debug!("Inserted group {} ({}) under {}", name, group_id, parent_id);
    Ok(group_id)
}

/// Insert a pure container group (no device target).
pub async fn create_container(pool: &SqlitePool, name: &str, parent_id: i64) -> Result<i64> {
    create_group(pool, name, parent_id, 0, -1, GROUP_KIND_CONTAINER, 0).await
}

/// Insert a device-channel leaf under a container.
pub async fn create_device(
    pool: &SqlitePool,
    name: &str,
    parent_id: i64,
    target_id: i64,
    target_channel: i64,
) -> Result<i64> {
    create_group(pool, name, parent_id, target_id, target_channel, GROUP_KIND_DEVICE, 0).await
}

/// Find the first group with the given name anywhere in the tree.
pub async fn group_id_by_name(pool: &SqlitePool, name: &str) -> Result<Option<i64>> {
    let id = sqlx::query_scalar("SELECT GroupId FROM Groups WHERE Name = ? ORDER BY GroupId ASC")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(id)
}

/// Find a group by name under a specific parent.
pub async fn group_id_by_name_and_parent(
    pool: &SqlitePool,
    name: &str,
    parent_id: i64,
) -> Result<Option<i64>> {
    let id = sqlx::query_scalar("SELECT GroupId FROM Groups WHERE Name = ? AND ParentId = ?")
        .bind(name)
        .bind(parent_id)
        .fetch_optional(pool)
        .await?;
    Ok(id)
}

async fn child_ids(pool: &SqlitePool, parent_id: i64) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar("SELECT GroupId FROM Groups WHERE ParentId = ?")
        .bind(parent_id)
        .fetch_all(pool)
        .await?;
    Ok(ids)
}

/// Total number of rows in the Groups table.
pub async fn group_count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Groups")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Delete a group and its whole subtree, leaves first.
///
/// The walk keeps a visited set and a depth bound so a cyclic or corrupt
/// tree surfaces as [`Error::GroupTreeTooDeep`] instead of hanging.
pub async fn delete_group(pool: &SqlitePool, group_id: i64) -> Result<()> {
    let mut order = vec![group_id];
    let mut frontier = vec![(group_id, 0usize)];
    let mut seen: HashSet<i64> = HashSet::from([group_id]);

    while let Some((id, depth)) = frontier.pop() {
        if depth >= MAX_TREE_DEPTH {
            return Err(Error::GroupTreeTooDeep(id));
        }
        for child in child_ids(pool, id).await? {
            if child == id || !seen.insert(child) {
                return Err(Error::GroupTreeTooDeep(child));
            }
            order.push(child);
            frontier.push((child, depth + 1));
        }
    }

    tracing::debug!("Deleting group {} and {} descendants", group_id, order.len() - 1);

    for id in order.into_iter().rev() {
        sqlx::query("DELETE FROM Groups WHERE GroupId = ?")
            .bind(id)
            .execute(pool)
            .await?;
    }

    Ok(())
}
