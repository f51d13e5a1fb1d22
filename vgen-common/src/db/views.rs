//! Views table operations
//!
//! Views are the host tool's canvases. Everything the generator creates is
//! an overlay view (`Type` 1000), the same kind the host tool makes for each
//! loudspeaker position during initial setup.

use crate::Result;
use sqlx::SqlitePool;

/// View type of user-facing overlay canvases.
pub const VIEW_TYPE_OVERLAY: i64 = 1000;

/// Insert a new overlay view and return its ViewId.
pub async fn create_view(pool: &SqlitePool, name: &str, h_res: i64, v_res: i64) -> Result<i64> {
    sqlx::query(
        r#"
        INSERT INTO Views ("Type", "Name", "Icon", "Flags", "HomeViewIndex", "NaviBarIndex",
                           "HRes", "VRes", "ZoomLevel", "ScalingFactor", "ScalingPosX",
                           "ScalingPosY", "ReferenceVenueObjectId")
        VALUES (?, ?, NULL, 4, NULL, -1, ?, ?, 100, NULL, NULL, NULL, NULL)
        "#,
    )
    .bind(VIEW_TYPE_OVERLAY)
    .bind(name)
    .bind(h_res)
    .bind(v_res)
    .execute(pool)
    .await?;

    let view_id: i64 = sqlx::query_scalar("SELECT max(ViewId) FROM Views")
        .fetch_one(pool)
        .await?;

    tracing::debug!("Created view {} ({}) at {}x{}", name, view_id, h_res, v_res);
    Ok(view_id)
}

/// Look up a view id by exact name.
pub async fn view_id_by_name(pool: &SqlitePool, name: &str) -> Result<Option<i64>> {
    let id = sqlx::query_scalar("SELECT ViewId FROM Views WHERE Name = ? ORDER BY ViewId ASC")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(id)
}

/// All overlay view ids in the project.
pub async fn overlay_view_ids(pool: &SqlitePool) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar("SELECT ViewId FROM Views WHERE Type = ? ORDER BY ViewId ASC")
        .bind(VIEW_TYPE_OVERLAY)
        .fetch_all(pool)
        .await?;
    Ok(ids)
}

/// Shift every control on a view vertically by `delta` pixels.
pub async fn shift_view_controls(pool: &SqlitePool, view_id: i64, delta: i64) -> Result<()> {
    sqlx::query("UPDATE Controls SET PosY = PosY + ? WHERE ViewId = ?")
        .bind(delta)
        .bind(view_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete a view row by name.
pub async fn delete_view_by_name(pool: &SqlitePool, name: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM Views WHERE Name = ?")
        .bind(name)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Total number of rows in the Views table.
pub async fn view_count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Views")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
