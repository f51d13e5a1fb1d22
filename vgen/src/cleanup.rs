//! Cleanup of generated rows
//!
//! Removes everything a previous run created: the two generated views and
//! their controls, the injected navigation buttons, the sub-array mirror
//! group and the whole `AUTO` subtree. Safe to run on a project that was
//! never generated.

use sqlx::SqlitePool;
use vgen_common::db::project::ROOT_GROUP_ID;
use vgen_common::db::{controls, groups, views};
use vgen_common::Result;

use crate::discovery::SOURCE_TYPE_SUB_ARRAY;
use crate::views::nav;
use crate::{MASTER_WINDOW_TITLE, METER_WINDOW_TITLE, PARENT_GROUP_TITLE};

/// Strip all generated rows from a project.
pub async fn clean_project(pool: &SqlitePool) -> Result<()> {
    tracing::info!("Cleaning project");

    if let Some(master_view_id) = views::view_id_by_name(pool, MASTER_WINDOW_TITLE).await? {
        controls::delete_controls_in_view(pool, master_view_id).await?;
        tracing::info!("Deleted {} controls", MASTER_WINDOW_TITLE);

        views::delete_view_by_name(pool, MASTER_WINDOW_TITLE).await?;
        tracing::info!("Deleted {} view", MASTER_WINDOW_TITLE);

        nav::remove_nav_buttons(pool, master_view_id).await?;
    }

    if let Some(meter_view_id) = views::view_id_by_name(pool, METER_WINDOW_TITLE).await? {
        controls::delete_controls_in_view(pool, meter_view_id).await?;
        tracing::info!("Deleted {} controls", METER_WINDOW_TITLE);

        views::delete_view_by_name(pool, METER_WINDOW_TITLE).await?;
        tracing::info!("Deleted {} view", METER_WINDOW_TITLE);
    }

    let parent_id = groups::group_id_by_name(pool, PARENT_GROUP_TITLE).await?;

    // The sub-array mirror lives under the parent group but carries the
    // source's own name, so it needs its own pass.
    let sub_array_name: Option<String> =
        sqlx::query_scalar("SELECT Name FROM SourceGroups WHERE Type = ?")
            .bind(SOURCE_TYPE_SUB_ARRAY)
            .fetch_optional(pool)
            .await?;
    if let Some(name) = sub_array_name {
        let under = parent_id.unwrap_or(ROOT_GROUP_ID);
        if let Some(group_id) = groups::group_id_by_name_and_parent(pool, &name, under).await? {
            groups::delete_group(pool, group_id).await?;
        }
    }

    if let Some(parent_id) = parent_id {
        groups::delete_group(pool, parent_id).await?;
        tracing::info!("Deleted {} group", PARENT_GROUP_TITLE);
    }

    Ok(())
}
