//! Navigation buttons on the host tool's own views
//!
//! Every overlay view that is not one of the generated pair gets a button
//! jumping to the master view. Existing controls are shifted down to make
//! room; removal restores them.

use sqlx::{Row, SqlitePool};
use vgen_common::db::controls::TARGET_CHANNEL_NONE;
use vgen_common::db::views;
use vgen_common::Result;

use crate::instantiate::{insert_template, Overrides};
use crate::{ProjectContext, TemplateStore, MASTER_WINDOW_TITLE, NAV_BUTTON_Y};

/// Vertical room cleared above each view's own controls.
pub const NAV_SHIFT: i64 = NAV_BUTTON_Y + 20;

/// Inject a master-view button into every other overlay view.
pub async fn create_nav_buttons(
    pool: &SqlitePool,
    store: &TemplateStore,
    ctx: &mut ProjectContext,
) -> Result<()> {
    let meter_view_id = ctx
        .meter_view_id
        .ok_or_else(|| vgen_common::Error::Config("meter view must be created first".to_string()))?;
    let master_view_id = ctx.master_view_id;

    for view_id in views::overlay_view_ids(pool).await? {
        if Some(view_id) == ctx.meter_view_id || Some(view_id) == master_view_id {
            continue;
        }
        views::shift_view_controls(pool, view_id, NAV_SHIFT).await?;
        insert_template(
            pool,
            store,
            "Nav Button",
            view_id,
            15,
            NAV_BUTTON_Y,
            ctx,
            &Overrides::named(MASTER_WINDOW_TITLE, meter_view_id + 1, TARGET_CHANNEL_NONE),
        )
        .await?;
    }

    Ok(())
}

/// Remove previously injected buttons and shift the views' controls back.
///
/// Every row of the injected widget carries the master view as its target
/// with the sentinel channel, so the match is on target alone.
pub async fn remove_nav_buttons(pool: &SqlitePool, master_view_id: i64) -> Result<()> {
    let rows = sqlx::query(
        r#"
        SELECT DISTINCT ViewId FROM Controls
        WHERE TargetId = ? AND TargetChannel = ?
        "#,
    )
    .bind(master_view_id)
    .bind(TARGET_CHANNEL_NONE)
    .fetch_all(pool)
    .await?;

    for row in &rows {
        let view_id: i64 = row.get("ViewId");
        if view_id == master_view_id {
            continue;
        }
        views::shift_view_controls(pool, view_id, -NAV_SHIFT).await?;
    }

    sqlx::query("DELETE FROM Controls WHERE TargetId = ? AND TargetChannel = ?")
        .bind(master_view_id)
        .bind(TARGET_CHANNEL_NONE)
        .execute(pool)
        .await?;

    Ok(())
}
