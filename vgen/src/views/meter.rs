//! Meter view composition
//!
//! One column per channel group, a frame header above a stack of per-channel
//! meters. The view is sized up front from the template dimensions and the
//! discovered column/row counts.

use sqlx::SqlitePool;
use vgen_common::db::views;
use vgen_common::Result;

use crate::discovery::{ChannelGroupKind, SourceGroup, SOURCE_TYPE_SUB_ARRAY};
use crate::instantiate::{insert_template, Overrides};
use crate::{
    ProjectContext, TemplateStore, MASTER_WINDOW_TITLE, METER_SPACING_X, METER_SPACING_Y,
    METER_VIEW_START_X, METER_VIEW_START_Y, METER_WINDOW_TITLE, NAV_BUTTON_X, NAV_BUTTON_Y,
};

/// Column count and deepest channel count for sizing the meter view.
///
/// Left/right pairs occupy one column's width in the estimate, so the
/// group after an R-flavour group is not counted.
pub fn meter_column_totals(sources: &[SourceGroup]) -> (i64, i64) {
    let mut columns = 0;
    let mut deepest = 0;
    for source in sources {
        let mut skip = false;
        for group in &source.channel_groups {
            if skip {
                skip = false;
                continue;
            }
            if matches!(group.kind, ChannelGroupKind::SubsR | ChannelGroupKind::TopsL) {
                skip = true;
            }
            columns += 1;
            deepest = deepest.max(group.channels.len() as i64);
        }
    }
    (columns, deepest)
}

fn skip_meter_column(source: &SourceGroup, idx: usize) -> bool {
    let group = &source.channel_groups[idx];
    // Combined groups are redundant when their L/R splits get columns.
    (group.kind == ChannelGroupKind::Subs && source.source_type == SOURCE_TYPE_SUB_ARRAY)
        || (group.kind <= ChannelGroupKind::Subs
            && source.channel_groups.len() > 2
            && (idx == 0 || idx == 3))
}

/// Create the meter view and fill in one metering column per group.
pub async fn create_meter_view(
    pool: &SqlitePool,
    store: &TemplateStore,
    sources: &[SourceGroup],
    ctx: &mut ProjectContext,
) -> Result<()> {
    let (_, title_h) = store.size("Meters Title")?;
    let (group_w, group_h) = store.size("Meters Group")?;
    let (meter_w, meter_h) = store.size("Meter")?;

    let spacing_x = meter_w.max(group_w) + METER_SPACING_X;
    let spacing_y = meter_h + METER_SPACING_Y;

    let (columns, deepest) = meter_column_totals(sources);
    let h_res = spacing_x * columns + METER_SPACING_X;
    let v_res = title_h + group_h + spacing_y * deepest + 100;

    let meter_view_id = views::create_view(pool, METER_WINDOW_TITLE, h_res, v_res).await?;
    ctx.meter_view_id = Some(meter_view_id);

    let mut pos_x = METER_VIEW_START_X;
    let mut pos_y = METER_VIEW_START_Y;

    // The master view is created immediately after this one, so its id is
    // known before it exists.
    insert_template(
        pool,
        store,
        "Nav Button",
        meter_view_id,
        NAV_BUTTON_X,
        pos_y + NAV_BUTTON_Y,
        ctx,
        &Overrides::named(MASTER_WINDOW_TITLE, meter_view_id + 1, -1),
    )
    .await?;

    let (_, h) = insert_template(
        pool,
        store,
        "Meters Title",
        meter_view_id,
        pos_x,
        pos_y,
        ctx,
        &Overrides::default(),
    )
    .await?;
    pos_y += h + METER_SPACING_Y;
    let start_y = pos_y;

    for source in sources {
        for idx in 0..source.channel_groups.len() {
            if skip_meter_column(source, idx) {
                continue;
            }
            let group = &source.channel_groups[idx];

            let (_, header_h) = insert_template(
                pool,
                store,
                "Meters Group",
                meter_view_id,
                pos_x,
                pos_y,
                ctx,
                &Overrides {
                    display_name: Some(group.name.clone()),
                    target_id: Some(group.group_id),
                    ..Overrides::default()
                },
            )
            .await?;
            pos_y += header_h + 10;

            // All meters of one column share a joined id so the host tool
            // treats them as one widget.
            let column_joined_id = ctx.next_joined_id;
            for channel in &group.channels {
                insert_template(
                    pool,
                    store,
                    "Meter",
                    meter_view_id,
                    pos_x,
                    pos_y,
                    ctx,
                    &Overrides {
                        display_name: Some(channel.name.clone()),
                        target_id: Some(channel.target_id),
                        target_channel: Some(channel.target_channel),
                        joined_id: Some(column_joined_id),
                        ..Overrides::default()
                    },
                )
                .await?;
                pos_y += spacing_y;
            }

            pos_x += spacing_x;
            pos_y = start_y;
            ctx.next_joined_id += 1;
        }
    }

    tracing::info!("Created meter view ({})", meter_view_id);
    Ok(())
}
