//! Master view composition
//!
//! One overall-control strip followed by a fader block per channel group.
//! The fader blocks come from the `Group` template family; variant suffixes
//! select the stereo, array-processing and CPL editions, and individual
//! controls are rewired to the group's targets while stamping.

use sqlx::SqlitePool;
use vgen_common::db::controls::{self, CTRL_BUTTON, CTRL_FRAME, CTRL_INPUT, CTRL_METER};
use vgen_common::db::views;
use vgen_common::Result;

use crate::discovery::{self, ChannelGroup, SourceGroup};
use crate::instantiate::{insert_template, Overrides};
use crate::{
    ProjectContext, TemplateStore, MASTER_WINDOW_TITLE, METER_SPACING_X, METER_SPACING_Y,
    METER_WINDOW_TITLE, NAV_BUTTON_X, NAV_BUTTON_Y,
};

/// Number of fader blocks the master view will hold.
pub fn master_group_total(sources: &[SourceGroup]) -> i64 {
    let mut total = 0;
    for source in sources {
        for group in &source.channel_groups {
            if !group.kind.is_lr_flavour() {
                total += 1;
            }
        }
    }
    total
}

fn fader_template_name(source: &SourceGroup) -> String {
    let mut name = String::from("Group");
    if source.channel_groups.len() >= 3 {
        name.push_str(" LR");
    }
    if source.ap_enable {
        name.push_str(" AP");
    }
    if source.has_cpl() {
        name.push_str(" CPL2");
    }
    name
}

/// Stamp one fader block, rewiring its controls to the channel group.
async fn insert_fader_block(
    pool: &SqlitePool,
    store: &TemplateStore,
    source: &SourceGroup,
    group: &ChannelGroup,
    lr_groups: Option<(&ChannelGroup, &ChannelGroup)>,
    view_id: i64,
    pos_x: i64,
    pos_y: i64,
    ctx: &mut ProjectContext,
) -> Result<()> {
    let template_name = fader_template_name(source);
    let template = store.get(&template_name)?;
    let stereo = template_name.contains("Group LR");

    // Meters and mute buttons alternate between the left and right splits.
    let mut meter_side = 0;
    let mut mute_side = 0;

    let joined_id = ctx.next_joined_id;
    for control in &template.controls {
        let mut row = control.clone();
        row.view_id = view_id;
        row.pos_x = control.pos_x + pos_x;
        row.pos_y = control.pos_y + pos_y;
        row.joined_id = joined_id;
        row.target_id = group.group_id;

        // Subs and point sources label the cut button with the crossover
        // found on their own view.
        if !group.kind.is_tops()
            && row.display_name.as_deref() == Some("CUT")
            && source.xover.is_some()
        {
            row.display_name = source.xover.clone();
            tracing::info!("{} - enabling {}", group.name, source.xover.as_deref().unwrap_or(""));
        }

        match row.control_type {
            CTRL_METER => {
                let channel = if stereo {
                    let side = if meter_side == 0 {
                        lr_groups.map(|(l, _)| l)
                    } else {
                        lr_groups.map(|(_, r)| r)
                    };
                    meter_side += 1;
                    side.and_then(|g| g.channels.first())
                } else {
                    group.channels.first()
                };
                if let Some(channel) = channel {
                    row.target_id = channel.target_id;
                    row.target_channel = channel.target_channel;
                }
            }
            CTRL_BUTTON => {
                if stereo && row.target_property.as_deref() == Some("Config_Mute") {
                    let side = if mute_side == 0 {
                        lr_groups.map(|(l, _)| l)
                    } else {
                        lr_groups.map(|(_, r)| r)
                    };
                    mute_side += 1;
                    if let Some(side) = side {
                        row.target_id = side.group_id;
                    }
                }
                if row.display_name.as_deref() == Some("View EQ") {
                    row.target_id = source.view_id + 1;
                }
            }
            CTRL_FRAME => {
                if row.display_name.as_deref().is_some_and(|n| !n.is_empty()) {
                    row.display_name = Some(group.name.clone());
                }
            }
            CTRL_INPUT => {
                if row.target_property.as_deref() == Some("ChStatus_MsDelay")
                    && (group.name.to_lowercase().contains("fill") || group.kind.is_subs())
                {
                    row.flags = 14;
                    tracing::info!("{} - setting relative delay", group.name);
                }
            }
            _ => {}
        }

        // The CPL rotary is meaningless on groups driven through their own
        // crossover; the cut button covers them.
        if row.control_type == CTRL_INPUT
            && row.target_property.as_deref() == Some("Config_Filter3")
            && !group.kind.is_tops()
            && source.xover.is_some()
        {
            tracing::info!("{} - skipping CPL", group.name);
            continue;
        }

        controls::insert_control(pool, &row).await?;
    }

    Ok(())
}

/// Create the master view: title, main fader, monitoring strip and one
/// fader block per channel group.
pub async fn create_master_view(
    pool: &SqlitePool,
    store: &TemplateStore,
    sources: &[SourceGroup],
    ctx: &mut ProjectContext,
) -> Result<()> {
    let (master_w, master_h) = store.size("Master Main")?;
    let (array_sight_w, _) = store.size("Master ArraySight")?;
    let (_, title_h) = store.size("Master Title")?;
    let (fader_w, fader_h) = store.size("Group LR AP CPL2")?;
    let buffer = 200;

    let h_res = master_w
        + array_sight_w
        + (METER_SPACING_X + fader_w) * master_group_total(sources)
        + buffer;
    let v_res = title_h + fader_h.max(master_h) + 60;

    let master_view_id = views::create_view(pool, MASTER_WINDOW_TITLE, h_res, v_res).await?;
    ctx.master_view_id = Some(master_view_id);

    let meter_view_id = ctx
        .meter_view_id
        .ok_or_else(|| vgen_common::Error::Config("meter view must be created first".to_string()))?;

    let mut pos_x = 10;
    let mut pos_y = 10;

    insert_template(
        pool,
        store,
        "Nav Button",
        master_view_id,
        NAV_BUTTON_X,
        pos_y + NAV_BUTTON_Y,
        ctx,
        &Overrides::named(METER_WINDOW_TITLE, meter_view_id, -1),
    )
    .await?;

    let (_, h) = insert_template(
        pool,
        store,
        "Master Title",
        master_view_id,
        pos_x,
        pos_y,
        ctx,
        &Overrides::default(),
    )
    .await?;
    pos_y += h + METER_SPACING_Y;

    let (w, _) = insert_template(
        pool,
        store,
        "Master Main",
        master_view_id,
        pos_x,
        pos_y,
        ctx,
        &Overrides {
            target_id: Some(ctx.master_group_id),
            ..Overrides::default()
        },
    )
    .await?;
    pos_x += w + METER_SPACING_X / 2;

    let (array_sight_w, array_sight_h) = insert_template(
        pool,
        store,
        "Master ArraySight",
        master_view_id,
        pos_x,
        pos_y,
        ctx,
        &Overrides {
            target_id: Some(0),
            ..Overrides::default()
        },
    )
    .await?;

    if discovery::ap_status(sources)? {
        let (w, _) = insert_template(
            pool,
            store,
            "THC",
            master_view_id,
            pos_x,
            pos_y + array_sight_h + METER_SPACING_Y / 2,
            ctx,
            &Overrides {
                target_id: ctx.ap_group_id,
                ..Overrides::default()
            },
        )
        .await?;
        pos_x += w + METER_SPACING_X * 4;
    } else {
        pos_x += array_sight_w + METER_SPACING_X * 4;
    }

    for source in sources {
        for idx in 0..source.channel_groups.len() {
            let group = &source.channel_groups[idx];
            if group.kind.is_lr_flavour() {
                continue;
            }

            let lr_groups = if source.channel_groups.len() >= 3 {
                match (
                    source.channel_groups.get(idx + 1),
                    source.channel_groups.get(idx + 2),
                ) {
                    (Some(left), Some(right)) => Some((left, right)),
                    _ => None,
                }
            } else {
                None
            };

            insert_fader_block(
                pool, store, source, group, lr_groups, master_view_id, pos_x, pos_y, ctx,
            )
            .await?;

            // The fader block's nav button shares its joined id; the extra
            // advance afterwards mirrors the host tool's numbering.
            insert_template(
                pool,
                store,
                "Nav Button",
                master_view_id,
                pos_x,
                pos_y,
                ctx,
                &Overrides::named(&group.name, source.view_id, -1),
            )
            .await?;

            pos_x += fader_w + METER_SPACING_X;
            ctx.next_joined_id += 1;
        }
    }

    tracing::info!("Created master view ({})", master_view_id);
    Ok(())
}
