//! Group synthesis
//!
//! Builds the generator's group tree under the `AUTO` parent: per-input
//! routing buckets, discrete L/R/C splits for the sub array, and the
//! array-processing bucket. All rows land under `AUTO` so cleanup can
//! remove them wholesale.

use sqlx::{Row, SqlitePool};
use vgen_common::db::groups;
use vgen_common::db::project::ROOT_GROUP_ID;
use vgen_common::Result;

use crate::discovery::{ChannelGroupKind, SourceGroup, SOURCE_TYPE_SUB_ARRAY};
use crate::{AP_GROUP_TITLE, PARENT_GROUP_TITLE};

/// Input routing buckets, one per amplifier input.
pub const INPUT_BUCKETS: [&str; 8] = ["A1", "A2", "A3", "A4", "D1", "D2", "D3", "D4"];

/// Per-input enable properties probed in the simulation snapshot.
pub const INPUT_ENABLE_PROPERTIES: [&str; 8] = [
    "Config_InputEnable1",
    "Config_InputEnable2",
    "Config_InputEnable3",
    "Config_InputEnable4",
    "Config_InputEnable5",
    "Config_InputEnable6",
    "Config_InputEnable7",
    "Config_InputEnable8",
];

/// Snapshot id carrying the simulation import.
pub const ARRAYCALC_SNAPSHOT_ID: i64 = 1;

/// One patched amplifier channel with its per-input enable states.
#[derive(Debug, Clone)]
struct PatchChannel {
    name: String,
    target_id: i64,
    target_channel: i64,
    input_enable: [bool; 8],
}

/// Create the `AUTO` parent group under the root, reusing an existing one.
pub async fn ensure_parent_group(pool: &SqlitePool) -> Result<i64> {
    if let Some(id) = groups::group_id_by_name(pool, PARENT_GROUP_TITLE).await? {
        tracing::info!("Found existing {} group", PARENT_GROUP_TITLE);
        return Ok(id);
    }
    let id = groups::create_container(pool, PARENT_GROUP_TITLE, ROOT_GROUP_ID).await?;
    tracing::info!("Created {} group", PARENT_GROUP_TITLE);
    Ok(id)
}

async fn load_patch_channels(pool: &SqlitePool) -> Result<Vec<PatchChannel>> {
    let rows = sqlx::query(
        r#"
        SELECT TargetId, TargetNode FROM SnapshotValues
        WHERE SnapshotId = ? AND TargetProperty = 'Config_InputEnable1'
        ORDER BY TargetId ASC
        "#,
    )
    .bind(ARRAYCALC_SNAPSHOT_ID)
    .fetch_all(pool)
    .await?;

    let mut channels = Vec::with_capacity(rows.len());
    for row in &rows {
        let target_id: i64 = row.get("TargetId");
        let target_channel: i64 = row.get("TargetNode");

        let name: Option<String> = sqlx::query_scalar(
            "SELECT Name FROM AmplifierChannels WHERE DeviceId = ? AND AmplifierChannel = ?",
        )
        .bind(target_id)
        .bind(target_channel)
        .fetch_optional(pool)
        .await?;
        let Some(name) = name else {
            continue;
        };

        let mut input_enable = [false; 8];
        for (idx, property) in INPUT_ENABLE_PROPERTIES.iter().enumerate() {
            let enabled: i64 = sqlx::query_scalar(
                r#"
                SELECT COUNT(*) FROM SnapshotValues
                WHERE SnapshotId = ? AND TargetId = ? AND TargetNode = ?
                  AND TargetProperty = ? AND Value = 1
                "#,
            )
            .bind(ARRAYCALC_SNAPSHOT_ID)
            .bind(target_id)
            .bind(target_channel)
            .bind(property)
            .fetch_one(pool)
            .await?;
            input_enable[idx] = enabled > 0;
        }

        channels.push(PatchChannel {
            name,
            target_id,
            target_channel,
            input_enable,
        });
    }

    tracing::info!("Loaded input routing for {} channels", channels.len());
    Ok(channels)
}

/// Create the A1-A4/D1-D4 input routing groups under the parent.
///
/// Same-named buckets from a previous run are deleted first, then each
/// enabled channel lands in every bucket its routing enables.
pub async fn create_input_groups(pool: &SqlitePool, parent_group_id: i64) -> Result<()> {
    let channels = load_patch_channels(pool).await?;

    let mut bucket_ids = [0i64; 8];
    for (idx, bucket) in INPUT_BUCKETS.iter().enumerate() {
        if let Some(stale) = groups::group_id_by_name_and_parent(pool, bucket, parent_group_id).await? {
            tracing::info!("Deleting existing input group {} ({})", bucket, stale);
            groups::delete_group(pool, stale).await?;
        }
        bucket_ids[idx] = groups::create_container(pool, bucket, parent_group_id).await?;
    }

    for channel in &channels {
        for (idx, enabled) in channel.input_enable.iter().enumerate() {
            if *enabled {
                groups::create_device(
                    pool,
                    &channel.name,
                    bucket_ids[idx],
                    channel.target_id,
                    channel.target_channel,
                )
                .await?;
            }
        }
    }

    Ok(())
}

#[derive(Debug)]
struct SubDevice {
    name: String,
    target_id: i64,
    target_channel: i64,
}

async fn sub_array_devices(pool: &SqlitePool, position: &str) -> Result<Vec<SubDevice>> {
    // Sub array device names end with L/R/C, two digits, a dash and two
    // further digits.
    let pattern = format!("% {}__%", position);
    let rows = sqlx::query(
        r#"
        WITH RECURSIVE devs(GroupId, Name, ParentId, TargetId, TargetChannel, Type) AS (
            SELECT GroupId, Name, ParentId, TargetId, TargetChannel, Type
            FROM Groups WHERE Name = (SELECT Name FROM SourceGroups WHERE Type = ?)
            UNION
            SELECT Groups.GroupId, Groups.Name, Groups.ParentId, Groups.TargetId,
                   Groups.TargetChannel, Groups.Type
            FROM Groups, devs WHERE Groups.ParentId = devs.GroupId
        )
        SELECT devs.Name, devs.TargetId, devs.TargetChannel
        FROM devs
        JOIN Cabinets
          ON devs.TargetId = Cabinets.DeviceId
         AND devs.TargetChannel = Cabinets.AmplifierChannel
        JOIN CabinetsAdditionalData
          ON Cabinets.CabinetId = CabinetsAdditionalData.CabinetId
        WHERE Linked = 0
          AND devs.Name LIKE ?
        "#,
    )
    .bind(SOURCE_TYPE_SUB_ARRAY)
    .bind(&pattern)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| SubDevice {
            name: row.get("Name"),
            target_id: row.get("TargetId"),
            target_channel: row.get("TargetChannel"),
        })
        .collect())
}

/// Create discrete left/right/centre groups for the sub array.
///
/// No-op when the project carries no sub array source.
pub async fn create_sub_lrc_groups(pool: &SqlitePool, parent_group_id: i64) -> Result<()> {
    let name: Option<String> =
        sqlx::query_scalar("SELECT Name FROM SourceGroups WHERE Type = ?")
            .bind(SOURCE_TYPE_SUB_ARRAY)
            .fetch_optional(pool)
            .await?;
    let Some(name) = name else {
        return Ok(());
    };

    let mirror_id = groups::create_container(pool, &name, parent_group_id).await?;
    let subs_id =
        groups::create_container(pool, &format!("{name} SUBs"), mirror_id).await?;

    let suffixes = [" SUBs L", " SUBs R", " SUBs C"];
    let positions = ["L", "R", "C"];
    let mut suffix_idx = 0;
    for position in positions {
        let devices = sub_array_devices(pool, position).await?;
        if devices.is_empty() {
            continue;
        }
        let split_id =
            groups::create_container(pool, &format!("{name}{}", suffixes[suffix_idx]), subs_id)
                .await?;
        suffix_idx += 1;
        for device in &devices {
            groups::create_device(
                pool,
                &device.name,
                split_id,
                device.target_id,
                device.target_channel,
            )
            .await?;
        }
    }

    Ok(())
}

/// Collect every tops channel of AP-enabled sources into one `AP` group.
///
/// Returns the new group's id, or `None` when no source uses array
/// processing.
pub async fn configure_ap_channels(
    pool: &SqlitePool,
    sources: &[SourceGroup],
    parent_group_id: i64,
) -> Result<Option<i64>> {
    let mut ap_channels = Vec::new();
    for source in sources.iter().filter(|s| s.ap_enable) {
        for group in &source.channel_groups {
            if group.kind == ChannelGroupKind::Tops {
                ap_channels.extend(group.channels.iter().cloned());
            }
        }
    }

    if ap_channels.is_empty() {
        return Ok(None);
    }

    let ap_group_id = groups::create_container(pool, AP_GROUP_TITLE, parent_group_id).await?;
    for channel in &ap_channels {
        groups::create_device(
            pool,
            &channel.name,
            ap_group_id,
            channel.target_id,
            channel.target_channel,
        )
        .await?;
    }

    tracing::info!("Created {} group with {} channels", AP_GROUP_TITLE, ap_channels.len());
    Ok(Some(ap_group_id))
}

/// Fold the sub array's centre channels into its left group.
///
/// Centre-only cabinets otherwise drop out of the left/right mute pairing
/// on the master view.
pub async fn add_sub_c_to_sub_l(pool: &SqlitePool, sources: &[SourceGroup]) -> Result<()> {
    let mut subs_l_id = None;
    for source in sources {
        for group in &source.channel_groups {
            if group.kind == ChannelGroupKind::SubsL {
                subs_l_id = Some(group.group_id);
            }
        }
    }
    let Some(subs_l_id) = subs_l_id else {
        return Ok(());
    };

    for source in sources {
        for group in &source.channel_groups {
            if group.kind == ChannelGroupKind::SubsC {
                for channel in &group.channels {
                    groups::create_device(
                        pool,
                        &channel.name,
                        subs_l_id,
                        channel.target_id,
                        channel.target_channel,
                    )
                    .await?;
                }
            }
        }
    }

    Ok(())
}
