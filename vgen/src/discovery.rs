//! Source group topology discovery
//!
//! One wide read-only pass over the project joins the source definitions to
//! their mirror groups, views and crossover controls, then a per-group tree
//! walk resolves the amplifier channels behind each group. Everything later
//! stages need is captured here, so generation never re-queries topology.

use sqlx::{Row, SqlitePool};
use vgen_common::{Error, Result};

/// Source type: line array
pub const SOURCE_TYPE_ARRAY: i64 = 1;
/// Source type: point source
pub const SOURCE_TYPE_POINT: i64 = 2;
/// Source type: sub array
pub const SOURCE_TYPE_SUB_ARRAY: i64 = 3;
/// Source type: additional amplifier
pub const SOURCE_TYPE_ADDITIONAL_AMP: i64 = 4;
/// Source type: unused channels
pub const SOURCE_TYPE_UNUSED: i64 = 5;

/// Flavour of one channel group inside a source group.
///
/// The discriminants order the groups the way they are laid out in the
/// meter view: main group first, tops before subs, L before R before C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChannelGroupKind {
    Point = 0,
    Tops = 1,
    TopsL = 2,
    TopsR = 3,
    Subs = 4,
    SubsL = 5,
    SubsR = 6,
    SubsC = 7,
}

impl ChannelGroupKind {
    /// Any of the tops flavours, including the combined group.
    pub fn is_tops(self) -> bool {
        matches!(self, Self::Tops | Self::TopsL | Self::TopsR)
    }

    /// Any of the subs flavours, including the combined group.
    pub fn is_subs(self) -> bool {
        matches!(self, Self::Subs | Self::SubsL | Self::SubsR | Self::SubsC)
    }

    /// A left/right/centre split group rather than a combined one.
    pub fn is_lr_flavour(self) -> bool {
        matches!(
            self,
            Self::TopsL | Self::TopsR | Self::SubsL | Self::SubsR | Self::SubsC
        )
    }
}

/// One amplifier channel resolved behind a channel group.
#[derive(Debug, Clone)]
pub struct Channel {
    pub group_id: i64,
    pub name: String,
    pub target_id: i64,
    pub target_channel: i64,
    pub cabinet_name: String,
    pub cabinet_id: i64,
}

/// One mirror group of a source group, with its resolved channels.
#[derive(Debug, Clone)]
pub struct ChannelGroup {
    pub group_id: i64,
    pub name: String,
    pub kind: ChannelGroupKind,
    pub channels: Vec<Channel>,
}

/// One discovered source group with all its mirror groups.
#[derive(Debug, Clone)]
pub struct SourceGroup {
    pub view_id: i64,
    pub name: String,
    pub source_group_id: i64,
    pub next_source_group_id: i64,
    pub source_type: i64,
    pub ap_enable: bool,
    pub array_sight_id: Option<i64>,
    pub cabinet_family: String,
    pub channel_groups: Vec<ChannelGroup>,
    /// Crossover label found on the source's view, when one exists
    pub xover: Option<String>,
}

impl SourceGroup {
    pub fn has_array_processing(&self) -> bool {
        self.ap_enable
    }

    /// CPL is only relevant for the GSL and KSL cabinet families.
    pub fn has_cpl(&self) -> bool {
        matches!(self.cabinet_family.as_str(), "GSL" | "KSL")
    }
}

/// Whether any discovered source group uses array processing.
///
/// Errors on an empty source list: that means discovery has not run, not
/// that the project has no array processing.
pub fn ap_status(sources: &[SourceGroup]) -> Result<bool> {
    if sources.is_empty() {
        return Err(Error::NotFound(
            "no source groups discovered".to_string(),
        ));
    }
    Ok(sources.iter().any(SourceGroup::has_array_processing))
}

fn assemble_channel_groups(row: &sqlx::sqlite::SqliteRow) -> Vec<ChannelGroup> {
    // Column pairs in discriminant order: main group then the seven
    // tops/subs flavours. Only present pairs become channel groups.
    let pairs: [(&str, &str, ChannelGroupKind); 8] = [
        ("MasterGroupId", "MasterGroupName", ChannelGroupKind::Point),
        ("TopGroupId", "TopGroupName", ChannelGroupKind::Tops),
        ("TopLeftGroupId", "TopLeftGroupName", ChannelGroupKind::TopsL),
        (
            "TopRightGroupId",
            "TopRightGroupName",
            ChannelGroupKind::TopsR,
        ),
        ("SubGroupId", "SubGroupName", ChannelGroupKind::Subs),
        ("SubLeftGroupId", "SubLeftGroupName", ChannelGroupKind::SubsL),
        (
            "SubRightGroupId",
            "SubRightGroupName",
            ChannelGroupKind::SubsR,
        ),
        ("SubCGroupId", "SubCGroupName", ChannelGroupKind::SubsC),
    ];

    let mut groups = Vec::new();
    for (id_col, name_col, kind) in pairs.iter().rev() {
        let group_id: Option<i64> = row.get(*id_col);
        let name: Option<String> = row.get(*name_col);
        if let (Some(group_id), Some(name)) = (group_id, name) {
            groups.push(ChannelGroup {
                group_id,
                name,
                kind: *kind,
                channels: Vec::new(),
            });
        }
        // The main mirror group only stands in when no tops or subs
        // flavour was found; a point source has nothing else.
        if !groups.is_empty() && *kind == ChannelGroupKind::Tops {
            break;
        }
    }
    groups.reverse();
    groups
}

/// Discover every source group and the amplifier channels behind it.
///
/// Stereo pairs appear once (the second half carries OrderIndex -1), the
/// unused-channels bucket is skipped, and array mirror groups are taken
/// from outside the Master tree so the L/R splits are visible.
pub async fn discover_source_groups(pool: &SqlitePool) -> Result<Vec<SourceGroup>> {
    sqlx::query("PRAGMA case_sensitive_like = ON").execute(pool).await?;

    let rows = sqlx::query(
        r#"
        SELECT Views.ViewId, Views.Name, SourceGroups.SourceGroupId, NextSourceGroupId,
               SourceGroups.Type, ArrayProcessingEnable, ArraySightId, System,
               masterGroup.GroupId AS MasterGroupId, masterGroup.Name AS MasterGroupName,
               topsGroup.GroupId AS TopGroupId, topsGroup.Name AS TopGroupName,
               topsLGroup.GroupId AS TopLeftGroupId, topsLGroup.Name AS TopLeftGroupName,
               topsRGroup.GroupId AS TopRightGroupId, topsRGroup.Name AS TopRightGroupName,
               subsGroup.GroupId AS SubGroupId, subsGroup.Name AS SubGroupName,
               subsLGroup.GroupId AS SubLeftGroupId, subsLGroup.Name AS SubLeftGroupName,
               subsRGroup.GroupId AS SubRightGroupId, subsRGroup.Name AS SubRightGroupName,
               subsCGroup.GroupId AS SubCGroupId, subsCGroup.Name AS SubCGroupName,
               i.DisplayName AS xover
        FROM SourceGroups
        JOIN SourceGroupsAdditionalData
          ON SourceGroups.SourceGroupId = SourceGroupsAdditionalData.SourceGroupId
        JOIN Views
          ON Views.Name = SourceGroups.Name
        JOIN Groups masterGroup
          ON SourceGroups.Name = masterGroup.Name
        LEFT OUTER JOIN (SELECT GroupId, Name, ParentId FROM Groups WHERE Name LIKE '% TOPs') topsGroup
          ON topsGroup.ParentId = masterGroup.GroupId
        LEFT OUTER JOIN (SELECT GroupId, Name, ParentId FROM Groups WHERE Name LIKE '% TOPs L') topsLGroup
          ON topsLGroup.ParentId = topsGroup.GroupId
        LEFT OUTER JOIN (SELECT GroupId, Name, ParentId FROM Groups WHERE Name LIKE '% TOPs R') topsRGroup
          ON topsRGroup.ParentId = topsGroup.GroupId
        LEFT OUTER JOIN (SELECT GroupId, Name, ParentId FROM Groups WHERE Name LIKE '% SUBs') subsGroup
          ON subsGroup.ParentId = masterGroup.GroupId
        LEFT OUTER JOIN (SELECT GroupId, Name, ParentId FROM Groups WHERE Name LIKE '% SUBs L') subsLGroup
          ON subsLGroup.ParentId = subsGroup.GroupId
        LEFT OUTER JOIN (SELECT GroupId, Name, ParentId FROM Groups WHERE Name LIKE '% SUBs R') subsRGroup
          ON subsRGroup.ParentId = subsGroup.GroupId
        LEFT OUTER JOIN (SELECT GroupId, Name, ParentId FROM Groups WHERE Name LIKE '% SUBs C') subsCGroup
          ON subsCGroup.ParentId = subsGroup.GroupId
        LEFT OUTER JOIN (SELECT * FROM Controls WHERE DisplayName = '100Hz' OR DisplayName = 'Infra') i
          ON i.ViewId = Views.ViewId
        WHERE SourceGroups.Name != 'Unused channels'
          AND OrderIndex != -1
          AND (SourceGroups.Type == 1 AND masterGroup.ParentId != (SELECT GroupId FROM Groups WHERE Name == 'Master'))
          OR (SourceGroups.Type == 3 AND masterGroup.ParentId != (SELECT GroupId FROM Groups WHERE Name == 'Master'))
          OR (SourceGroups.Type == 2 AND masterGroup.ParentId == (SELECT GroupId FROM Groups WHERE Name == 'Master'))
          OR SourceGroups.Type == 4
        ORDER BY SourceGroups.OrderIndex ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut sources = Vec::with_capacity(rows.len());
    for row in &rows {
        let ap_enable: i64 = row.get("ArrayProcessingEnable");
        let mut source = SourceGroup {
            view_id: row.get("ViewId"),
            name: row.get("Name"),
            source_group_id: row.get("SourceGroupId"),
            next_source_group_id: row.get("NextSourceGroupId"),
            source_type: row.get("Type"),
            ap_enable: ap_enable != 0,
            array_sight_id: row.get("ArraySightId"),
            cabinet_family: row.get("System"),
            channel_groups: assemble_channel_groups(row),
            xover: row.get("xover"),
        };

        for group in &mut source.channel_groups {
            group.channels = group_channels(pool, group.group_id).await?;
            tracing::info!(
                "Assigned {} channels to {}",
                group.channels.len(),
                group.name
            );
        }

        tracing::info!("Discovered source group {} / {}", source.source_group_id, source.name);
        sources.push(source);
    }

    Ok(sources)
}

/// Resolve the amplifier channels in one group subtree.
///
/// The recursive CTE walks the subtree (UNION dedup terminates it on
/// malformed cyclic trees); device entries are joined to their unlinked
/// cabinet rows to yield one row per physical channel.
pub async fn group_channels(pool: &SqlitePool, group_id: i64) -> Result<Vec<Channel>> {
    let rows = sqlx::query(
        r#"
        WITH RECURSIVE devs(GroupId, Name, ParentId, TargetId, TargetChannel, Type, Flags) AS (
            SELECT GroupId, Name, ParentId, TargetId, TargetChannel, Type, Flags
            FROM Groups WHERE ParentId = ?
            UNION
            SELECT Groups.GroupId, Groups.Name, Groups.ParentId, Groups.TargetId,
                   Groups.TargetChannel, Groups.Type, Groups.Flags
            FROM Groups, devs WHERE Groups.ParentId = devs.GroupId
        )
        SELECT devs.GroupId, devs.Name, devs.TargetId, devs.TargetChannel,
               CabinetsAdditionalData.Name AS CabinetName, Cabinets.CabinetId
        FROM devs
        JOIN Cabinets
          ON devs.TargetId = Cabinets.DeviceId
         AND devs.TargetChannel = Cabinets.AmplifierChannel
        JOIN CabinetsAdditionalData
          ON Cabinets.CabinetId = CabinetsAdditionalData.CabinetId
         AND Linked = 0
        WHERE devs.Type = 1
        "#,
    )
    .bind(group_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| Channel {
            group_id: row.get("GroupId"),
            name: row.get("Name"),
            target_id: row.get("TargetId"),
            target_channel: row.get("TargetChannel"),
            cabinet_name: row.get("CabinetName"),
            cabinet_id: row.get("CabinetId"),
        })
        .collect())
}
