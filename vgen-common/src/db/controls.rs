//! Controls table operations
//!
//! Controls are the positioned view-surface items (frames, buttons, meters,
//! inputs). The same table layout exists in both stores: the template file
//! holds the pre-authored fragments, the project file holds the live rows.
//! Rows sharing a JoinedId form one logical multi-part widget.

use crate::Result;
use sqlx::{Row, SqlitePool};

/// Control type: numeric input field
pub const CTRL_INPUT: i64 = 3;
/// Control type: button / switch
pub const CTRL_BUTTON: i64 = 4;
/// Control type: signal meter
pub const CTRL_METER: i64 = 7;
/// Control type: frame
pub const CTRL_FRAME: i64 = 12;

/// Target type marking a button that swaps to another view
pub const TARGET_TYPE_VIEW: i64 = 5;

/// Sentinel target channel for controls that bind to no channel
pub const TARGET_CHANNEL_NONE: i64 = -1;

/// One row of the Controls table, named fields instead of tuple indexes.
#[derive(Debug, Clone)]
pub struct ControlRow {
    pub control_type: i64,
    pub pos_x: i64,
    pub pos_y: i64,
    pub width: i64,
    pub height: i64,
    pub view_id: i64,
    pub display_name: Option<String>,
    pub joined_id: i64,
    pub limit_min: f64,
    pub limit_max: f64,
    pub main_color: i64,
    pub sub_color: i64,
    pub label_color: i64,
    pub label_font: i64,
    pub label_alignment: i64,
    pub line_thickness: i64,
    pub threshold_value: f64,
    pub flags: i64,
    pub action_type: i64,
    pub target_type: i64,
    pub target_id: i64,
    pub target_channel: i64,
    pub target_property: Option<String>,
    pub target_record: i64,
    pub picture_id_day: i64,
    pub picture_id_night: i64,
    pub font: String,
    pub alignment: i64,
}

impl ControlRow {
    pub fn is_frame(&self) -> bool {
        self.control_type == CTRL_FRAME
    }

    /// A button whose target is another view rather than a device property.
    pub fn is_view_button(&self) -> bool {
        self.control_type == CTRL_BUTTON && self.target_type == TARGET_TYPE_VIEW
    }
}

fn row_to_control(row: &sqlx::sqlite::SqliteRow) -> ControlRow {
    ControlRow {
        control_type: row.get("Type"),
        pos_x: row.get("PosX"),
        pos_y: row.get("PosY"),
        width: row.get("Width"),
        height: row.get("Height"),
        view_id: row.get("ViewId"),
        display_name: row.get("DisplayName"),
        joined_id: row.get("JoinedId"),
        limit_min: row.get("LimitMin"),
        limit_max: row.get("LimitMax"),
        main_color: row.get("MainColor"),
        sub_color: row.get("SubColor"),
        label_color: row.get("LabelColor"),
        label_font: row.get("LabelFont"),
        label_alignment: row.get("LabelAlignment"),
        line_thickness: row.get("LineThickness"),
        threshold_value: row.get("ThresholdValue"),
        flags: row.get("Flags"),
        action_type: row.get("ActionType"),
        target_type: row.get("TargetType"),
        target_id: row.get("TargetId"),
        target_channel: row.get("TargetChannel"),
        target_property: row.get("TargetProperty"),
        target_record: row.get("TargetRecord"),
        picture_id_day: row.get("PictureIdDay"),
        picture_id_night: row.get("PictureIdNight"),
        font: row.get("Font"),
        alignment: row.get("Alignment"),
    }
}

/// Load all controls sharing a JoinedId, left to right.
///
/// This is how template fragments are read out of the template store.
pub async fn controls_by_joined_id(pool: &SqlitePool, joined_id: i64) -> Result<Vec<ControlRow>> {
    let rows = sqlx::query(
        r#"
        SELECT "Type", PosX, PosY, Width, Height, ViewId, DisplayName, JoinedId,
               LimitMin, LimitMax, MainColor, SubColor, LabelColor, LabelFont,
               LabelAlignment, LineThickness, ThresholdValue, Flags, ActionType,
               TargetType, TargetId, TargetChannel, TargetProperty, TargetRecord,
               PictureIdDay, PictureIdNight, Font, Alignment
        FROM Controls
        WHERE JoinedId = ?
        ORDER BY PosX ASC
        "#,
    )
    .bind(joined_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(row_to_control).collect())
}

/// Insert one control row into the project.
///
/// ConfirmOnMsg/ConfirmOffMsg are never carried over from templates and the
/// Dimension blob is written as a single space, matching the host tool.
pub async fn insert_control(pool: &SqlitePool, control: &ControlRow) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO Controls ("Type", "PosX", "PosY", "Width", "Height", "ViewId",
                              "DisplayName", "JoinedId", "LimitMin", "LimitMax",
                              "MainColor", "SubColor", "LabelColor", "LabelFont",
                              "LabelAlignment", "LineThickness", "ThresholdValue",
                              "Flags", "ActionType", "TargetType", "TargetId",
                              "TargetChannel", "TargetProperty", "TargetRecord",
                              "ConfirmOnMsg", "ConfirmOffMsg", "PictureIdDay",
                              "PictureIdNight", "Font", "Alignment", "Dimension")
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
                NULL, NULL, ?, ?, ?, ?, ' ')
        "#,
    )
    .bind(control.control_type)
    .bind(control.pos_x)
    .bind(control.pos_y)
    .bind(control.width)
    .bind(control.height)
    .bind(control.view_id)
    .bind(control.display_name.as_deref().unwrap_or(""))
    .bind(control.joined_id)
    .bind(control.limit_min)
    .bind(control.limit_max)
    .bind(control.main_color)
    .bind(control.sub_color)
    .bind(control.label_color)
    .bind(control.label_font)
    .bind(control.label_alignment)
    .bind(control.line_thickness)
    .bind(control.threshold_value)
    .bind(control.flags)
    .bind(control.action_type)
    .bind(control.target_type)
    .bind(control.target_id)
    .bind(control.target_channel)
    .bind(control.target_property.as_deref())
    .bind(control.target_record)
    .bind(control.picture_id_day)
    .bind(control.picture_id_night)
    .bind(control.font.as_str())
    .bind(control.alignment)
    .execute(pool)
    .await?;

    Ok(())
}

/// Highest JoinedId currently in use, if any controls exist.
pub async fn max_joined_id(pool: &SqlitePool) -> Result<Option<i64>> {
    let id = sqlx::query_scalar("SELECT JoinedId FROM Controls ORDER BY JoinedId DESC LIMIT 1")
        .fetch_optional(pool)
        .await?;
    Ok(id)
}

/// Total number of rows in the Controls table.
pub async fn control_count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Controls")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Number of controls on one view.
pub async fn controls_in_view(pool: &SqlitePool, view_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Controls WHERE ViewId = ?")
        .bind(view_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Delete every control on a view.
pub async fn delete_controls_in_view(pool: &SqlitePool, view_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM Controls WHERE ViewId = ?")
        .bind(view_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
