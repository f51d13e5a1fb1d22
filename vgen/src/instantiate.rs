//! Template instantiation
//!
//! Stamps a named template into a project view: each template control row is
//! copied with its position shifted by the anchor, selected fields replaced
//! by per-call overrides, and all rows of one call sharing a joined id.

use sqlx::SqlitePool;
use vgen_common::db::controls::{self, TARGET_CHANNEL_NONE};
use vgen_common::Result;

use crate::{ProjectContext, TemplateStore};

/// Device-scoped target properties.
///
/// These bind to the amplifier itself rather than one of its channels, so
/// a channel-bound override must be forced back to channel 0.
pub const DEVICE_PROPERTIES: [&str; 24] = [
    "Status_SmpsFrequency",
    "Status_MainsPowerPeak",
    "Status_SmpsVoltage",
    "Status_SmpsTemperature",
    "Status_LockMode",
    "Status_StatusText",
    "Status_PwrOk",
    "Settings_Buzzer",
    "Settings_DeviceName",
    "Settings_InputGainEnable",
    "Settings_LockCmd",
    "Settings_MCLEnable",
    "Settings_PwrOn",
    "Input_Analog_Gain",
    "Input_Digital_Gain",
    "Input_Digital_Mode",
    "Input_Digital_Sync",
    "Input_Digital_SampleStatus",
    "Input_Digital_DsDataPri",
    "Input_Digital_DsDataSec",
    "Input_Digital_TxStream",
    "Error_GnrlErr",
    "Error_SmpsTempOff",
    "Error_SmpsTempWarn",
];

/// Per-call replacements applied to every control of a template.
///
/// `None` keeps the template's own value for that field.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub display_name: Option<String>,
    pub target_id: Option<i64>,
    pub target_channel: Option<i64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    /// Share a previously allocated joined id instead of taking a new one
    pub joined_id: Option<i64>,
    pub target_property: Option<String>,
    pub target_record: Option<i64>,
}

impl Overrides {
    pub fn targeting(target_id: i64, target_channel: i64) -> Self {
        Self {
            target_id: Some(target_id),
            target_channel: Some(target_channel),
            ..Self::default()
        }
    }

    pub fn named(display_name: &str, target_id: i64, target_channel: i64) -> Self {
        Self {
            display_name: Some(display_name.to_string()),
            target_id: Some(target_id),
            target_channel: Some(target_channel),
            ..Self::default()
        }
    }
}

/// Stamp a template into a view at an anchor position.
///
/// Returns the template's bounding size so callers can advance their
/// layout cursor. When no joined id is supplied one is allocated from the
/// context and all rows of this call share it.
pub async fn insert_template(
    pool: &SqlitePool,
    store: &TemplateStore,
    name: &str,
    view_id: i64,
    pos_x: i64,
    pos_y: i64,
    ctx: &mut ProjectContext,
    overrides: &Overrides,
) -> Result<(i64, i64)> {
    let joined_id = match overrides.joined_id {
        Some(id) => id,
        None => ctx.take_joined_id(),
    };

    let template = store.get(name)?;

    for control in &template.controls {
        let mut row = control.clone();
        row.view_id = view_id;
        row.pos_x = control.pos_x + pos_x;
        row.pos_y = control.pos_y + pos_y;
        row.joined_id = joined_id;

        if let Some(target_id) = overrides.target_id {
            row.target_id = target_id;
        }
        if let Some(target_channel) = overrides.target_channel {
            row.target_channel = target_channel;
        }
        if let Some(width) = overrides.width {
            row.width = width;
        }
        if let Some(height) = overrides.height {
            row.height = height;
        }
        if let Some(property) = &overrides.target_property {
            row.target_property = Some(property.clone());
        }
        if let Some(record) = overrides.target_record {
            row.target_record = record;
        }

        // Frames and view-swap buttons take the caller's label, except the
        // Fallback/Regular legends which always keep their template text.
        if row.is_frame() || row.is_view_button() {
            if let Some(display_name) = &overrides.display_name {
                let keep =
                    matches!(row.display_name.as_deref(), Some("Fallback") | Some("Regular"));
                if !keep {
                    row.display_name = Some(display_name.clone());
                }
            }
        }

        if let Some(property) = &row.target_property {
            if DEVICE_PROPERTIES.contains(&property.as_str())
                && row.target_channel > TARGET_CHANNEL_NONE
            {
                row.target_channel = 0;
            }
        }

        controls::insert_control(pool, &row).await?;
    }

    Ok(template.size())
}
