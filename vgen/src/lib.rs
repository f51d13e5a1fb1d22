//! vgen - loudspeaker-management project view generator
//!
//! Regenerates the layout rows (groups, views, controls) inside a
//! loudspeaker-management project database: input-routing groups, a
//! per-position control panel ("AUTO - Master"), a signal-level meter panel
//! ("AUTO - Meters") and navigation buttons on every other view. Everything
//! it creates is tagged by naming convention so a re-run can clean up after
//! itself first.

use sqlx::SqlitePool;
use vgen_common::db::project;
use vgen_common::Result;

pub mod cleanup;
pub mod discovery;
pub mod groups;
pub mod instantiate;
pub mod templates;
pub mod views;

pub use instantiate::Overrides;
pub use templates::TemplateStore;

/// X offset of injected navigation buttons
pub const NAV_BUTTON_X: i64 = 270;
/// Y offset of injected navigation buttons
pub const NAV_BUTTON_Y: i64 = 15;

pub const METER_VIEW_START_X: i64 = 15;
pub const METER_VIEW_START_Y: i64 = 15;
pub const METER_SPACING_X: i64 = 15;
pub const METER_SPACING_Y: i64 = 15;

/// Name of the container group holding everything the generator creates
pub const PARENT_GROUP_TITLE: &str = "AUTO";
/// Name of the array-processing bucket group
pub const AP_GROUP_TITLE: &str = "AP";
/// Name of the generated meter view
pub const METER_WINDOW_TITLE: &str = "AUTO - Meters";
/// Name of the generated master view
pub const MASTER_WINDOW_TITLE: &str = "AUTO - Master";

/// Per-run mutable state threaded through the generation calls.
///
/// Replaces the globals of a hand-run layout session: the joined-id counter
/// and the ids of the rows created so far.
#[derive(Debug)]
pub struct ProjectContext {
    /// GroupId of the generator's `AUTO` parent group
    pub parent_group_id: i64,
    /// GroupId of the host tool's Master group
    pub master_group_id: i64,
    /// Next joined id to hand out for generated widgets
    pub next_joined_id: i64,
    /// ViewId of the generated meter view, once created
    pub meter_view_id: Option<i64>,
    /// ViewId of the generated master view, once created
    pub master_view_id: Option<i64>,
    /// GroupId of the AP bucket, when any AP channels exist
    pub ap_group_id: Option<i64>,
}

impl ProjectContext {
    /// Load the baseline state from an initialised project.
    pub async fn load(pool: &SqlitePool) -> Result<Self> {
        let master_group_id = project::master_group_id(pool).await?;
        let next_joined_id = project::next_joined_id(pool).await?;

        Ok(Self {
            parent_group_id: project::ROOT_GROUP_ID,
            master_group_id,
            next_joined_id,
            meter_view_id: None,
            master_view_id: None,
            ap_group_id: None,
        })
    }

    /// Allocate the next joined id and advance the counter.
    pub fn take_joined_id(&mut self) -> i64 {
        let id = self.next_joined_id;
        self.next_joined_id += 1;
        id
    }
}

/// Run the full generation pipeline against one open project.
///
/// Order is load-bearing: discovery must see the synthesized SUB L/R/C
/// groups, and the master view's navigation button references the meter
/// view created just before it.
pub async fn generate(pool: &SqlitePool, store: &TemplateStore) -> Result<()> {
    // Idempotence: remove anything a previous run left behind.
    cleanup::clean_project(pool).await?;

    let mut ctx = ProjectContext::load(pool).await?;
    ctx.parent_group_id = groups::ensure_parent_group(pool).await?;

    groups::create_input_groups(pool, ctx.parent_group_id).await?;
    groups::create_sub_lrc_groups(pool, ctx.parent_group_id).await?;

    let sources = discovery::discover_source_groups(pool).await?;
    tracing::info!("Discovered {} source groups", sources.len());

    ctx.ap_group_id = groups::configure_ap_channels(pool, &sources, ctx.parent_group_id).await?;

    views::meter::create_meter_view(pool, store, &sources, &mut ctx).await?;
    views::master::create_master_view(pool, store, &sources, &mut ctx).await?;
    views::nav::create_nav_buttons(pool, store, &mut ctx).await?;

    groups::add_sub_c_to_sub_l(pool, &sources).await?;

    Ok(())
}
