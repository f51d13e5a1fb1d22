//! Template store
//!
//! The template file holds a library of pre-authored layout fragments: a
//! Sections table naming each template and a Controls table holding its
//! rows, linked by JoinedId. The whole library is read once up front and
//! replayed from memory for every project.

use sqlx::{Row, SqlitePool};
use vgen_common::db::controls::{self, ControlRow};
use vgen_common::{Error, Result};

/// A named layout fragment: control rows with template-relative positions.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub joined_id: i64,
    pub controls: Vec<ControlRow>,
}

impl Template {
    /// Bounding size of the fragment: max over rows of position + extent.
    pub fn size(&self) -> (i64, i64) {
        let mut width = 0;
        let mut height = 0;
        for control in &self.controls {
            width = width.max(control.pos_x + control.width);
            height = height.max(control.pos_y + control.height);
        }
        (width, height)
    }
}

/// The loaded template library.
#[derive(Debug)]
pub struct TemplateStore {
    templates: Vec<Template>,
}

impl TemplateStore {
    /// Load every template from the template database.
    pub async fn load(pool: &SqlitePool) -> Result<Self> {
        let sections = sqlx::query("SELECT Name, JoinedId FROM Sections ORDER BY JoinedId ASC")
            .fetch_all(pool)
            .await?;

        let mut templates = Vec::with_capacity(sections.len());
        for section in &sections {
            let name: String = section.get("Name");
            let joined_id: i64 = section.get("JoinedId");
            let controls = controls::controls_by_joined_id(pool, joined_id).await?;
            tracing::debug!("Loaded template {} ({} controls)", name, controls.len());
            templates.push(Template {
                name,
                joined_id,
                controls,
            });
        }

        tracing::info!("Loaded {} templates", templates.len());
        Ok(Self { templates })
    }

    /// Look up a template by exact name.
    pub fn get(&self, name: &str) -> Result<&Template> {
        self.templates
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| Error::TemplateNotFound(name.to_string()))
    }

    /// Bounding size of a named template.
    pub fn size(&self, name: &str) -> Result<(i64, i64)> {
        Ok(self.get(name)?.size())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
