//! Persistent records exchanged with the storage collaborator.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::options::Options;
use crate::widget::Capabilities;

// ─── Lookup keys ─────────────────────────────────────────────────────────────

/// Selects an area or installed widget either by id or by slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    /// Numeric primary key.
    Id(u64),
    /// Unique slug.
    Slug(String),
}

impl RecordKey {
    /// Interprets a caller-supplied key: all-digit strings are ids, anything
    /// else is a slug.
    pub fn parse(key: &str) -> Self {
        match key.parse::<u64>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Slug(key.to_string()),
        }
    }
}

impl From<u64> for RecordKey {
    fn from(id: u64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for RecordKey {
    fn from(key: &str) -> Self {
        Self::parse(key)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Slug(slug) => f.write_str(slug),
        }
    }
}

// ─── Areas ───────────────────────────────────────────────────────────────────

/// A named placement zone in a layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    /// Primary key.
    pub id: u64,
    /// Display title.
    pub title: String,
    /// Unique slug used by layouts.
    pub slug: String,
}

/// Input for creating an [`Area`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewArea {
    /// Display title.
    pub title: String,
    /// Unique slug.
    pub slug: String,
}

// ─── Installed widgets ───────────────────────────────────────────────────────

/// A widget registered in storage and therefore usable in areas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledWidget {
    /// Primary key.
    pub id: u64,
    /// Slug of the widget package.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Short description.
    #[serde(default)]
    pub description: String,
    /// Author credit.
    #[serde(default)]
    pub author: String,
    /// Author or project website.
    #[serde(default)]
    pub website: String,
    /// Package version string.
    #[serde(default)]
    pub version: String,
}

/// Input for installing a widget.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewWidget {
    /// Slug of the widget package.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Short description.
    #[serde(default)]
    pub description: String,
    /// Author credit.
    #[serde(default)]
    pub author: String,
    /// Author or project website.
    #[serde(default)]
    pub website: String,
    /// Package version string.
    #[serde(default)]
    pub version: String,
}

// ─── Instances ───────────────────────────────────────────────────────────────

/// A stored placement of a widget in an area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// Primary key.
    pub id: u64,
    /// Instance title.
    pub title: String,
    /// Installed widget this instance uses.
    pub widget_id: u64,
    /// Area the instance is placed in.
    pub widget_area_id: u64,
    /// Slug of the installed widget (joined by the store).
    pub slug: String,
    /// Encoded options blob.
    pub options: String,
    /// Position inside the area.
    pub order: u32,
}

/// An instance with its options decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instance {
    /// Primary key.
    pub id: u64,
    /// Instance title.
    pub title: String,
    /// Installed widget this instance uses.
    pub widget_id: u64,
    /// Area the instance is placed in.
    pub widget_area_id: u64,
    /// Slug of the installed widget.
    pub slug: String,
    /// Decoded configuration.
    pub options: Options,
    /// Position inside the area.
    pub order: u32,
}

impl Instance {
    /// Combines a stored record with its decoded options.
    pub fn from_record(record: InstanceRecord, options: Options) -> Self {
        Self {
            id: record.id,
            title: record.title,
            widget_id: record.widget_id,
            widget_area_id: record.widget_area_id,
            slug: record.slug,
            options,
            order: record.order,
        }
    }
}

/// Input for creating an instance; `options` is already encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInstance {
    /// Instance title.
    pub title: String,
    /// Installed widget id.
    pub widget_id: u64,
    /// Target area id.
    pub widget_area_id: u64,
    /// Encoded options blob.
    pub options: String,
}

/// Changes applied by an instance edit; `options` is already encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceUpdate {
    /// New title.
    pub title: String,
    /// New area id.
    pub widget_area_id: u64,
    /// Encoded options blob.
    pub options: String,
}

// ─── Widget packages ─────────────────────────────────────────────────────────

/// Metadata read from a widget package's definition file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetManifest {
    /// Display title.
    pub title: String,
    /// Short description.
    pub description: String,
    /// Author credit.
    pub author: String,
    /// Author or project website.
    pub website: String,
    /// Package version string.
    pub version: String,
}

/// Lightweight description of a spawnable widget package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetSummary {
    /// Widget slug.
    pub slug: String,
    /// Metadata from the definition file.
    #[serde(flatten)]
    pub manifest: WidgetManifest,
    /// Hooks the implementation provides.
    pub capabilities: Capabilities,
}

impl WidgetSummary {
    /// Builds the installation input for this package.
    ///
    /// An empty manifest title falls back to the slug.
    pub fn to_new_widget(&self) -> NewWidget {
        let title = if self.manifest.title.is_empty() {
            self.slug.clone()
        } else {
            self.manifest.title.clone()
        };

        NewWidget {
            slug: self.slug.clone(),
            title,
            description: self.manifest.description.clone(),
            author: self.manifest.author.clone(),
            website: self.manifest.website.clone(),
            version: self.manifest.version.clone(),
        }
    }
}
