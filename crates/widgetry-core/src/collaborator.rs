//! Interfaces of the external systems the engine delegates to.
//!
//! The engine never reaches for a global container: storage, templating and
//! form validation are handed to it as trait objects.

use std::path::Path;

use crate::error::{StoreResult, ViewResult};
use crate::options::Options;
use crate::record::{
    Area, InstalledWidget, InstanceRecord, InstanceUpdate, NewArea, NewInstance, NewWidget,
    RecordKey,
};
use crate::widget::FieldRule;

/// Persistence of areas, installed widgets and instances.
///
/// Implementations are plain record stores; no transactions are assumed and
/// concurrent writers are last-write-wins.
pub trait WidgetStore: Send + Sync {
    /// All areas.
    fn get_areas(&self) -> StoreResult<Vec<Area>>;

    /// Instances placed in the area with `area_slug`, ordered by position.
    fn get_instances_by_area(&self, area_slug: &str) -> StoreResult<Vec<InstanceRecord>>;

    /// All installed widgets.
    fn get_widgets(&self) -> StoreResult<Vec<InstalledWidget>>;

    /// A single instance.
    fn get_instance(&self, id: u64) -> StoreResult<Option<InstanceRecord>>;

    /// An area by id or slug.
    fn get_area_by(&self, key: &RecordKey) -> StoreResult<Option<Area>>;

    /// An installed widget by id or slug.
    fn get_widget_by(&self, key: &RecordKey) -> StoreResult<Option<InstalledWidget>>;

    /// Installs a widget, returning its id.
    fn insert_widget(&self, widget: NewWidget) -> StoreResult<u64>;

    /// Uninstalls the widget with `slug` along with its instances.
    fn delete_widget(&self, slug: &str) -> StoreResult<bool>;

    /// Creates an area, returning its id.
    fn insert_area(&self, area: NewArea) -> StoreResult<u64>;

    /// Deletes an area along with its instances.
    fn delete_area(&self, id: u64) -> StoreResult<bool>;

    /// Creates an instance at the end of its area, returning its id.
    fn insert_instance(&self, instance: NewInstance) -> StoreResult<u64>;

    /// Applies an edit to an instance.
    fn update_instance(&self, id: u64, update: InstanceUpdate) -> StoreResult<bool>;

    /// Moves an instance to `position` within its area.
    fn update_instance_order(&self, id: u64, position: u32) -> StoreResult<bool>;

    /// Deletes an instance.
    fn delete_instance(&self, id: u64) -> StoreResult<bool>;
}

/// Renders a template file with a data context.
pub trait ViewRenderer: Send + Sync {
    /// Renders `template` with `context` into a string.
    fn render(&self, template: &Path, context: &Options) -> ViewResult<String>;
}

/// Evaluates form rules against submitted values.
pub trait FieldValidator: Send + Sync {
    /// Returns the formatted error messages, or `None` when every rule passed.
    fn validate(&self, rules: &[FieldRule], values: &Options) -> Option<Vec<String>>;
}
