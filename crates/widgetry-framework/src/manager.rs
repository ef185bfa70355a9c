//! The widget engine facade.
//!
//! [`WidgetManager`] is what applications talk to. It owns the
//! [`WidgetSpawner`] (catalog + registry) and the three collaborators, and
//! exposes:
//!
//! - **Public rendering**: [`render_display`](WidgetManager::render_display),
//!   [`render_area`](WidgetManager::render_area)
//! - **Admin forms**: [`render_form`](WidgetManager::render_form),
//!   [`validation_errors`](WidgetManager::validation_errors),
//!   [`prepare_options`](WidgetManager::prepare_options)
//! - **Queries**: areas, instances, installed and uninstalled widgets
//! - **Mutations**: add/edit/delete of instances, areas and installed widgets,
//!   returning an [`Outcome`] where input is validated
//!
//! Every operation spawns the widgets it needs afresh, so nothing leaks between
//! a form submission and its validation.
//!
//! # Example
//!
//! ```rust,ignore
//! let manager = WidgetManager::new(catalog, registry, store, views, validator);
//!
//! let outcome = manager.add_instance("Popular tags", tags_id, sidebar_id, options)?;
//! for rendered in manager.render_area("sidebar")? {
//!     println!("{}", rendered.html);
//! }
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use widgetry_core::{
    Area, FieldValidator, InstalledWidget, Instance, InstanceRecord, InstanceUpdate,
    JsonOptionCodec, NewArea, NewInstance, NewWidget, OptionCodec, Options, Outcome, RecordKey,
    ViewRenderer, WidgetError, WidgetResult, WidgetStore, WidgetSummary,
};

use crate::catalog::WidgetCatalog;
use crate::registry::WidgetRegistry;
use crate::render::RenderPipeline;
use crate::spawner::{SpawnedWidget, WidgetSpawner};
use crate::validation::ValidationAdapter;

/// One rendered instance of an area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedInstance {
    /// Instance id.
    pub id: u64,
    /// Instance title.
    pub title: String,
    /// Widget slug.
    pub slug: String,
    /// Display output.
    pub html: String,
}

/// Entry point of the widget engine.
pub struct WidgetManager {
    spawner: WidgetSpawner,
    store: Arc<dyn WidgetStore>,
    pipeline: RenderPipeline,
    validation: ValidationAdapter,
    codec: Arc<dyn OptionCodec>,
}

impl WidgetManager {
    /// Creates a manager using the JSON option codec.
    pub fn new(
        catalog: WidgetCatalog,
        registry: WidgetRegistry,
        store: Arc<dyn WidgetStore>,
        views: Arc<dyn ViewRenderer>,
        validator: Arc<dyn FieldValidator>,
    ) -> Self {
        Self {
            spawner: WidgetSpawner::new(catalog, registry),
            store,
            pipeline: RenderPipeline::new(views),
            validation: ValidationAdapter::new(validator),
            codec: Arc::new(JsonOptionCodec),
        }
    }

    /// Replaces the option codec.
    pub fn with_codec(mut self, codec: Arc<dyn OptionCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// The discovered widget packages.
    pub fn catalog(&self) -> &WidgetCatalog {
        self.spawner.catalog()
    }

    /// The registered widget implementations.
    pub fn registry(&self) -> &WidgetRegistry {
        self.spawner.registry()
    }

    /// Spawns a widget directly.
    pub fn spawn(&self, slug: &str) -> WidgetResult<Option<SpawnedWidget>> {
        self.spawner.spawn(slug)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All areas.
    pub fn list_areas(&self) -> WidgetResult<Vec<Area>> {
        Ok(self.store.get_areas()?)
    }

    /// Instances of the area with `area_slug`, in position order.
    pub fn list_instances_in_area(&self, area_slug: &str) -> WidgetResult<Vec<Instance>> {
        let records = self.store.get_instances_by_area(area_slug)?;
        Ok(records.into_iter().map(|r| self.decode(r)).collect())
    }

    /// Installed widgets.
    pub fn list_available_widgets(&self) -> WidgetResult<Vec<InstalledWidget>> {
        Ok(self.store.get_widgets()?)
    }

    /// Spawnable catalog widgets that are not installed, in discovery order.
    ///
    /// Packages without a definition file are left out, as are packages that
    /// fail to spawn (logged).
    pub fn list_uninstalled_widgets(&self) -> WidgetResult<Vec<WidgetSummary>> {
        let installed: HashSet<String> = self
            .store
            .get_widgets()?
            .into_iter()
            .map(|w| w.slug)
            .collect();

        let mut uninstalled = Vec::new();
        for slug in self.catalog().slugs() {
            if installed.contains(slug) {
                continue;
            }
            match self.spawner.spawn(slug) {
                Ok(Some(widget)) => uninstalled.push(widget.summary()),
                Ok(None) => {}
                Err(e) => warn!(slug, error = %e, "Skipping widget that cannot be spawned"),
            }
        }

        debug!(count = uninstalled.len(), "Uninstalled widgets listed");
        Ok(uninstalled)
    }

    /// An instance with its options decoded.
    pub fn get_instance(&self, id: u64) -> WidgetResult<Option<Instance>> {
        Ok(self.store.get_instance(id)?.map(|r| self.decode(r)))
    }

    /// An area by id or slug.
    pub fn get_area(&self, key: impl Into<RecordKey>) -> WidgetResult<Option<Area>> {
        Ok(self.store.get_area_by(&key.into())?)
    }

    /// An installed widget by id or slug.
    pub fn get_widget(&self, key: impl Into<RecordKey>) -> WidgetResult<Option<InstalledWidget>> {
        Ok(self.store.get_widget_by(&key.into())?)
    }

    /// Describes a catalog widget, `None` when it has no definition file.
    pub fn read_widget(&self, slug: &str) -> WidgetResult<Option<WidgetSummary>> {
        Ok(self.spawner.spawn(slug)?.map(|w| w.summary()))
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Renders the public output of widget `slug` configured with `options`.
    ///
    /// `None` means there is nothing to show: the package has no definition
    /// file or the widget suppressed itself.
    pub fn render_display(&self, slug: &str, options: &Options) -> WidgetResult<Option<String>> {
        match self.spawner.spawn(slug)? {
            Some(mut widget) => self.pipeline.display(&mut widget, options),
            None => Ok(None),
        }
    }

    /// Renders the edit form of widget `slug` pre-filled from `saved`.
    pub fn render_form(&self, slug: &str, saved: &Options) -> WidgetResult<String> {
        self.render_form_with_input(slug, saved, &Options::new())
    }

    /// Renders the edit form, preferring `submitted` values over `saved` ones.
    ///
    /// Used to re-display a form after failed validation.
    pub fn render_form_with_input(
        &self,
        slug: &str,
        saved: &Options,
        submitted: &Options,
    ) -> WidgetResult<String> {
        match self.spawner.spawn(slug)? {
            Some(mut widget) => self.pipeline.form(&mut widget, saved, submitted),
            None => Ok(String::new()),
        }
    }

    /// Renders every instance of an area in order.
    ///
    /// Instances that render to nothing are skipped, as are instances whose
    /// widget is no longer in the catalog or has no linked implementation.
    /// Hook and template failures still propagate.
    pub fn render_area(&self, area_slug: &str) -> WidgetResult<Vec<RenderedInstance>> {
        let mut rendered = Vec::new();

        for instance in self.list_instances_in_area(area_slug)? {
            let html = match self.render_display(&instance.slug, &instance.options) {
                Ok(Some(html)) => html,
                Ok(None) => continue,
                Err(
                    e @ (WidgetError::UnknownWidget { .. }
                    | WidgetError::ImplementationMissing { .. }),
                ) => {
                    warn!(
                        instance = instance.id,
                        slug = %instance.slug,
                        error = %e,
                        "Skipping instance whose widget cannot be loaded"
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };
            rendered.push(RenderedInstance {
                id: instance.id,
                title: instance.title,
                slug: instance.slug,
                html,
            });
        }

        Ok(rendered)
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validation messages for `options` submitted to widget `slug`.
    pub fn validation_errors(&self, slug: &str, options: &Options) -> WidgetResult<Vec<String>> {
        match self.spawner.spawn(slug)? {
            Some(widget) => Ok(self.validation.errors(&widget, options)),
            None => Ok(Vec::new()),
        }
    }

    /// Runs the widget's save hook over `options`.
    pub fn prepare_options(&self, slug: &str, options: Options) -> WidgetResult<Options> {
        match self.spawner.spawn(slug)? {
            Some(mut widget) => widget.save(options),
            None => Ok(options),
        }
    }

    // =========================================================================
    // Instances
    // =========================================================================

    /// Places widget `widget_id` in area `area_id`.
    ///
    /// Options are validated against the widget's fields, passed through its
    /// save hook and encoded before they reach the store. Invalid options
    /// yield [`Outcome::Error`] and nothing is written.
    ///
    /// # Errors
    ///
    /// [`WidgetError::WidgetNotFound`] if `widget_id` is not installed.
    pub fn add_instance(
        &self,
        title: &str,
        widget_id: u64,
        area_id: u64,
        options: Options,
    ) -> WidgetResult<Outcome> {
        let slug = self
            .store
            .get_widget_by(&RecordKey::Id(widget_id))?
            .ok_or_else(|| WidgetError::WidgetNotFound {
                key: widget_id.to_string(),
            })?
            .slug;

        let errors = self.validation_errors(&slug, &options)?;
        if !errors.is_empty() {
            debug!(slug = %slug, errors = errors.len(), "Instance rejected");
            return Ok(Outcome::error(errors));
        }

        let options = self.prepare_options(&slug, options)?;
        let id = self.store.insert_instance(NewInstance {
            title: title.to_string(),
            widget_id,
            widget_area_id: area_id,
            options: self.codec.encode(&options),
        })?;

        info!(id, slug = %slug, area_id, "Widget instance added");
        Ok(Outcome::Success)
    }

    /// Updates the title, area and options of an instance.
    ///
    /// Same validation and preparation as [`add_instance`](Self::add_instance).
    ///
    /// # Errors
    ///
    /// [`WidgetError::InstanceNotFound`] if `instance_id` does not exist.
    pub fn edit_instance(
        &self,
        instance_id: u64,
        title: &str,
        area_id: u64,
        options: Options,
    ) -> WidgetResult<Outcome> {
        let slug = self
            .store
            .get_instance(instance_id)?
            .ok_or(WidgetError::InstanceNotFound { id: instance_id })?
            .slug;

        let errors = self.validation_errors(&slug, &options)?;
        if !errors.is_empty() {
            debug!(id = instance_id, errors = errors.len(), "Instance edit rejected");
            return Ok(Outcome::error(errors));
        }

        let options = self.prepare_options(&slug, options)?;
        self.store.update_instance(
            instance_id,
            InstanceUpdate {
                title: title.to_string(),
                widget_area_id: area_id,
                options: self.codec.encode(&options),
            },
        )?;

        info!(id = instance_id, slug = %slug, area_id, "Widget instance updated");
        Ok(Outcome::Success)
    }

    /// Moves an instance to `position` within its area.
    pub fn update_instance_order(&self, id: u64, position: u32) -> WidgetResult<bool> {
        Ok(self.store.update_instance_order(id, position)?)
    }

    /// Removes an instance.
    pub fn delete_instance(&self, id: u64) -> WidgetResult<bool> {
        let deleted = self.store.delete_instance(id)?;
        if deleted {
            info!(id, "Widget instance deleted");
        }
        Ok(deleted)
    }

    // =========================================================================
    // Areas
    // =========================================================================

    /// Creates an area.
    ///
    /// The title is required; the slug is required, limited to letters,
    /// digits, `_` and `-`, and must be unused.
    pub fn add_area(&self, area: NewArea) -> WidgetResult<Outcome> {
        let mut errors = Vec::new();
        if area.title.trim().is_empty() {
            errors.push("The Title field is required.".to_string());
        }
        if area.slug.is_empty() {
            errors.push("The Slug field is required.".to_string());
        } else if !is_alpha_dash(&area.slug) {
            errors.push(
                "The Slug field may only contain alpha-numeric characters, underscores, and dashes."
                    .to_string(),
            );
        } else if self
            .store
            .get_area_by(&RecordKey::Slug(area.slug.clone()))?
            .is_some()
        {
            errors.push(format!("An area with the slug \"{}\" already exists.", area.slug));
        }

        if !errors.is_empty() {
            return Ok(Outcome::error(errors));
        }

        let slug = area.slug.clone();
        let id = self.store.insert_area(area)?;
        info!(id, slug = %slug, "Widget area added");
        Ok(Outcome::Success)
    }

    /// Removes an area and its instances.
    pub fn delete_area(&self, id: u64) -> WidgetResult<bool> {
        let deleted = self.store.delete_area(id)?;
        if deleted {
            info!(id, "Widget area deleted");
        }
        Ok(deleted)
    }

    // =========================================================================
    // Installed widgets
    // =========================================================================

    /// Installs a widget.
    ///
    /// Slug and title are required and the slug must not be installed yet.
    pub fn add_widget(&self, widget: NewWidget) -> WidgetResult<Outcome> {
        let mut errors = Vec::new();
        if widget.slug.trim().is_empty() {
            errors.push("The Slug field is required.".to_string());
        }
        if widget.title.trim().is_empty() {
            errors.push("The Title field is required.".to_string());
        }
        if errors.is_empty()
            && self
                .store
                .get_widget_by(&RecordKey::Slug(widget.slug.clone()))?
                .is_some()
        {
            errors.push(format!("The widget \"{}\" is already installed.", widget.slug));
        }

        if !errors.is_empty() {
            return Ok(Outcome::error(errors));
        }

        let slug = widget.slug.clone();
        let id = self.store.insert_widget(widget)?;
        info!(id, slug = %slug, "Widget installed");
        Ok(Outcome::Success)
    }

    /// Installs a catalog widget using the metadata of its definition file.
    pub fn install_widget(&self, slug: &str) -> WidgetResult<Outcome> {
        match self.read_widget(slug)? {
            Some(summary) => self.add_widget(summary.to_new_widget()),
            None => Ok(Outcome::error([format!(
                "The widget \"{slug}\" has no definition file."
            )])),
        }
    }

    /// Uninstalls a widget and removes its instances.
    pub fn delete_widget(&self, slug: &str) -> WidgetResult<bool> {
        let deleted = self.store.delete_widget(slug)?;
        if deleted {
            info!(slug, "Widget uninstalled");
        }
        Ok(deleted)
    }

    fn decode(&self, record: InstanceRecord) -> Instance {
        let options = self.codec.decode(&record.options);
        Instance::from_record(record, options)
    }
}

fn is_alpha_dash(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
