//! Fixtures shared by the unit tests: on-disk packages, test widgets and
//! in-memory collaborators.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde_json::{Value, json};
use tempfile::TempDir;
use widgetry_core::{
    Area, Capabilities, FieldRule, FieldSpec, FieldValidator, HookResult, InstalledWidget,
    InstanceRecord, InstanceUpdate, NewArea, NewInstance, NewWidget, Options, RecordKey, RunOutput,
    StoreResult, ViewRenderer, ViewResult, Widget, WidgetDescriptor, WidgetStore,
};

use crate::catalog::WidgetCatalog;
use crate::manager::WidgetManager;
use crate::registry::WidgetRegistry;
use crate::spawner::{VIEWS_DIR, WidgetSpawner, definition_path};

/// Unwraps a JSON object literal into [`Options`].
pub fn options(value: Value) -> Options {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

// =============================================================================
// Package fixture
// =============================================================================

/// A temporary package root with a `widget/` directory.
pub struct Fixture {
    root: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("widget")).unwrap();
        Self { root }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Creates a package directory without a definition file.
    pub fn bare_package(&self, slug: &str) -> PathBuf {
        let location = self.root.path().join("widget").join(slug);
        fs::create_dir_all(&location).unwrap();
        location
    }

    /// Creates a package with the given definition file contents.
    pub fn package(&self, slug: &str, definition: &str) -> PathBuf {
        let location = self.bare_package(slug);
        fs::write(definition_path(&location, slug), definition).unwrap();
        location
    }

    /// Writes a template into a package's `views/` directory.
    pub fn view(&self, slug: &str, file: &str, contents: &str) {
        let dir = self.root.path().join("widget").join(slug).join(VIEWS_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file), contents).unwrap();
    }

    /// Package with definition and both templates.
    pub fn full_package(&self, slug: &str, title: &str) -> PathBuf {
        let location = self.package(slug, &format!("title = \"{title}\"\n"));
        self.view(slug, "display.html", "");
        self.view(slug, "form.html", "");
        location
    }

    pub fn catalog(&self) -> WidgetCatalog {
        WidgetCatalog::build([self.root.path()])
    }

    /// Registry holding every test widget.
    pub fn registry(&self) -> WidgetRegistry {
        WidgetRegistry::new()
            .with_widget(WidgetDescriptor::new("tags", || Box::new(Tags::default())))
            .with_widget(WidgetDescriptor::new("newest", || Box::new(Newest)))
            .with_widget(WidgetDescriptor::new("html", || Box::new(Html)))
            .with_widget(WidgetDescriptor::new("hidden", || Box::new(Hidden)))
            .with_widget(WidgetDescriptor::new("broken", || Box::new(Broken)))
            .with_widget(WidgetDescriptor::new("shadow", || Box::new(Shadow)))
    }

    pub fn spawner(&self) -> WidgetSpawner {
        WidgetSpawner::new(self.catalog(), self.registry())
    }

    /// Manager over this fixture with echoing views and the required-only
    /// validator.
    pub fn manager(&self, store: Arc<RecordingStore>) -> WidgetManager {
        WidgetManager::new(
            self.catalog(),
            self.registry(),
            store,
            Arc::new(EchoRenderer),
            Arc::new(RequiredValidator::default()),
        )
    }
}

// =============================================================================
// Test widgets
// =============================================================================

/// Fields + run; reports the package directory it was spawned from.
#[derive(Default)]
pub struct Tags {
    location: PathBuf,
}

impl Widget for Tags {
    fn set_location(&mut self, location: &Path) {
        self.location = location.to_path_buf();
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::RUN | Capabilities::FIELDS
    }

    fn run(&mut self, _options: &Options) -> HookResult<RunOutput> {
        let package = self
            .location
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        Ok(RunOutput::Data(json!({"tags": ["rust", "web"], "package": package})))
    }

    fn fields(&self) -> Vec<FieldSpec> {
        vec![FieldSpec::new("limit", "Limit", "trim|required|is_natural_no_zero")]
    }
}

/// Every hook; the display hook returns a list.
pub struct Newest;

impl Widget for Newest {
    fn capabilities(&self) -> Capabilities {
        Capabilities::RUN | Capabilities::FORM | Capabilities::SAVE | Capabilities::FIELDS
    }

    fn run(&mut self, _options: &Options) -> HookResult<RunOutput> {
        Ok(RunOutput::Data(json!(["first post", "second post"])))
    }

    fn form(&mut self, options: &Options) -> HookResult<Options> {
        let mut data = Options::new();
        data.insert("options".into(), Value::Object(options.clone()));
        data.insert("choices".into(), json!([5, 10, 20]));
        Ok(data)
    }

    fn save(&mut self, mut options: Options) -> HookResult<Options> {
        options.insert("prepared".into(), Value::Bool(true));
        Ok(options)
    }

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("limit", "Number to show", "required|numeric"),
            FieldSpec::new("heading", "Heading", "max_length[40]"),
        ]
    }
}

/// No hooks at all.
pub struct Html;

impl Widget for Html {}

/// Always suppresses its output.
pub struct Hidden;

impl Widget for Hidden {
    fn capabilities(&self) -> Capabilities {
        Capabilities::RUN
    }

    fn run(&mut self, _options: &Options) -> HookResult<RunOutput> {
        Ok(RunOutput::Suppress)
    }
}

/// Display hook always fails.
pub struct Broken;

impl Widget for Broken {
    fn capabilities(&self) -> Capabilities {
        Capabilities::RUN
    }

    fn run(&mut self, _options: &Options) -> HookResult<RunOutput> {
        Err("feed unavailable".into())
    }
}

/// Display hook tries to supply its own `options` entry.
pub struct Shadow;

impl Widget for Shadow {
    fn capabilities(&self) -> Capabilities {
        Capabilities::RUN
    }

    fn run(&mut self, _options: &Options) -> HookResult<RunOutput> {
        Ok(RunOutput::Data(json!({"options": "fake", "x": 1})))
    }
}

// =============================================================================
// Collaborators
// =============================================================================

/// Renders `<template file name>|<context as JSON>`.
pub struct EchoRenderer;

impl EchoRenderer {
    /// Splits rendered output back into template name and context.
    pub fn split(rendered: &str) -> (String, Value) {
        let (name, context) = rendered.split_once('|').unwrap();
        (name.to_string(), serde_json::from_str(context).unwrap())
    }
}

impl ViewRenderer for EchoRenderer {
    fn render(&self, template: &Path, context: &Options) -> ViewResult<String> {
        let name = template
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(format!("{name}|{}", Value::Object(context.clone())))
    }
}

/// Only understands `required`.
#[derive(Default)]
pub struct RequiredValidator {
    calls: AtomicUsize,
}

impl RequiredValidator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FieldValidator for RequiredValidator {
    fn validate(&self, rules: &[FieldRule], values: &Options) -> Option<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let errors: Vec<String> = rules
            .iter()
            .filter(|rule| rule.has_rule("required"))
            .filter(|rule| match values.get(&rule.field) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(_) => false,
            })
            .map(|rule| format!("The {} field is required.", rule.label))
            .collect();

        (!errors.is_empty()).then_some(errors)
    }
}

#[derive(Default)]
struct StoreState {
    areas: Vec<Area>,
    widgets: Vec<InstalledWidget>,
    instances: Vec<InstanceRecord>,
    next_id: u64,
    writes: Vec<&'static str>,
}

impl StoreState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory store that records every write call.
#[derive(Default)]
pub struct RecordingStore {
    state: Mutex<StoreState>,
}

impl RecordingStore {
    /// Installs a widget without recording a write.
    pub fn seed_widget(&self, slug: &str) -> u64 {
        let mut state = self.state.lock();
        let id = state.next_id();
        state.widgets.push(InstalledWidget {
            id,
            slug: slug.to_string(),
            title: slug.to_string(),
            description: String::new(),
            author: String::new(),
            website: String::new(),
            version: String::new(),
        });
        id
    }

    /// Creates an area without recording a write.
    pub fn seed_area(&self, slug: &str) -> u64 {
        let mut state = self.state.lock();
        let id = state.next_id();
        state.areas.push(Area {
            id,
            title: slug.to_string(),
            slug: slug.to_string(),
        });
        id
    }

    /// Stores an instance with a raw options blob, without recording a write.
    pub fn seed_instance(&self, widget_id: u64, area_id: u64, title: &str, blob: &str) -> u64 {
        let mut state = self.state.lock();
        let id = state.next_id();
        let slug = state
            .widgets
            .iter()
            .find(|w| w.id == widget_id)
            .map(|w| w.slug.clone())
            .unwrap_or_default();
        let order = state
            .instances
            .iter()
            .filter(|i| i.widget_area_id == area_id)
            .count() as u32;
        state.instances.push(InstanceRecord {
            id,
            title: title.to_string(),
            widget_id,
            widget_area_id: area_id,
            slug,
            options: blob.to_string(),
            order,
        });
        id
    }

    pub fn writes(&self) -> Vec<&'static str> {
        self.state.lock().writes.clone()
    }

    pub fn raw_instance(&self, id: u64) -> Option<InstanceRecord> {
        self.state.lock().instances.iter().find(|i| i.id == id).cloned()
    }

    pub fn instance_count(&self) -> usize {
        self.state.lock().instances.len()
    }
}

impl WidgetStore for RecordingStore {
    fn get_areas(&self) -> StoreResult<Vec<Area>> {
        Ok(self.state.lock().areas.clone())
    }

    fn get_instances_by_area(&self, area_slug: &str) -> StoreResult<Vec<InstanceRecord>> {
        let state = self.state.lock();
        let Some(area) = state.areas.iter().find(|a| a.slug == area_slug) else {
            return Ok(Vec::new());
        };
        let mut instances: Vec<_> = state
            .instances
            .iter()
            .filter(|i| i.widget_area_id == area.id)
            .cloned()
            .collect();
        instances.sort_by_key(|i| i.order);
        Ok(instances)
    }

    fn get_widgets(&self) -> StoreResult<Vec<InstalledWidget>> {
        Ok(self.state.lock().widgets.clone())
    }

    fn get_instance(&self, id: u64) -> StoreResult<Option<InstanceRecord>> {
        Ok(self.raw_instance(id))
    }

    fn get_area_by(&self, key: &RecordKey) -> StoreResult<Option<Area>> {
        let state = self.state.lock();
        Ok(state
            .areas
            .iter()
            .find(|a| match key {
                RecordKey::Id(id) => a.id == *id,
                RecordKey::Slug(slug) => &a.slug == slug,
            })
            .cloned())
    }

    fn get_widget_by(&self, key: &RecordKey) -> StoreResult<Option<InstalledWidget>> {
        let state = self.state.lock();
        Ok(state
            .widgets
            .iter()
            .find(|w| match key {
                RecordKey::Id(id) => w.id == *id,
                RecordKey::Slug(slug) => &w.slug == slug,
            })
            .cloned())
    }

    fn insert_widget(&self, widget: NewWidget) -> StoreResult<u64> {
        let mut state = self.state.lock();
        state.writes.push("insert_widget");
        let id = state.next_id();
        state.widgets.push(InstalledWidget {
            id,
            slug: widget.slug,
            title: widget.title,
            description: widget.description,
            author: widget.author,
            website: widget.website,
            version: widget.version,
        });
        Ok(id)
    }

    fn delete_widget(&self, slug: &str) -> StoreResult<bool> {
        let mut state = self.state.lock();
        state.writes.push("delete_widget");
        let before = state.widgets.len();
        state.widgets.retain(|w| w.slug != slug);
        state.instances.retain(|i| i.slug != slug);
        Ok(state.widgets.len() != before)
    }

    fn insert_area(&self, area: NewArea) -> StoreResult<u64> {
        let mut state = self.state.lock();
        state.writes.push("insert_area");
        let id = state.next_id();
        state.areas.push(Area {
            id,
            title: area.title,
            slug: area.slug,
        });
        Ok(id)
    }

    fn delete_area(&self, id: u64) -> StoreResult<bool> {
        let mut state = self.state.lock();
        state.writes.push("delete_area");
        let before = state.areas.len();
        state.areas.retain(|a| a.id != id);
        state.instances.retain(|i| i.widget_area_id != id);
        Ok(state.areas.len() != before)
    }

    fn insert_instance(&self, instance: NewInstance) -> StoreResult<u64> {
        self.state.lock().writes.push("insert_instance");
        Ok(self.seed_instance(
            instance.widget_id,
            instance.widget_area_id,
            &instance.title,
            &instance.options,
        ))
    }

    fn update_instance(&self, id: u64, update: InstanceUpdate) -> StoreResult<bool> {
        let mut state = self.state.lock();
        state.writes.push("update_instance");
        let Some(instance) = state.instances.iter_mut().find(|i| i.id == id) else {
            return Ok(false);
        };
        instance.title = update.title;
        instance.widget_area_id = update.widget_area_id;
        instance.options = update.options;
        Ok(true)
    }

    fn update_instance_order(&self, id: u64, position: u32) -> StoreResult<bool> {
        let mut state = self.state.lock();
        state.writes.push("update_instance_order");
        let Some(instance) = state.instances.iter_mut().find(|i| i.id == id) else {
            return Ok(false);
        };
        instance.order = position;
        Ok(true)
    }

    fn delete_instance(&self, id: u64) -> StoreResult<bool> {
        let mut state = self.state.lock();
        state.writes.push("delete_instance");
        let before = state.instances.len();
        state.instances.retain(|i| i.id != id);
        Ok(state.instances.len() != before)
    }
}
