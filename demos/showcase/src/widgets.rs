//! Widgets shipped with the showcase.
//!
//! Their packages (definition file and views) live under `widget/<slug>/`
//! next to this crate's `Cargo.toml`.

use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tracing::debug;
use widgetry::prelude::*;

const TAGS: [(&str, u32); 6] = [
    ("rust", 42),
    ("web", 31),
    ("templates", 17),
    ("cms", 12),
    ("plugins", 9),
    ("forms", 4),
];

const POSTS: [&str; 5] = [
    "Widget areas in five minutes",
    "Validating widget options",
    "Writing a display template",
    "Package roots and overrides",
    "Shipping a widget package",
];

/// Reads a positive count from `options[key]`, accepting numbers and numeric
/// strings.
fn count(options: &Options, key: &str, default: usize) -> usize {
    match options.get(key) {
        Some(Value::Number(n)) => n.as_u64().map_or(default, |n| n as usize),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

// ─── tags ────────────────────────────────────────────────────────────────────

/// Most used tags, largest first.
#[derive(Default)]
pub struct Tags {
    location: PathBuf,
}

#[register_widget("tags")]
impl Widget for Tags {
    fn set_location(&mut self, location: &Path) {
        self.location = location.to_path_buf();
    }

    fn fields(&self) -> Vec<FieldSpec> {
        vec![FieldSpec::new(
            "limit",
            "Number of tags",
            "trim|required|is_natural_no_zero|less_than[50]",
        )]
    }

    fn run(&mut self, options: &Options) -> HookResult<RunOutput> {
        debug!(location = %self.location.display(), "Listing tags");
        let tags: Vec<Value> = TAGS
            .iter()
            .take(count(options, "limit", TAGS.len()))
            .map(|(name, uses)| json!({ "name": name, "uses": uses }))
            .collect();
        Ok(RunOutput::Data(json!({ "tags": tags })))
    }
}

// ─── newest ──────────────────────────────────────────────────────────────────

/// Latest posts with a configurable heading.
#[derive(Default)]
pub struct Newest;

#[register_widget("newest")]
impl Widget for Newest {
    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("limit", "Number of posts", "trim|required|in_list[3,5]"),
            FieldSpec::new("heading", "Heading", "trim|max_length[40]"),
        ]
    }

    fn run(&mut self, options: &Options) -> HookResult<RunOutput> {
        let posts: Vec<&str> = POSTS.iter().copied().take(count(options, "limit", 3)).collect();
        if posts.is_empty() {
            return Ok(RunOutput::Suppress);
        }
        Ok(RunOutput::Data(json!({ "posts": posts })))
    }

    fn form(&mut self, options: &Options) -> HookResult<Options> {
        let mut data = Options::new();
        data.insert(OPTIONS_KEY.to_string(), Value::Object(options.clone()));
        data.insert("choices".to_string(), json!([3, 5]));
        Ok(data)
    }

    fn save(&mut self, mut options: Options) -> HookResult<Options> {
        let limit = count(&options, "limit", 3);
        options.insert("limit".to_string(), json!(limit));
        if let Some(Value::String(heading)) = options.get_mut("heading") {
            *heading = heading.trim().to_string();
        }
        Ok(options)
    }
}

// ─── html ────────────────────────────────────────────────────────────────────

/// Free-form markup entered by an administrator.
#[derive(Default)]
pub struct Html;

#[register_widget("html")]
impl Widget for Html {
    fn fields(&self) -> Vec<FieldSpec> {
        vec![FieldSpec::new("html", "HTML", "required")]
    }
}
