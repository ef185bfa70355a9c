//! Slug → implementation lookup.
//!
//! [`WidgetRegistry::collect_all`] gathers every descriptor that
//! `#[register_widget]` placed in the link-time [`WIDGET_REGISTRY`];
//! [`WidgetRegistry::with_widget`] adds or overrides entries by hand.

use std::collections::HashMap;

use tracing::{debug, warn};
use widgetry_core::{WIDGET_API_VERSION, WIDGET_REGISTRY, WidgetDescriptor};

/// Widget implementations keyed by slug.
#[derive(Debug, Clone, Default)]
pub struct WidgetRegistry {
    descriptors: HashMap<&'static str, WidgetDescriptor>,
}

impl WidgetRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every widget linked into the binary.
    ///
    /// Descriptors built against an incompatible API version are skipped.
    /// When several descriptors claim the same slug the first one wins.
    pub fn collect_all() -> Self {
        let mut registry = Self::new();

        for descriptor in WIDGET_REGISTRY.iter() {
            if !descriptor.is_compatible() {
                warn!(
                    slug         = descriptor.slug,
                    api_version  = format_args!("{:#010x}", descriptor.api_version),
                    host_version = format_args!("{:#010x}", WIDGET_API_VERSION),
                    "Widget API version incompatible, skipping"
                );
                continue;
            }

            if registry.descriptors.contains_key(descriptor.slug) {
                warn!(
                    slug = descriptor.slug,
                    "Multiple widget implementations registered, using first"
                );
                continue;
            }

            registry.descriptors.insert(descriptor.slug, *descriptor);
        }

        debug!(widgets = registry.len(), "Widget implementations collected");
        registry
    }

    /// Registers `descriptor`, replacing any entry with the same slug.
    pub fn register(&mut self, descriptor: WidgetDescriptor) {
        if self.descriptors.insert(descriptor.slug, descriptor).is_some() {
            debug!(slug = descriptor.slug, "Widget implementation replaced");
        }
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_widget(mut self, descriptor: WidgetDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    /// Descriptor registered for `slug`.
    pub fn get(&self, slug: &str) -> Option<&WidgetDescriptor> {
        self.descriptors.get(slug)
    }

    /// Returns `true` if an implementation is registered for `slug`.
    pub fn contains(&self, slug: &str) -> bool {
        self.descriptors.contains_key(slug)
    }

    /// Registered slugs, sorted.
    pub fn slugs(&self) -> Vec<&'static str> {
        let mut slugs: Vec<_> = self.descriptors.keys().copied().collect();
        slugs.sort_unstable();
        slugs
    }

    /// Number of registered implementations.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
