//! Widget descriptor: the static, `Copy` handle to a widget type.

use linkme::distributed_slice;

use super::Widget;

// ─── API versioning ──────────────────────────────────────────────────────────

/// Current widget API version (1.0).
pub const WIDGET_API_VERSION: u32 = 0x0001_0000;

// ─── WidgetDescriptor ────────────────────────────────────────────────────────

/// A static descriptor that names and instantiates a widget type.
///
/// Produced by `#[register_widget("slug")]` and collected in
/// [`WIDGET_REGISTRY`]; can also be built by hand and registered explicitly.
#[derive(Debug, Clone, Copy)]
pub struct WidgetDescriptor {
    /// Widget API version this descriptor was compiled against.
    pub api_version: u32,

    /// Slug the implementation answers to (the widget directory name).
    pub slug: &'static str,

    /// Factory creating a fresh widget value.
    pub create: fn() -> Box<dyn Widget>,
}

impl WidgetDescriptor {
    /// Creates a descriptor for the current API version.
    pub const fn new(slug: &'static str, create: fn() -> Box<dyn Widget>) -> Self {
        Self {
            api_version: WIDGET_API_VERSION,
            slug,
            create,
        }
    }

    /// Returns `true` if this descriptor's API version is compatible with the
    /// running engine.
    ///
    /// The major part must match exactly; the descriptor's minor part must be
    /// ≤ the host's minor part.
    pub fn is_compatible(&self) -> bool {
        let host_major = WIDGET_API_VERSION >> 16;
        let desc_major = self.api_version >> 16;
        let desc_minor = self.api_version & 0xFFFF;
        let host_minor = WIDGET_API_VERSION & 0xFFFF;
        desc_major == host_major && desc_minor <= host_minor
    }

    /// Creates a new widget value.
    #[inline]
    pub fn instantiate(&self) -> Box<dyn Widget> {
        (self.create)()
    }
}

// ─── Link-time registry ──────────────────────────────────────────────────────

/// Every widget registered with `#[register_widget]`, across all linked crates.
#[distributed_slice]
pub static WIDGET_REGISTRY: [WidgetDescriptor];
