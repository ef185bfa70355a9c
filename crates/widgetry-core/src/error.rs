//! Unified error types for the Widgetry core.
//!
//! Expected conditions (a widget without its definition file, failed form
//! validation, corrupted stored options) never show up here: they are turned
//! into `None`, [`Outcome::Error`](crate::Outcome) or an empty option map by
//! the layer that meets them. What remains are the conditions a caller has to
//! deal with.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error returned by widget hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for widget hook implementations.
pub type HookResult<T> = Result<T, BoxError>;

// =============================================================================
// Store Errors
// =============================================================================

/// Errors reported by a [`WidgetStore`](crate::WidgetStore) implementation.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A record that the operation needs does not exist.
    #[error("{kind} '{key}' not found")]
    NotFound {
        /// Record kind (`area`, `widget`, `instance`).
        kind: &'static str,
        /// Lookup key that failed.
        key: String,
    },

    /// The backing storage failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Creates a not-found error.
    pub fn not_found(kind: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    /// Creates a backend error.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

// =============================================================================
// View Errors
// =============================================================================

/// Errors reported by a [`ViewRenderer`](crate::ViewRenderer) implementation.
#[derive(Debug, Error)]
pub enum ViewError {
    /// The template file could not be read.
    #[error("failed to read template {}: {source}", .path.display())]
    Io {
        /// Template path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The template engine rejected the template or the data.
    #[error("failed to render template {}: {reason}", .path.display())]
    Render {
        /// Template path.
        path: PathBuf,
        /// Engine message.
        reason: String,
    },
}

// =============================================================================
// Widget Errors
// =============================================================================

/// Errors surfaced by the widget engine.
#[derive(Debug, Error)]
pub enum WidgetError {
    /// The slug was never discovered by the catalog.
    #[error("unknown widget '{slug}'")]
    UnknownWidget {
        /// Requested slug.
        slug: String,
    },

    /// The definition file exists but no implementation is registered for it.
    #[error("widget '{slug}' has a definition file but no registered implementation")]
    ImplementationMissing {
        /// Widget slug.
        slug: String,
    },

    /// A widget hook failed.
    #[error("widget '{slug}' failed in `{hook}`: {source}")]
    Hook {
        /// Widget slug.
        slug: String,
        /// Hook name (`run`, `form`, `save`).
        hook: &'static str,
        /// Error returned by the widget.
        #[source]
        source: BoxError,
    },

    /// The widget ships no template for the requested view.
    #[error("widget '{slug}' has no '{view}' template under {}", .location.display())]
    TemplateMissing {
        /// Widget slug.
        slug: String,
        /// View name (`display` or `form`).
        view: &'static str,
        /// Widget location that was searched.
        location: PathBuf,
    },

    /// No installed widget matches the key.
    #[error("installed widget '{key}' not found")]
    WidgetNotFound {
        /// Id or slug used for the lookup.
        key: String,
    },

    /// No instance matches the id.
    #[error("widget instance {id} not found")]
    InstanceNotFound {
        /// Instance id.
        id: u64,
    },

    /// Persistence collaborator failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// View collaborator failure.
    #[error(transparent)]
    View(#[from] ViewError),
}

impl WidgetError {
    /// Creates an unknown-widget error.
    pub fn unknown(slug: impl Into<String>) -> Self {
        Self::UnknownWidget { slug: slug.into() }
    }

    /// Wraps an error raised by a widget hook.
    pub fn hook(slug: impl Into<String>, hook: &'static str, source: BoxError) -> Self {
        Self::Hook {
            slug: slug.into(),
            hook,
            source,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for persistence operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for view rendering.
pub type ViewResult<T> = Result<T, ViewError>;

/// Result type for widget engine operations.
pub type WidgetResult<T> = Result<T, WidgetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_error_keeps_source() {
        let err = WidgetError::hook("tags", "run", "boom".into());
        assert_eq!(err.to_string(), "widget 'tags' failed in `run`: boom");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_store_error_converts() {
        let err: WidgetError = StoreError::not_found("area", 7).into();
        assert_eq!(err.to_string(), "area '7' not found");
    }
}
