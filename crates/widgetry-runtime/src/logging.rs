//! `tracing-subscriber` setup for hosts of the widget engine.
//!
//! Engine crates only emit `tracing` events. A host either lets
//! [`WidgetRuntime`](crate::WidgetRuntime) install a subscriber from the
//! `[logging]` table or builds one itself:
//!
//! ```rust,ignore
//! use widgetry_runtime::logging::{LoggingBuilder, SpanEvents};
//!
//! LoggingBuilder::new()
//!     .directive("widgetry_framework=debug")
//!     .span_events(SpanEvents::LIFECYCLE)
//!     .init();
//! ```
//!
//! `RUST_LOG`, when set, replaces the base level but not the directives.

use std::path::{Path, PathBuf};

use tracing::{Level, Subscriber, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::Layer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LogOutput, LogRotation, LoggingConfig, SpanEventConfig};

/// Span lifecycle events written as log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanEvents {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

impl SpanEvents {
    pub const NONE: Self = Self::with(false, false);

    /// Creation and close of each span.
    pub const LIFECYCLE: Self = Self::with(true, false);

    /// Every transition.
    pub const FULL: Self = Self::with(true, true);

    const fn with(lifecycle: bool, activity: bool) -> Self {
        Self {
            new: lifecycle,
            enter: activity,
            exit: activity,
            close: lifecycle,
        }
    }

    fn fmt_span(self) -> FmtSpan {
        [
            (self.new, FmtSpan::NEW),
            (self.enter, FmtSpan::ENTER),
            (self.exit, FmtSpan::EXIT),
            (self.close, FmtSpan::CLOSE),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .fold(FmtSpan::NONE, |acc, (_, flag)| acc | flag)
    }
}

impl From<&SpanEventConfig> for SpanEvents {
    fn from(config: &SpanEventConfig) -> Self {
        let SpanEventConfig {
            new,
            enter,
            exit,
            close,
        } = *config;
        Self {
            new,
            enter,
            exit,
            close,
        }
    }
}

fn rotation(schedule: LogRotation) -> Rotation {
    match schedule {
        LogRotation::Never => Rotation::NEVER,
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
    }
}

/// Installs a subscriber described by `config` unless one is already set.
pub fn init_from_config(config: &LoggingConfig) {
    LoggingBuilder::from_config(config).init();
}

// ─── LoggingBuilder ──────────────────────────────────────────────────────────

/// Assembles a filter and a `fmt` layer and installs them globally.
#[derive(Debug)]
pub struct LoggingBuilder {
    level: Level,
    directives: Vec<String>,
    span_events: SpanEvents,
    format: LogFormat,
    output: LogOutput,
    target: bool,
    thread_ids: bool,
    file_location: bool,
    file_path: Option<PathBuf>,
    rotation: LogRotation,
    max_files: usize,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingBuilder {
    /// Compact `info` lines with targets on stdout.
    pub fn new() -> Self {
        Self {
            level: Level::INFO,
            directives: Vec::new(),
            span_events: SpanEvents::NONE,
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            target: true,
            thread_ids: false,
            file_location: false,
            file_path: None,
            rotation: LogRotation::Never,
            max_files: 5,
        }
    }

    /// Mirrors a `[logging]` table. Per-module filters become directives in
    /// module order.
    pub fn from_config(config: &LoggingConfig) -> Self {
        let mut modules: Vec<_> = config.filters.iter().collect();
        modules.sort_unstable_by_key(|(module, _)| module.as_str());

        Self {
            level: config.level.to_tracing_level(),
            directives: modules
                .into_iter()
                .map(|(module, level)| format!("{module}={}", level.as_str()))
                .collect(),
            span_events: (&config.span_events).into(),
            format: config.format,
            output: config.output,
            thread_ids: config.thread_ids,
            file_location: config.file_location,
            file_path: config.file_path.clone(),
            rotation: config.rotation,
            max_files: config.max_files as usize,
            ..Self::new()
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Adds an `EnvFilter` directive such as `widgetry_framework=trace`.
    pub fn directive(mut self, directive: &str) -> Self {
        self.directives.push(directive.to_string());
        self
    }

    pub fn span_events(mut self, events: SpanEvents) -> Self {
        self.span_events = events;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// Prefix lines with the emitting module.
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.target = enabled;
        self
    }

    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.thread_ids = enabled;
        self
    }

    /// Append source file and line to each event.
    pub fn with_file_location(mut self, enabled: bool) -> Self {
        self.file_location = enabled;
        self
    }

    /// Log file used with [`LogOutput::File`].
    pub fn file_path(mut self, path: PathBuf) -> Self {
        self.file_path = Some(path);
        self
    }

    pub fn rotation(mut self, rotation: LogRotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Rotated files kept next to the active one.
    pub fn max_files(mut self, count: usize) -> Self {
        self.max_files = count;
        self
    }

    /// Installs the subscriber, ignoring an already installed one.
    pub fn init(self) {
        if self.try_init().is_err() {
            tracing::debug!("A global subscriber is already installed");
        }
    }

    /// Installs the subscriber.
    pub fn try_init(self) -> Result<(), TryInitError> {
        let filter = self.filter();
        let writer = self.writer();
        tracing_subscriber::registry()
            .with(self.layer(writer))
            .with(filter)
            .try_init()
    }

    fn filter(&self) -> EnvFilter {
        let base = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_str().to_lowercase()));

        self.directives
            .iter()
            .fold(base, |filter, raw| match raw.parse() {
                Ok(directive) => filter.add_directive(directive),
                Err(e) => {
                    warn!(directive = %raw, error = %e, "Ignoring invalid log directive");
                    filter
                }
            })
    }

    fn writer(&self) -> BoxMakeWriter {
        match self.output {
            LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
            LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
            LogOutput::File => match self.file_path.as_deref().and_then(|p| self.appender(p)) {
                Some(appender) => BoxMakeWriter::new(appender),
                None => {
                    warn!("Log file unavailable, writing to stdout");
                    BoxMakeWriter::new(std::io::stdout)
                }
            },
        }
    }

    fn appender(&self, path: &Path) -> Option<RollingFileAppender> {
        let dir = path.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let prefix = path
            .file_name()
            .map_or_else(|| "widgetry.log".to_string(), |n| n.to_string_lossy().into_owned());

        match RollingFileAppender::builder()
            .rotation(rotation(self.rotation))
            .filename_prefix(prefix)
            .max_log_files(self.max_files.max(1))
            .build(dir)
        {
            Ok(appender) => Some(appender),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot open log file");
                None
            }
        }
    }

    fn layer<S>(&self, writer: BoxMakeWriter) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        let layer = fmt::layer()
            .with_writer(writer)
            .with_span_events(self.span_events.fmt_span())
            .with_target(self.target)
            .with_thread_ids(self.thread_ids)
            .with_file(self.file_location)
            .with_line_number(self.file_location);

        match self.format {
            LogFormat::Compact => layer.compact().boxed(),
            LogFormat::Full => layer.boxed(),
            LogFormat::Pretty => layer.pretty().boxed(),
            #[cfg(feature = "json-log")]
            LogFormat::Json => layer.json().boxed(),
        }
    }
}
