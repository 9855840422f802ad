//! Timeline configuration.
//!
//! Every knob is optional. Build a [`Timeline`] with [`Timeline::builder`]
//! and chain only what differs from the defaults:
//!
//! ```rust
//! use raillog::{PathSource, Timeline, Width};
//!
//! let timeline = Timeline::builder()
//!     .min_slots(4)
//!     .width(Width::Fixed(100))
//!     .slim(true)
//!     .close_path(PathSource::Url)
//!     .build();
//! ```
//!
//! Or pick the same settings up from the environment:
//!
//! | Variable | Values |
//! |---|---|
//! | `RAILLOG_WIDTH` | `auto` (terminal), `off`, or a column count |
//! | `RAILLOG_SLIM` | `1`/`true`/`yes`/`on` or `0`/`false`/`no`/`off` |
//! | `RAILLOG_TIMESTAMP` | same as `RAILLOG_SLIM` |
//! | `RAILLOG_MIN_SLOTS` | initial lane count |

use std::fmt;
use std::sync::Arc;

use crate::color::{Colorizer, Level, RampColorizer, default_level};
use crate::context::Context;
use crate::error::Error;
use crate::middleware::Timeline;
use crate::reporter::{Reporter, Stdout};

pub(crate) type LevelFn = Arc<dyn Fn(u64, &Context) -> Level + Send + Sync>;

/// Lanes allocated before the first request.
pub const DEFAULT_MIN_SLOTS: usize = 3;

// ── Width ─────────────────────────────────────────────────────────────────────

/// Total line width used to wrap log messages.
#[derive(Clone, Default)]
pub enum Width {
    /// A fixed number of columns.
    Fixed(usize),
    /// Asked on every render; `None` disables wrapping for that render.
    Provider(Arc<dyn Fn() -> Option<usize> + Send + Sync>),
    /// The current terminal width, or no wrapping when stdout is not a terminal.
    #[default]
    Terminal,
    /// Never wrap.
    Disabled,
}

impl Width {
    pub fn provider(f: impl Fn() -> Option<usize> + Send + Sync + 'static) -> Self {
        Self::Provider(Arc::new(f))
    }

    /// Resolves the width for one render.
    pub fn resolve(&self) -> Option<usize> {
        match self {
            Self::Fixed(columns) => Some(*columns),
            Self::Provider(f)    => f(),
            Self::Terminal       => crossterm::terminal::size().ok().map(|(columns, _)| usize::from(columns)),
            Self::Disabled       => None,
        }
        .filter(|&columns| columns > 0)
    }
}

impl fmt::Debug for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(columns) => f.debug_tuple("Fixed").field(columns).finish(),
            Self::Provider(_)    => f.write_str("Provider(..)"),
            Self::Terminal       => f.write_str("Terminal"),
            Self::Disabled       => f.write_str("Disabled"),
        }
    }
}

// ── PathSource ────────────────────────────────────────────────────────────────

/// Which URL an open or close line shows.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PathSource {
    /// The URL as it is when the line renders; the handler may have rewritten it.
    Url,
    /// The URL the request arrived with.
    #[default]
    OriginalUrl,
}

impl PathSource {
    pub(crate) fn select(self, context: &Context) -> &str {
        match self {
            Self::Url         => context.url(),
            Self::OriginalUrl => context.original_url(),
        }
    }
}

// ── Options ───────────────────────────────────────────────────────────────────

/// Resolved settings shared by every session of one [`Timeline`].
pub(crate) struct Options {
    pub min_slots: usize,
    pub width: Width,
    pub timestamp: bool,
    pub slim: bool,
    pub level: LevelFn,
    pub colorizer: Arc<dyn Colorizer>,
    pub reporter: Arc<dyn Reporter>,
    pub open_path: PathSource,
    pub close_path: PathSource,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            min_slots: DEFAULT_MIN_SLOTS,
            width: Width::default(),
            timestamp: false,
            slim: false,
            level: Arc::new(default_level),
            colorizer: Arc::new(RampColorizer),
            reporter: Arc::new(Stdout),
            open_path: PathSource::default(),
            close_path: PathSource::default(),
        }
    }
}

// ── TimelineBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Timeline`].
///
/// Obtain via [`Timeline::builder()`] or [`TimelineBuilder::from_env()`].
#[must_use]
#[derive(Default)]
pub struct TimelineBuilder {
    options: Options,
}

impl TimelineBuilder {
    /// Starts from the defaults and applies any `RAILLOG_*` variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut builder = Self::default();

        if let Some(value) = lookup("RAILLOG_WIDTH") {
            builder = builder.width(parse_width(&value)?);
        }
        if let Some(value) = lookup("RAILLOG_SLIM") {
            builder = builder.slim(parse_flag("RAILLOG_SLIM", &value)?);
        }
        if let Some(value) = lookup("RAILLOG_TIMESTAMP") {
            builder = builder.timestamp(parse_flag("RAILLOG_TIMESTAMP", &value)?);
        }
        if let Some(value) = lookup("RAILLOG_MIN_SLOTS") {
            let slots = value.trim().parse().map_err(|_| invalid("RAILLOG_MIN_SLOTS", &value))?;
            builder = builder.min_slots(slots);
        }

        Ok(builder)
    }

    /// Number of lanes allocated up front. More are added on demand.
    pub fn min_slots(mut self, slots: usize) -> Self {
        self.options.min_slots = slots;
        self
    }

    pub fn width(mut self, width: Width) -> Self {
        self.options.width = width;
        self
    }

    /// Show wall-clock time instead of the elapsed duration.
    pub fn timestamp(mut self, enabled: bool) -> Self {
        self.options.timestamp = enabled;
        self
    }

    /// Drop the separators between rail glyphs.
    pub fn slim(mut self, enabled: bool) -> Self {
        self.options.slim = enabled;
        self
    }

    /// Replaces the elapsed-time → level mapping.
    pub fn level(mut self, f: impl Fn(u64, &Context) -> Level + Send + Sync + 'static) -> Self {
        self.options.level = Arc::new(f);
        self
    }

    pub fn colorizer(mut self, colorizer: impl Colorizer) -> Self {
        self.options.colorizer = Arc::new(colorizer);
        self
    }

    pub fn reporter(mut self, reporter: impl Reporter) -> Self {
        self.options.reporter = Arc::new(reporter);
        self
    }

    /// URL shown on open lines.
    pub fn open_path(mut self, source: PathSource) -> Self {
        self.options.open_path = source;
        self
    }

    /// URL shown on close lines.
    pub fn close_path(mut self, source: PathSource) -> Self {
        self.options.close_path = source;
        self
    }

    pub fn build(self) -> Timeline {
        Timeline::with_options(self.options)
    }
}

fn invalid(key: &'static str, value: &str) -> Error {
    Error::Config { key, value: value.to_owned() }
}

fn parse_width(value: &str) -> Result<Width, Error> {
    match value.trim() {
        "auto" | "" => Ok(Width::Terminal),
        "off" | "0" => Ok(Width::Disabled),
        n => n.parse().map(Width::Fixed).map_err(|_| invalid("RAILLOG_WIDTH", value)),
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, Error> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on"  => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _                            => Err(invalid(key, value)),
    }
}
