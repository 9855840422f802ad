//! Line rendering.
//!
//! Every emitted line has three parts joined by single spaces:
//!
//! ```text
//! 200 ⇽ GET     120ms │┈┴┈┈ /users/42
//! └──── metadata ───┘ └rail┘ └message┘
//! ```
//!
//! The rail has one glyph per lane. Occupied lanes draw `│`, coloured by how
//! long their request has been running *right now*; empty lanes draw a dim
//! `┈`. The lane owned by the request being logged draws a marker instead:
//! `┬` when it opens, `├` for a log call, `┴` when it closes.

use std::time::Duration;

use http::Method;
use tokio::time::Instant;

use crate::color::{Colorizer, Level, PALETTE, Paint, Tone};
use crate::context::Context;
use crate::message::{Fragment, wrap};

const RAIL: char = '│';
const SPACER: char = '┈';
const OPEN_ARROW: char = '⇾';
const CLOSE_ARROW: char = '⇽';

pub(crate) const STATUS_WIDTH: usize = 3;
pub(crate) const METHOD_WIDTH: usize = 7;
pub(crate) const DURATION_WIDTH: usize = 5;
pub(crate) const CLOCK_WIDTH: usize = 8;

/// The glyph drawn in the logging request's own lane.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Marker {
    /// First line of a request.
    Open,
    /// First line of a log call.
    Join,
    /// Continuation of a wrapped line.
    Through,
    /// Last line of a request.
    Close,
}

impl Marker {
    fn glyph(self) -> char {
        match self {
            Self::Open    => '┬',
            Self::Join    => '├',
            Self::Through => RAIL,
            Self::Close   => '┴',
        }
    }
}

/// Which kind of line is being emitted. Decides markers for wrapped text.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineKind {
    Open,
    Log,
    Close,
}

impl LineKind {
    fn marker(self, fragment: &Fragment) -> Marker {
        match self {
            Self::Open  if fragment.first => Marker::Open,
            Self::Log   if fragment.first => Marker::Join,
            Self::Close if fragment.last  => Marker::Close,
            _                             => Marker::Through,
        }
    }
}

/// Contents of the metadata column for the first line of a call.
/// Continuation lines always get blank padding.
#[derive(Clone, Debug)]
pub enum Meta {
    Open { method: Method, clock: Option<String> },
    Blank,
    Custom { text: String, paint: Paint },
    Close { status: Option<u16>, failed: bool, status_paint: Paint, method: Method, time: String, time_paint: Paint },
}

/// Fixed geometry shared by every line of one timeline.
#[derive(Clone, Copy, Debug, Default)]
pub struct Layout {
    pub slim: bool,
    pub timestamp: bool,
}

impl Layout {
    fn time_width(&self) -> usize {
        if self.timestamp { CLOCK_WIDTH } else { DURATION_WIDTH }
    }

    /// Visible width of the metadata column.
    pub fn meta_width(&self) -> usize {
        STATUS_WIDTH + 1 + 1 + 1 + METHOD_WIDTH + 1 + self.time_width()
    }

    /// Visible width of a rail with `lanes` lanes.
    pub fn rail_width(&self, lanes: usize) -> usize {
        match lanes {
            0 => 0,
            n if self.slim => n,
            n => 2 * n - 1,
        }
    }

    /// Room left for message text in a `total`-column terminal, if any.
    pub fn message_width(&self, total: usize, lanes: usize) -> Option<usize> {
        let fixed = self.meta_width() + 1 + self.rail_width(lanes) + 1;
        total.checked_sub(fixed).filter(|&w| w > 0)
    }
}

/// The lane state a set of lines is rendered against.
pub struct Frame<'a> {
    pub lanes: &'a [Option<Instant>],
    pub now: Instant,
    pub slot: usize,
}

/// Renders lines for one request.
pub struct Renderer<'a> {
    pub layout: Layout,
    pub colorizer: &'a dyn Colorizer,
    pub level: &'a (dyn Fn(u64, &Context) -> Level + Send + Sync),
    pub context: &'a Context,
}

impl Renderer<'_> {
    /// Paint for something that has been running for `elapsed`.
    pub fn tone(&self, elapsed: Duration) -> Paint {
        let ms = millis(elapsed);
        let level = (self.level)(ms, self.context);
        self.colorizer.paint_for(Tone::Level(level), ms, self.context)
    }

    /// Wraps `message` and renders one line per fragment.
    ///
    /// `width` is the total terminal width; `None` disables wrapping.
    pub fn lines(
        &self,
        frame: &Frame<'_>,
        kind: LineKind,
        meta: &Meta,
        message: &str,
        paint: Paint,
        width: Option<usize>,
    ) -> Vec<String> {
        let message_width = width.and_then(|w| self.layout.message_width(w, frame.lanes.len()));

        wrap(message, message_width)
            .iter()
            .map(|fragment| {
                let meta = if fragment.first { self.meta(meta) } else { self.meta(&Meta::Blank) };
                let rail = self.rail(frame, kind.marker(fragment));
                // Trimmed before painting: the reset code would shield trailing spaces.
                let text = fragment.text.trim_end();
                let text = if text.is_empty() { String::new() } else { paint.apply(text) };
                compose(&meta, &rail, &text)
            })
            .collect()
    }

    /// One glyph per lane, separator-joined unless slim.
    pub fn rail(&self, frame: &Frame<'_>, marker: Marker) -> String {
        let glyphs: Vec<String> = frame.lanes
            .iter()
            .enumerate()
            .map(|(i, lane)| match (i == frame.slot, lane) {
                (true, _) if marker == Marker::Open => marker.glyph().to_string(),
                (true, Some(start)) => self.tone(frame.now.saturating_duration_since(*start)).glyph(marker.glyph()),
                (true, None) => marker.glyph().to_string(),
                (false, Some(start)) => self.tone(frame.now.saturating_duration_since(*start)).glyph(RAIL),
                (false, None) => spacer(1),
            })
            .collect();

        let separator = if self.layout.slim { String::new() } else { spacer(1) };
        glyphs.join(&separator)
    }

    pub fn meta(&self, meta: &Meta) -> String {
        let time_width = self.layout.time_width();
        match meta {
            Meta::Open { method, clock } => {
                let time = match clock {
                    Some(clock) => pad_left(clock, time_width, Paint::PLAIN),
                    None        => spacer(time_width),
                };
                format!("{} {OPEN_ARROW} {} {time}", spacer(STATUS_WIDTH), fit(method.as_str(), METHOD_WIDTH))
            }
            Meta::Blank => " ".repeat(self.layout.meta_width()),
            Meta::Custom { text, paint } => paint.apply(&fit(text, self.layout.meta_width())),
            Meta::Close { status, failed, status_paint, method, time, time_paint } => {
                let status = match (status, failed) {
                    // Codes past three digits widen the line instead of losing digits.
                    (Some(code), _) => status_paint.apply(&format!("{code:<STATUS_WIDTH$}")),
                    (None, true)    => status_paint.apply("ERR"),
                    (None, false)   => spacer(STATUS_WIDTH),
                };
                format!(
                    "{status} {CLOSE_ARROW} {} {}",
                    fit(method.as_str(), METHOD_WIDTH),
                    pad_left(time, time_width, *time_paint),
                )
            }
        }
    }
}

/// Joins the three parts with single spaces and trims trailing whitespace.
pub fn compose(meta: &str, rail: &str, message: &str) -> String {
    let line = format!("{meta} {rail} {message}");
    line.trim_end().to_owned()
}

// ── Durations ─────────────────────────────────────────────────────────────────

pub fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Formats an elapsed time in at most five columns.
///
/// `999ms`, then `1.00s`..`9.99s`, `10.0s`..`99.9s`, `100s`..`9999s`,
/// then whole minutes and finally whole hours.
pub fn format_duration(ms: u64) -> String {
    match ms {
        0..=999 => format!("{ms}ms"),
        1_000..=9_994 => {
            let hundredths = (ms + 5) / 10;
            format!("{}.{:02}s", hundredths / 100, hundredths % 100)
        }
        9_995..=99_949 => {
            let tenths = (ms + 50) / 100;
            format!("{}.{}s", tenths / 10, tenths % 10)
        }
        99_950..=9_999_499 => format!("{}s", (ms + 500) / 1_000),
        9_999_500..=599_999_999 => format!("{}m", ms / 60_000),
        _ => format!("{}h", (ms / 3_600_000).min(9_999)),
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn spacer(count: usize) -> String {
    Paint::fg(PALETTE.spacer).apply(&SPACER.to_string().repeat(count))
}

/// Truncates or right-pads `text` with spaces to exactly `width` characters.
fn fit(text: &str, width: usize) -> String {
    let truncated: String = text.chars().take(width).collect();
    format!("{truncated:<width$}")
}

/// Left-pads `text` with spacer glyphs to `width` characters, painting the text.
fn pad_left(text: &str, width: usize, paint: Paint) -> String {
    let len = text.chars().count();
    if len >= width {
        return paint.apply(text);
    }
    format!("{}{}", spacer(width - len), paint.apply(text))
}
