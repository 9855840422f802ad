//! Colour selection for rails, durations, and messages.
//!
//! Two inputs pick a colour:
//!
//! - a numeric **level**, derived from how long a request has been running.
//!   Levels `<= 0` are not coloured; positive levels walk a yellow → red ramp
//!   in the 256-colour cube and saturate at red.
//! - a named [`Severity`] (`info`, `warning`, `error`, `fatal`) with a fixed
//!   colour each. Any other name paints nothing.
//!
//! The level function and the [`Colorizer`] are configured independently on
//! the [`TimelineBuilder`](crate::TimelineBuilder).

use std::fmt;
use std::str::FromStr;

use crossterm::style::{Color, Stylize, style};

use crate::context::Context;

// ── Palette ───────────────────────────────────────────────────────────────────

/// Index into the xterm 6×6×6 colour cube. Each component is `0..=5`.
const fn cube(r: u8, g: u8, b: u8) -> Color {
    Color::AnsiValue(16 + 36 * r + 6 * g + b)
}

/// Fixed colours shared by every timeline in the process.
pub struct Palette {
    pub spacer: Color,
    pub info: Color,
    pub warning: Color,
    pub error: Color,
    pub fatal: Color,
}

pub static PALETTE: Palette = Palette {
    spacer: cube(1, 1, 1),
    info: cube(0, 3, 5),
    warning: cube(5, 4, 0),
    error: cube(5, 2, 0),
    fatal: cube(5, 0, 0),
};

// ── Level ─────────────────────────────────────────────────────────────────────

/// Colour intensity derived from elapsed time. `<= 0` means uncoloured.
pub type Level = i64;

/// `floor(elapsed_ms / 50) - 1`: anything under 100ms stays uncoloured.
pub fn default_level(elapsed_ms: u64, _context: &Context) -> Level {
    (elapsed_ms / 50) as Level - 1
}

// ── Severity ──────────────────────────────────────────────────────────────────

/// Named severities with a fixed colour.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info    => "info",
            Self::Warning => "warning",
            Self::Error   => "error",
            Self::Fatal   => "fatal",
        }
    }

    fn color(self) -> Color {
        match self {
            Self::Info    => PALETTE.info,
            Self::Warning => PALETTE.warning,
            Self::Error   => PALETTE.error,
            Self::Fatal   => PALETTE.fatal,
        }
    }
}

impl FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info"    => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "error"   => Ok(Self::Error),
            "fatal"   => Ok(Self::Fatal),
            _         => Err(()),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Paint ─────────────────────────────────────────────────────────────────────

/// A text decorator: either leaves text alone or sets its foreground colour.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Paint(Option<Color>);

impl Paint {
    /// The identity decorator.
    pub const PLAIN: Paint = Paint(None);

    pub fn fg(color: Color) -> Self {
        Self(Some(color))
    }

    pub fn is_plain(&self) -> bool {
        self.0.is_none()
    }

    pub fn apply(&self, text: &str) -> String {
        match self.0 {
            Some(color) => style(text).with(color).to_string(),
            None        => text.to_owned(),
        }
    }

    pub fn glyph(&self, glyph: char) -> String {
        match self.0 {
            Some(color) => style(glyph).with(color).to_string(),
            None        => glyph.to_string(),
        }
    }
}

// ── Colorizer ─────────────────────────────────────────────────────────────────

/// What a [`Colorizer`] is asked to paint.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Tone {
    Level(Level),
    Severity(Severity),
}

impl From<Level> for Tone {
    fn from(level: Level) -> Self { Self::Level(level) }
}

impl From<Severity> for Tone {
    fn from(severity: Severity) -> Self { Self::Severity(severity) }
}

/// Maps a [`Tone`] to a [`Paint`].
///
/// Implemented for any `Fn(Tone) -> Paint`, so a closure is enough to
/// replace the default ramp. Override [`paint_for`](Colorizer::paint_for)
/// to colour by request as well: it sees the elapsed time and the context of
/// the request being drawn.
pub trait Colorizer: Send + Sync + 'static {
    fn paint(&self, tone: Tone) -> Paint;

    /// Paints `tone` for the request in `context`, `elapsed_ms` into its life.
    fn paint_for(&self, tone: Tone, elapsed_ms: u64, context: &Context) -> Paint {
        let _ = (elapsed_ms, context);
        self.paint(tone)
    }

    /// Paints a severity given by name. Unknown names are left plain.
    fn paint_named(&self, name: &str, elapsed_ms: u64, context: &Context) -> Paint {
        match name.parse::<Severity>() {
            Ok(severity) => self.paint_for(Tone::Severity(severity), elapsed_ms, context),
            Err(())      => Paint::PLAIN,
        }
    }
}

impl<F> Colorizer for F
where
    F: Fn(Tone) -> Paint + Send + Sync + 'static,
{
    fn paint(&self, tone: Tone) -> Paint {
        self(tone)
    }
}

/// The default colorizer: yellow → red ramp for levels, fixed severity colours.
#[derive(Clone, Copy, Debug, Default)]
pub struct RampColorizer;

impl Colorizer for RampColorizer {
    fn paint(&self, tone: Tone) -> Paint {
        match tone {
            Tone::Level(level) if level <= 0 => Paint::PLAIN,
            Tone::Level(level) => {
                // Green drains from 5 to 0 as the level rises, then stays red.
                let green = (6 - level.min(6)).min(5) as u8;
                Paint::fg(cube(5, green, 0))
            }
            Tone::Severity(severity) => Paint::fg(severity.color()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> Context {
        Context::new(http::Method::GET, "/")
    }

    #[test]
    fn default_level_is_uncoloured_below_100ms() {
        assert_eq!(default_level(0, &ctx()), -1);
        assert_eq!(default_level(99, &ctx()), 0);
        assert_eq!(default_level(100, &ctx()), 1);
        assert_eq!(default_level(349, &ctx()), 5);
    }

    #[test]
    fn non_positive_levels_are_plain() {
        for level in [-3, -1, 0] {
            let paint = RampColorizer.paint(Tone::Level(level));
            assert!(paint.is_plain());
            assert_eq!(paint.apply("│"), "│");
        }
        let paint = RampColorizer.paint(Tone::Level(default_level(99, &ctx())));
        assert!(!paint.apply("│").contains('\u{1b}'));
    }

    #[test]
    fn ramp_moves_towards_red_and_saturates() {
        assert_eq!(RampColorizer.paint(Tone::Level(1)), Paint::fg(cube(5, 5, 0)));
        assert_eq!(RampColorizer.paint(Tone::Level(3)), Paint::fg(cube(5, 3, 0)));
        assert_eq!(RampColorizer.paint(Tone::Level(6)), Paint::fg(cube(5, 0, 0)));
        assert_eq!(RampColorizer.paint(Tone::Level(600)), Paint::fg(cube(5, 0, 0)));
        assert_eq!(RampColorizer.paint(Tone::Level(Level::MAX)), Paint::fg(cube(5, 0, 0)));
    }

    #[test]
    fn named_severities() {
        let named = |name| RampColorizer.paint_named(name, 0, &ctx());
        assert_eq!(named("info"), Paint::fg(PALETTE.info));
        assert_eq!(named("warning"), Paint::fg(PALETTE.warning));
        assert_eq!(named("error"), Paint::fg(PALETTE.error));
        assert_eq!(named("fatal"), Paint::fg(PALETTE.fatal));
        assert_eq!(named("verbose"), Paint::PLAIN);
        assert_eq!(named("INFO"), Paint::PLAIN);
    }

    #[test]
    fn closures_are_colorizers() {
        let mono = |_: Tone| Paint::fg(Color::White);
        assert_eq!(mono.paint(Tone::Level(-5)), Paint::fg(Color::White));
        assert_eq!(mono.paint_named("nope", 0, &ctx()), Paint::PLAIN);
        assert_eq!(mono.paint_for(Tone::Level(3), 500, &ctx()), Paint::fg(Color::White));
    }

    struct Spotlight;

    impl Colorizer for Spotlight {
        fn paint(&self, _: Tone) -> Paint {
            Paint::PLAIN
        }

        fn paint_for(&self, _: Tone, elapsed_ms: u64, context: &Context) -> Paint {
            if context.url() == "/hot" && elapsed_ms >= 10 { Paint::fg(PALETTE.fatal) } else { Paint::PLAIN }
        }
    }

    #[test]
    fn colorizers_see_the_request_they_paint() {
        let hot = Context::new(http::Method::GET, "/hot");
        assert_eq!(Spotlight.paint_for(Tone::Level(1), 20, &hot), Paint::fg(PALETTE.fatal));
        assert_eq!(Spotlight.paint_for(Tone::Level(1), 5, &hot), Paint::PLAIN);
        assert_eq!(Spotlight.paint_for(Tone::Level(1), 20, &ctx()), Paint::PLAIN);
        assert_eq!(Spotlight.paint_named("fatal", 20, &hot), Paint::fg(PALETTE.fatal));
        assert_eq!(Spotlight.paint_named("fatal", 20, &ctx()), Paint::PLAIN);
    }

    #[test]
    fn cube_indices() {
        assert_eq!(cube(1, 1, 1), Color::AnsiValue(59));
        assert_eq!(cube(5, 0, 0), Color::AnsiValue(196));
        assert_eq!(cube(5, 5, 0), Color::AnsiValue(226));
    }
}
