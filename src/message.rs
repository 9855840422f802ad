//! Log arguments, message text, and width-aware wrapping.
//!
//! A log call takes any number of [`LogValue`]s. Each kind has its own
//! serialisation rule:
//!
//! | Variant | Rendered as |
//! |---|---|
//! | `Error` | the diagnostic trace: message, then one `caused by:` line per source |
//! | `Callable` | `fn <type name>` |
//! | `Structured` | pretty-printed JSON, usually spanning several lines |
//! | `Plain` | the text itself |
//!
//! Rendered values are joined with single spaces, then [`wrap`]ped.

use std::any::type_name;
use std::fmt;

use serde::Serialize;

use crate::error::Error;

/// One argument of a log call.
#[derive(Clone, Debug, PartialEq)]
pub enum LogValue {
    Plain(String),
    Error(String),
    Callable(String),
    Structured(serde_json::Value),
}

impl LogValue {
    /// Captures an error and its `source()` chain.
    pub fn error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut trace = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            trace.push_str("\n    caused by: ");
            trace.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::Error(trace)
    }

    /// Captures any failure through its `Debug` output.
    ///
    /// `anyhow::Error` and friends print their full chain this way.
    pub fn failure(failure: &impl fmt::Debug) -> Self {
        Self::Error(format!("{failure:?}"))
    }

    /// Names a function, closure, or any other value by its type.
    pub fn callable<F: ?Sized>(_: &F) -> Self {
        Self::Callable(type_name::<F>().to_owned())
    }

    /// Serialises `value` to a structured dump.
    ///
    /// Fails when the value's `Serialize` impl does, e.g. a map with
    /// non-string keys.
    pub fn structured<T: Serialize + ?Sized>(value: &T) -> Result<Self, Error> {
        Ok(Self::Structured(serde_json::to_value(value)?))
    }

    fn render(&self) -> String {
        match self {
            Self::Plain(text) | Self::Error(text) => text.clone(),
            Self::Callable(name)                  => format!("fn {name}"),
            Self::Structured(value)               => format!("{value:#}"),
        }
    }
}

impl From<&str> for LogValue {
    fn from(s: &str) -> Self { Self::Plain(s.to_owned()) }
}

impl From<String> for LogValue {
    fn from(s: String) -> Self { Self::Plain(s) }
}

impl From<&String> for LogValue {
    fn from(s: &String) -> Self { Self::Plain(s.clone()) }
}

impl From<serde_json::Value> for LogValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::Plain(s),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => Self::Structured(value),
            primitive => Self::Plain(primitive.to_string()),
        }
    }
}

macro_rules! plain_from_display {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for LogValue {
                fn from(v: $t) -> Self { Self::Plain(v.to_string()) }
            }
        )*
    };
}

plain_from_display!(bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

/// Builds a `[LogValue; N]` from heterogeneous expressions.
///
/// ```rust
/// use raillog::{LogValue, values};
///
/// let args = values!["user", 42, serde_json::json!({ "admin": false })];
/// assert_eq!(args[1], LogValue::Plain("42".into()));
/// ```
#[macro_export]
macro_rules! values {
    ($($value:expr),* $(,)?) => {
        [$($crate::LogValue::from($value)),*]
    };
}

/// Renders every value and joins them with single spaces.
pub fn join(values: &[LogValue]) -> String {
    values.iter().map(LogValue::render).collect::<Vec<_>>().join(" ")
}

// ── Wrapping ──────────────────────────────────────────────────────────────────

/// One output line's worth of message text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Fragment {
    pub text: String,
    pub first: bool,
    pub last: bool,
}

/// Splits `message` into lines at most `width` characters wide.
///
/// With no width (or zero) the whole message is one line. Otherwise the
/// message is scanned in `width`-sized chunks, and a newline inside a chunk
/// cuts it there; scanning resumes just past the newline. Always yields at
/// least one fragment.
pub fn wrap(message: &str, width: Option<usize>) -> Vec<Fragment> {
    let pieces = match width {
        Some(width) if width > 0 => chunk(message, width),
        _ => vec![message.to_owned()],
    };

    let count = pieces.len();
    pieces
        .into_iter()
        .enumerate()
        .map(|(i, text)| Fragment { text, first: i == 0, last: i + 1 == count })
        .collect()
}

fn chunk(message: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = message.chars().collect();
    let mut lines = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let end = (pos + width).min(chars.len());
        match chars[pos..end].iter().position(|&c| c == '\n') {
            Some(newline) => {
                lines.push(chars[pos..pos + newline].iter().collect());
                pos += newline + 1;
            }
            None => {
                lines.push(chars[pos..end].iter().collect());
                pos = end;
            }
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
