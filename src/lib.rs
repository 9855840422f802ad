//! # raillog
//!
//! Request middleware that draws every in-flight request as a lane of an
//! ASCII rail diagram, so overlapping lifetimes are visible at a glance.
//!
//! ```text
//! ┈┈┈ ⇾ GET     ┈┈┈┈┈ ┬┈┈┈┈ /
//! ┈┈┈ ⇾ GET     ┈┈┈┈┈ │┈┬┈┈ /redirect
//!                     │┈├┈┈
//!                     │┈│┈┈ Will get a redirect
//! 301 ⇽ GET      12ms │┈┴┈┈ /redirect
//! 200 ⇽ GET     120ms ┴┈┈┈┈ /
//! ```
//!
//! ## The contract
//!
//! The host framework owns the request. raillog only watches it:
//!
//! - **One lane per request** — lowest free lane first, more lanes only when
//!   every lane is busy. Lanes are never compacted.
//! - **Colour is time** — rails, markers, and durations turn yellow then red
//!   as a request stays open; under 100ms nothing is coloured.
//! - **Logs land in the right lane** — a handler's log calls render inside its
//!   own lane, wrapped to the terminal width.
//! - **Failures pass through** — an `Err` from the handler is drawn at fatal
//!   severity and handed back unchanged.
//!
//! What raillog intentionally ignores: log history, filtering, transport,
//! and coordination between processes.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use raillog::{Context, Timeline, values};
//! use http::Method;
//!
//! #[tokio::main]
//! async fn main() {
//!     let timeline = Timeline::new();
//!
//!     let _user = timeline
//!         .track(Context::new(Method::GET, "/users/42"), |session| async move {
//!             session.info(values!["cache miss for", 42]);
//!             session.set_status(200u16);
//!             Ok::<_, std::io::Error>("alice")
//!         })
//!         .await;
//! }
//! ```

mod color;
mod config;
mod context;
mod error;
mod lanes;
mod message;
mod render;
mod reporter;
mod status;

pub mod middleware;

pub use color::{Colorizer, Level, PALETTE, Paint, Palette, RampColorizer, Severity, Tone, default_level};
pub use config::{DEFAULT_MIN_SLOTS, PathSource, TimelineBuilder, Width};
pub use context::Context;
pub use error::Error;
pub use lanes::Lanes;
pub use message::{Fragment, LogValue, join, wrap};
pub use middleware::{Session, Timeline};
pub use render::format_duration;
pub use reporter::{Reporter, Stdout};
pub use status::Outcome;
