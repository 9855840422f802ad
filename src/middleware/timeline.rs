//! The timeline middleware and its per-request logging handle.
//!
//! # Lifecycle of one request
//!
//! ```text
//! track(context, next)
//!   ├─ lock lanes: acquire + occupy          ← shared state mutated
//!   ├─ open line                             ← ┬
//!   ├─ next(session).await                   ← the only suspension point
//!   │    └─ session.log(..) / info / fatal   ← ├, reads lanes, never writes
//!   ├─ on Err: fatal line with the failure
//!   ├─ render close line, release lane       ← ┴, shared state mutated
//!   └─ return the handler's result unchanged
//! ```
//!
//! The lane is owned by a guard that frees it on drop, so it is released
//! exactly once whether the handler succeeds, fails, panics, or the whole
//! future is dropped by the host.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use http::Method;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::color::{Paint, Severity, Tone};
use crate::config::{Options, TimelineBuilder};
use crate::context::Context;
use crate::lanes::Lanes;
use crate::message::{LogValue, join};
use crate::render::{Frame, Layout, LineKind, Meta, Renderer, format_duration, millis};
use crate::status::Outcome;

// ── Shared state ──────────────────────────────────────────────────────────────

struct Shared {
    lanes: Mutex<Lanes>,
    options: Options,
}

impl Shared {
    /// Lane state is consistent after every statement that touches it, so a
    /// poisoned lock is safe to keep using.
    fn lanes(&self) -> MutexGuard<'_, Lanes> {
        self.lanes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn layout(&self) -> Layout {
        Layout { slim: self.options.slim, timestamp: self.options.timestamp }
    }
}

/// Closes its session and frees its lane when dropped.
///
/// The session is marked closed first, so a `Session` clone that outlives a
/// cancelled or panicked request cannot draw into the lane once it is reused.
struct LaneGuard {
    shared: Arc<Shared>,
    slot: usize,
    closed: Arc<AtomicBool>,
}

impl Drop for LaneGuard {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::Release);
        self.shared.lanes().release(self.slot);
    }
}

// ── Timeline ──────────────────────────────────────────────────────────────────

/// Request middleware that draws every in-flight request as a lane.
///
/// Cheap to clone; clones share lanes and configuration.
///
/// ```rust
/// use raillog::{Context, Timeline, Width};
/// use http::Method;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let timeline = Timeline::builder().width(Width::Fixed(80)).build();
///
/// let res: Result<&str, std::io::Error> = timeline
///     .track(Context::new(Method::GET, "/users/42"), |session| async move {
///         session.log(["looking up user", "42"]);
///         session.set_status(200u16);
///         Ok("alice")
///     })
///     .await;
/// assert_eq!(res.unwrap(), "alice");
/// # }
/// ```
#[derive(Clone)]
pub struct Timeline {
    shared: Arc<Shared>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> TimelineBuilder {
        TimelineBuilder::default()
    }

    pub(crate) fn with_options(options: Options) -> Self {
        let lanes = Mutex::new(Lanes::with_capacity(options.min_slots));
        Self { shared: Arc::new(Shared { lanes, options }) }
    }

    /// A copy of the current lane state.
    pub fn lanes(&self) -> Lanes {
        self.shared.lanes().clone()
    }

    /// Runs `next` as one tracked request.
    ///
    /// The open line is reported before `next` is called; the close line
    /// after it finishes. An `Err` is logged at fatal severity and then
    /// returned unchanged.
    pub async fn track<F, Fut, T, E>(&self, context: Context, next: F) -> Result<T, E>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Debug,
    {
        let start = Instant::now();
        let slot = {
            let mut lanes = self.shared.lanes();
            let slot = lanes.acquire();
            lanes.occupy(slot, start);
            slot
        };
        let closed = Arc::new(AtomicBool::new(false));
        let guard = LaneGuard { shared: Arc::clone(&self.shared), slot, closed: Arc::clone(&closed) };
        debug!(lane = slot, method = %context.method, url = %context.url, "request opened");

        let session = Session {
            inner: Arc::new(SessionInner {
                shared: Arc::clone(&self.shared),
                slot,
                start,
                context: Mutex::new(context),
                closed,
            }),
        };
        session.open();

        let result = next(session.clone()).await;

        if let Err(failure) = &result {
            session.failure(failure);
        }
        session.close(result.is_err(), guard);
        result
    }
}

impl Default for Timeline {
    fn default() -> Self { Self::new() }
}

// ── Session ───────────────────────────────────────────────────────────────────

struct SessionInner {
    shared: Arc<Shared>,
    slot: usize,
    start: Instant,
    context: Mutex<Context>,
    closed: Arc<AtomicBool>,
}

/// Handle given to the downstream operation of one tracked request.
///
/// Reads and writes the request [`Context`] and logs into the request's lane.
/// Cheap to clone. Log calls made after the request closed are dropped,
/// since the lane may already belong to another request.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Index of the lane this request draws in.
    pub fn slot(&self) -> usize { self.inner.slot }

    /// Time since the request entered the timeline.
    pub fn elapsed(&self) -> Duration { self.inner.start.elapsed() }

    /// A copy of the request context.
    pub fn context(&self) -> Context {
        self.lock_context().clone()
    }

    pub fn method(&self) -> Method { self.lock_context().method.clone() }
    pub fn url(&self) -> String { self.lock_context().url.clone() }
    pub fn status(&self) -> Option<u16> { self.lock_context().status }

    pub fn set_url(&self, url: impl Into<String>) {
        self.lock_context().set_url(url);
    }

    /// Accepts a bare `u16` or an [`http::StatusCode`].
    pub fn set_status(&self, status: impl Into<u16>) {
        self.lock_context().set_status(status);
    }

    /// Logs `values` unpainted.
    pub fn log<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.write(&Meta::Blank, values, Paint::PLAIN);
    }

    /// Logs `values` in the `info` colour.
    pub fn info<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.write(&Meta::Blank, values, self.severity(Severity::Info));
    }

    /// Logs `values` in the `fatal` colour.
    pub fn fatal<I>(&self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        self.write(&Meta::Blank, values, self.severity(Severity::Fatal));
    }

    /// Logs `values` painted by severity name. Unknown names log unpainted.
    pub fn log_as<I>(&self, severity: &str, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        let paint = self.inner.shared.options.colorizer.paint_named(severity, millis(self.elapsed()), &self.context());
        self.write(&Meta::Blank, values, paint);
    }

    /// Logs `values` with `meta` in the metadata column of the first line.
    pub fn log_with_meta<I>(&self, meta: &str, values: I)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        let meta = Meta::Custom { text: meta.to_owned(), paint: Paint::PLAIN };
        self.write(&meta, values, Paint::PLAIN);
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn lock_context(&self) -> MutexGuard<'_, Context> {
        self.inner.context.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn severity(&self, severity: Severity) -> Paint {
        let context = self.context();
        self.inner.shared.options.colorizer.paint_for(Tone::Severity(severity), millis(self.elapsed()), &context)
    }

    fn write<I>(&self, meta: &Meta, values: I, paint: Paint)
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        let values: Vec<LogValue> = values.into_iter().map(Into::into).collect();
        let context = self.context();
        let lines = self.render(&context, LineKind::Log, meta, &join(&values), paint);
        self.report(lines);
    }

    fn open(&self) {
        let options = &self.inner.shared.options;
        let context = self.context();
        let meta = Meta::Open {
            method: context.method.clone(),
            clock: options.timestamp.then(wall_clock),
        };
        let lines = self.render(&context, LineKind::Open, &meta, options.open_path.select(&context), Paint::PLAIN);
        self.report(lines);
    }

    fn failure(&self, failure: &impl fmt::Debug) {
        let paint = self.severity(Severity::Fatal);
        let meta = Meta::Custom { text: "ERR".to_owned(), paint };
        self.write(&meta, [LogValue::failure(failure)], paint);
    }

    fn close(&self, failed: bool, guard: LaneGuard) {
        let shared = &self.inner.shared;
        let context = self.context();
        let elapsed = self.elapsed();

        let outcome = Outcome::classify(context.status, failed);
        let status_paint = outcome.severity().map_or(Paint::PLAIN, |severity| {
            shared.options.colorizer.paint_for(Tone::Severity(severity), millis(elapsed), &context)
        });
        let time_paint = self.renderer(&context).tone(elapsed);
        let time = if shared.options.timestamp { wall_clock() } else { format_duration(millis(elapsed)) };

        let meta = Meta::Close {
            status: context.status,
            failed,
            status_paint,
            method: context.method.clone(),
            time,
            time_paint,
        };
        let lines = self.render(&context, LineKind::Close, &meta, shared.options.close_path.select(&context), Paint::PLAIN);

        drop(guard);
        debug!(lane = self.inner.slot, status = ?context.status, ?outcome, elapsed_ms = millis(elapsed), "request closed");

        self.report(lines);
    }

    fn renderer<'a>(&'a self, context: &'a Context) -> Renderer<'a> {
        let shared = &self.inner.shared;
        Renderer {
            layout: shared.layout(),
            colorizer: &*shared.options.colorizer,
            level: &*shared.options.level,
            context,
        }
    }

    /// Renders against the lanes as they are right now; nothing is held
    /// locked while the colorizer and level function run.
    ///
    /// Renders nothing once the session is closed. The flag is read under the
    /// lanes lock, which the guard only takes after setting it.
    fn render(&self, context: &Context, kind: LineKind, meta: &Meta, message: &str, paint: Paint) -> Vec<String> {
        let lanes = {
            let lanes = self.inner.shared.lanes();
            if self.inner.closed.load(Ordering::Acquire) {
                warn!(lane = self.inner.slot, "log call after the request closed, dropped");
                return Vec::new();
            }
            lanes.snapshot()
        };
        let frame = Frame { lanes: &lanes, now: Instant::now(), slot: self.inner.slot };
        let width = self.inner.shared.options.width.resolve();
        self.renderer(context).lines(&frame, kind, meta, message, paint, width)
    }

    fn report(&self, lines: Vec<String>) {
        let reporter = &self.inner.shared.options.reporter;
        for mut line in lines {
            line.push('\n');
            reporter.report(&line);
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("slot", &self.inner.slot)
            .field("context", &*self.lock_context())
            .finish()
    }
}

fn wall_clock() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Width;

    fn capture() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) + Send + Sync + 'static) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        (lines, move |line: &str| sink.lock().unwrap().push(line.to_owned()))
    }

    #[tokio::test(start_paused = true)]
    async fn lane_is_released_after_close() {
        let (lines, reporter) = capture();
        let timeline = Timeline::builder().min_slots(1).width(Width::Disabled).reporter(reporter).build();

        let slot = timeline
            .track(Context::new(Method::GET, "/"), |s| async move { Ok::<_, ()>(s.slot()) })
            .await
            .unwrap();

        assert_eq!(slot, 0);
        assert_eq!(timeline.lanes().start(0), None);
        assert_eq!(timeline.lanes().len(), 1);
        assert_eq!(lines.lock().unwrap().len(), 2);
        assert!(lines.lock().unwrap().iter().all(|l| l.ends_with('\n')));
    }

    #[tokio::test(start_paused = true)]
    async fn logs_after_close_are_dropped() {
        let (lines, reporter) = capture();
        let timeline = Timeline::builder().width(Width::Disabled).reporter(reporter).build();

        let session = timeline
            .track(Context::new(Method::GET, "/"), |s| async move { Ok::<_, ()>(s) })
            .await
            .unwrap();
        session.log(["too late"]);

        assert_eq!(lines.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn url_rewrites_show_on_close_when_selected() {
        let (lines, reporter) = capture();
        let timeline = Timeline::builder()
            .width(Width::Disabled)
            .close_path(crate::config::PathSource::Url)
            .reporter(reporter)
            .build();

        timeline
            .track(Context::new(Method::GET, "/old"), |s| async move {
                s.set_url("/new");
                Ok::<_, ()>(())
            })
            .await
            .unwrap();

        let lines = lines.lock().unwrap();
        assert!(lines[0].trim_end().ends_with("/old"));
        assert!(lines[1].trim_end().ends_with("/new"));
    }

    #[tokio::test(start_paused = true)]
    async fn timestamp_mode_shows_wall_clock() {
        let (lines, reporter) = capture();
        let timeline = Timeline::builder().width(Width::Disabled).timestamp(true).reporter(reporter).build();

        timeline
            .track(Context::new(Method::GET, "/"), |s| async move {
                s.set_status(204u16);
                Ok::<_, ()>(())
            })
            .await
            .unwrap();

        let lines = lines.lock().unwrap();
        let close = &lines[1];
        assert!(!close.contains("ms"));
        assert_eq!(close.matches(':').count(), 2);
    }
}
