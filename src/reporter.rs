//! Output sinks for rendered lines.

use std::io::Write;

use tracing::warn;

/// Receives one fully rendered, newline-terminated line per call.
///
/// Implemented for any `Fn(&str)`, so a closure that pushes into a buffer
/// is a complete reporter.
pub trait Reporter: Send + Sync + 'static {
    fn report(&self, line: &str);
}

impl<F> Reporter for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn report(&self, line: &str) {
        self(line)
    }
}

/// Writes lines to the process's standard output. The default reporter.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stdout;

impl Reporter for Stdout {
    fn report(&self, line: &str) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = out.write_all(line.as_bytes()).and_then(|()| out.flush()) {
            warn!("stdout reporter write failed: {e}");
        }
    }
}
