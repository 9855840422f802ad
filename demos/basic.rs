//! Minimal raillog demo — overlapping requests drawn as a rail diagram.
//!
//! Run with:
//!   cargo run --example basic
//!   RAILLOG_SLIM=1 RAILLOG_WIDTH=80 cargo run --example basic
//!   RUST_LOG=raillog=debug cargo run --example basic
//!
//! Fires a steady stream of fast requests plus a redirect, a not-found, a
//! failing handler, and a slow one, all sharing one timeline.

use std::time::Duration;

use http::Method;
use raillog::{Context, Session, Timeline, TimelineBuilder, values};
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), raillog::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let timeline = TimelineBuilder::from_env()?.build();
    let mut requests = JoinSet::new();

    for i in 0..6u64 {
        requests.spawn(fire(timeline.clone(), Method::GET, "/", move |s| ok(s, 20 + i * 17, 200)));
        sleep(Duration::from_millis(40)).await;

        match i {
            1 => { requests.spawn(fire(timeline.clone(), Method::GET, "/redirect", redirect)); }
            2 => { requests.spawn(fire(timeline.clone(), Method::GET, "/not-found", not_found)); }
            3 => { requests.spawn(fire(timeline.clone(), Method::GET, "/faulty", faulty)); }
            4 => { requests.spawn(fire(timeline.clone(), Method::POST, "/intensive", intensive)); }
            _ => {}
        }
    }

    while requests.join_next().await.is_some() {}
    Ok(())
}

async fn fire<F, Fut>(timeline: Timeline, method: Method, path: &'static str, handler: F)
where
    F: FnOnce(Session) -> Fut,
    Fut: std::future::Future<Output = Result<(), std::io::Error>>,
{
    // The failure has already been drawn on the rail; nothing left to do.
    let _ = timeline.track(Context::new(method, path), handler).await;
}

async fn ok(s: Session, ms: u64, status: u16) -> Result<(), std::io::Error> {
    sleep(Duration::from_millis(ms)).await;
    s.set_status(status);
    Ok(())
}

async fn redirect(s: Session) -> Result<(), std::io::Error> {
    s.log(["\nWill get a redirect\n\n"]);
    ok(s, 10, 301).await
}

async fn not_found(s: Session) -> Result<(), std::io::Error> {
    s.info(["\nThe resource will not be found\n\n"]);
    ok(s, 10, 404).await
}

async fn faulty(s: Session) -> Result<(), std::io::Error> {
    s.log(["\nThis one will throw an error\n\n"]);
    sleep(Duration::from_millis(25)).await;
    Err(std::io::Error::other("upstream connection reset"))
}

async fn intensive(s: Session) -> Result<(), std::io::Error> {
    s.log_with_meta("job", values!["crunching", serde_json::json!({ "rows": 120_000, "shards": [1, 2, 3] })]);
    ok(s, 350, 200).await
}
