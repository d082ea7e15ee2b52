//! A suite whose `set_up` waits for an event raised on another thread.
//!
//! The event source stands in for a page load or any other notification an
//! embedding environment delivers asynchronously.
//!
//! `RUST_LOG=asynctest=debug cargo run --example delayed_signal`

use std::{
    process::Termination,
    thread,
    time::{Duration, Instant},
};

use asynctest::{harness, notify::SuiteFinished, suite::Suite};
use crossbeam_channel::Receiver;

/// Emits `loaded` once after `delay`, like a document finishing to load.
fn load_page(delay: Duration) -> Receiver<&'static str> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    thread::spawn(move || {
        thread::sleep(delay);
        let _ = tx.send("loaded");
    });
    rx
}

fn main() -> impl Termination {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let suite = Suite::new("page test suite")
        .async_set_up(|ctx, done| {
            ctx.set("requested", Instant::now());
            let page = load_page(Duration::from_millis(100));
            thread::spawn(move || match page.recv() {
                Ok(event) => {
                    tracing::info!(event, "page ready");
                    done.call();
                }
                Err(_) => done.fail("page never loaded"),
            });
        })
        .tear_down(|ctx| {
            ctx.remove::<Instant>("requested");
        })
        .test("it waits for the page", |ctx| {
            let requested = ctx
                .get::<Instant>("requested")
                .expect("set_up stores the request time");
            assert!(requested.elapsed() >= Duration::from_millis(100));
        })
        .async_test("it finishes from another thread", |_, done| {
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                done.finish(Ok::<(), String>(()));
            });
        })
        .notify(true);

    harness(suite)
        .with_timeout(Duration::from_secs(5))
        .with_notifier(|event: SuiteFinished| {
            tracing::info!(
                suite = %event.report.name,
                passed = event.report.passed(),
                "suite finished"
            );
        })
        .run()
}
