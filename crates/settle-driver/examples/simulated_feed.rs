//! Drive a simulated infinite-scroll feed across two tabs
//!
//! Run with `RUST_LOG=debug` to see every tick.

use settle_core::Result;
use settle_detector::DetectorParameters;
use settle_driver::{
    LoggingHandler, MetricsHandler, Pacer, ScrollSession, SessionConfig, ThreadPacer,
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// A feed that loads a page of items per poll, with an occasional slow load
struct SimulatedFeed {
    loaded: u64,
    total: u64,
    page: u64,
    polls: u64,
}

impl SimulatedFeed {
    fn new(total: u64, page: u64) -> Self {
        Self {
            loaded: 0,
            total,
            page,
            polls: 0,
        }
    }

    fn measure(&mut self) -> Result<u64> {
        self.polls += 1;
        // Every seventh poll the next page is still loading
        if self.polls % 7 != 0 {
            self.loaded = (self.loaded + self.page).min(self.total);
        }
        Ok(self.loaded)
    }
}

/// Sleeps a hundredth of the advised delay so the demo finishes quickly
struct FastForward(ThreadPacer);

impl Pacer for FastForward {
    fn pause(&mut self, delay: Duration) {
        self.0.pause(delay / 100);
    }
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = SessionConfig::new(DetectorParameters::default()).with_history();
    let mut feed = SimulatedFeed::new(240, 12);
    let source = move || feed.measure();

    let mut session = ScrollSession::new(config, source, FastForward(ThreadPacer::new()))?;
    let metrics = MetricsHandler::new();
    session.register_handler(LoggingHandler::with_ticks());
    session.register_handler(metrics.clone());

    let quotes = session.run()?;
    println!("quotes: {} items after {} ticks", quotes.final_size, quotes.ticks);

    // The second tab reuses the session; the source keeps reporting the final size
    session.begin_phase("reposts");
    let reposts = session.run()?;
    println!("reposts: {} items after {} ticks", reposts.final_size, reposts.ticks);

    println!("{:?}", metrics.snapshot());
    println!("{}", session.report().to_json()?);
    Ok(())
}
