//! Pacing between polls
//!
//! The detector only recommends a delay; a [`Pacer`] is what actually waits.

use crate::cancel::CancelHandle;
use std::time::Duration;

/// Waits between two polls
pub trait Pacer {
    fn pause(&mut self, delay: Duration);
}

/// Sleeps the current thread
///
/// When built with a [`CancelHandle`] the sleep is split into short slices so
/// that a cancellation request ends the wait early.
#[derive(Debug, Clone, Default)]
pub struct ThreadPacer {
    cancel: Option<CancelHandle>,
    slice: Duration,
}

impl ThreadPacer {
    const DEFAULT_SLICE: Duration = Duration::from_millis(100);

    pub fn new() -> Self {
        Self {
            cancel: None,
            slice: Self::DEFAULT_SLICE,
        }
    }

    pub fn with_cancel(cancel: CancelHandle) -> Self {
        Self {
            cancel: Some(cancel),
            slice: Self::DEFAULT_SLICE,
        }
    }
}

impl Pacer for ThreadPacer {
    fn pause(&mut self, delay: Duration) {
        let Some(cancel) = &self.cancel else {
            std::thread::sleep(delay);
            return;
        };
        let slice = if self.slice.is_zero() {
            Self::DEFAULT_SLICE
        } else {
            self.slice
        };
        let mut remaining = delay;
        while !remaining.is_zero() && !cancel.is_cancelled() {
            let nap = remaining.min(slice);
            std::thread::sleep(nap);
            remaining -= nap;
        }
    }
}

/// Records requested delays without waiting
#[derive(Debug, Clone, Default)]
pub struct RecordingPacer {
    delays: Vec<Duration>,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    /// Sum of all requested delays
    pub fn total(&self) -> Duration {
        self.delays.iter().sum()
    }
}

impl Pacer for RecordingPacer {
    fn pause(&mut self, delay: Duration) {
        self.delays.push(delay);
    }
}

impl<P: Pacer + ?Sized> Pacer for &mut P {
    fn pause(&mut self, delay: Duration) {
        (**self).pause(delay)
    }
}
