//! Content-size sources
//!
//! A source is the driver's only view of the host: each call to
//! [`SizeSource::measure`] reads the current content volume. Sources may fail
//! (the page navigated away, the selector matched nothing); the session
//! decides how many consecutive failures it tolerates.

use settle_core::{IntoSize, Result};

/// A source of content-size measurements
pub trait SizeSource {
    type Size: IntoSize;

    /// Read the current content size
    fn measure(&mut self) -> Result<Self::Size>;
}

impl<F, T> SizeSource for F
where
    F: FnMut() -> Result<T>,
    T: IntoSize,
{
    type Size = T;

    fn measure(&mut self) -> Result<T> {
        self()
    }
}

/// Replays a fixed sequence of sizes, then repeats the last one
///
/// Useful for dry runs and tests: a finished feed keeps reporting its final
/// size, which is exactly what a real page does once the end is reached.
#[derive(Debug, Clone)]
pub struct ScriptedSource<T: IntoSize> {
    sizes: Vec<T>,
    cursor: usize,
}

impl<T: IntoSize> ScriptedSource<T> {
    pub fn new(sizes: Vec<T>) -> Self {
        Self { sizes, cursor: 0 }
    }

    /// Number of measurements served so far
    pub fn served(&self) -> usize {
        self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.sizes.len()
    }
}

impl<T: IntoSize> SizeSource for ScriptedSource<T> {
    type Size = u64;

    fn measure(&mut self) -> Result<u64> {
        let index = self.cursor.min(self.sizes.len().saturating_sub(1));
        self.cursor = self.cursor.saturating_add(1);
        Ok(self.sizes.get(index).map(|&s| s.into_size()).unwrap_or(0))
    }
}

/// Maximum over several sources measuring the same content
///
/// Counting the same items through several selectors and keeping the
/// largest count is robust to any one selector breaking. A member that
/// fails is skipped; the measurement fails only if every member fails.
pub struct MaxOfSources<S: SizeSource> {
    sources: Vec<S>,
}

impl<S: SizeSource> MaxOfSources<S> {
    pub fn new(sources: Vec<S>) -> Self {
        Self { sources }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl<S: SizeSource> SizeSource for MaxOfSources<S> {
    type Size = u64;

    fn measure(&mut self) -> Result<u64> {
        let mut best: Option<u64> = None;
        let mut last_err = None;
        for source in &mut self.sources {
            match source.measure() {
                Ok(size) => {
                    let size = size.into_size();
                    best = Some(best.map_or(size, |b| b.max(size)));
                }
                Err(err) => last_err = Some(err),
            }
        }
        match (best, last_err) {
            (Some(size), _) => Ok(size),
            (None, Some(err)) => Err(err),
            (None, None) => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use settle_core::Error;

    #[test]
    fn test_scripted_source_repeats_last() {
        let mut source = ScriptedSource::new(vec![3i64, -1, 9]);
        let read: Vec<u64> = (0..5).map(|_| source.measure().unwrap()).collect();
        assert_eq!(read, vec![3, 0, 9, 9, 9]);
        assert_eq!(source.served(), 5);
        assert!(source.is_exhausted());
    }

    #[test]
    fn test_empty_scripted_source() {
        let mut source = ScriptedSource::<u64>::new(Vec::new());
        assert_eq!(source.measure().unwrap(), 0);
    }

    #[test]
    fn test_closure_source() {
        let mut height = 0.0f64;
        let mut source = || -> Result<f64> {
            height += 480.5;
            Ok(height)
        };
        assert_eq!(source.measure().unwrap().into_size(), 480);
        assert_eq!(source.measure().unwrap().into_size(), 961);
    }

    #[test]
    fn test_max_of_sources() {
        let mut source = MaxOfSources::new(vec![
            ScriptedSource::new(vec![4u64, 10]),
            ScriptedSource::new(vec![7u64, 8]),
        ]);
        assert_eq!(source.measure().unwrap(), 7);
        assert_eq!(source.measure().unwrap(), 10);
    }

    #[test]
    fn test_max_of_sources_skips_failures() {
        let mut calls = 0;
        let flaky = move || -> Result<u64> {
            calls += 1;
            if calls % 2 == 1 {
                Err(Error::source("selector missing"))
            } else {
                Ok(50)
            }
        };
        let steady = || -> Result<u64> { Ok(20) };

        let mut both: MaxOfSources<Box<dyn FnMut() -> Result<u64>>> =
            MaxOfSources::new(vec![Box::new(flaky), Box::new(steady)]);
        assert_eq!(both.measure().unwrap(), 20);
        assert_eq!(both.measure().unwrap(), 50);
    }

    #[test]
    fn test_max_of_sources_all_failing() {
        let failing = || -> Result<u64> { Err(Error::source("no document")) };
        let mut source = MaxOfSources::new(vec![failing]);
        assert!(matches!(source.measure(), Err(Error::Source(_))));
        assert_eq!(MaxOfSources::<ScriptedSource<u64>>::new(Vec::new()).measure().unwrap(), 0);
    }
}
