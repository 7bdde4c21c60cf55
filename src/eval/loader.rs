//! Cycling batch source for evaluation

use crate::error::{Error, Result};
use crate::train::Batch;

/// Anything that can hand out evaluation batches on demand
pub trait BatchSource {
    fn next_batch(&mut self) -> Result<Batch>;
}

/// Wraps a restartable data source so it never runs dry
///
/// When the current pass is exhausted, `restart` is called for a fresh
/// iterator. A source that yields nothing even after a restart is an error.
pub struct CyclingLoader<F, I> {
    restart: F,
    current: I,
    restarts: usize,
}

impl<F, I> CyclingLoader<F, I>
where
    F: FnMut() -> I,
    I: Iterator<Item = Batch>,
{
    pub fn new(mut restart: F) -> Self {
        let current = restart();
        Self { restart, current, restarts: 0 }
    }

    /// Times the underlying source has been restarted
    pub fn restarts(&self) -> usize {
        self.restarts
    }
}

impl<F, I> BatchSource for CyclingLoader<F, I>
where
    F: FnMut() -> I,
    I: Iterator<Item = Batch>,
{
    fn next_batch(&mut self) -> Result<Batch> {
        if let Some(batch) = self.current.next() {
            return Ok(batch);
        }
        self.current = (self.restart)();
        self.restarts += 1;
        self.current.next().ok_or(Error::EmptyDataset)
    }
}
