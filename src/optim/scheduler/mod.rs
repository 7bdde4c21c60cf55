//! Learning rate schedulers
//!
//! Schedulers are pure functions of the global step. The trainer calls
//! [`LRScheduler::step`] after every generator update, keyed by the global
//! step counter, and the scheduler writes the new rate into the optimizer.

mod linear_decay;

#[cfg(test)]
mod tests;

pub use linear_decay::LinearLrDecay;

use crate::optim::Optimizer;

/// Learning rate scheduler trait
pub trait LRScheduler {
    /// Learning rate scheduled for `current_step`
    fn lr_at(&self, current_step: u64) -> f32;

    /// Apply the schedule for `current_step` to `optimizer` and return the rate
    fn step(&mut self, optimizer: &mut dyn Optimizer, current_step: u64) -> f32 {
        let lr = self.lr_at(current_step);
        optimizer.set_lr(lr);
        lr
    }
}
