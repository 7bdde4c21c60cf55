//! Linear learning rate decay between two global steps

use super::LRScheduler;
use crate::error::{Error, Result};
use crate::optim::Optimizer;

/// Linear Decay Learning Rate Scheduler
///
/// Holds `start_lr` up to `decay_start_step`, then decays linearly to
/// `end_lr`, reached at `decay_end_step` and held afterwards.
///
/// Formula: lr_t = start_lr - (start_lr - end_lr) * (t - t_start) / (t_end - t_start)
///
/// The optimizer is only written while `t_start < t < t_end`; outside the
/// window it keeps whatever rate it last received.
#[derive(Debug, Clone)]
pub struct LinearLrDecay {
    start_lr: f32,
    end_lr: f32,
    decay_start_step: u64,
    decay_end_step: u64,
    delta: f32,
}

impl LinearLrDecay {
    /// Create a new linear decay scheduler
    ///
    /// # Errors
    /// `InvalidSchedule` unless `start_lr > end_lr` and
    /// `decay_end_step > decay_start_step`.
    pub fn new(
        start_lr: f32,
        end_lr: f32,
        decay_start_step: u64,
        decay_end_step: u64,
    ) -> Result<Self> {
        if start_lr <= end_lr || start_lr.is_nan() || end_lr.is_nan() {
            return Err(Error::InvalidSchedule(format!(
                "start_lr ({start_lr}) must be greater than end_lr ({end_lr})"
            )));
        }
        if decay_end_step <= decay_start_step {
            return Err(Error::InvalidSchedule(format!(
                "decay_end_step ({decay_end_step}) must be after decay_start_step ({decay_start_step})"
            )));
        }
        let delta = (start_lr - end_lr) / (decay_end_step - decay_start_step) as f32;
        Ok(Self { start_lr, end_lr, decay_start_step, decay_end_step, delta })
    }

    pub fn start_lr(&self) -> f32 {
        self.start_lr
    }

    pub fn end_lr(&self) -> f32 {
        self.end_lr
    }

    fn in_window(&self, current_step: u64) -> bool {
        current_step > self.decay_start_step && current_step < self.decay_end_step
    }
}

impl LRScheduler for LinearLrDecay {
    fn lr_at(&self, current_step: u64) -> f32 {
        if current_step <= self.decay_start_step {
            self.start_lr
        } else if current_step >= self.decay_end_step {
            self.end_lr
        } else {
            self.start_lr - self.delta * (current_step - self.decay_start_step) as f32
        }
    }

    fn step(&mut self, optimizer: &mut dyn Optimizer, current_step: u64) -> f32 {
        let lr = self.lr_at(current_step);
        if self.in_window(current_step) {
            optimizer.set_lr(lr);
        }
        lr
    }
}
