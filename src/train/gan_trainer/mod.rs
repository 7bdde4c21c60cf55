//! Adversarial training coordinator
//!
//! [`GanTrainer`] owns the generator, critic and frozen encoder together with
//! both optimizers, the LR schedulers, the EMA tracker and the step counters.
//! Each iteration:
//!
//! 1. encodes the conditioning signals,
//! 2. runs a critic pass and accumulates its gradients, stepping the critic
//!    optimizer on accumulation boundaries,
//! 3. every `n_critic · accumulated_times` global steps, runs
//!    `g_accumulated_times` generator passes, steps the generator optimizer,
//!    advances both LR schedules and refreshes the EMA shadow.

mod core;
mod epoch;
mod result;
mod step;

#[cfg(test)]
mod tests;

pub use core::{GanTrainer, TrainState};
pub use result::{EpochSummary, StepOutcome, TrainResult};
