//! Conditional GAN building blocks
//!
//! - [`Generator`], [`Critic`] and [`Encoder`]: interfaces for the externally
//!   defined networks
//! - [`loss`]: pluggable adversarial losses
//! - [`GradientPenalty`]: interpolation-based critic regularizer
//! - [`EmaTracker`]: moving average of generator weights used for evaluation
//! - [`reference`]: small closed-form networks for smoke runs and tests

mod ema;
pub mod loss;
mod networks;
mod penalty;
pub mod reference;
mod validity;

pub use ema::{EmaDecay, EmaTracker};
pub use loss::{
    AdversarialLoss, DiscriminatorLoss, GeneratorInputs, GeneratorLoss, LossKind,
};
pub use networks::{Critic, Encoder, Generator};
pub use penalty::{GradientPenalty, PenaltyEstimate, PENALTY_WEIGHT};
pub use validity::Validity;
