//! Optimizers, gradient clipping and learning rate schedules

mod adam;
mod clip;
mod optimizer;
mod scheduler;
mod sgd;

pub use adam::Adam;
pub use clip::clip_grad_norm;
pub use optimizer::Optimizer;
pub use scheduler::{LRScheduler, LinearLrDecay};
pub use sgd::SGD;
