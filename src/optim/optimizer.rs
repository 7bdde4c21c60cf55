//! Optimizer trait

use crate::Tensor;

/// Trait for optimization algorithms
///
/// The trainer owns one optimizer per network and is the only caller of
/// `step` and `zero_grad`; a `step` is always followed by `zero_grad`
/// before the next accumulation window starts.
pub trait Optimizer {
    /// Perform a single optimization step using the accumulated gradients
    fn step(&mut self, params: &mut [Tensor]);

    /// Clear all gradients
    fn zero_grad(&mut self, params: &mut [Tensor]) {
        for param in params.iter() {
            param.zero_grad();
        }
    }

    /// Get learning rate
    fn lr(&self) -> f32;

    /// Set learning rate
    fn set_lr(&mut self, lr: f32);
}
