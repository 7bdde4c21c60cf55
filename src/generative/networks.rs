//! Collaborator interfaces for the networks the trainer drives
//!
//! Architectures live outside this crate. The trainer only needs forward
//! passes, explicit vector-Jacobian products and access to the parameter
//! tensors so optimizers can update them.

use ndarray::{Array2, Array3, Array4};

use super::Validity;
use crate::Tensor;

/// Image generator conditioned on a representation batch
pub trait Generator {
    /// Generate an image batch `(batch, channels, height, width)`
    ///
    /// `epoch` is forwarded untouched; architectures with progressive stages
    /// use it to pick the active stage.
    fn forward(&self, conditioning: &Array2<f32>, epoch: usize) -> Array4<f32>;

    /// Accumulate `∂L/∂θ` into the parameter gradients given `∂L/∂output`
    fn backward(&mut self, conditioning: &Array2<f32>, epoch: usize, grad_output: &Array4<f32>);

    fn parameters(&self) -> &[Tensor];

    fn parameters_mut(&mut self) -> &mut [Tensor];
}

/// Critic (discriminator) scoring image batches
pub trait Critic {
    /// Score an image batch
    fn forward(&self, images: &Array4<f32>) -> Validity;

    /// Accumulate `∂L/∂θ` into the parameter gradients given `∂L/∂validity`
    fn backward(&mut self, images: &Array4<f32>, grad_output: &Validity);

    /// `∂L/∂images` given `∂L/∂validity`, leaving parameter gradients untouched
    fn input_gradient(&self, images: &Array4<f32>, grad_output: &Validity) -> Array4<f32>;

    /// Accumulate `∂/∂θ ⟨∇ₓ Σ D(x), direction⟩` into the parameter gradients
    ///
    /// This is the second-order term needed to backpropagate a loss defined
    /// on the critic's input gradient (the gradient penalty).
    fn backward_input_gradient(&mut self, images: &Array4<f32>, direction: &Array4<f32>);

    fn parameters(&self) -> &[Tensor];

    fn parameters_mut(&mut self) -> &mut [Tensor];
}

/// Frozen sequence encoder producing conditioning representations
///
/// Takes `&self` and exposes no backward pass, so it can never receive
/// gradients from the adversarial losses.
pub trait Encoder {
    /// Map signals `(batch, time, channels)` to representations `(batch, features)`
    fn represent(&self, signals: &Array3<f32>) -> Array2<f32>;
}
