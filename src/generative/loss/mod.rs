//! Adversarial loss strategies
//!
//! Each variant computes its value together with the gradient of that value
//! with respect to the critic outputs, so the trainer can push gradients into
//! the networks without a global tape.
//!
//! | variant       | critic loss                                   | generator loss                 |
//! |---------------|-----------------------------------------------|--------------------------------|
//! | `hinge`       | mean(relu(1 − real)) + mean(relu(1 + fake))   | −mean(fake)                    |
//! | `standard`    | BCE(σ(real), 1) + BCE(σ(fake), 0)             | BCE(σ(fake), 1)                |
//! | `lsgan`       | Σ_scales MSE(real, 1) + MSE(fake, 0)          | Σ_scales MSE(fake, 1)          |
//! | `wgangp`      | −mean(real) + mean(fake) + 10·gp/φ²           | −mean(fake)                    |
//! | `wgangp-mode` | as `wgangp`                                   | −mean(fake) + 1/(lz + 1e−5)    |
//! | `wgangp-eps`  | `wgangp` + 1e−3·mean(real)²                   | −mean(fake)                    |
//!
//! The variant is parsed once from configuration ([`LossKind`]) and turned into
//! a boxed [`AdversarialLoss`] before training starts.

mod hinge;
mod least_squares;
mod standard;
mod wasserstein;


pub use hinge::Hinge;
pub use least_squares::LeastSquares;
pub use standard::Standard;
pub use wasserstein::{mode_seeking_term, WganGp, WganGpEps, WganGpMode, MODE_SEEKING_EPS};

use ndarray::{Array2, Array4, ArrayD};
use std::fmt;
use std::str::FromStr;

use super::Validity;
use crate::error::{Error, Result};

/// Supported loss variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LossKind {
    Hinge,
    Standard,
    LeastSquares,
    WganGp,
    WganGpMode,
    WganGpEps,
}

impl LossKind {
    pub const ALL: [LossKind; 6] = [
        LossKind::Hinge,
        LossKind::Standard,
        LossKind::LeastSquares,
        LossKind::WganGp,
        LossKind::WganGpMode,
        LossKind::WganGpEps,
    ];

    /// Configuration name of the variant
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hinge => "hinge",
            Self::Standard => "standard",
            Self::LeastSquares => "lsgan",
            Self::WganGp => "wgangp",
            Self::WganGpMode => "wgangp-mode",
            Self::WganGpEps => "wgangp-eps",
        }
    }

    /// Whether the critic loss includes a gradient penalty
    pub fn uses_gradient_penalty(self) -> bool {
        matches!(self, Self::WganGp | Self::WganGpMode | Self::WganGpEps)
    }

    /// Build the strategy; `phi` is the gradient-penalty target norm
    pub fn build(self, phi: f32) -> Box<dyn AdversarialLoss> {
        match self {
            Self::Hinge => Box::new(Hinge),
            Self::Standard => Box::new(Standard),
            Self::LeastSquares => Box::new(LeastSquares),
            Self::WganGp => Box::new(WganGp::new(phi)),
            Self::WganGpMode => Box::new(WganGpMode::new(phi)),
            Self::WganGpEps => Box::new(WganGpEps::new(phi)),
        }
    }
}

impl FromStr for LossKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnknownLoss(s.to_string()))
    }
}

impl fmt::Display for LossKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Critic loss value with its gradients w.r.t. both validity batches
#[derive(Debug, Clone)]
pub struct DiscriminatorLoss {
    pub value: f32,
    pub grad_real: Validity,
    pub grad_fake: Validity,
}

impl DiscriminatorLoss {
    /// Scale value and gradients, e.g. by `1 / accumulated_times`
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            value: self.value * factor,
            grad_real: self.grad_real.scaled(factor),
            grad_fake: self.grad_fake.scaled(factor),
        }
    }
}

/// Generator loss value with its gradients
///
/// `grad_images` carries terms that depend on the generated images directly
/// rather than through the critic (the mode-seeking term).
#[derive(Debug, Clone)]
pub struct GeneratorLoss {
    pub value: f32,
    pub grad_fake: Validity,
    pub grad_images: Option<Array4<f32>>,
}

impl GeneratorLoss {
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            value: self.value * factor,
            grad_fake: self.grad_fake.scaled(factor),
            grad_images: self.grad_images.map(|g| g * factor),
        }
    }
}

/// Tensors a generator loss may need besides the critic output
#[derive(Debug, Clone, Copy)]
pub struct GeneratorInputs<'a> {
    pub images: &'a Array4<f32>,
    pub conditioning: &'a Array2<f32>,
}

/// A pluggable adversarial loss
pub trait AdversarialLoss {
    fn kind(&self) -> LossKind;

    /// Weight applied to the gradient penalty, `None` when the variant has none
    fn penalty_weight(&self) -> Option<f32> {
        None
    }

    /// Critic loss; `penalty` is the gradient penalty estimate when one applies
    fn discriminator_loss(
        &self,
        real: &Validity,
        fake: &Validity,
        penalty: Option<f32>,
    ) -> Result<DiscriminatorLoss>;

    fn generator_loss(&self, fake: &Validity, inputs: &GeneratorInputs<'_>)
        -> Result<GeneratorLoss>;
}

pub(crate) fn mean(values: &ArrayD<f32>) -> f32 {
    values.mean().unwrap_or(0.0)
}

/// Uniform gradient `value / n` for a mean over `like`
pub(crate) fn uniform_grad(like: &ArrayD<f32>, value: f32) -> ArrayD<f32> {
    let n = like.len().max(1) as f32;
    ArrayD::from_elem(like.raw_dim(), value / n)
}
