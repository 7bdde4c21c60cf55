//! Standard (non-saturating BCE) GAN loss
//!
//! Critic outputs are logits. BCE on σ(x) is evaluated in the numerically
//! stable logit form:
//!
//! ```text
//! L_i = max(x_i, 0) - x_i * t_i + log(1 + exp(-|x_i|))
//! ∂L/∂x_i = (σ(x_i) - t_i) / n
//! ```

use ndarray::ArrayD;

use super::{AdversarialLoss, DiscriminatorLoss, GeneratorInputs, GeneratorLoss, LossKind};
use crate::error::Result;
use crate::generative::Validity;

/// Binary cross-entropy on sigmoid critic outputs
pub struct Standard;

/// Numerically stable sigmoid
pub(crate) fn sigmoid(v: f32) -> f32 {
    if v >= 0.0 {
        1.0 / (1.0 + (-v).exp())
    } else {
        let exp_v = v.exp();
        exp_v / (1.0 + exp_v)
    }
}

fn stable_bce(logit: f32, target: f32) -> f32 {
    logit.max(0.0) - logit * target + (1.0 + (-logit.abs()).exp()).ln()
}

/// Mean BCE of `σ(logits)` against a constant target, with its gradient
fn bce_with_logits(logits: &ArrayD<f32>, target: f32) -> (f32, ArrayD<f32>) {
    let n = logits.len().max(1) as f32;
    let value = logits.iter().map(|&x| stable_bce(x, target)).sum::<f32>() / n;
    let grad = logits.mapv(|x| (sigmoid(x) - target) / n);
    (value, grad)
}

impl AdversarialLoss for Standard {
    fn kind(&self) -> LossKind {
        LossKind::Standard
    }

    fn discriminator_loss(
        &self,
        real: &Validity,
        fake: &Validity,
        _penalty: Option<f32>,
    ) -> Result<DiscriminatorLoss> {
        real.ensure_compatible(fake)?;
        let (real_loss, grad_real) = bce_with_logits(real.as_single("standard")?, 1.0);
        let (fake_loss, grad_fake) = bce_with_logits(fake.as_single("standard")?, 0.0);

        Ok(DiscriminatorLoss {
            value: real_loss + fake_loss,
            grad_real: Validity::Single(grad_real),
            grad_fake: Validity::Single(grad_fake),
        })
    }

    fn generator_loss(
        &self,
        fake: &Validity,
        _inputs: &GeneratorInputs<'_>,
    ) -> Result<GeneratorLoss> {
        let (value, grad) = bce_with_logits(fake.as_single("standard")?, 1.0);
        Ok(GeneratorLoss { value, grad_fake: Validity::Single(grad), grad_images: None })
    }
}
