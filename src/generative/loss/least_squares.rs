//! Least-squares GAN loss, summed over critic scales

use ndarray::ArrayD;

use super::{mean, AdversarialLoss, DiscriminatorLoss, GeneratorInputs, GeneratorLoss, LossKind};
use crate::error::Result;
use crate::generative::Validity;

/// LSGAN loss
///
/// L_D = Σ_s mean((real_s - 1)²) + mean(fake_s²), L_G = Σ_s mean((fake_s - 1)²)
pub struct LeastSquares;

/// mean((x - target)²) and its gradient 2(x - target)/n
fn mse(values: &ArrayD<f32>, target: f32) -> (f32, ArrayD<f32>) {
    let n = values.len().max(1) as f32;
    let value = mean(&values.mapv(|x| (x - target) * (x - target)));
    let grad = values.mapv(|x| 2.0 * (x - target) / n);
    (value, grad)
}

impl AdversarialLoss for LeastSquares {
    fn kind(&self) -> LossKind {
        LossKind::LeastSquares
    }

    fn discriminator_loss(
        &self,
        real: &Validity,
        fake: &Validity,
        _penalty: Option<f32>,
    ) -> Result<DiscriminatorLoss> {
        real.ensure_compatible(fake)?;

        let mut value = 0.0;
        let mut grad_real = Vec::with_capacity(real.num_scales());
        let mut grad_fake = Vec::with_capacity(fake.num_scales());
        for (r, f) in real.scales().iter().zip(fake.scales()) {
            let (real_loss, g_r) = mse(r, 1.0);
            let (fake_loss, g_f) = mse(f, 0.0);
            value += real_loss + fake_loss;
            grad_real.push(g_r);
            grad_fake.push(g_f);
        }

        Ok(DiscriminatorLoss {
            value,
            grad_real: rewrap(real, grad_real),
            grad_fake: rewrap(fake, grad_fake),
        })
    }

    fn generator_loss(
        &self,
        fake: &Validity,
        _inputs: &GeneratorInputs<'_>,
    ) -> Result<GeneratorLoss> {
        let mut value = 0.0;
        let mut grads = Vec::with_capacity(fake.num_scales());
        for f in fake.scales() {
            let (loss, g) = mse(f, 1.0);
            value += loss;
            grads.push(g);
        }
        Ok(GeneratorLoss { value, grad_fake: rewrap(fake, grads), grad_images: None })
    }
}

/// Put per-scale gradients back into the container shape of `like`
fn rewrap(like: &Validity, mut grads: Vec<ArrayD<f32>>) -> Validity {
    match like {
        Validity::Single(_) if grads.len() == 1 => Validity::Single(grads.remove(0)),
        _ => Validity::MultiScale(grads),
    }
}
