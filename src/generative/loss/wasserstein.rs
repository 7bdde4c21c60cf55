//! Wasserstein losses with gradient penalty
//!
//! All three variants share the critic objective
//! `-mean(real) + mean(fake) + 10 · gp / φ²`; they differ in the extra drift
//! term on the critic side and the mode-seeking term on the generator side.

use ndarray::{s, Array2, Array4, Axis};

use super::{
    mean, uniform_grad, AdversarialLoss, DiscriminatorLoss, GeneratorInputs, GeneratorLoss,
    LossKind,
};
use crate::error::{Error, Result};
use crate::generative::penalty::PENALTY_WEIGHT;
use crate::generative::Validity;

/// Stabiliser added to the diversity ratio before inverting it
pub const MODE_SEEKING_EPS: f32 = 1e-5;

/// Coefficient of the `mean(real)²` drift term of `wgangp-eps`
const DRIFT_WEIGHT: f32 = 1e-3;

fn penalty_weight(phi: f32) -> f32 {
    PENALTY_WEIGHT / (phi * phi)
}

fn critic_objective(
    name: &'static str,
    real: &Validity,
    fake: &Validity,
    penalty: Option<f32>,
    weight: f32,
) -> Result<(DiscriminatorLoss, f32)> {
    real.ensure_compatible(fake)?;
    let r = real.as_single(name)?;
    let f = fake.as_single(name)?;
    let real_mean = mean(r);

    let value = -real_mean + mean(f) + weight * penalty.unwrap_or(0.0);
    let loss = DiscriminatorLoss {
        value,
        grad_real: Validity::Single(uniform_grad(r, -1.0)),
        grad_fake: Validity::Single(uniform_grad(f, 1.0)),
    };
    Ok((loss, real_mean))
}

fn negated_mean(name: &'static str, fake: &Validity) -> Result<GeneratorLoss> {
    let f = fake.as_single(name)?;
    Ok(GeneratorLoss {
        value: -mean(f),
        grad_fake: Validity::Single(uniform_grad(f, -1.0)),
        grad_images: None,
    })
}

/// WGAN-GP with target gradient norm `φ`
pub struct WganGp {
    phi: f32,
}

impl WganGp {
    pub fn new(phi: f32) -> Self {
        Self { phi }
    }
}

impl AdversarialLoss for WganGp {
    fn kind(&self) -> LossKind {
        LossKind::WganGp
    }

    fn penalty_weight(&self) -> Option<f32> {
        Some(penalty_weight(self.phi))
    }

    fn discriminator_loss(
        &self,
        real: &Validity,
        fake: &Validity,
        penalty: Option<f32>,
    ) -> Result<DiscriminatorLoss> {
        critic_objective("wgangp", real, fake, penalty, penalty_weight(self.phi))
            .map(|(loss, _)| loss)
    }

    fn generator_loss(
        &self,
        fake: &Validity,
        _inputs: &GeneratorInputs<'_>,
    ) -> Result<GeneratorLoss> {
        negated_mean("wgangp", fake)
    }
}

/// WGAN-GP with a `1e-3 · mean(real)²` drift term keeping critic outputs near zero
pub struct WganGpEps {
    phi: f32,
}

impl WganGpEps {
    pub fn new(phi: f32) -> Self {
        Self { phi }
    }
}

impl AdversarialLoss for WganGpEps {
    fn kind(&self) -> LossKind {
        LossKind::WganGpEps
    }

    fn penalty_weight(&self) -> Option<f32> {
        Some(penalty_weight(self.phi))
    }

    fn discriminator_loss(
        &self,
        real: &Validity,
        fake: &Validity,
        penalty: Option<f32>,
    ) -> Result<DiscriminatorLoss> {
        let (mut loss, real_mean) =
            critic_objective("wgangp-eps", real, fake, penalty, penalty_weight(self.phi))?;
        loss.value += DRIFT_WEIGHT * real_mean * real_mean;

        // ∂(c·m²)/∂r_i = 2c·m / n
        let r = real.as_single("wgangp-eps")?;
        let drift = uniform_grad(r, 2.0 * DRIFT_WEIGHT * real_mean);
        loss.grad_real = loss.grad_real.map(|g| g + &drift);
        Ok(loss)
    }

    fn generator_loss(
        &self,
        fake: &Validity,
        _inputs: &GeneratorInputs<'_>,
    ) -> Result<GeneratorLoss> {
        negated_mean("wgangp-eps", fake)
    }
}

/// WGAN-GP whose generator is also penalised for collapsing diverse inputs
pub struct WganGpMode {
    phi: f32,
}

impl WganGpMode {
    pub fn new(phi: f32) -> Self {
        Self { phi }
    }
}

impl AdversarialLoss for WganGpMode {
    fn kind(&self) -> LossKind {
        LossKind::WganGpMode
    }

    fn penalty_weight(&self) -> Option<f32> {
        Some(penalty_weight(self.phi))
    }

    fn discriminator_loss(
        &self,
        real: &Validity,
        fake: &Validity,
        penalty: Option<f32>,
    ) -> Result<DiscriminatorLoss> {
        critic_objective("wgangp-mode", real, fake, penalty, penalty_weight(self.phi))
            .map(|(loss, _)| loss)
    }

    fn generator_loss(
        &self,
        fake: &Validity,
        inputs: &GeneratorInputs<'_>,
    ) -> Result<GeneratorLoss> {
        let mut loss = negated_mean("wgangp-mode", fake)?;
        let (term, grad_images) = mode_seeking_term(inputs.images, inputs.conditioning)?;
        loss.value += term;
        loss.grad_images = Some(grad_images);
        Ok(loss)
    }
}

fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Mode-seeking term `1 / (lz + ε)` and its gradient w.r.t. `images`
///
/// The batch is split into two halves; `lz` is the mean absolute pixel
/// difference between the image halves divided by the mean absolute
/// difference between the matching conditioning halves. When both
/// conditioning halves are identical the ratio is undefined and the term
/// contributes nothing.
///
/// # Errors
/// `InvalidBatch` if the batch is odd, smaller than two, or the image and
/// conditioning batch sizes differ.
pub fn mode_seeking_term(
    images: &Array4<f32>,
    conditioning: &Array2<f32>,
) -> Result<(f32, Array4<f32>)> {
    let n = images.len_of(Axis(0));
    if n != conditioning.len_of(Axis(0)) {
        return Err(Error::InvalidBatch(format!(
            "{n} generated images for {} conditioning vectors",
            conditioning.len_of(Axis(0))
        )));
    }
    if n < 2 || n % 2 != 0 {
        return Err(Error::InvalidBatch(format!(
            "mode-seeking loss needs an even batch of at least 2, got {n}"
        )));
    }
    let half = n / 2;

    let image_diff = &images.slice(s![half.., .., .., ..]) - &images.slice(s![..half, .., .., ..]);
    let cond_diff = &conditioning.slice(s![half.., ..]) - &conditioning.slice(s![..half, ..]);

    let image_gap = image_diff.mapv(f32::abs).mean().unwrap_or(0.0);
    let cond_gap = cond_diff.mapv(f32::abs).mean().unwrap_or(0.0);

    let mut grad = Array4::zeros(images.raw_dim());
    if cond_gap <= 0.0 || !cond_gap.is_finite() {
        return Ok((0.0, grad));
    }

    let lz = image_gap / cond_gap;
    let value = 1.0 / (lz + MODE_SEEKING_EPS);

    // ∂value/∂lz · ∂lz/∂diff_k = -1/(lz+ε)² · sign(diff_k) / (K · cond_gap)
    let k = image_diff.len() as f32;
    let coef = -value * value / (k * cond_gap);
    let upper: Array4<f32> = image_diff.mapv(|d| coef * sign(d));
    grad.slice_mut(s![half.., .., .., ..]).assign(&upper);
    grad.slice_mut(s![..half, .., .., ..]).assign(&upper.mapv(|g| -g));

    Ok((value, grad))
}
