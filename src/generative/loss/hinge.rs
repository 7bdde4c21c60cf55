//! Hinge loss

use super::{
    mean, uniform_grad, AdversarialLoss, DiscriminatorLoss, GeneratorInputs, GeneratorLoss,
    LossKind,
};
use crate::error::Result;
use crate::generative::Validity;

/// Hinge loss
///
/// L_D = mean(relu(1 - real)) + mean(relu(1 + fake)), L_G = -mean(fake)
pub struct Hinge;

impl AdversarialLoss for Hinge {
    fn kind(&self) -> LossKind {
        LossKind::Hinge
    }

    fn discriminator_loss(
        &self,
        real: &Validity,
        fake: &Validity,
        _penalty: Option<f32>,
    ) -> Result<DiscriminatorLoss> {
        real.ensure_compatible(fake)?;
        let r = real.as_single("hinge")?;
        let f = fake.as_single("hinge")?;

        let real_term = mean(&r.mapv(|x| (1.0 - x).max(0.0)));
        let fake_term = mean(&f.mapv(|x| (1.0 + x).max(0.0)));

        // relu'(0) = 0
        let n_r = r.len().max(1) as f32;
        let n_f = f.len().max(1) as f32;
        let grad_real = r.mapv(|x| if 1.0 - x > 0.0 { -1.0 / n_r } else { 0.0 });
        let grad_fake = f.mapv(|x| if 1.0 + x > 0.0 { 1.0 / n_f } else { 0.0 });

        Ok(DiscriminatorLoss {
            value: real_term + fake_term,
            grad_real: Validity::Single(grad_real),
            grad_fake: Validity::Single(grad_fake),
        })
    }

    fn generator_loss(
        &self,
        fake: &Validity,
        _inputs: &GeneratorInputs<'_>,
    ) -> Result<GeneratorLoss> {
        let f = fake.as_single("hinge")?;
        Ok(GeneratorLoss {
            value: -mean(f),
            grad_fake: Validity::Single(uniform_grad(f, -1.0)),
            grad_images: None,
        })
    }
}
