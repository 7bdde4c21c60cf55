//! Interpolation-based gradient penalty
//!
//! For real samples `x_r` and detached fake samples `x_f`:
//!
//! ```text
//! x̂_i = α_i · x_r,i + (1 − α_i) · x_f,i,   α_i ~ U[0, 1)
//! g_i = ∇ₓ Σ D(x̂) evaluated at x̂_i
//! gp  = mean_i (‖g_i‖₂ − φ)²
//! ```
//!
//! One coefficient is drawn per sample and broadcast over channels and
//! pixels. The estimate keeps the interpolated batch and the derivative of
//! `gp` with respect to every `g_i` so the trainer can push the penalty into
//! the critic parameters through [`Critic::backward_input_gradient`].

use ndarray::{Array1, Array4, Axis};
use rand::Rng;

use super::Critic;
use crate::error::{Error, Result};

/// Coefficient of the gradient penalty in the Wasserstein critic loss (before `/ φ²`)
pub const PENALTY_WEIGHT: f32 = 10.0;

/// Gradient penalty estimator with target norm `φ`
#[derive(Debug, Clone, Copy)]
pub struct GradientPenalty {
    phi: f32,
}

/// Result of one penalty evaluation
#[derive(Debug, Clone)]
pub struct PenaltyEstimate {
    /// `mean((‖g_i‖ − φ)²)`
    pub value: f32,
    /// Interpolated batch the critic was evaluated on
    pub interpolates: Array4<f32>,
    /// `∂gp/∂g`, same shape as `interpolates`
    pub direction: Array4<f32>,
    /// Per-sample `‖g_i‖`
    pub grad_norms: Array1<f32>,
}

impl GradientPenalty {
    pub fn new(phi: f32) -> Self {
        Self { phi }
    }

    pub fn phi(&self) -> f32 {
        self.phi
    }

    /// Estimate the penalty with coefficients drawn from `rng`
    pub fn estimate<C, R>(
        &self,
        critic: &C,
        real: &Array4<f32>,
        fake: &Array4<f32>,
        rng: &mut R,
    ) -> Result<PenaltyEstimate>
    where
        C: Critic + ?Sized,
        R: Rng,
    {
        let alpha: Vec<f32> = (0..real.len_of(Axis(0))).map(|_| rng.random::<f32>()).collect();
        self.estimate_with_alpha(critic, real, fake, &alpha)
    }

    /// Estimate the penalty with explicit per-sample coefficients
    pub fn estimate_with_alpha<C>(
        &self,
        critic: &C,
        real: &Array4<f32>,
        fake: &Array4<f32>,
        alpha: &[f32],
    ) -> Result<PenaltyEstimate>
    where
        C: Critic + ?Sized,
    {
        if real.shape() != fake.shape() {
            return Err(Error::ShapeMismatch {
                fake: fake.shape().to_vec(),
                real: real.shape().to_vec(),
            });
        }
        let n = real.len_of(Axis(0));
        if alpha.len() != n {
            return Err(Error::InvalidBatch(format!(
                "{} interpolation coefficients for a batch of {n}",
                alpha.len()
            )));
        }

        let mut interpolates = fake.clone();
        for ((mut out, r), &a) in interpolates.outer_iter_mut().zip(real.outer_iter()).zip(alpha) {
            out.zip_mut_with(&r, |o, &r| *o = a * r + (1.0 - a) * *o);
        }

        let validity = critic.forward(&interpolates);
        let gradients = critic.input_gradient(&interpolates, &validity.ones_like());

        let grad_norms: Array1<f32> = gradients
            .outer_iter()
            .map(|g| g.iter().map(|&x| x * x).sum::<f32>().sqrt())
            .collect();

        let value = grad_norms.iter().map(|&norm| (norm - self.phi).powi(2)).sum::<f32>()
            / n.max(1) as f32;

        // ∂gp/∂g_i = 2(‖g_i‖ − φ) / n · g_i / ‖g_i‖, zero where the gradient vanishes
        let mut direction = gradients;
        for (mut g, &norm) in direction.outer_iter_mut().zip(grad_norms.iter()) {
            let coef = if norm > 0.0 { 2.0 * (norm - self.phi) / (n as f32 * norm) } else { 0.0 };
            g.mapv_inplace(|x| x * coef);
        }

        Ok(PenaltyEstimate { value, interpolates, direction, grad_norms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generative::reference::QuadraticCritic;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn batch(values: &[f32], n: usize) -> Array4<f32> {
        let d = values.len() / n;
        Array4::from_shape_vec((n, 1, 1, d), values.to_vec()).unwrap()
    }

    #[test]
    fn test_linear_critic_penalty_is_exact() {
        // ∇ₓD = a everywhere, ‖a‖ = 5
        let critic = QuadraticCritic::from_parts(vec![3.0, 4.0], 0.0, 0.0);
        let real = batch(&[1.0, 2.0, -1.0, 0.5], 2);
        let fake = batch(&[0.0, 0.0, 3.0, 3.0], 2);

        let alpha = [0.3, 0.9];
        let penalty = GradientPenalty::new(1.0);
        let gp = penalty.estimate_with_alpha(&critic, &real, &fake, &alpha).unwrap();
        assert_abs_diff_eq!(gp.value, 16.0, epsilon = 1e-4);
        assert!(gp.grad_norms.iter().all(|&n| (n - 5.0).abs() < 1e-5));

        let at_target =
            GradientPenalty::new(5.0).estimate_with_alpha(&critic, &real, &fake, &alpha).unwrap();
        assert_abs_diff_eq!(at_target.value, 0.0, epsilon = 1e-8);
        assert!(at_target.direction.iter().all(|&d| d.abs() < 1e-8));
    }

    #[test]
    fn test_identical_batches_ignore_alpha() {
        let critic = QuadraticCritic::from_parts(vec![0.5, -0.25, 1.0], 0.8, 0.1);
        let real = batch(&[0.2, -0.4, 0.9, 0.1, 0.3, -0.6], 2);
        let penalty = GradientPenalty::new(1.0);

        let a = penalty.estimate_with_alpha(&critic, &real, &real, &[0.0, 0.0]).unwrap();
        let b = penalty.estimate_with_alpha(&critic, &real, &real, &[0.7, 0.2]).unwrap();

        assert_abs_diff_eq!(a.value, b.value, epsilon = 1e-6);
        assert_eq!(a.interpolates, real);
    }

    #[test]
    fn test_interpolates_lie_between_endpoints() {
        let critic = QuadraticCritic::from_parts(vec![1.0, 1.0], 0.2, 0.0);
        let real = batch(&[1.0, 1.0], 1);
        let fake = batch(&[-1.0, 3.0], 1);

        let gp =
            GradientPenalty::new(1.0).estimate_with_alpha(&critic, &real, &fake, &[0.25]).unwrap();
        // 0.25·real + 0.75·fake
        assert_abs_diff_eq!(gp.interpolates[[0, 0, 0, 0]], -0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(gp.interpolates[[0, 0, 0, 1]], 2.5, epsilon = 1e-6);
    }

    #[test]
    fn test_direction_matches_finite_difference() {
        let critic = QuadraticCritic::from_parts(vec![0.6, -0.2], 0.4, 0.0);
        let real = batch(&[1.0, -0.5, 0.2, 0.8], 2);
        let fake = batch(&[-0.3, 0.4, 0.9, -1.1], 2);
        let alpha = [0.4, 0.6];
        let penalty = GradientPenalty::new(1.0);

        let gp = penalty.estimate_with_alpha(&critic, &real, &fake, &alpha).unwrap();
        let ones = critic.forward(&gp.interpolates).ones_like();
        let grads = critic.input_gradient(&gp.interpolates, &ones);

        // gp as a function of the raw gradient tensor
        let gp_of = |g: &Array4<f32>| -> f32 {
            g.outer_iter()
                .map(|row| (row.iter().map(|x| x * x).sum::<f32>().sqrt() - 1.0).powi(2))
                .sum::<f32>()
                / 2.0
        };

        let h = 1e-3;
        for idx in [[0, 0, 0, 0], [0, 0, 0, 1], [1, 0, 0, 0], [1, 0, 0, 1]] {
            let mut bumped = grads.clone();
            bumped[idx] += h;
            let numeric = (gp_of(&bumped) - gp_of(&grads)) / h;
            assert_abs_diff_eq!(numeric, gp.direction[idx], epsilon = 1e-2);
        }
    }

    #[test]
    fn test_mismatched_batches_are_rejected() {
        let critic = QuadraticCritic::from_parts(vec![1.0, 1.0], 0.0, 0.0);
        let real = batch(&[1.0, 1.0], 1);
        let fake = batch(&[1.0, 1.0, 2.0, 2.0], 2);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            GradientPenalty::new(1.0).estimate(&critic, &real, &fake, &mut rng),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_coefficient_count_must_match_batch() {
        let critic = QuadraticCritic::from_parts(vec![1.0, 1.0], 0.0, 0.0);
        let real = batch(&[1.0, 1.0], 1);
        assert!(matches!(
            GradientPenalty::new(1.0).estimate_with_alpha(&critic, &real, &real, &[0.1, 0.2]),
            Err(Error::InvalidBatch(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_penalty_is_non_negative(
            values in prop::collection::vec(-3.0f32..3.0, 8),
            linear in prop::collection::vec(-2.0f32..2.0, 2),
            curvature in -1.0f32..1.0,
            phi in 0.1f32..5.0,
            seed in any::<u64>(),
        ) {
            let critic = QuadraticCritic::from_parts(linear, curvature, 0.0);
            let real = batch(&values[..4], 2);
            let fake = batch(&values[4..], 2);
            let mut rng = StdRng::seed_from_u64(seed);

            let gp = GradientPenalty::new(phi).estimate(&critic, &real, &fake, &mut rng).unwrap();
            prop_assert!(gp.value >= 0.0);
            prop_assert!(gp.value.is_finite());
        }
    }
}
