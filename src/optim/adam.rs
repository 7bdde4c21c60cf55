//! Adam optimizer

use super::Optimizer;
use crate::Tensor;
use ndarray::Array1;

/// Adam optimizer
///
/// m_t = β1·m + (1-β1)·g, v_t = β2·v + (1-β2)·g²,
/// θ_t = θ - lr · m̂_t / (√v̂_t + ε) with bias-corrected moments.
///
/// GAN setups commonly run with `β1 = 0` so the first moment is just the
/// current gradient.
pub struct Adam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    t: u64,
    m: Vec<Option<Array1<f32>>>,
    v: Vec<Option<Array1<f32>>>,
}

impl Adam {
    /// Create a new Adam optimizer
    pub fn new(lr: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self { lr, beta1, beta2, epsilon, t: 0, m: Vec::new(), v: Vec::new() }
    }

    /// Adam with `(0.9, 0.999)` betas and `ε = 1e-8`
    pub fn default_params(lr: f32) -> Self {
        Self::new(lr, 0.9, 0.999, 1e-8)
    }

    fn ensure_moments(&mut self, params: &[Tensor]) {
        if self.m.len() != params.len() {
            self.m = params.iter().map(|_| None).collect();
            self.v = params.iter().map(|_| None).collect();
        }
    }

    /// Number of steps taken so far
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.t
    }

    #[must_use]
    pub fn betas(&self) -> (f32, f32) {
        (self.beta1, self.beta2)
    }
}

/// `1 - β^t`, with `t` saturated to the `powi` exponent range
fn bias_correction(beta: f32, t: u64) -> f32 {
    1.0 - beta.powi(i32::try_from(t).unwrap_or(i32::MAX))
}

impl Optimizer for Adam {
    fn step(&mut self, params: &mut [Tensor]) {
        self.ensure_moments(params);
        self.t += 1;

        let bias1 = bias_correction(self.beta1, self.t);
        let bias2 = bias_correction(self.beta2, self.t);

        for (i, param) in params.iter_mut().enumerate() {
            let Some(grad) = param.grad() else {
                continue;
            };

            let m = match self.m[i].take() {
                Some(m) => m * self.beta1 + &grad * (1.0 - self.beta1),
                None => &grad * (1.0 - self.beta1),
            };
            let grad_sq = grad.mapv(|g| g * g);
            let v = match self.v[i].take() {
                Some(v) => v * self.beta2 + &grad_sq * (1.0 - self.beta2),
                None => &grad_sq * (1.0 - self.beta2),
            };

            let (lr, eps) = (self.lr, self.epsilon);
            ndarray::Zip::from(param.data_mut()).and(&m).and(&v).for_each(|p, &m_i, &v_i| {
                let m_hat = m_i / bias1;
                let v_hat = v_i / bias2;
                *p -= lr * m_hat / (v_hat.sqrt() + eps);
            });

            self.m[i] = Some(m);
            self.v[i] = Some(v);
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }
}
