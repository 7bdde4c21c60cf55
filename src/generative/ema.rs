//! Exponential moving average of generator parameters
//!
//! The shadow copy is what evaluation and sampling use. It lives outside the
//! optimizer: nothing ever writes gradients into it.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::Generator;
use crate::error::{Error, Result};
use crate::Tensor;

/// How the decay factor `β` is chosen after each generator step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EmaDecay {
    /// Constant `β`
    Fixed(f32),
    /// Half-life measured in images, ramped up from the start of training
    ///
    /// `ema_nimg = min(kimg · 1000, cur_nimg · warmup)` with
    /// `cur_nimg = images_per_step · global_steps`, and
    /// `β = 0.5^(images_per_step / ema_nimg)`.
    Warmup { kimg: f32, warmup: f32, images_per_step: f32 },
}

impl EmaDecay {
    /// Decay factor for the update following `global_steps`
    pub fn beta(&self, global_steps: u64) -> f32 {
        match *self {
            Self::Fixed(beta) => beta,
            Self::Warmup { kimg, warmup, images_per_step } => {
                let cur_nimg = f64::from(images_per_step) * global_steps as f64;
                let ema_nimg = (f64::from(kimg) * 1000.0).min(cur_nimg * f64::from(warmup));
                0.5f64.powf(f64::from(images_per_step) / ema_nimg.max(1e-8)) as f32
            }
        }
    }
}

/// Shadow parameters tracking the generator
#[derive(Debug, Clone)]
pub struct EmaTracker {
    shadow: Vec<Array1<f32>>,
    decay: EmaDecay,
}

impl EmaTracker {
    /// Start tracking from the current parameter values
    pub fn new(params: &[Tensor], decay: EmaDecay) -> Self {
        Self { shadow: params.iter().map(|p| p.data().clone()).collect(), decay }
    }

    pub fn decay(&self) -> EmaDecay {
        self.decay
    }

    pub fn shadow(&self) -> &[Array1<f32>] {
        &self.shadow
    }

    /// Replace the shadow buffers, e.g. when resuming from a checkpoint
    pub fn load_shadow(&mut self, shadow: Vec<Array1<f32>>) -> Result<()> {
        self.check_layout(shadow.iter().map(Array1::len))?;
        self.shadow = shadow;
        Ok(())
    }

    /// `shadow = shadow · β + param · (1 − β)` for every parameter
    pub fn update(&mut self, params: &[Tensor], beta: f32) -> Result<()> {
        self.check_layout(params.iter().map(Tensor::len))?;
        for (shadow, param) in self.shadow.iter_mut().zip(params) {
            shadow.zip_mut_with(param.data(), |s, &p| *s = *s * beta + p * (1.0 - beta));
        }
        Ok(())
    }

    /// Update with the configured decay for `global_steps`; returns `β`
    pub fn refresh(&mut self, params: &[Tensor], global_steps: u64) -> Result<f32> {
        let beta = self.decay.beta(global_steps);
        self.update(params, beta)?;
        Ok(beta)
    }

    /// Run `f` with the shadow weights loaded into `generator`
    ///
    /// The live weights are restored afterwards, so optimizer state stays
    /// consistent with the parameters it was computed for.
    pub fn with_shadow<G, T, F>(&mut self, generator: &mut G, f: F) -> Result<T>
    where
        G: Generator + ?Sized,
        F: FnOnce(&mut G) -> T,
    {
        self.check_layout(generator.parameters().iter().map(Tensor::len))?;
        self.swap(generator.parameters_mut());
        let out = f(generator);
        self.swap(generator.parameters_mut());
        Ok(out)
    }

    fn swap(&mut self, params: &mut [Tensor]) {
        for (shadow, param) in self.shadow.iter_mut().zip(params.iter_mut()) {
            std::mem::swap(shadow, param.data_mut());
        }
    }

    /// Tensor count and per-tensor lengths must match the shadow buffers
    fn check_layout<I: Iterator<Item = usize>>(&self, lens: I) -> Result<()> {
        let lens: Vec<usize> = lens.collect();
        let same = lens.len() == self.shadow.len()
            && lens.iter().zip(&self.shadow).all(|(&len, s)| len == s.len());
        if same {
            Ok(())
        } else {
            Err(Error::ParameterMismatch {
                expected: self.shadow.iter().map(Array1::len).sum(),
                actual: lens.iter().sum(),
            })
        }
    }
}
