//! Critic output container

use ndarray::ArrayD;
use std::slice;

use crate::error::{Error, Result};

/// Critic scores for one image batch
///
/// Most critics return one tensor (one score per sample, or a patch map for
/// least-squares critics). Multi-scale critics return one tensor per scale.
#[derive(Debug, Clone, PartialEq)]
pub enum Validity {
    Single(ArrayD<f32>),
    MultiScale(Vec<ArrayD<f32>>),
}

impl Validity {
    /// All scale tensors in order; a single tensor is one scale
    pub fn scales(&self) -> &[ArrayD<f32>] {
        match self {
            Self::Single(v) => slice::from_ref(v),
            Self::MultiScale(v) => v,
        }
    }

    pub fn num_scales(&self) -> usize {
        self.scales().len()
    }

    /// The single validity tensor, or an error naming `loss` for multi-scale outputs
    pub fn as_single(&self, loss: &'static str) -> Result<&ArrayD<f32>> {
        match self {
            Self::Single(v) => Ok(v),
            Self::MultiScale(v) => Err(Error::UnsupportedValidity { loss, scales: v.len() }),
        }
    }

    /// Check that `self` and `other` have the same scale count and shapes
    pub fn ensure_compatible(&self, other: &Validity) -> Result<()> {
        let mismatch = || Error::ValidityMismatch {
            real: self.scales().iter().flat_map(|s| s.shape().to_vec()).collect(),
            fake: other.scales().iter().flat_map(|s| s.shape().to_vec()).collect(),
        };
        if self.num_scales() != other.num_scales() {
            return Err(mismatch());
        }
        if self.scales().iter().zip(other.scales()).any(|(a, b)| a.shape() != b.shape()) {
            return Err(mismatch());
        }
        Ok(())
    }

    /// Apply `f` to every scale, keeping the container shape
    pub fn map<F>(&self, f: F) -> Validity
    where
        F: Fn(&ArrayD<f32>) -> ArrayD<f32>,
    {
        match self {
            Self::Single(v) => Self::Single(f(v)),
            Self::MultiScale(v) => Self::MultiScale(v.iter().map(f).collect()),
        }
    }

    /// Same structure filled with ones (the seed for `∇ₓ Σ D(x)`)
    pub fn ones_like(&self) -> Validity {
        self.map(|v| ArrayD::ones(v.raw_dim()))
    }

    pub fn scaled(&self, factor: f32) -> Validity {
        self.map(|v| v * factor)
    }

    pub fn is_finite(&self) -> bool {
        self.scales().iter().all(|s| s.iter().all(|x| x.is_finite()))
    }
}

impl From<ArrayD<f32>> for Validity {
    fn from(value: ArrayD<f32>) -> Self {
        Self::Single(value)
    }
}
