//! Image-quality metric services

use ndarray::{Array3, Array4, Axis};
use std::path::Path;

use crate::error::{Error, Result};

/// Inception Score service
pub trait InceptionScorer {
    /// Score `u8` HWC images, returning `(mean, std)` over splits
    fn score(&mut self, images: &[Array3<u8>]) -> Result<(f32, f32)>;
}

/// Directory-based FID service
pub trait FidScorer {
    /// Score every image stored under `dir` against the reference statistics
    fn score_dir(&mut self, dir: &Path) -> Result<f32>;
}

/// Quantise generator output in `[-1, 1]` to `u8` HWC images
///
/// `x * 127.5 + 127.5`, clamped to `[0, 255]` and truncated.
pub fn to_uint8(images: &Array4<f32>) -> Vec<Array3<u8>> {
    images
        .axis_iter(Axis(0))
        .map(|chw| {
            chw.permuted_axes([1, 2, 0]).mapv(|x| (x * 127.5 + 127.5).clamp(0.0, 255.0) as u8)
        })
        .collect()
}

/// Inception-style score with a fixed intensity classifier
///
/// Each image is soft-assigned to `bins` classes by its mean intensity and
/// the usual `exp(E[KL(p(y|x) ‖ p(y))])` is computed per split. Cheap enough
/// for demo runs and tests; real runs plug in an Inception network instead.
#[derive(Debug, Clone, Copy)]
pub struct BinnedInceptionScore {
    bins: usize,
    splits: usize,
}

impl BinnedInceptionScore {
    pub fn new(bins: usize, splits: usize) -> Self {
        Self { bins: bins.max(2), splits: splits.max(1) }
    }

    fn class_probs(&self, image: &Array3<u8>) -> Vec<f32> {
        let mean = image.iter().map(|&p| f32::from(p)).sum::<f32>() / (image.len().max(1) as f32);
        let m = mean / 255.0;
        let width = 1.0 / self.bins as f32;
        let logits: Vec<f32> = (0..self.bins)
            .map(|k| {
                let centre = (k as f32 + 0.5) * width;
                -(m - centre).powi(2) / (0.5 * width * width)
            })
            .collect();
        let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exp: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
        let total: f32 = exp.iter().sum();
        exp.into_iter().map(|e| e / total).collect()
    }
}

impl Default for BinnedInceptionScore {
    fn default() -> Self {
        Self::new(10, 10)
    }
}

impl InceptionScorer for BinnedInceptionScore {
    fn score(&mut self, images: &[Array3<u8>]) -> Result<(f32, f32)> {
        if images.is_empty() {
            return Err(Error::Metric("no images to score".to_string()));
        }

        let probs: Vec<Vec<f32>> = images.iter().map(|img| self.class_probs(img)).collect();
        let splits = self.splits.min(probs.len());
        let chunk = probs.len() / splits;

        let scores: Vec<f32> = (0..splits)
            .map(|s| {
                let part = &probs[s * chunk..(s + 1) * chunk];
                let marginal: Vec<f32> = (0..self.bins)
                    .map(|k| part.iter().map(|p| p[k]).sum::<f32>() / part.len() as f32)
                    .collect();
                let kl = part
                    .iter()
                    .map(|p| {
                        p.iter()
                            .zip(&marginal)
                            .filter(|&(&pk, _)| pk > 0.0)
                            .map(|(&pk, &qk)| pk * (pk.ln() - qk.ln()))
                            .sum::<f32>()
                    })
                    .sum::<f32>()
                    / part.len() as f32;
                kl.exp()
            })
            .collect();

        let mean = scores.iter().sum::<f32>() / splits as f32;
        let var = scores.iter().map(|s| (s - mean).powi(2)).sum::<f32>() / splits as f32;
        Ok((mean, var.sqrt()))
    }
}
