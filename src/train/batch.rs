//! Batch data structure

use ndarray::{Array3, Array4, Axis};

use crate::error::{Error, Result};

/// One conditioning/target batch
///
/// Signals, labels and images share the leading batch dimension.
#[derive(Debug, Clone)]
pub struct Batch {
    /// EEG signals `(batch, time, channels)`
    pub signals: Array3<f32>,
    /// Class label per sample
    pub labels: Vec<usize>,
    /// Target images `(batch, channels, height, width)` in `[-1, 1]`
    pub images: Array4<f32>,
}

impl Batch {
    /// Create a batch, checking that all parts agree on the batch size
    pub fn new(signals: Array3<f32>, labels: Vec<usize>, images: Array4<f32>) -> Result<Self> {
        let n = signals.len_of(Axis(0));
        if images.len_of(Axis(0)) != n || labels.len() != n {
            return Err(Error::InvalidBatch(format!(
                "{n} signals, {} labels and {} images",
                labels.len(),
                images.len_of(Axis(0))
            )));
        }
        if n == 0 {
            return Err(Error::InvalidBatch("empty batch".to_string()));
        }
        Ok(Self { signals, labels, images })
    }

    /// Number of samples
    pub fn size(&self) -> usize {
        self.labels.len()
    }
}
