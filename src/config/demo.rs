//! Synthetic batches for demo runs

use ndarray::{Array3, Array4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::schema::DataSpec;
use crate::error::Result;
use crate::train::Batch;

/// Create `num_batches` synthetic EEG/image batches of `batch_size` samples
///
/// Each label drives a sine of its own frequency on every electrode and a
/// flat image whose intensity is spread over `[-1, 1]` by label, so the
/// conditioning carries information about the target. Small uniform noise
/// is added to both.
pub fn create_demo_batches(
    data: &DataSpec,
    batch_size: usize,
    num_batches: usize,
    seed: u64,
) -> Result<Vec<Batch>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let classes = data.num_classes.max(1);
    let side = data.img_size;

    (0..num_batches)
        .map(|_| {
            let labels: Vec<usize> =
                (0..batch_size).map(|_| rng.random_range(0..classes)).collect();

            let signals = Array3::from_shape_fn(
                (batch_size, data.signal_length, data.signal_channels),
                |(i, t, c)| {
                    let freq = (labels[i] + 1) as f32 / data.signal_length.max(1) as f32;
                    let phase = c as f32 * 0.1;
                    (std::f32::consts::TAU * freq * t as f32 + phase).sin()
                },
            ) + Array3::from_shape_simple_fn(
                (batch_size, data.signal_length, data.signal_channels),
                || (rng.random::<f32>() - 0.5) * 0.1,
            );

            let images = Array4::from_shape_fn((batch_size, data.channels, side, side), |(i, ..)| {
                label_intensity(labels[i], classes)
            })
            .mapv(|x| x + (rng.random::<f32>() - 0.5) * 0.05)
            .mapv(|x| x.clamp(-1.0, 1.0));

            Batch::new(signals, labels, images)
        })
        .collect()
}

fn label_intensity(label: usize, classes: usize) -> f32 {
    if classes == 1 {
        0.0
    } else {
        2.0 * label as f32 / (classes - 1) as f32 - 1.0
    }
}
