//! Periodic generator evaluation

use ndarray::Array2;
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

use super::loader::BatchSource;
use super::metrics::{to_uint8, FidScorer, InceptionScorer};
use super::samples::{PngDirectory, SampleSink};
use crate::config::EvalSpec;
use crate::distributed::{Membership, ProcessGroup};
use crate::error::Result;
use crate::generative::{Encoder, Generator};
use crate::monitor::{RankGated, TelemetrySink};
use crate::train::Batch;

/// Where conditioning representations come from during evaluation
pub enum ConditioningSource<'a> {
    /// The same representation batch on every pass
    Fixed(&'a Array2<f32>),
    /// Fresh batches, encoded on the fly; the source must cycle
    Dataset(&'a mut dyn BatchSource),
}

/// Scores of one validation run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalReport {
    /// Validation step the scores were logged at
    pub step: u64,
    pub inception_mean: f32,
    pub inception_std: f32,
    /// Only present when a FID scorer is attached
    pub fid: Option<f32>,
    pub num_images: usize,
}

impl fmt::Display for EvalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IS {:.4} ± {:.4} over {} images",
            self.inception_mean, self.inception_std, self.num_images
        )?;
        if let Some(fid) = self.fid {
            write!(f, ", FID {fid:.4}")?;
        }
        Ok(())
    }
}

/// Runs the generator without gradients and hands its images to the
/// metric services
///
/// Scoring and telemetry happen on the primary rank only. Other ranks still
/// generate (so collective backends stay in lockstep) but report `(0, 0)`.
pub struct Evaluator {
    eval_iters: usize,
    clean_fid_buffer: bool,
    membership: Membership,
    inception: Box<dyn InceptionScorer>,
    fid: Option<(Box<dyn FidScorer>, PngDirectory)>,
    telemetry: RankGated<Box<dyn TelemetrySink>>,
    valid_global_steps: u64,
}

impl Evaluator {
    pub fn new(
        spec: &EvalSpec,
        group: &ProcessGroup,
        inception: Box<dyn InceptionScorer>,
        telemetry: Box<dyn TelemetrySink>,
    ) -> Self {
        Self {
            eval_iters: spec.eval_iters(),
            clean_fid_buffer: spec.clean_fid_buffer,
            membership: group.membership(),
            inception,
            fid: None,
            telemetry: RankGated::new(telemetry, group.membership()),
            valid_global_steps: 0,
        }
    }

    /// Write every generated image to `buffer` and score the directory
    pub fn with_fid(mut self, scorer: Box<dyn FidScorer>, buffer: PngDirectory) -> Self {
        self.fid = Some((scorer, buffer));
        self
    }

    /// Resume the validation step counter
    pub fn with_valid_global_steps(mut self, steps: u64) -> Self {
        self.valid_global_steps = steps;
        self
    }

    pub fn valid_global_steps(&self) -> u64 {
        self.valid_global_steps
    }

    pub fn eval_iters(&self) -> usize {
        self.eval_iters
    }

    /// Generate `eval_iters` batches and compute Inception Score (and FID)
    ///
    /// Call between training iterations only, typically inside
    /// `GanTrainer::with_averaged_generator`.
    pub fn validate<G, E>(
        &mut self,
        generator: &G,
        encoder: &E,
        mut source: ConditioningSource<'_>,
        epoch: usize,
    ) -> Result<EvalReport>
    where
        G: Generator + ?Sized,
        E: Encoder + ?Sized,
    {
        let primary = self.membership.is_primary();
        let mut img_list = Vec::new();

        for iter_idx in 0..self.eval_iters {
            let gen_imgs = match &mut source {
                ConditioningSource::Fixed(conditioning) => generator.forward(*conditioning, epoch),
                ConditioningSource::Dataset(batches) => {
                    let batch = batches.next_batch()?;
                    generator.forward(&encoder.represent(&batch.signals), epoch)
                }
            };
            let images = to_uint8(&gen_imgs);
            if primary {
                if let Some((_, buffer)) = &mut self.fid {
                    buffer.write(iter_idx, &images)?;
                }
            }
            img_list.extend(images);
        }

        let (inception_mean, inception_std) = if primary {
            info!(images = img_list.len(), "calculate inception score");
            self.inception.score(&img_list)?
        } else {
            (0.0, 0.0)
        };

        let fid = match (&mut self.fid, primary) {
            (Some((scorer, buffer)), true) => {
                info!("calculate fid score");
                let score = scorer.score_dir(buffer.dir())?;
                buffer.finish(self.clean_fid_buffer)?;
                if self.clean_fid_buffer {
                    *buffer = PngDirectory::create(buffer.dir())?;
                }
                Some(score)
            }
            _ => None,
        };

        let report = EvalReport {
            step: self.valid_global_steps,
            inception_mean,
            inception_std,
            fid,
            num_images: img_list.len(),
        };

        if primary {
            info!(epoch, %report, "validation finished");
            let step = self.valid_global_steps;
            self.telemetry.add_scalar("Inception_score/mean", inception_mean, step);
            self.telemetry.add_scalar("Inception_score/std", inception_std, step);
            if let Some(fid) = fid {
                self.telemetry.add_scalar("FID_score", fid, step);
            }
            self.telemetry.flush();
            self.valid_global_steps += 1;
        }

        Ok(report)
    }

    /// Inception Score per class label over one pass of `batches`
    pub fn score_by_label<G, E, I, B>(
        &mut self,
        generator: &G,
        encoder: &E,
        batches: I,
        epoch: usize,
    ) -> Result<BTreeMap<usize, (f32, f32)>>
    where
        G: Generator + ?Sized,
        E: Encoder + ?Sized,
        I: IntoIterator<Item = B>,
        B: std::borrow::Borrow<Batch>,
    {
        let mut by_label: BTreeMap<usize, Vec<_>> = BTreeMap::new();
        for batch in batches {
            let batch = batch.borrow();
            let gen_imgs = generator.forward(&encoder.represent(&batch.signals), epoch);
            for (label, image) in batch.labels.iter().zip(to_uint8(&gen_imgs)) {
                by_label.entry(*label).or_default().push(image);
            }
        }

        let mut scores = BTreeMap::new();
        for (label, images) in by_label {
            let score = self.inception.score(&images)?;
            info!(label, mean = score.0, "inception score by label");
            scores.insert(label, score);
        }
        Ok(scores)
    }
}

/// Render every batch of `batches` through `sink`, returning the image count
pub fn save_samples<G, E, I, B>(
    generator: &G,
    encoder: &E,
    batches: I,
    epoch: usize,
    sink: &mut dyn SampleSink,
) -> Result<usize>
where
    G: Generator + ?Sized,
    E: Encoder + ?Sized,
    I: IntoIterator<Item = B>,
    B: std::borrow::Borrow<Batch>,
{
    let mut count = 0;
    for (i, batch) in batches.into_iter().enumerate() {
        let gen_imgs = generator.forward(&encoder.represent(&batch.borrow().signals), epoch);
        let images = to_uint8(&gen_imgs);
        count += images.len();
        sink.write(i, &images)?;
    }
    Ok(count)
}
