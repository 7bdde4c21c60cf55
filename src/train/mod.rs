//! Adversarial training loop
//!
//! - [`Batch`]: conditioning signals, labels and target images
//! - [`GanTrainer`]: alternating critic/generator updates with gradient
//!   accumulation, clipping, LR decay and EMA tracking
//! - [`cur_stage`]: progressive-growing stage for a global step
//!
//! # Example
//!
//! ```no_run
//! use eegan::config::load_config;
//! use eegan::distributed::ProcessGroup;
//! use eegan::generative::reference::{AffineGenerator, MeanPoolEncoder, QuadraticCritic};
//! use eegan::monitor::TracingSink;
//! use eegan::train::{Batch, GanTrainer};
//!
//! let cfg = load_config("gan.yaml")?;
//! let group = ProcessGroup::single();
//! let image = (cfg.data.channels, cfg.data.img_size, cfg.data.img_size);
//! let generator = AffineGenerator::new(cfg.data.signal_channels, image, 0);
//! let critic = QuadraticCritic::new(image.0 * image.1 * image.2, 1);
//!
//! let mut trainer =
//!     GanTrainer::new(&cfg, generator, critic, MeanPoolEncoder, &group, Box::new(TracingSink))?;
//!
//! let batches: Vec<Batch> = vec![];
//! for epoch in 0..cfg.schedule.max_epoch {
//!     let summary = trainer.train_epoch(&batches, epoch)?;
//!     println!("epoch {epoch}: d_loss={:.4}", summary.mean_d_loss);
//! }
//! # Ok::<(), eegan::Error>(())
//! ```

mod batch;
mod gan_trainer;
mod stage;

pub use batch::Batch;
pub use gan_trainer::{EpochSummary, GanTrainer, StepOutcome, TrainResult, TrainState};
pub use stage::cur_stage;
