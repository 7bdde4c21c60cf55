//! eegan: adversarial training loop for EEG-conditioned image generators
//!
//! A frozen encoder turns EEG recordings into conditioning vectors; a
//! generator maps them to images and a critic scores real against generated
//! images. This crate owns the training step around those networks:
//!
//! - [`train`]: the [`GanTrainer`](train::GanTrainer) coordinator with
//!   critic/generator cadence and gradient accumulation
//! - [`generative`]: loss variants, gradient penalty, EMA shadow weights and
//!   the collaborator traits networks implement
//! - [`optim`]: Adam, SGD, gradient clipping and linear LR decay
//! - [`eval`]: Inception Score / FID driver and sample buffers
//! - [`monitor`]: scalar telemetry sinks
//! - [`config`]: YAML configuration, validation and CLI arguments
//!
//! # Example
//!
//! ```no_run
//! use eegan::config::{create_demo_batches, GanTrainConfig};
//! use eegan::distributed::ProcessGroup;
//! use eegan::generative::reference::{AffineGenerator, MeanPoolEncoder, QuadraticCritic};
//! use eegan::monitor::TracingSink;
//! use eegan::train::GanTrainer;
//!
//! let cfg = GanTrainConfig::default();
//! let batches = create_demo_batches(&cfg.data, cfg.data.dis_batch_size, 8, 0)?;
//! let image = (cfg.data.channels, cfg.data.img_size, cfg.data.img_size);
//!
//! let group = ProcessGroup::init(0, 1)?;
//! let mut trainer = GanTrainer::new(
//!     &cfg,
//!     AffineGenerator::new(cfg.data.signal_channels, image, 0),
//!     QuadraticCritic::new(image.0 * image.1 * image.2, 1),
//!     MeanPoolEncoder,
//!     &group,
//!     Box::new(TracingSink),
//! )?;
//! let result = trainer.train(0, 2, |_| &batches)?;
//! println!("{} generator steps", result.gen_steps);
//! group.shutdown();
//! # Ok::<(), eegan::Error>(())
//! ```

pub mod autograd;
pub mod cli;
pub mod config;
pub mod distributed;
pub mod error;
pub mod eval;
pub mod generative;
pub mod monitor;
pub mod optim;
pub mod train;

pub use autograd::Tensor;
pub use error::{Error, Result};
