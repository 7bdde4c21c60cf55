//! Generator evaluation
//!
//! - `evaluator`: [`Evaluator`] runs the generator over a fixed or cycling
//!   conditioning source and reports Inception Score (and FID when wired)
//! - `loader`: [`CyclingLoader`] restarts an exhausted data source
//! - `metrics`: metric-service traits and `u8` quantisation
//! - `samples`: PNG sample buffer for directory-based scorers
//!
//! ## Example
//!
//! ```no_run
//! use eegan::config::EvalSpec;
//! use eegan::distributed::ProcessGroup;
//! use eegan::eval::{BinnedInceptionScore, ConditioningSource, Evaluator};
//! use eegan::generative::reference::{AffineGenerator, MeanPoolEncoder};
//! use eegan::monitor::TracingSink;
//! use ndarray::Array2;
//!
//! let generator = AffineGenerator::new(8, (3, 32, 32), 0);
//! let fixed = Array2::zeros((100, 8));
//! let mut evaluator = Evaluator::new(
//!     &EvalSpec::default(),
//!     &ProcessGroup::single(),
//!     Box::new(BinnedInceptionScore::default()),
//!     Box::new(TracingSink),
//! );
//! let report =
//!     evaluator.validate(&generator, &MeanPoolEncoder, ConditioningSource::Fixed(&fixed), 0)?;
//! println!("{report}");
//! # Ok::<(), eegan::Error>(())
//! ```

mod evaluator;
mod loader;
mod metrics;
mod samples;


pub use evaluator::{save_samples, ConditioningSource, EvalReport, Evaluator};
pub use loader::{BatchSource, CyclingLoader};
pub use metrics::{to_uint8, BinnedInceptionScore, FidScorer, InceptionScorer};
pub use samples::{PngDirectory, SampleSink};
