//! Declarative YAML configuration
//!
//! - [`GanTrainConfig`]: loss, schedule, data shapes, optimizers, EMA, evaluation
//! - [`load_config`] / [`validate_config`]: read and check a config file
//! - [`Cli`]: command-line arguments for the `eegan` binary
//!
//! # Example
//!
//! ```yaml
//! loss:
//!   name: wgangp-eps
//!   phi: 1.0
//! schedule:
//!   n_critic: 5
//!   accumulated_times: 1
//!   max_iter: 500000
//! optimizer:
//!   g_lr: 0.0001
//!   d_lr: 0.0001
//!   beta1: 0.0
//!   beta2: 0.99
//! ema:
//!   kimg: 500
//!   warmup: 0.1
//! ```

mod args;
mod demo;
mod loader;
mod schema;
mod validate;

pub use args::{parse_args, Cli, Command, DemoArgs, InfoArgs, OutputFormat, ValidateArgs};
pub use demo::create_demo_batches;
pub use loader::{load_config, parse_config};
pub use schema::{
    DataSpec, EmaSpec, EvalSpec, GanTrainConfig, LossSpec, OptimSpec, ScheduleSpec,
};
pub use validate::{validate_config, ValidationError};
