//! Crate-wide error type

use crate::config::ValidationError;

/// Errors raised by the training core
///
/// Every variant is fatal for the current run: the trainer returns it before
/// mutating any optimizer or EMA state, and the caller is expected to abort.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "Unknown loss variant: {0} (must be one of: hinge, standard, lsgan, wgangp, wgangp-mode, wgangp-eps)"
    )]
    UnknownLoss(String),

    #[error("Generated images {fake:?} do not match target images {real:?}")]
    ShapeMismatch { fake: Vec<usize>, real: Vec<usize> },

    #[error("Validity shape mismatch: real {real:?}, fake {fake:?}")]
    ValidityMismatch { real: Vec<usize>, fake: Vec<usize> },

    #[error("Loss {loss} expects a single validity tensor, got {scales} scales")]
    UnsupportedValidity { loss: &'static str, scales: usize },

    #[error("Invalid learning rate decay: {0}")]
    InvalidSchedule(String),

    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    #[error("Parameter layout mismatch: expected {expected} values, got {actual}")]
    ParameterMismatch { expected: usize, actual: usize },

    #[error("Data source yielded no batches")]
    EmptyDataset,

    #[error("Invalid process group: rank {rank} with world size {world_size}")]
    InvalidProcessGroup { rank: usize, world_size: usize },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid config: {0}")]
    Validation(#[from] ValidationError),

    #[error("Metric service error: {0}")]
    Metric(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
