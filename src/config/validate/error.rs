//! Validation error types
//!
//! Defines all validation error variants for adversarial training configs.

/// Validation error type
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error(
        "Invalid loss: {0} (must be one of: hinge, standard, lsgan, wgangp, wgangp-mode, wgangp-eps)"
    )]
    InvalidLoss(String),

    #[error("Invalid gradient penalty target: {0} (must be > 0.0)")]
    InvalidPhi(f32),

    #[error("Invalid {name}: {value} (must be > 0)")]
    InvalidCount { name: &'static str, value: usize },

    #[error("Invalid learning rate {name}: {value} (must be > 0.0 and <= 1.0)")]
    InvalidLearningRate { name: &'static str, value: f32 },

    #[error("Invalid Adam {name}: {value} (must be in [0.0, 1.0))")]
    InvalidBeta { name: &'static str, value: f32 },

    #[error("Invalid gradient clip value: {0} (must be > 0.0)")]
    InvalidGradClip(f32),

    #[error("Invalid EMA decay: {0} (must be in [0.0, 1.0])")]
    InvalidEmaBeta(f32),

    #[error("Invalid EMA warmup: {0} (must be >= 0.0)")]
    InvalidEmaWarmup(f32),

    #[error("Invalid EMA half-life: {0} kimg (must be > 0.0)")]
    InvalidEmaKimg(f32),

    #[error("Invalid LR decay length: max_iter must be > 0")]
    InvalidMaxIter,

    #[error("Evaluation batch size {batch} exceeds number of evaluation images {total}")]
    EvalBatchTooLarge { batch: usize, total: usize },

    #[error("wgangp-mode needs even batch sizes, got {0}")]
    OddModeSeekingBatch(usize),

    #[error("Invalid grow_steps: {0:?} (must be strictly increasing)")]
    UnsortedGrowSteps(Vec<u64>),
}
