//! Training result types

/// What one call to `train_step` did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Global step the iteration ran at
    pub global_step: u64,
    /// Critic loss, already divided by `accumulated_times`
    pub d_loss: f32,
    /// Gradient penalty estimate, for losses that use one
    pub gradient_penalty: Option<f32>,
    /// Whether the critic optimizer stepped (accumulation boundary)
    pub dis_stepped: bool,
    /// Generator loss summed over its accumulation repetitions
    pub g_loss: Option<f32>,
    /// EMA decay applied after the generator step
    pub ema_beta: Option<f32>,
    /// `(generator, critic)` learning rates after scheduling
    pub lrs: Option<(f32, f32)>,
}

impl StepOutcome {
    pub fn gen_stepped(&self) -> bool {
        self.g_loss.is_some()
    }
}

/// Aggregates of one epoch
#[derive(Debug, Clone, PartialEq)]
pub struct EpochSummary {
    pub epoch: usize,
    pub iterations: usize,
    pub dis_steps: usize,
    pub gen_steps: usize,
    /// Mean of the per-iteration critic losses
    pub mean_d_loss: f32,
    pub last_g_loss: Option<f32>,
    pub last_ema_beta: Option<f32>,
    /// Global step counter after the epoch
    pub global_steps: u64,
}

/// Result of a multi-epoch run
#[derive(Debug, Clone)]
pub struct TrainResult {
    pub epochs: Vec<EpochSummary>,
    pub global_steps: u64,
    pub gen_steps: u64,
    /// Total training time in seconds
    pub elapsed_secs: f64,
}

impl TrainResult {
    pub fn final_epoch(&self) -> Option<&EpochSummary> {
        self.epochs.last()
    }
}
