//! Configuration validation logic

use super::error::ValidationError;
use crate::config::schema::GanTrainConfig;
use crate::generative::LossKind;

/// Validate a training configuration
///
/// Checks:
/// - The loss variant is known
/// - Counts and batch sizes are positive
/// - Learning rates, betas and EMA settings are in range
/// - Evaluation batches fit in the evaluation set
/// - Progressive growing thresholds are strictly increasing
pub fn validate_config(cfg: &GanTrainConfig) -> Result<(), ValidationError> {
    let kind: LossKind = cfg
        .loss
        .name
        .parse()
        .map_err(|_| ValidationError::InvalidLoss(cfg.loss.name.clone()))?;

    if cfg.loss.phi <= 0.0 || cfg.loss.phi.is_nan() {
        return Err(ValidationError::InvalidPhi(cfg.loss.phi));
    }

    let counts = [
        ("n_critic", cfg.schedule.n_critic),
        ("accumulated_times", cfg.schedule.accumulated_times),
        ("g_accumulated_times", cfg.schedule.g_accumulated_times),
        ("max_epoch", cfg.schedule.max_epoch),
        ("print_freq", cfg.schedule.print_freq),
        ("dis_batch_size", cfg.data.dis_batch_size),
        ("gen_batch_size", cfg.data.gen_batch_size),
        ("img_size", cfg.data.img_size),
        ("channels", cfg.data.channels),
        ("signal_channels", cfg.data.signal_channels),
        ("signal_length", cfg.data.signal_length),
        ("num_classes", cfg.data.num_classes),
        ("num_eval_imgs", cfg.eval.num_eval_imgs),
        ("eval_batch_size", cfg.eval.eval_batch_size),
    ];
    if let Some(&(name, value)) = counts.iter().find(|(_, value)| *value == 0) {
        return Err(ValidationError::InvalidCount { name, value });
    }

    if cfg.schedule.max_iter == Some(0) {
        return Err(ValidationError::InvalidMaxIter);
    }

    for (name, value) in [("g_lr", cfg.optimizer.g_lr), ("d_lr", cfg.optimizer.d_lr)] {
        if value <= 0.0 || value > 1.0 || value.is_nan() {
            return Err(ValidationError::InvalidLearningRate { name, value });
        }
    }

    for (name, value) in [("beta1", cfg.optimizer.beta1), ("beta2", cfg.optimizer.beta2)] {
        if !(0.0..1.0).contains(&value) {
            return Err(ValidationError::InvalidBeta { name, value });
        }
    }

    if cfg.optimizer.grad_clip <= 0.0 || cfg.optimizer.grad_clip.is_nan() {
        return Err(ValidationError::InvalidGradClip(cfg.optimizer.grad_clip));
    }

    if !(0.0..=1.0).contains(&cfg.ema.beta) {
        return Err(ValidationError::InvalidEmaBeta(cfg.ema.beta));
    }
    if cfg.ema.warmup < 0.0 || cfg.ema.warmup.is_nan() {
        return Err(ValidationError::InvalidEmaWarmup(cfg.ema.warmup));
    }
    if cfg.ema.kimg <= 0.0 || cfg.ema.kimg.is_nan() {
        return Err(ValidationError::InvalidEmaKimg(cfg.ema.kimg));
    }

    if cfg.eval.eval_batch_size > cfg.eval.num_eval_imgs {
        return Err(ValidationError::EvalBatchTooLarge {
            batch: cfg.eval.eval_batch_size,
            total: cfg.eval.num_eval_imgs,
        });
    }

    if cfg.schedule.grow_steps.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ValidationError::UnsortedGrowSteps(cfg.schedule.grow_steps.clone()));
    }

    if kind == LossKind::WganGpMode {
        // the mode-seeking term splits every generated batch in half
        for size in [cfg.data.gen_batch_size, cfg.data.dis_batch_size] {
            if size % 2 != 0 {
                return Err(ValidationError::OddModeSeekingBatch(size));
            }
        }
    }

    Ok(())
}
