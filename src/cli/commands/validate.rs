//! Validate command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, GanTrainConfig, ValidateArgs};

/// Format loss configuration as a string
pub fn format_loss_info(cfg: &GanTrainConfig) -> String {
    let mut lines = vec![format!("  Loss: {}", cfg.loss.name)];
    if let Ok(kind) = cfg.loss_kind() {
        if kind.uses_gradient_penalty() {
            lines.push(format!("  Gradient penalty target (phi): {}", cfg.loss.phi));
        }
    }
    lines.join("\n")
}

/// Format update cadence as a string
pub fn format_schedule_info(cfg: &GanTrainConfig) -> String {
    let s = &cfg.schedule;
    let mut lines = vec![
        format!("  Critic updates per generator update: {}", s.n_critic),
        format!("  Critic accumulation: {}", s.accumulated_times),
        format!("  Generator accumulation: {}", s.g_accumulated_times),
        format!("  Max epoch: {}", s.max_epoch),
    ];
    if let Some(end) = cfg.decay_end_step() {
        lines.push(format!("  Linear LR decay to 0 over {end} steps"));
    }
    if !s.grow_steps.is_empty() {
        lines.push(format!("  Grow steps: {:?}", s.grow_steps));
    }
    lines.join("\n")
}

/// Format optimizer configuration as a string
pub fn format_optimizer_info(cfg: &GanTrainConfig) -> String {
    let o = &cfg.optimizer;
    [
        format!("  Optimizer: adam (beta1={}, beta2={})", o.beta1, o.beta2),
        format!("  Generator learning rate: {}", o.g_lr),
        format!("  Critic learning rate: {}", o.d_lr),
        format!("  Gradient clipping: {}", o.grad_clip),
    ]
    .join("\n")
}

/// Format data shapes as a string
pub fn format_data_info(cfg: &GanTrainConfig) -> String {
    let d = &cfg.data;
    [
        format!("  Batch size: critic {}, generator {}", d.dis_batch_size, d.gen_batch_size),
        format!("  Images: {}x{}x{}", d.channels, d.img_size, d.img_size),
        format!("  Signals: {} steps x {} electrodes", d.signal_length, d.signal_channels),
    ]
    .join("\n")
}

/// Format EMA configuration as a string
pub fn format_ema_info(cfg: &GanTrainConfig) -> String {
    if cfg.ema.warmup == 0.0 {
        format!("  EMA: fixed beta {}", cfg.ema.beta)
    } else {
        format!("  EMA: {} kimg half-life, warmup {}", cfg.ema.kimg, cfg.ema.warmup)
    }
}

/// Format evaluation configuration as a string
pub fn format_eval_info(cfg: &GanTrainConfig) -> Option<String> {
    let e = &cfg.eval;
    if e.num_eval_imgs == 0 {
        return None;
    }
    let mut lines = vec![format!(
        "  Evaluation: {} images in {} passes",
        e.num_eval_imgs,
        e.eval_iters()
    )];
    if let Some(dir) = &e.fid_buffer_dir {
        lines.push(format!("  FID buffer: {}", dir.display()));
    }
    Some(lines.join("\n"))
}

/// Print detailed configuration summary
pub fn print_detailed_summary(cfg: &GanTrainConfig) {
    println!();
    println!("Configuration Summary:");
    println!("{}", format_loss_info(cfg));
    println!();
    println!("{}", format_schedule_info(cfg));
    println!();
    println!("{}", format_data_info(cfg));
    println!();
    println!("{}", format_optimizer_info(cfg));
    println!();
    println!("{}", format_ema_info(cfg));

    if let Some(eval_info) = format_eval_info(cfg) {
        println!();
        println!("{eval_info}");
    }
}

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<(), String> {
    log(level, LogLevel::Normal, &format!("Validating config: {}", args.config.display()));

    let cfg = load_config(&args.config).map_err(|e| format!("Validation failed: {e}"))?;

    log(level, LogLevel::Normal, "Configuration is valid");

    if args.detailed && level != LogLevel::Quiet {
        print_detailed_summary(&cfg);
    }

    Ok(())
}
