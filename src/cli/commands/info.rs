//! Info command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, InfoArgs, OutputFormat};

pub fn run_info(args: InfoArgs, level: LogLevel) -> Result<(), String> {
    let cfg = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;

    match args.format {
        OutputFormat::Text => {
            log(level, LogLevel::Normal, "Configuration Info:");
            println!();
            println!("Loss: {} (phi={})", cfg.loss.name, cfg.loss.phi);
            println!(
                "Cadence: n_critic={}, accumulated_times={}, g_accumulated_times={}",
                cfg.schedule.n_critic,
                cfg.schedule.accumulated_times,
                cfg.schedule.g_accumulated_times
            );
            println!("Optimizer: adam (g_lr={}, d_lr={})", cfg.optimizer.g_lr, cfg.optimizer.d_lr);
            println!("Epochs: {}", cfg.schedule.max_epoch);
            println!(
                "Batch size: critic {}, generator {}",
                cfg.data.dis_batch_size, cfg.data.gen_batch_size
            );

            if cfg.schedule.max_iter.is_some() {
                println!("LR decay: enabled");
            }
            if cfg.ema.warmup > 0.0 {
                println!("EMA warmup: enabled");
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&cfg)
                .map_err(|e| format!("JSON serialization error: {e}"))?;
            println!("{json}");
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&cfg)
                .map_err(|e| format!("YAML serialization error: {e}"))?;
            println!("{yaml}");
        }
    }

    Ok(())
}
