//! Demo command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{create_demo_batches, load_config, DemoArgs};
use crate::distributed::ProcessGroup;
use crate::eval::{
    save_samples, BinnedInceptionScore, ConditioningSource, CyclingLoader, Evaluator, PngDirectory,
};
use crate::generative::reference::{AffineGenerator, MeanPoolEncoder, QuadraticCritic};
use crate::monitor::{JsonlSink, TelemetrySink, TracingSink};
use crate::train::GanTrainer;

/// Training truncates the telemetry file; evaluation appends to it
fn telemetry_sink(args: &DemoArgs, append: bool) -> Result<Box<dyn TelemetrySink>, String> {
    match &args.telemetry {
        Some(path) => {
            let sink = if append { JsonlSink::append(path) } else { JsonlSink::create(path) };
            Ok(Box::new(sink.map_err(|e| format!("Telemetry error: {e}"))?))
        }
        None => Ok(Box::new(TracingSink)),
    }
}

pub fn run_demo(args: DemoArgs, level: LogLevel) -> Result<(), String> {
    log(level, LogLevel::Normal, &format!("eegan: demo run from {}", args.config.display()));

    let mut cfg = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    if args.seed.is_some() {
        cfg.seed = args.seed;
    }
    let seed = cfg.seed.unwrap_or(0);
    let epochs = args.epochs.unwrap_or(cfg.schedule.max_epoch);

    let data = &cfg.data;
    let batches = create_demo_batches(data, data.dis_batch_size, args.batches, seed)
        .map_err(|e| format!("Data error: {e}"))?;

    let image = (data.channels, data.img_size, data.img_size);
    let generator = AffineGenerator::new(data.signal_channels, image, seed);
    let critic = QuadraticCritic::new(image.0 * image.1 * image.2, seed.wrapping_add(1));

    let group = ProcessGroup::single();
    let telemetry = telemetry_sink(&args, false)?;
    let mut trainer = GanTrainer::new(&cfg, generator, critic, MeanPoolEncoder, &group, telemetry)
        .map_err(|e| format!("Setup error: {e}"))?;

    let result =
        trainer.train(0, epochs, |_| &batches).map_err(|e| format!("Training error: {e}"))?;

    for summary in &result.epochs {
        log(
            level,
            LogLevel::Verbose,
            &format!(
                "  epoch {}: {} iterations, {} generator steps, mean D loss {:.4}",
                summary.epoch, summary.iterations, summary.gen_steps, summary.mean_d_loss
            ),
        );
    }
    log(
        level,
        LogLevel::Normal,
        &format!(
            "Trained {} epochs: {} iterations, {} generator steps in {:.2}s",
            result.epochs.len(),
            result.global_steps,
            result.gen_steps,
            result.elapsed_secs
        ),
    );

    trainer.flush_telemetry();
    let mut evaluator = Evaluator::new(
        &cfg.eval,
        &group,
        Box::new(BinnedInceptionScore::default()),
        telemetry_sink(&args, true)?,
    );
    let mut loader = CyclingLoader::new(|| batches.iter().cloned());
    let report = trainer
        .with_averaged_generator(|generator, encoder| {
            let source = ConditioningSource::Dataset(&mut loader);
            evaluator.validate(&*generator, encoder, source, epochs)
        })
        .and_then(|report| report)
        .map_err(|e| format!("Evaluation error: {e}"))?;
    log(level, LogLevel::Normal, &format!("Validation: {report}"));

    if let Some(dir) = &cfg.eval.fid_buffer_dir {
        let mut sink = PngDirectory::create(dir).map_err(|e| format!("Sample error: {e}"))?;
        let count = trainer
            .with_averaged_generator(|generator, encoder| {
                save_samples(&*generator, encoder, &batches, epochs, &mut sink)
            })
            .and_then(|count| count)
            .map_err(|e| format!("Sample error: {e}"))?;
        log(level, LogLevel::Normal, &format!("Saved {count} samples to {}", dir.display()));
    }

    group.shutdown();
    Ok(())
}
