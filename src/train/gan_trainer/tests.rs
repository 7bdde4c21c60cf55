//! Tests for the adversarial training coordinator.

use super::*;
use crate::config::GanTrainConfig;
use crate::distributed::ProcessGroup;
use crate::error::Error;
use crate::generative::reference::{AffineGenerator, MeanPoolEncoder, QuadraticCritic};
use crate::generative::{Critic, Encoder, Generator, LossKind};
use crate::monitor::MemorySink;
use crate::optim::SGD;
use crate::train::Batch;
use crate::Tensor;
use approx::assert_abs_diff_eq;
use ndarray::{Array1, Array2, Array3, Array4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

type TestTrainer = GanTrainer<AffineGenerator, QuadraticCritic, MeanPoolEncoder>;

const SIGNAL_CHANNELS: usize = 3;
const IMAGE: (usize, usize, usize) = (1, 2, 2);

fn small_config(loss: &str) -> GanTrainConfig {
    let mut cfg = GanTrainConfig::default();
    cfg.loss.name = loss.to_string();
    cfg.data.dis_batch_size = 4;
    cfg.data.gen_batch_size = 4;
    cfg.data.img_size = 2;
    cfg.data.channels = 1;
    cfg.data.signal_channels = SIGNAL_CHANNELS;
    cfg.data.signal_length = 5;
    cfg.eval.num_eval_imgs = 8;
    cfg.eval.eval_batch_size = 4;
    cfg.optimizer.g_lr = 0.05;
    cfg.optimizer.d_lr = 0.05;
    cfg.seed = Some(7);
    cfg
}

fn batches(count: usize, size: usize, seed: u64) -> Vec<Batch> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let signals = Array3::from_shape_fn((size, 5, SIGNAL_CHANNELS), |_| {
                rng.random::<f32>() * 2.0 - 1.0
            });
            let images = Array4::from_shape_fn((size, IMAGE.0, IMAGE.1, IMAGE.2), |_| {
                rng.random::<f32>() * 2.0 - 1.0
            });
            Batch::new(signals, (0..size).map(|i| i % 2).collect(), images).unwrap()
        })
        .collect()
}

fn build_with_sink(cfg: &GanTrainConfig, sink: MemorySink, group: &ProcessGroup) -> TestTrainer {
    let generator = AffineGenerator::new(SIGNAL_CHANNELS, IMAGE, 1);
    let critic = QuadraticCritic::new(IMAGE.0 * IMAGE.1 * IMAGE.2, 2);
    GanTrainer::new(cfg, generator, critic, MeanPoolEncoder, group, Box::new(sink)).unwrap()
}

fn build(cfg: &GanTrainConfig) -> TestTrainer {
    build_with_sink(cfg, MemorySink::new(), &ProcessGroup::single())
}

fn build_sgd(cfg: &GanTrainConfig) -> TestTrainer {
    build(cfg).with_optimizers(Box::new(SGD::new(0.05, 0.0)), Box::new(SGD::new(0.05, 0.0)))
}

fn snapshot(params: &[Tensor]) -> Vec<Array1<f32>> {
    params.iter().map(|p| p.data().clone()).collect()
}

fn critic_params(trainer: &TestTrainer) -> Vec<Array1<f32>> {
    snapshot(trainer.critic().parameters())
}

fn generator_params(trainer: &TestTrainer) -> Vec<Array1<f32>> {
    snapshot(trainer.generator().parameters())
}

#[test]
fn test_unknown_loss_fails_before_training() {
    let cfg = small_config("wasserstein");
    let generator = AffineGenerator::new(SIGNAL_CHANNELS, IMAGE, 1);
    let critic = QuadraticCritic::new(4, 2);
    let result = GanTrainer::new(
        &cfg,
        generator,
        critic,
        MeanPoolEncoder,
        &ProcessGroup::single(),
        Box::new(MemorySink::new()),
    );
    assert!(matches!(result, Err(Error::Validation(_))));
}

#[test]
fn test_accumulation_window_steps_on_boundary_only() {
    let mut cfg = small_config("wgangp");
    cfg.schedule.accumulated_times = 2;
    let mut trainer = build_sgd(&cfg);
    let data = batches(2, 4, 11);

    let before = critic_params(&trainer);
    let first = trainer.train_step(0, &data[0], 0).unwrap();
    assert!(!first.dis_stepped);
    assert_eq!(critic_params(&trainer), before);
    // gradients persist into the next iteration
    assert!(trainer.critic().parameters().iter().all(|p| p.grad().is_some()));

    let second = trainer.train_step(1, &data[1], 0).unwrap();
    assert!(second.dis_stepped);
    assert_ne!(critic_params(&trainer), before);
    assert!(trainer.critic().parameters().iter().all(|p| p.grad().is_none()));
}

#[test]
fn test_critic_updates_iff_boundary() {
    for acc in 1..=3usize {
        let mut cfg = small_config("hinge");
        cfg.schedule.accumulated_times = acc;
        let mut trainer = build_sgd(&cfg);

        for (iter_idx, batch) in batches(7, 4, 3).iter().enumerate() {
            let outcome = trainer.train_step(iter_idx, batch, 0).unwrap();
            let boundary = (iter_idx + 1) % acc == 0;
            assert_eq!(outcome.dis_stepped, boundary, "acc={acc} iter={iter_idx}");
        }
    }
}

#[test]
fn test_generator_gating() {
    let mut cfg = small_config("wgangp-eps");
    cfg.schedule.n_critic = 3;
    let mut trainer = build_sgd(&cfg);

    for (iter_idx, batch) in batches(7, 4, 5).iter().enumerate() {
        let before = generator_params(&trainer);
        let outcome = trainer.train_step(iter_idx, batch, 0).unwrap();
        let expected = outcome.global_step % 3 == 0;

        assert_eq!(outcome.gen_stepped(), expected, "global_step={}", outcome.global_step);
        assert_eq!(generator_params(&trainer) != before, expected);
    }
    assert_eq!(trainer.state().gen_steps, 3);
    assert_eq!(trainer.global_steps(), 7);
}

#[test]
fn test_generator_accumulation_matches_single_pass() {
    // a deterministic generator sees the same batch every repetition, so
    // g_acc passes scaled by 1/g_acc add up to one unscaled pass
    for loss in ["hinge", "wgangp-mode"] {
        let mut once_cfg = small_config(loss);
        once_cfg.optimizer.grad_clip = 1e3;
        let mut thrice_cfg = once_cfg.clone();
        thrice_cfg.schedule.g_accumulated_times = 3;

        let mut once = build_sgd(&once_cfg);
        let mut thrice = build_sgd(&thrice_cfg);
        let data = batches(1, 4, 21);

        let a = once.train_step(0, &data[0], 0).unwrap();
        let b = thrice.train_step(0, &data[0], 0).unwrap();

        assert_abs_diff_eq!(a.g_loss.unwrap(), b.g_loss.unwrap(), epsilon = 1e-5);
        for (x, y) in generator_params(&once).iter().zip(generator_params(&thrice).iter()) {
            for (p, q) in x.iter().zip(y.iter()) {
                assert_abs_diff_eq!(*p, *q, epsilon = 1e-5);
            }
        }
        assert_eq!(thrice.state().gen_steps, 1);
        assert!(thrice.generator().parameters().iter().all(|p| p.grad().is_none()));
    }
}

#[test]
fn test_stage_follows_grow_steps() {
    let mut cfg = small_config("hinge");
    cfg.schedule.grow_steps = vec![2, 4];
    let mut trainer = build(&cfg);

    let mut stages = vec![trainer.stage()];
    for (iter_idx, batch) in batches(5, 4, 4).iter().enumerate() {
        trainer.train_step(iter_idx, batch, 0).unwrap();
        stages.push(trainer.stage());
    }
    assert_eq!(stages, vec![0, 0, 1, 1, 2, 2]);
}

#[test]
fn test_generator_period_includes_accumulation() {
    let mut cfg = small_config("lsgan");
    cfg.schedule.n_critic = 2;
    cfg.schedule.accumulated_times = 2;
    let mut trainer = build(&cfg);

    let gated: Vec<bool> = batches(9, 4, 8)
        .iter()
        .enumerate()
        .map(|(i, b)| trainer.train_step(i, b, 0).unwrap().gen_stepped())
        .collect();
    assert_eq!(gated, vec![true, false, false, false, true, false, false, false, true]);
}

#[test]
fn test_generator_step_leaves_critic_gradients_alone() {
    let mut cfg = small_config("hinge");
    cfg.schedule.accumulated_times = 2;
    let mut trainer = build_sgd(&cfg);
    let data = batches(1, 4, 9);

    // iteration 0 is not a boundary but runs the generator step
    let outcome = trainer.train_step(0, &data[0], 0).unwrap();
    assert!(outcome.gen_stepped());

    // critic gradients equal those of the critic loss alone
    let mut reference = build_sgd(&cfg);
    let conditioning = reference.encoder().represent(&data[0].signals);
    let fake = reference.generator().forward(&conditioning, 0);
    let real_v = reference.critic().forward(&data[0].images);
    let fake_v = reference.critic().forward(&fake);
    let loss = LossKind::Hinge
        .build(1.0)
        .discriminator_loss(&real_v, &fake_v, None)
        .unwrap()
        .scaled(0.5);
    reference.critic.backward(&data[0].images, &loss.grad_real);
    reference.critic.backward(&fake, &loss.grad_fake);

    for (a, b) in trainer.critic().parameters().iter().zip(reference.critic().parameters()) {
        let (ga, gb) = (a.grad().unwrap(), b.grad().unwrap());
        for (x, y) in ga.iter().zip(gb.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-6);
        }
    }
}

#[test]
fn test_shape_mismatch_is_fatal_and_leaves_state() {
    let cfg = small_config("hinge");
    let generator = AffineGenerator::new(SIGNAL_CHANNELS, (1, 3, 3), 1);
    let critic = QuadraticCritic::new(4, 2);
    let mut trainer = GanTrainer::new(
        &cfg,
        generator,
        critic,
        MeanPoolEncoder,
        &ProcessGroup::single(),
        Box::new(MemorySink::new()),
    )
    .unwrap();

    let err = trainer.train_step(0, &batches(1, 4, 1)[0], 0).unwrap_err();
    match err {
        Error::ShapeMismatch { fake, real } => {
            assert_eq!(fake, vec![4, 1, 3, 3]);
            assert_eq!(real, vec![4, 1, 2, 2]);
        }
        other => panic!("unexpected error {other}"),
    }
    assert_eq!(trainer.global_steps(), 0);
    assert!(trainer.critic().parameters().iter().all(|p| p.grad().is_none()));
}

#[test]
fn test_mode_seeking_rejects_odd_batch() {
    let cfg = small_config("wgangp-mode");
    let mut trainer = build(&cfg);
    let result = trainer.train_step(0, &batches(1, 3, 1)[0], 0);
    assert!(matches!(result, Err(Error::InvalidBatch(_))));
}

#[test]
fn test_every_loss_variant_trains_finitely() {
    for kind in LossKind::ALL {
        let mut trainer = build(&small_config(kind.as_str()));
        assert_eq!(trainer.loss_kind(), kind);
        let summary = trainer.train_epoch(batches(4, 4, 21), 0).unwrap();

        assert!(summary.mean_d_loss.is_finite(), "{kind}");
        assert!(summary.last_g_loss.is_some_and(f32::is_finite), "{kind}");
        assert_eq!(
            trainer.state().gen_steps as usize,
            summary.gen_steps,
            "{kind} generator steps"
        );
        assert!(generator_params(&trainer).iter().all(|p| p.iter().all(|x| x.is_finite())));
    }
}

#[test]
fn test_penalty_reported_only_for_wasserstein_losses() {
    for kind in LossKind::ALL {
        let mut trainer = build(&small_config(kind.as_str()));
        let outcome = trainer.train_step(0, &batches(1, 4, 2)[0], 0).unwrap();
        assert_eq!(outcome.gradient_penalty.is_some(), kind.uses_gradient_penalty(), "{kind}");
        if let Some(gp) = outcome.gradient_penalty {
            assert!(gp >= 0.0);
        }
    }
}

#[test]
fn test_lr_decay_follows_global_steps() {
    let mut cfg = small_config("hinge");
    cfg.schedule.max_iter = Some(4);
    cfg.optimizer.g_lr = 0.08;
    cfg.optimizer.d_lr = 0.04;
    let mut trainer = build(&cfg);
    let data = batches(3, 4, 4);

    let first = trainer.train_step(0, &data[0], 0).unwrap();
    // step 0 is the window start: rate returned, optimizer untouched
    assert_eq!(first.lrs, Some((0.08, 0.04)));

    trainer.train_step(1, &data[1], 0).unwrap();
    let third = trainer.train_step(2, &data[2], 0).unwrap();
    let (g_lr, d_lr) = third.lrs.unwrap();
    assert_abs_diff_eq!(g_lr, 0.04, epsilon = 1e-7);
    assert_abs_diff_eq!(d_lr, 0.02, epsilon = 1e-7);
    assert_abs_diff_eq!(trainer.gen_lr(), 0.04, epsilon = 1e-7);
    assert_abs_diff_eq!(trainer.dis_lr(), 0.02, epsilon = 1e-7);
}

#[test]
fn test_no_decay_without_max_iter() {
    let mut trainer = build(&small_config("hinge"));
    let outcome = trainer.train_step(0, &batches(1, 4, 4)[0], 0).unwrap();
    assert_eq!(outcome.lrs, None);
    assert_eq!(trainer.gen_lr(), 0.05);
}

#[test]
fn test_ema_with_zero_beta_tracks_live_weights() {
    let mut cfg = small_config("hinge");
    cfg.ema.beta = 0.0;
    let mut trainer = build(&cfg);

    let outcome = trainer.train_step(0, &batches(1, 4, 6)[0], 0).unwrap();
    assert_eq!(outcome.ema_beta, Some(0.0));
    assert_eq!(trainer.ema().shadow(), generator_params(&trainer).as_slice());
}

#[test]
fn test_ema_with_unit_beta_keeps_initial_weights() {
    let mut cfg = small_config("hinge");
    cfg.ema.beta = 1.0;
    let mut trainer = build(&cfg);
    let initial = generator_params(&trainer);

    trainer.train_epoch(batches(3, 4, 6), 0).unwrap();
    assert_eq!(trainer.ema().shadow(), initial.as_slice());
    assert_ne!(generator_params(&trainer), initial);
}

#[test]
fn test_averaged_generator_is_restored() {
    let mut cfg = small_config("hinge");
    cfg.ema.beta = 1.0;
    let mut trainer = build(&cfg);
    let initial = generator_params(&trainer);
    trainer.train_epoch(batches(2, 4, 6), 0).unwrap();
    let live = generator_params(&trainer);

    let seen = trainer.with_averaged_generator(|g, _| snapshot(g.parameters())).unwrap();
    assert_eq!(seen, initial);
    assert_eq!(generator_params(&trainer), live);
}

#[test]
fn test_telemetry_on_primary_rank() {
    let mut cfg = small_config("wgangp");
    cfg.schedule.max_iter = Some(10);
    let sink = MemorySink::new();
    let mut trainer = build_with_sink(&cfg, sink.clone(), &ProcessGroup::single());

    trainer.train_epoch(batches(2, 4, 12), 0).unwrap();

    assert_eq!(sink.series("d_loss").len(), 2);
    assert_eq!(sink.series("g_loss").len(), 2);
    assert_eq!(sink.series("LR/g_lr").len(), 2);
    assert_eq!(sink.series("LR/d_lr")[1].0, 1);
}

#[test]
fn test_telemetry_skipped_on_secondary_rank() {
    let sink = MemorySink::new();
    let group = ProcessGroup::init(1, 2).unwrap();
    let mut trainer = build_with_sink(&small_config("hinge"), sink.clone(), &group);
    group.shutdown();

    // the trainer keeps its own copy of rank and world size
    assert_eq!(trainer.membership().rank(), 1);
    assert_eq!(trainer.membership().world_size(), 2);
    trainer.train_epoch(batches(2, 4, 12), 0).unwrap();
    assert!(sink.is_empty());
}

#[test]
fn test_epoch_summary_counts() {
    let mut cfg = small_config("hinge");
    cfg.schedule.accumulated_times = 2;
    let mut trainer = build(&cfg);

    let summary = trainer.train_epoch(batches(5, 4, 14), 3).unwrap();
    assert_eq!(summary.epoch, 3);
    assert_eq!(summary.iterations, 5);
    assert_eq!(summary.dis_steps, 2);
    // global steps 0, 2, 4
    assert_eq!(summary.gen_steps, 3);
    assert_eq!(summary.global_steps, 5);
}

#[test]
fn test_epoch_discards_partial_window() {
    let mut cfg = small_config("hinge");
    cfg.schedule.accumulated_times = 2;
    let mut trainer = build(&cfg);

    // odd batch count leaves gradients from the last iteration behind
    trainer.train_epoch(batches(3, 4, 15), 0).unwrap();
    assert!(trainer.critic().parameters().iter().all(|p| p.grad().is_some()));

    let before = critic_params(&trainer);
    let first = trainer.train_step(0, &batches(1, 4, 16)[0], 1).unwrap();
    assert!(!first.dis_stepped);
    assert_eq!(critic_params(&trainer), before);

    trainer.train_epoch(Vec::<Batch>::new(), 1).unwrap();
    assert!(trainer.critic().parameters().iter().all(|p| p.grad().is_none()));
}

#[test]
fn test_train_runs_epochs() {
    let mut trainer = build(&small_config("standard"));
    let result = trainer.train(0, 3, |epoch| batches(2, 4, epoch as u64)).unwrap();

    assert_eq!(result.epochs.len(), 3);
    assert_eq!(result.global_steps, 6);
    assert_eq!(result.final_epoch().map(|s| s.epoch), Some(2));
}

#[test]
fn test_resume_state() {
    let state = TrainState { global_steps: 10, gen_steps: 4 };
    let trainer = build(&small_config("hinge")).with_state(state);
    assert_eq!(trainer.global_steps(), 10);
}

#[test]
fn test_restored_shadow_drives_averaged_generator() {
    let mut trainer = build(&small_config("hinge"));
    let restored: Vec<Array1<f32>> =
        generator_params(&trainer).iter().map(|p| p.mapv(|_| 0.0)).collect();
    trainer.ema_mut().load_shadow(restored).unwrap();

    let conditioning = Array2::from_elem((2, SIGNAL_CHANNELS), 0.5);
    let averaged = trainer
        .with_averaged_generator(|generator, _| generator.forward(&conditioning, 0))
        .unwrap();
    // zero weights and bias give tanh(0) everywhere
    assert!(averaged.iter().all(|&v| v == 0.0));
    assert!(generator_params(&trainer).iter().any(|p| p.iter().any(|&v| v != 0.0)));
}
