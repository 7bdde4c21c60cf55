//! Tests for learning rate schedulers

use super::*;
use crate::optim::{Optimizer, SGD};
use approx::assert_abs_diff_eq;
use proptest::prelude::*;

#[test]
fn test_linear_decay_midpoint() {
    let mut optimizer = SGD::new(0.001, 0.0);
    let mut scheduler = LinearLrDecay::new(0.001, 0.0, 0, 1000).unwrap();

    let lr = scheduler.step(&mut optimizer, 500);

    assert_abs_diff_eq!(lr, 0.0005, epsilon = 1e-9);
    assert_abs_diff_eq!(optimizer.lr(), 0.0005, epsilon = 1e-9);
}

#[test]
fn test_linear_decay_endpoints() {
    let scheduler = LinearLrDecay::new(0.01, 0.001, 100, 200).unwrap();

    assert_eq!(scheduler.lr_at(100), 0.01);
    assert_eq!(scheduler.lr_at(200), 0.001);
    assert_eq!(scheduler.lr_at(0), 0.01);
    assert_eq!(scheduler.lr_at(10_000), 0.001);
}

#[test]
fn test_linear_decay_only_writes_inside_window() {
    let mut optimizer = SGD::new(0.5, 0.0);
    let mut scheduler = LinearLrDecay::new(0.01, 0.0, 10, 20).unwrap();

    // Before the window: returned but not written
    assert_eq!(scheduler.step(&mut optimizer, 5), 0.01);
    assert_eq!(optimizer.lr(), 0.5);

    scheduler.step(&mut optimizer, 15);
    assert_abs_diff_eq!(optimizer.lr(), 0.005, epsilon = 1e-7);

    // After the window the optimizer keeps its last written rate
    assert_eq!(scheduler.step(&mut optimizer, 25), 0.0);
    assert_abs_diff_eq!(optimizer.lr(), 0.005, epsilon = 1e-7);
}

#[test]
fn test_linear_decay_rejects_increasing_schedule() {
    assert!(LinearLrDecay::new(0.001, 0.001, 0, 10).is_err());
    assert!(LinearLrDecay::new(0.0001, 0.001, 0, 10).is_err());
}

#[test]
fn test_linear_decay_rejects_empty_window() {
    assert!(LinearLrDecay::new(0.001, 0.0, 10, 10).is_err());
    assert!(LinearLrDecay::new(0.001, 0.0, 10, 5).is_err());
}

proptest! {
    #[test]
    fn prop_linear_decay_is_linear_inside_window(
        start_lr in 1e-4f32..1e-1,
        ratio in 0.0f32..0.9,
        decay_start in 0u64..1000,
        span in 2u64..10_000,
        frac in 0.0f64..1.0,
    ) {
        let end_lr = start_lr * ratio;
        let decay_end = decay_start + span;
        let scheduler = LinearLrDecay::new(start_lr, end_lr, decay_start, decay_end).unwrap();

        let t = decay_start + 1 + ((span - 2) as f64 * frac) as u64;
        let expected = start_lr - (start_lr - end_lr) * (t - decay_start) as f32 / span as f32;
        prop_assert!((scheduler.lr_at(t) - expected).abs() <= 1e-6 * start_lr.max(1.0));

        // Monotone non-increasing across the window
        prop_assert!(scheduler.lr_at(t) <= start_lr + 1e-9);
        prop_assert!(scheduler.lr_at(t) >= end_lr - 1e-9);
        prop_assert!(scheduler.lr_at(t + 1) <= scheduler.lr_at(t) + 1e-9);
    }
}
