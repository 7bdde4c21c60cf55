//! Property-based tests for configuration validation

use super::error::ValidationError;
use super::validator::validate_config;
use crate::config::schema::*;
use crate::generative::LossKind;
use proptest::prelude::*;

fn arb_valid_config() -> impl Strategy<Value = GanTrainConfig> {
    (
        prop::sample::select(LossKind::ALL.to_vec()),
        0.1f32..10.0,   // phi
        1usize..8,      // n_critic
        1usize..4,      // accumulated_times
        1usize..64,     // half batch
        1e-6f32..1.0,   // lr
        0.0f32..0.999,  // beta2
    )
        .prop_map(|(kind, phi, n_critic, acc, half_batch, lr, beta2)| GanTrainConfig {
            loss: LossSpec { name: kind.as_str().to_string(), phi },
            schedule: ScheduleSpec { n_critic, accumulated_times: acc, ..Default::default() },
            data: DataSpec {
                dis_batch_size: half_batch * 2,
                gen_batch_size: half_batch * 2,
                ..Default::default()
            },
            optimizer: OptimSpec { g_lr: lr, d_lr: lr, beta2, ..Default::default() },
            ..Default::default()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_valid_config_passes(cfg in arb_valid_config()) {
        prop_assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn prop_zero_n_critic_fails(cfg in arb_valid_config()) {
        let mut cfg = cfg;
        cfg.schedule.n_critic = 0;
        prop_assert!(
            matches!(
                validate_config(&cfg),
                Err(ValidationError::InvalidCount { name: "n_critic", value: 0 })
            ),
            "expected n_critic rejection"
        );
    }

    #[test]
    fn prop_negative_lr_fails(cfg in arb_valid_config(), lr in -1.0f32..=0.0) {
        let mut cfg = cfg;
        cfg.optimizer.g_lr = lr;
        prop_assert!(
            matches!(
                validate_config(&cfg),
                Err(ValidationError::InvalidLearningRate { .. })
            ),
            "expected learning rate rejection"
        );
    }
}
