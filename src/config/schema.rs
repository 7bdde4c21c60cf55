//! YAML schema for adversarial training runs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::generative::{EmaDecay, LossKind};

/// Complete training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GanTrainConfig {
    #[serde(default)]
    pub loss: LossSpec,

    #[serde(default)]
    pub schedule: ScheduleSpec,

    #[serde(default)]
    pub data: DataSpec,

    #[serde(default)]
    pub optimizer: OptimSpec,

    #[serde(default)]
    pub ema: EmaSpec,

    #[serde(default)]
    pub eval: EvalSpec,

    /// Seed for interpolation coefficients and demo data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl GanTrainConfig {
    /// Parsed loss variant
    pub fn loss_kind(&self) -> Result<LossKind> {
        self.loss.name.parse()
    }

    /// EMA decay law for a group of `world_size` processes
    ///
    /// A zero warmup selects the fixed decay constant.
    pub fn ema_decay(&self, world_size: usize) -> EmaDecay {
        if self.ema.warmup == 0.0 {
            EmaDecay::Fixed(self.ema.beta)
        } else {
            EmaDecay::Warmup {
                kimg: self.ema.kimg,
                warmup: self.ema.warmup,
                images_per_step: (self.data.dis_batch_size * world_size) as f32,
            }
        }
    }

    /// Global step at which linear LR decay reaches zero, if decay is enabled
    pub fn decay_end_step(&self) -> Option<u64> {
        self.schedule.max_iter.map(|iters| iters * self.schedule.n_critic as u64)
    }
}

/// Loss variant and gradient-penalty target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossSpec {
    /// hinge | standard | lsgan | wgangp | wgangp-mode | wgangp-eps
    #[serde(default = "default_loss")]
    pub name: String,

    /// Target gradient norm of the penalty
    #[serde(default = "default_phi")]
    pub phi: f32,
}

impl Default for LossSpec {
    fn default() -> Self {
        Self { name: default_loss(), phi: default_phi() }
    }
}

fn default_loss() -> String {
    "wgangp-eps".to_string()
}

fn default_phi() -> f32 {
    1.0
}

/// Update cadence and run length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSpec {
    /// Critic updates per generator update
    #[serde(default = "default_one")]
    pub n_critic: usize,

    /// Critic gradient accumulation window
    #[serde(default = "default_one")]
    pub accumulated_times: usize,

    /// Generator gradient accumulation repetitions
    #[serde(default = "default_one")]
    pub g_accumulated_times: usize,

    #[serde(default = "default_max_epoch")]
    pub max_epoch: usize,

    /// Enables linear LR decay to zero over `max_iter · n_critic` steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iter: Option<u64>,

    #[serde(default = "default_print_freq")]
    pub print_freq: usize,

    /// Global steps at which progressive generators enter their next stage
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grow_steps: Vec<u64>,
}

impl Default for ScheduleSpec {
    fn default() -> Self {
        Self {
            n_critic: 1,
            accumulated_times: 1,
            g_accumulated_times: 1,
            max_epoch: default_max_epoch(),
            max_iter: None,
            print_freq: default_print_freq(),
            grow_steps: Vec::new(),
        }
    }
}

fn default_one() -> usize {
    1
}

fn default_max_epoch() -> usize {
    200
}

fn default_print_freq() -> usize {
    100
}

/// Batch sizes and tensor shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSpec {
    #[serde(default = "default_dis_batch_size")]
    pub dis_batch_size: usize,

    #[serde(default = "default_gen_batch_size")]
    pub gen_batch_size: usize,

    /// Square image side length
    #[serde(default = "default_img_size")]
    pub img_size: usize,

    #[serde(default = "default_channels")]
    pub channels: usize,

    /// EEG electrodes per sample
    #[serde(default = "default_signal_channels")]
    pub signal_channels: usize,

    /// EEG time steps per sample
    #[serde(default = "default_signal_length")]
    pub signal_length: usize,

    #[serde(default = "default_num_classes")]
    pub num_classes: usize,
}

impl Default for DataSpec {
    fn default() -> Self {
        Self {
            dis_batch_size: default_dis_batch_size(),
            gen_batch_size: default_gen_batch_size(),
            img_size: default_img_size(),
            channels: default_channels(),
            signal_channels: default_signal_channels(),
            signal_length: default_signal_length(),
            num_classes: default_num_classes(),
        }
    }
}

fn default_dis_batch_size() -> usize {
    32
}

fn default_gen_batch_size() -> usize {
    64
}

fn default_img_size() -> usize {
    32
}

fn default_channels() -> usize {
    3
}

fn default_signal_channels() -> usize {
    128
}

fn default_signal_length() -> usize {
    440
}

fn default_num_classes() -> usize {
    40
}

/// Adam settings shared by both networks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimSpec {
    #[serde(default = "default_lr")]
    pub g_lr: f32,

    #[serde(default = "default_lr")]
    pub d_lr: f32,

    #[serde(default)]
    pub beta1: f32,

    #[serde(default = "default_beta2")]
    pub beta2: f32,

    /// Global gradient-norm limit for both networks
    #[serde(default = "default_grad_clip")]
    pub grad_clip: f32,
}

impl Default for OptimSpec {
    fn default() -> Self {
        Self {
            g_lr: default_lr(),
            d_lr: default_lr(),
            beta1: 0.0,
            beta2: default_beta2(),
            grad_clip: default_grad_clip(),
        }
    }
}

fn default_lr() -> f32 {
    1e-4
}

fn default_beta2() -> f32 {
    0.99
}

fn default_grad_clip() -> f32 {
    5.0
}

/// Generator weight averaging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmaSpec {
    /// Fixed decay used when warmup is disabled
    #[serde(default = "default_ema_beta")]
    pub beta: f32,

    /// Half-life in thousands of images
    #[serde(default = "default_ema_kimg")]
    pub kimg: f32,

    /// Warmup ratio; 0 disables warmup
    #[serde(default)]
    pub warmup: f32,
}

impl Default for EmaSpec {
    fn default() -> Self {
        Self { beta: default_ema_beta(), kimg: default_ema_kimg(), warmup: 0.0 }
    }
}

fn default_ema_beta() -> f32 {
    0.9999
}

fn default_ema_kimg() -> f32 {
    500.0
}

/// Periodic evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalSpec {
    #[serde(default = "default_num_eval_imgs")]
    pub num_eval_imgs: usize,

    #[serde(default = "default_eval_batch_size")]
    pub eval_batch_size: usize,

    /// Directory receiving PNG samples for the FID scorer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fid_buffer_dir: Option<PathBuf>,

    /// Delete the FID buffer after scoring
    #[serde(default)]
    pub clean_fid_buffer: bool,
}

impl EvalSpec {
    /// Number of generator passes per validation run
    pub fn eval_iters(&self) -> usize {
        self.num_eval_imgs / self.eval_batch_size.max(1)
    }
}

impl Default for EvalSpec {
    fn default() -> Self {
        Self {
            num_eval_imgs: default_num_eval_imgs(),
            eval_batch_size: default_eval_batch_size(),
            fid_buffer_dir: None,
            clean_fid_buffer: false,
        }
    }
}

fn default_num_eval_imgs() -> usize {
    20_000
}

fn default_eval_batch_size() -> usize {
    100
}
