//! Core GanTrainer struct and basic methods

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{validate_config, GanTrainConfig};
use crate::distributed::{Membership, ProcessGroup};
use crate::error::Result;
use crate::generative::{
    AdversarialLoss, Critic, EmaTracker, Encoder, Generator, GradientPenalty, LossKind,
};
use crate::monitor::{RankGated, TelemetrySink};
use crate::optim::{Adam, LinearLrDecay, Optimizer};
use crate::train::cur_stage;

/// Step counters mutated every iteration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrainState {
    /// Iterations completed across all epochs
    pub global_steps: u64,
    /// Generator updates performed
    pub gen_steps: u64,
}

/// Fixed cadence of the adversarial updates
#[derive(Debug, Clone, Copy)]
pub(crate) struct StepSettings {
    pub n_critic: usize,
    pub accumulated_times: usize,
    pub g_accumulated_times: usize,
    pub grad_clip: f32,
    pub print_freq: usize,
    pub max_epoch: usize,
}

impl StepSettings {
    /// Global-step period between generator updates
    pub fn generator_period(&self) -> u64 {
        (self.n_critic * self.accumulated_times) as u64
    }
}

/// Owner of both networks, their optimizers and every piece of running state
///
/// All mutation of parameters, gradients, optimizer moments and EMA shadows
/// goes through this aggregate.
///
/// # Example
///
/// ```no_run
/// use eegan::config::GanTrainConfig;
/// use eegan::distributed::ProcessGroup;
/// use eegan::generative::reference::{AffineGenerator, MeanPoolEncoder, QuadraticCritic};
/// use eegan::monitor::TracingSink;
/// use eegan::train::GanTrainer;
///
/// let cfg = GanTrainConfig::default();
/// let generator = AffineGenerator::new(128, (3, 32, 32), 0);
/// let critic = QuadraticCritic::new(3 * 32 * 32, 1);
/// let mut trainer = GanTrainer::new(
///     &cfg,
///     generator,
///     critic,
///     MeanPoolEncoder,
///     &ProcessGroup::single(),
///     Box::new(TracingSink),
/// )?;
/// // trainer.train_epoch(&batches, 0)?;
/// # Ok::<(), eegan::Error>(())
/// ```
pub struct GanTrainer<G, D, E> {
    pub(crate) generator: G,
    pub(crate) critic: D,
    pub(crate) encoder: E,

    pub(crate) gen_optimizer: Box<dyn Optimizer>,
    pub(crate) dis_optimizer: Box<dyn Optimizer>,

    /// Generator and critic LR decay, when enabled
    pub(crate) schedulers: Option<(LinearLrDecay, LinearLrDecay)>,

    pub(crate) loss: Box<dyn AdversarialLoss>,
    pub(crate) penalty: GradientPenalty,
    pub(crate) ema: EmaTracker,

    pub(crate) settings: StepSettings,
    pub(crate) grow_steps: Vec<u64>,
    pub(crate) membership: Membership,
    pub(crate) telemetry: RankGated<Box<dyn TelemetrySink>>,
    pub(crate) rng: StdRng,
    pub(crate) state: TrainState,
}

impl<G, D, E> GanTrainer<G, D, E>
where
    G: Generator,
    D: Critic,
    E: Encoder,
{
    /// Build a trainer from a validated configuration
    ///
    /// Both networks get Adam with the configured betas. The loss variant is
    /// resolved here, once; an unknown name fails before anything is built.
    pub fn new(
        cfg: &GanTrainConfig,
        generator: G,
        critic: D,
        encoder: E,
        group: &ProcessGroup,
        telemetry: Box<dyn TelemetrySink>,
    ) -> Result<Self> {
        validate_config(cfg)?;
        let kind: LossKind = cfg.loss_kind()?;

        let opt = &cfg.optimizer;
        let gen_optimizer: Box<dyn Optimizer> =
            Box::new(Adam::new(opt.g_lr, opt.beta1, opt.beta2, 1e-8));
        let dis_optimizer: Box<dyn Optimizer> =
            Box::new(Adam::new(opt.d_lr, opt.beta1, opt.beta2, 1e-8));

        let schedulers = match cfg.decay_end_step() {
            Some(end) => Some((
                LinearLrDecay::new(opt.g_lr, 0.0, 0, end)?,
                LinearLrDecay::new(opt.d_lr, 0.0, 0, end)?,
            )),
            None => None,
        };

        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let ema = EmaTracker::new(generator.parameters(), cfg.ema_decay(group.world_size()));

        let settings = StepSettings {
            n_critic: cfg.schedule.n_critic,
            accumulated_times: cfg.schedule.accumulated_times,
            g_accumulated_times: cfg.schedule.g_accumulated_times,
            grad_clip: opt.grad_clip,
            print_freq: cfg.schedule.print_freq,
            max_epoch: cfg.schedule.max_epoch,
        };

        tracing::debug!(
            loss = %kind,
            n_critic = settings.n_critic,
            accumulated_times = settings.accumulated_times,
            g_accumulated_times = settings.g_accumulated_times,
            lr_decay = schedulers.is_some(),
            "trainer initialised"
        );

        Ok(Self {
            generator,
            critic,
            encoder,
            gen_optimizer,
            dis_optimizer,
            schedulers,
            loss: kind.build(cfg.loss.phi),
            penalty: GradientPenalty::new(cfg.loss.phi),
            ema,
            settings,
            grow_steps: cfg.schedule.grow_steps.clone(),
            membership: group.membership(),
            telemetry: RankGated::new(telemetry, group.membership()),
            rng,
            state: TrainState::default(),
        })
    }

    /// Replace both optimizers, e.g. with plain SGD
    pub fn with_optimizers(
        mut self,
        gen_optimizer: Box<dyn Optimizer>,
        dis_optimizer: Box<dyn Optimizer>,
    ) -> Self {
        self.gen_optimizer = gen_optimizer;
        self.dis_optimizer = dis_optimizer;
        self
    }

    /// Resume step counters, e.g. from a checkpoint
    pub fn with_state(mut self, state: TrainState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> TrainState {
        self.state
    }

    pub fn global_steps(&self) -> u64 {
        self.state.global_steps
    }

    /// Progressive-growing stage for the next iteration
    pub fn stage(&self) -> usize {
        cur_stage(self.state.global_steps, &self.grow_steps)
    }

    pub fn loss_kind(&self) -> LossKind {
        self.loss.kind()
    }

    pub fn gen_lr(&self) -> f32 {
        self.gen_optimizer.lr()
    }

    pub fn dis_lr(&self) -> f32 {
        self.dis_optimizer.lr()
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn critic(&self) -> &D {
        &self.critic
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn ema(&self) -> &EmaTracker {
        &self.ema
    }

    /// Mutable EMA access for the external checkpointer
    pub fn ema_mut(&mut self) -> &mut EmaTracker {
        &mut self.ema
    }

    pub fn membership(&self) -> Membership {
        self.membership
    }

    /// Run `f` with the averaged weights loaded into the generator
    ///
    /// Must only be called between training iterations; the live weights are
    /// restored before this returns.
    pub fn with_averaged_generator<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut G, &E) -> T,
    {
        let encoder = &self.encoder;
        self.ema.with_shadow(&mut self.generator, |generator| f(generator, encoder))
    }

    pub fn flush_telemetry(&mut self) {
        self.telemetry.flush();
    }
}
