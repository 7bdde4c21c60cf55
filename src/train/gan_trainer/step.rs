//! Training step operations

use ndarray::{Array2, Array4};

use super::core::GanTrainer;
use super::result::StepOutcome;
use crate::error::{Error, Result};
use crate::generative::{Critic, Encoder, Generator, GeneratorInputs, LossKind};
use crate::monitor::TelemetrySink;
use crate::optim::{clip_grad_norm, LRScheduler};
use crate::train::Batch;

/// Generator-side results of one update
struct GeneratorUpdate {
    loss: f32,
    ema_beta: f32,
    lrs: Option<(f32, f32)>,
}

impl<G, D, E> GanTrainer<G, D, E>
where
    G: Generator,
    D: Critic,
    E: Encoder,
{
    /// Run one iteration: a critic pass on every call and, every
    /// `n_critic · accumulated_times` global steps, a generator update
    ///
    /// `iter_idx` is the batch index within the current epoch; it decides
    /// the critic's accumulation boundary. `epoch` is passed through to the
    /// generator.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` when the generator output does not match the target
    /// images, plus any loss error. Errors are raised before any gradient is
    /// accumulated for the iteration.
    pub fn train_step(
        &mut self,
        iter_idx: usize,
        batch: &Batch,
        epoch: usize,
    ) -> Result<StepOutcome> {
        if self.loss.kind() == LossKind::WganGpMode && batch.size() % 2 != 0 {
            return Err(Error::InvalidBatch(format!(
                "wgangp-mode needs an even batch, got {}",
                batch.size()
            )));
        }

        // The encoder is frozen: representations carry no gradient
        let conditioning = self.encoder.represent(&batch.signals);

        let (d_loss, gradient_penalty, dis_stepped) =
            self.discriminator_step(iter_idx, &conditioning, &batch.images, epoch)?;

        let global_step = self.state.global_steps;
        let update = if global_step % self.settings.generator_period() == 0 {
            Some(self.generator_step(&conditioning, epoch)?)
        } else {
            None
        };

        self.state.global_steps += 1;

        Ok(StepOutcome {
            global_step,
            d_loss,
            gradient_penalty,
            dis_stepped,
            g_loss: update.as_ref().map(|u| u.loss),
            ema_beta: update.as_ref().map(|u| u.ema_beta),
            lrs: update.and_then(|u| u.lrs),
        })
    }

    fn discriminator_step(
        &mut self,
        iter_idx: usize,
        conditioning: &Array2<f32>,
        real_imgs: &Array4<f32>,
        epoch: usize,
    ) -> Result<(f32, Option<f32>, bool)> {
        let acc = self.settings.accumulated_times;
        let scale = 1.0 / acc as f32;

        // Generator output is a plain array here, so nothing flows back into it
        let fake_imgs = self.generator.forward(conditioning, epoch);
        if fake_imgs.shape() != real_imgs.shape() {
            return Err(Error::ShapeMismatch {
                fake: fake_imgs.shape().to_vec(),
                real: real_imgs.shape().to_vec(),
            });
        }

        let real_validity = self.critic.forward(real_imgs);
        let fake_validity = self.critic.forward(&fake_imgs);

        let penalty = match self.loss.penalty_weight() {
            Some(weight) => Some((
                weight,
                self.penalty.estimate(&self.critic, real_imgs, &fake_imgs, &mut self.rng)?,
            )),
            None => None,
        };

        let penalty_value = penalty.as_ref().map(|(_, estimate)| estimate.value);
        let d_loss = self
            .loss
            .discriminator_loss(&real_validity, &fake_validity, penalty_value)?
            .scaled(scale);

        self.critic.backward(real_imgs, &d_loss.grad_real);
        self.critic.backward(&fake_imgs, &d_loss.grad_fake);
        if let Some((weight, estimate)) = &penalty {
            let direction = &estimate.direction * (weight * scale);
            self.critic.backward_input_gradient(&estimate.interpolates, &direction);
        }

        let dis_stepped = (iter_idx + 1) % acc == 0;
        if dis_stepped {
            clip_grad_norm(self.critic.parameters_mut(), self.settings.grad_clip);
            self.dis_optimizer.step(self.critic.parameters_mut());
            self.dis_optimizer.zero_grad(self.critic.parameters_mut());
            self.telemetry.add_scalar("d_loss", d_loss.value, self.state.global_steps);
        }

        Ok((d_loss.value, penalty_value, dis_stepped))
    }

    fn generator_step(
        &mut self,
        conditioning: &Array2<f32>,
        epoch: usize,
    ) -> Result<GeneratorUpdate> {
        let g_acc = self.settings.g_accumulated_times;
        let global_steps = self.state.global_steps;

        let mut g_loss_total = 0.0;
        for _ in 0..g_acc {
            let gen_imgs = self.generator.forward(conditioning, epoch);
            let fake_validity = self.critic.forward(&gen_imgs);

            let inputs = GeneratorInputs { images: &gen_imgs, conditioning };
            let g_loss = self
                .loss
                .generator_loss(&fake_validity, &inputs)?
                .scaled(1.0 / g_acc as f32);

            // Critic parameter gradients stay untouched by the generator pass
            let mut grad_imgs = self.critic.input_gradient(&gen_imgs, &g_loss.grad_fake);
            if let Some(direct) = &g_loss.grad_images {
                grad_imgs += direct;
            }
            self.generator.backward(conditioning, epoch, &grad_imgs);
            g_loss_total += g_loss.value;
        }

        clip_grad_norm(self.generator.parameters_mut(), self.settings.grad_clip);
        self.gen_optimizer.step(self.generator.parameters_mut());
        self.gen_optimizer.zero_grad(self.generator.parameters_mut());

        let lrs = match &mut self.schedulers {
            Some((gen_scheduler, dis_scheduler)) => {
                let g_lr = gen_scheduler.step(self.gen_optimizer.as_mut(), global_steps);
                let d_lr = dis_scheduler.step(self.dis_optimizer.as_mut(), global_steps);
                self.telemetry.add_scalar("LR/g_lr", g_lr, global_steps);
                self.telemetry.add_scalar("LR/d_lr", d_lr, global_steps);
                Some((g_lr, d_lr))
            }
            None => None,
        };

        let ema_beta = self.ema.refresh(self.generator.parameters(), global_steps)?;

        self.telemetry.add_scalar("g_loss", g_loss_total, global_steps);
        self.state.gen_steps += 1;

        Ok(GeneratorUpdate { loss: g_loss_total, ema_beta, lrs })
    }
}
