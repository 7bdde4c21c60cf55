//! Epoch-level training

use std::borrow::Borrow;
use std::time::Instant;
use tracing::info;

use super::core::GanTrainer;
use super::result::{EpochSummary, TrainResult};
use crate::error::Result;
use crate::generative::{Critic, Encoder, Generator};
use crate::monitor::TelemetrySink;
use crate::train::Batch;

impl<G, D, E> GanTrainer<G, D, E>
where
    G: Generator,
    D: Critic,
    E: Encoder,
{
    /// Train for one epoch
    ///
    /// Both networks start the epoch with cleared gradients, so a partial
    /// accumulation window left over from the previous epoch is discarded.
    /// Progress lines start once this epoch has made a generator update.
    pub fn train_epoch<I, B>(&mut self, batches: I, epoch: usize) -> Result<EpochSummary>
    where
        I: IntoIterator<Item = B>,
        B: Borrow<Batch>,
    {
        self.dis_optimizer.zero_grad(self.critic.parameters_mut());
        self.gen_optimizer.zero_grad(self.generator.parameters_mut());

        let mut summary = EpochSummary {
            epoch,
            iterations: 0,
            dis_steps: 0,
            gen_steps: 0,
            mean_d_loss: 0.0,
            last_g_loss: None,
            last_ema_beta: None,
            global_steps: self.state.global_steps,
        };
        let mut d_loss_sum = 0.0;

        for (iter_idx, batch) in batches.into_iter().enumerate() {
            let outcome = self.train_step(iter_idx, batch.borrow(), epoch)?;

            summary.iterations += 1;
            d_loss_sum += outcome.d_loss;
            if outcome.dis_stepped {
                summary.dis_steps += 1;
            }
            if let Some(g_loss) = outcome.g_loss {
                summary.gen_steps += 1;
                summary.last_g_loss = Some(g_loss);
                summary.last_ema_beta = outcome.ema_beta;
            }

            if self.membership.is_primary()
                && summary.gen_steps > 0
                && iter_idx % self.settings.print_freq == 0
            {
                info!(
                    epoch,
                    max_epoch = self.settings.max_epoch,
                    batch = iter_idx,
                    d_loss = outcome.d_loss,
                    g_loss = summary.last_g_loss.unwrap_or_default(),
                    ema_beta = summary.last_ema_beta.unwrap_or_default(),
                    stage = self.stage(),
                    "train progress"
                );
            }
        }

        if summary.iterations > 0 {
            summary.mean_d_loss = d_loss_sum / summary.iterations as f32;
        }
        summary.global_steps = self.state.global_steps;
        self.telemetry.flush();
        Ok(summary)
    }

    /// Train for `epochs` epochs starting at `start_epoch`
    ///
    /// `make_batches` is called once per epoch with the epoch index.
    pub fn train<F, I, B>(
        &mut self,
        start_epoch: usize,
        epochs: usize,
        mut make_batches: F,
    ) -> Result<TrainResult>
    where
        F: FnMut(usize) -> I,
        I: IntoIterator<Item = B>,
        B: Borrow<Batch>,
    {
        let started = Instant::now();
        let mut summaries = Vec::with_capacity(epochs);

        for epoch in start_epoch..start_epoch + epochs {
            let summary = self.train_epoch(make_batches(epoch), epoch)?;
            info!(
                epoch,
                iterations = summary.iterations,
                gen_steps = summary.gen_steps,
                mean_d_loss = summary.mean_d_loss,
                "epoch finished"
            );
            summaries.push(summary);
        }

        Ok(TrainResult {
            epochs: summaries,
            global_steps: self.state.global_steps,
            gen_steps: self.state.gen_steps,
            elapsed_secs: started.elapsed().as_secs_f64(),
        })
    }
}
