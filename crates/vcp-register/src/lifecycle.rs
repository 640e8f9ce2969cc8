//! Pause/resume handling for suspended virtual clusters
//!
//! A sleeping instance can still be registered: the secret is picked up the
//! next time it wakes. The operator decides whether to wait for that or to
//! wake it now, in which case the instance is resumed and polled until it
//! reports active again.

use std::sync::Arc;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use vcp_core::{
    Instance, InstanceConnection, LifecycleConfig, Prompt, PromptError, QuestionOptions,
};

use crate::error::RegisterError;

pub const LEAVE_SLEEPING: &str =
    "No. Leave it sleeping. (It will be added automatically on next wakeup)";
pub const WAKE_NOW: &str = "Yes. Wake and add now.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeState {
    Active,
    Suspended,
    WakingInProgress,
    Resolved { asleep: bool },
}

/// Drives one instance from its observed state to [`WakeState::Resolved`]
#[derive(Clone)]
pub struct WakeController {
    prompt: Arc<dyn Prompt>,
    config: LifecycleConfig,
}

impl WakeController {
    pub fn new(prompt: Arc<dyn Prompt>, config: LifecycleConfig) -> Self {
        Self { prompt, config }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Returns `true` when the instance was left asleep
    pub async fn resolve(
        &self,
        connection: &dyn InstanceConnection,
        instance: &Instance,
        cancel: &CancellationToken,
    ) -> Result<bool, RegisterError> {
        let mut state = if connection
            .status()
            .await
            .map_err(RegisterError::StatusFailure)?
            .is_suspended()
        {
            WakeState::Suspended
        } else {
            WakeState::Active
        };

        loop {
            debug!("vcluster {} is in state {:?}", instance, state);
            state = match state {
                WakeState::Active => WakeState::Resolved { asleep: false },
                WakeState::Suspended => {
                    let answer = self.ask(instance, cancel).await?;
                    if answer == WAKE_NOW {
                        connection.resume().await.map_err(|source| {
                            RegisterError::WakeCommandFailure {
                                name: instance.name.clone(),
                                source,
                            }
                        })?;
                        WakeState::WakingInProgress
                    } else {
                        info!(
                            "vcluster {} is sleeping, it will be added automatically the next time it wakes up",
                            instance
                        );
                        WakeState::Resolved { asleep: true }
                    }
                }
                WakeState::WakingInProgress => {
                    self.wait_until_active(connection, instance, cancel).await?;
                    WakeState::Resolved { asleep: false }
                }
                WakeState::Resolved { asleep } => return Ok(asleep),
            };
        }
    }

    async fn ask(
        &self,
        instance: &Instance,
        cancel: &CancellationToken,
    ) -> Result<String, RegisterError> {
        if cancel.is_cancelled() {
            return Err(RegisterError::Cancelled);
        }

        let question = QuestionOptions::new(
            format!(
                "vcluster {} is sleeping. Do you want to wake it up and add it now?",
                instance.qualified_name()
            ),
            LEAVE_SLEEPING,
        )
        .with_options([LEAVE_SLEEPING, WAKE_NOW]);
        let prompt = self.prompt.clone();

        let answer = tokio::select! {
            _ = cancel.cancelled() => return Err(RegisterError::Cancelled),
            joined = tokio::task::spawn_blocking(move || prompt.question(&question)) => joined
                .map_err(|e| PromptError::Io(std::io::Error::other(e)))
                .and_then(|answer| answer)
                .map_err(RegisterError::PromptFailure)?,
        };

        if cancel.is_cancelled() {
            return Err(RegisterError::Cancelled);
        }
        Ok(answer)
    }

    async fn wait_until_active(
        &self,
        connection: &dyn InstanceConnection,
        instance: &Instance,
        cancel: &CancellationToken,
    ) -> Result<(), RegisterError> {
        info!("Waiting for vcluster {} to wake up", instance);

        let poll_interval = self.config.poll_interval;
        let mut ticker = interval_at(Instant::now() + poll_interval, poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let deadline = sleep(self.config.wake_timeout);
        tokio::pin!(deadline);
        let timed_out = || RegisterError::WakeTimeout {
            name: instance.name.clone(),
            timeout: self.config.wake_timeout,
        };

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RegisterError::Cancelled),
                _ = &mut deadline => return Err(timed_out()),
                _ = ticker.tick() => {}
            }

            // A status query may hang; it must not outlive the deadline
            let status = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RegisterError::Cancelled),
                _ = &mut deadline => return Err(timed_out()),
                status = connection.status() => status.map_err(RegisterError::StatusFailure)?,
            };
            if !status.is_suspended() {
                info!("vcluster {} is awake", instance);
                return Ok(());
            }
            debug!("vcluster {} is still {}", instance, status);
        }
    }
}
