//! Screen lifecycle.
//!
//! The [`Engine`] owns the classifier, the frame source and the
//! configuration. Activating a screen starts a sampling loop for it;
//! deactivating stops the loop and hands back the final state.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::classifier::Classifier;
use crate::config::EngineConfig;
use crate::frame::FrameSource;
use crate::sample::Letter;
use crate::scheduler::{LinkStatus, PollingScheduler, SampleConsumer, SchedulerHandle};
use crate::session::{ChallengeStateMachine, HoldConfirmation, RecognitionMonitor};
use crate::{Error, Result};

/// An active screen: one running sampling loop and its consumer.
pub struct Screen<C: SampleConsumer> {
    handle: SchedulerHandle<C>,
}

/// Hold-to-confirm practice of one letter.
pub type PracticeScreen = Screen<HoldConfirmation>;
/// The challenge game.
pub type ChallengeScreen = Screen<ChallengeStateMachine>;
/// Passive recognition.
pub type RecognizeScreen = Screen<RecognitionMonitor>;

impl<C: SampleConsumer> Screen<C> {
    fn new(handle: SchedulerHandle<C>) -> Self {
        Self { handle }
    }

    pub fn snapshot(&self) -> C::Snapshot {
        self.handle.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<C::Snapshot> {
        self.handle.subscribe()
    }

    pub fn link_status(&self) -> LinkStatus {
        self.handle.link_status()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<LinkStatus> {
        self.handle.subscribe_status()
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_running()
    }

    /// Stop sampling. Returns the consumer's final state.
    pub async fn deactivate(self) -> Result<C> {
        self.handle.stop().await
    }
}

impl Screen<HoldConfirmation> {
    /// Start a new attempt at the current letter.
    pub async fn reset(&self) -> Result<()> {
        self.handle.call(|hold| hold.reset()).await
    }

    /// Practice a different letter.
    pub async fn set_target(&self, letter: Letter) -> Result<()> {
        self.handle.call(move |hold| hold.set_target(letter)).await
    }
}

impl Screen<ChallengeStateMachine> {
    pub async fn reset_game(&self) -> Result<()> {
        self.handle.call(|game| game.reset_game()).await
    }

    /// Force the current target. The letter must be in the pool.
    pub async fn set_target(&self, letter: Letter) -> Result<()> {
        self.handle.call(move |game| game.set_target(letter)).await?
    }
}

/// Entry point: activates screens against a classifier and frame source.
pub struct Engine {
    classifier: Arc<dyn Classifier>,
    frames: Arc<dyn FrameSource>,
    config: EngineConfig,
}

impl Engine {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        frames: Arc<dyn FrameSource>,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            classifier,
            frames,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn classifier(&self) -> &Arc<dyn Classifier> {
        &self.classifier
    }

    pub async fn probe_health(&self) -> bool {
        self.classifier.probe_health().await
    }

    fn scheduler(&self, interval: std::time::Duration) -> Result<PollingScheduler> {
        PollingScheduler::new(
            Arc::clone(&self.classifier),
            Arc::clone(&self.frames),
            interval,
        )
    }

    /// Start practicing `letter`.
    pub fn activate_practice(&self, letter: Letter) -> Result<PracticeScreen> {
        let scheduler = self.scheduler(self.config.practice_interval)?;
        info!(target_letter = %letter, "Activating practice");
        let hold = HoldConfirmation::new(letter, self.config.hold.clone());
        Ok(Screen::new(scheduler.start(hold)))
    }

    /// Start a new challenge game.
    pub fn activate_challenge(&self) -> Result<ChallengeScreen> {
        let challenge = self.config.challenge.clone();
        let game = match self.config.seed {
            Some(seed) => ChallengeStateMachine::with_seed(challenge, seed)?,
            None => ChallengeStateMachine::new(challenge)?,
        };
        info!(target_letter = %game.target(), "Activating challenge");
        Ok(Screen::new(
            self.scheduler(self.config.challenge_interval)?.start(game),
        ))
    }

    /// Start passive recognition once the backend answers its health probe.
    pub async fn activate_recognition(&self) -> Result<RecognizeScreen> {
        if !self.classifier.probe_health().await {
            let url = self.classifier.endpoint();
            warn!(url = %url, "Backend unavailable, not starting recognition");
            return Err(Error::BackendUnavailable { url });
        }
        info!("Activating recognition");
        Ok(Screen::new(
            self.scheduler(self.config.recognition_interval)?
                .start(RecognitionMonitor::new()),
        ))
    }
}
