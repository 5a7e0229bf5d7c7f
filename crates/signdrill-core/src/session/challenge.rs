//! Timed challenge game.
//!
//! Each round shows a target letter. A confident classification either
//! matches it (score and streak go up, a new target follows a short
//! feedback window) or does not (the streak resets and a life is lost).
//! Running out of lives ends the game until [`ChallengeStateMachine::reset_game`].

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::ChallengeConfig;
use crate::error::ClassificationFailure;
use crate::sample::{Letter, PredictionSample};
use crate::scheduler::SampleConsumer;
use crate::{Error, Result};

/// Outcome of the most recent judged sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundResult {
    Correct,
    Wrong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeState {
    AwaitingInput,
    ShowingFeedback,
    GameOver,
}

/// Something observable that happened to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeEvent {
    Correct,
    Wrong,
    GameOver,
    /// The feedback window closed and a new target was drawn.
    NextTarget(Letter),
    /// The feedback window closed; same target again.
    RetryTarget,
}

/// Scoring state for one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeRound {
    pub target: Letter,
    pub last_result: Option<RoundResult>,
    /// Reset to 0 on every correct answer.
    pub consecutive_failures: u32,
    pub score: u32,
    pub streak: u32,
    pub best_streak: u32,
    /// Judged samples this game.
    pub rounds_played: u32,
    pub is_game_over: bool,
}

impl ChallengeRound {
    fn new(target: Letter) -> Self {
        Self {
            target,
            last_result: None,
            consecutive_failures: 0,
            score: 0,
            streak: 0,
            best_streak: 0,
            rounds_played: 0,
            is_game_over: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransitionKind {
    NextTarget,
    RetryTarget,
}

/// Deferred end of a feedback window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingTransition {
    deadline: Instant,
    kind: TransitionKind,
}

/// Published state of a challenge game.
#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeSnapshot {
    pub round: ChallengeRound,
    pub state: ChallengeState,
    pub lives_remaining: u32,
    pub max_failures: u32,
    pub last_sample: Option<PredictionSample>,
    pub last_failure: Option<ClassificationFailure>,
}

/// Draw uniformly from `pool` minus `excluding`; repeat when nothing else is left.
fn pick_target(pool: &[Letter], excluding: Option<Letter>, rng: &mut StdRng) -> Option<Letter> {
    let candidates: Vec<Letter> = pool
        .iter()
        .copied()
        .filter(|letter| Some(*letter) != excluding)
        .collect();
    candidates
        .choose(rng)
        .copied()
        .or_else(|| pool.choose(rng).copied())
}

/// Drives rounds, scoring and game over.
#[derive(Debug)]
pub struct ChallengeStateMachine {
    config: ChallengeConfig,
    round: ChallengeRound,
    pending: Option<PendingTransition>,
    rng: StdRng,
    last_sample: Option<PredictionSample>,
    last_failure: Option<ClassificationFailure>,
}

impl ChallengeStateMachine {
    /// Start a game with targets drawn from OS entropy.
    pub fn new(config: ChallengeConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Start a game with a deterministic target sequence.
    pub fn with_seed(config: ChallengeConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: ChallengeConfig, mut rng: StdRng) -> Result<Self> {
        config.validate()?;
        let target = pick_target(&config.letter_pool, None, &mut rng)
            .ok_or_else(|| Error::invalid_config("letter pool is empty"))?;

        Ok(Self {
            config,
            round: ChallengeRound::new(target),
            pending: None,
            rng,
            last_sample: None,
            last_failure: None,
        })
    }

    pub fn config(&self) -> &ChallengeConfig {
        &self.config
    }

    pub fn round(&self) -> &ChallengeRound {
        &self.round
    }

    pub fn target(&self) -> Letter {
        self.round.target
    }

    pub fn state(&self) -> ChallengeState {
        if self.round.is_game_over {
            ChallengeState::GameOver
        } else if self.pending.is_some() {
            ChallengeState::ShowingFeedback
        } else {
            ChallengeState::AwaitingInput
        }
    }

    pub fn lives_remaining(&self) -> u32 {
        self.config
            .max_failures
            .saturating_sub(self.round.consecutive_failures)
    }

    /// When the current feedback window ends.
    pub fn feedback_deadline(&self) -> Option<Instant> {
        self.pending.map(|pending| pending.deadline)
    }

    /// Draw the next target, never `excluding` unless the pool has one letter.
    pub fn pick_next_target(&mut self, excluding: Option<Letter>) -> Letter {
        pick_target(&self.config.letter_pool, excluding, &mut self.rng).unwrap_or(self.round.target)
    }

    /// Judge one classification result.
    ///
    /// Ignored outside [`ChallengeState::AwaitingInput`]. Samples without a
    /// hand or below the threshold are not judged. A confident sample with
    /// no letter is a wrong answer.
    pub fn observe(&mut self, sample: &PredictionSample, now: Instant) -> Option<ChallengeEvent> {
        if self.state() != ChallengeState::AwaitingInput {
            return None;
        }

        self.last_sample = Some(sample.clone());
        self.last_failure = None;

        if !sample.is_confident(self.config.confidence_threshold) {
            return None;
        }

        self.round.rounds_played += 1;

        if sample.letter == Some(self.round.target) {
            self.round.last_result = Some(RoundResult::Correct);
            self.round.score += 1;
            self.round.streak += 1;
            self.round.best_streak = self.round.best_streak.max(self.round.streak);
            self.round.consecutive_failures = 0;
            self.schedule(now, TransitionKind::NextTarget);
            info!(
                target_letter = %self.round.target,
                score = self.round.score,
                streak = self.round.streak,
                "Correct"
            );
            return Some(ChallengeEvent::Correct);
        }

        self.round.last_result = Some(RoundResult::Wrong);
        self.round.streak = 0;
        self.round.consecutive_failures += 1;

        if self.round.consecutive_failures >= self.config.max_failures {
            self.round.is_game_over = true;
            info!(
                target_letter = %self.round.target,
                score = self.round.score,
                best_streak = self.round.best_streak,
                "Game over"
            );
            return Some(ChallengeEvent::GameOver);
        }

        self.schedule(now, TransitionKind::RetryTarget);
        debug!(
            target_letter = %self.round.target,
            got = ?sample.letter,
            lives = self.lives_remaining(),
            "Wrong"
        );
        Some(ChallengeEvent::Wrong)
    }

    /// A classification failed. The round is left untouched.
    pub fn observe_failure(&mut self, failure: &ClassificationFailure) {
        self.last_failure = Some(failure.clone());
    }

    fn schedule(&mut self, now: Instant, kind: TransitionKind) {
        let hold = match kind {
            TransitionKind::NextTarget => self.config.correct_feedback,
            TransitionKind::RetryTarget => self.config.wrong_feedback,
        };
        self.pending = Some(PendingTransition {
            deadline: now + hold,
            kind,
        });
    }

    /// Close the feedback window if its deadline has passed.
    pub fn fire_due(&mut self, now: Instant) -> Option<ChallengeEvent> {
        let pending = self.pending.filter(|pending| pending.deadline <= now)?;
        self.pending = None;
        self.round.last_result = None;

        match pending.kind {
            TransitionKind::NextTarget => {
                let next = self.pick_next_target(Some(self.round.target));
                self.round.target = next;
                debug!(target_letter = %next, "Next target");
                Some(ChallengeEvent::NextTarget(next))
            }
            TransitionKind::RetryTarget => Some(ChallengeEvent::RetryTarget),
        }
    }

    /// Start a new game with a freshly drawn target.
    pub fn reset_game(&mut self) {
        self.pending = None;
        let target = self.pick_next_target(None);
        self.round = ChallengeRound::new(target);
        self.last_sample = None;
        self.last_failure = None;
        info!(target_letter = %target, "Game reset");
    }

    /// Replace the current target with `letter` from the pool.
    ///
    /// Cancels any feedback window. Score and lives are kept.
    pub fn set_target(&mut self, letter: Letter) -> Result<()> {
        if !self.config.letter_pool.contains(&letter) {
            return Err(Error::invalid_config(format!(
                "letter {} is not in the pool",
                letter
            )));
        }
        self.pending = None;
        self.round.target = letter;
        self.round.last_result = None;
        Ok(())
    }

    pub fn snapshot(&self) -> ChallengeSnapshot {
        ChallengeSnapshot {
            round: self.round.clone(),
            state: self.state(),
            lives_remaining: self.lives_remaining(),
            max_failures: self.config.max_failures,
            last_sample: self.last_sample.clone(),
            last_failure: self.last_failure.clone(),
        }
    }
}

impl SampleConsumer for ChallengeStateMachine {
    type Snapshot = ChallengeSnapshot;

    fn on_sample(&mut self, sample: &PredictionSample, now: Instant) {
        self.observe(sample, now);
    }

    fn on_failure(&mut self, failure: &ClassificationFailure, _now: Instant) {
        self.observe_failure(failure);
    }

    fn accepts_samples(&self) -> bool {
        self.state() == ChallengeState::AwaitingInput
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.feedback_deadline()
    }

    fn on_deadline(&mut self, now: Instant) {
        self.fire_due(now);
    }

    fn snapshot(&self) -> ChallengeSnapshot {
        ChallengeStateMachine::snapshot(self)
    }
}
