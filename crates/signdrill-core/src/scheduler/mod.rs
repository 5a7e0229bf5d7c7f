//! Periodic sampling of the classifier.
//!
//! A [`PollingScheduler`] spawns one driver task per active screen. The
//! driver owns the screen's [`SampleConsumer`] and is the only place its
//! state changes:
//! - a ticker fires every sampling interval
//! - at most one acquire+classify call is in flight at a time; ticks that
//!   arrive while one is pending are skipped, not queued
//! - consumer deadlines (feedback windows, hold progress) run in the same
//!   loop, so no two updates ever interleave
//! - once stopped, results of the abandoned call are discarded
//!
//! Observers read derived state through `tokio::sync::watch` channels.

mod consumer;
mod status;

pub use consumer::SampleConsumer;
pub use status::LinkStatus;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

use crate::classifier::Classifier;
use crate::config::validate_nonzero;
use crate::error::ClassificationFailure;
use crate::frame::FrameSource;
use crate::sample::PredictionSample;
use crate::{Error, Result};

/// Capacity of the command queue between a handle and its driver.
const COMMAND_CAPACITY: usize = 16;

/// Runs against the consumer and returns the deferred reply, sent once the
/// new snapshot is published.
type Mutation<C> = Box<dyn FnOnce(&mut C) -> Reply + Send>;
type Reply = Box<dyn FnOnce() + Send>;

enum Command<C> {
    Call(Mutation<C>),
    Stop,
}

/// Result of one sampling tick.
enum TickOutcome {
    Sample(PredictionSample),
    Failure(ClassificationFailure),
    /// Frame acquisition failed or produced nothing.
    NoFrame(Error),
}

/// Starts sampling loops against a classifier and frame source.
#[derive(Clone)]
pub struct PollingScheduler {
    classifier: Arc<dyn Classifier>,
    frames: Arc<dyn FrameSource>,
    interval: Duration,
}

impl PollingScheduler {
    /// Fails with [`Error::InvalidConfig`] when `interval` is zero.
    pub fn new(
        classifier: Arc<dyn Classifier>,
        frames: Arc<dyn FrameSource>,
        interval: Duration,
    ) -> Result<Self> {
        validate_nonzero("sampling interval", interval)?;
        Ok(Self {
            classifier,
            frames,
            interval,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn a driver for `consumer` and return its handle.
    ///
    /// The first tick fires one interval from now. Must be called from
    /// within a Tokio runtime.
    pub fn start<C: SampleConsumer>(&self, consumer: C) -> SchedulerHandle<C> {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(consumer.snapshot());
        let (status_tx, status_rx) = watch::channel(LinkStatus::default());

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let driver = Driver {
            consumer,
            classifier: Arc::clone(&self.classifier),
            frames: Arc::clone(&self.frames),
            ticker,
            commands: commands_rx,
            mounted: true,
            in_flight: None,
            snapshots: snapshot_tx,
            status: LinkStatus::default(),
            status_tx,
        };

        info!(
            interval_ms = self.interval.as_millis() as u64,
            "Sampling started"
        );
        let task = tokio::spawn(driver.run());

        SchedulerHandle {
            commands: commands_tx,
            task,
            snapshots: snapshot_rx,
            status: status_rx,
        }
    }
}

/// Control handle for one running sampling loop.
///
/// Dropping the handle stops the loop; use [`SchedulerHandle::stop`] to stop
/// it and get the consumer back.
pub struct SchedulerHandle<C: SampleConsumer> {
    commands: mpsc::Sender<Command<C>>,
    task: JoinHandle<C>,
    snapshots: watch::Receiver<C::Snapshot>,
    status: watch::Receiver<LinkStatus>,
}

impl<C: SampleConsumer> SchedulerHandle<C> {
    /// Run `f` against the consumer inside the driver loop.
    ///
    /// The snapshot is republished afterwards.
    pub async fn call<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut C) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let mutation: Mutation<C> = Box::new(move |consumer| {
            let result = f(consumer);
            Box::new(move || {
                let _ = reply_tx.send(result);
            })
        });
        self.commands
            .send(Command::Call(mutation))
            .await
            .map_err(|_| Error::SchedulerStopped)?;
        reply_rx.await.map_err(|_| Error::SchedulerStopped)
    }

    /// Latest published consumer snapshot.
    pub fn snapshot(&self) -> C::Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified whenever the snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<C::Snapshot> {
        self.snapshots.clone()
    }

    pub fn link_status(&self) -> LinkStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<LinkStatus> {
        self.status.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop sampling and return the consumer.
    ///
    /// A call still in flight is abandoned; its result never reaches the
    /// consumer.
    pub async fn stop(self) -> Result<C> {
        // A send error means the driver already exited; the join below still
        // yields the consumer.
        let _ = self.commands.send(Command::Stop).await;
        self.task.await.map_err(|e| {
            error!(error = %e, "Sampling driver panicked");
            Error::SchedulerStopped
        })
    }
}

struct Driver<C: SampleConsumer> {
    consumer: C,
    classifier: Arc<dyn Classifier>,
    frames: Arc<dyn FrameSource>,
    ticker: Interval,
    commands: mpsc::Receiver<Command<C>>,
    /// Cleared on stop. Completions arriving after this are dropped.
    mounted: bool,
    /// The single outstanding acquire+classify call, if any.
    in_flight: Option<JoinHandle<TickOutcome>>,
    snapshots: watch::Sender<C::Snapshot>,
    status: LinkStatus,
    status_tx: watch::Sender<LinkStatus>,
}

async fn wait_in_flight(
    in_flight: &mut Option<JoinHandle<TickOutcome>>,
) -> std::result::Result<TickOutcome, JoinError> {
    match in_flight {
        Some(task) => task.await,
        None => std::future::pending().await,
    }
}

async fn sample_once(
    frames: Arc<dyn FrameSource>,
    classifier: Arc<dyn Classifier>,
) -> TickOutcome {
    let frame = match frames.acquire().await {
        Ok(frame) if frame.is_empty() => {
            return TickOutcome::NoFrame(Error::Acquisition {
                message: "empty frame".to_string(),
            })
        }
        Ok(frame) => frame,
        Err(e) => return TickOutcome::NoFrame(e),
    };

    match classifier.classify(&frame).await {
        Ok(sample) => TickOutcome::Sample(sample),
        Err(failure) => TickOutcome::Failure(failure),
    }
}

impl<C: SampleConsumer> Driver<C> {
    async fn run(mut self) -> C {
        while self.mounted {
            let deadline = self.consumer.next_deadline();

            tokio::select! {
                biased;

                command = self.commands.recv() => self.on_command(command),

                joined = wait_in_flight(&mut self.in_flight) => {
                    self.in_flight = None;
                    self.on_complete(joined);
                }

                _ = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.consumer.on_deadline(Instant::now());
                    self.publish();
                }

                _ = self.ticker.tick() => self.on_tick(),
            }
        }

        if self.in_flight.take().is_some() {
            debug!("Abandoning in-flight classification");
        }
        info!("Sampling stopped");
        self.consumer
    }

    fn on_command(&mut self, command: Option<Command<C>>) {
        match command {
            Some(Command::Call(mutation)) => {
                let reply = mutation(&mut self.consumer);
                self.publish();
                reply();
            }
            // A closed channel means every handle is gone.
            Some(Command::Stop) | None => self.mounted = false,
        }
    }

    fn on_tick(&mut self) {
        if self.in_flight.is_some() {
            trace!("Classification in flight, skipping tick");
            self.skip_tick();
            return;
        }
        if !self.consumer.accepts_samples() {
            trace!("Consumer not accepting samples, skipping tick");
            self.skip_tick();
            return;
        }

        let frames = Arc::clone(&self.frames);
        let classifier = Arc::clone(&self.classifier);
        self.in_flight = Some(tokio::spawn(sample_once(frames, classifier)));
    }

    fn skip_tick(&mut self) {
        self.status.ticks_skipped += 1;
        self.publish_status();
    }

    fn on_complete(&mut self, joined: std::result::Result<TickOutcome, JoinError>) {
        if !self.mounted {
            return;
        }

        let now = Instant::now();
        match joined {
            Ok(TickOutcome::Sample(sample)) => {
                trace!(
                    letter = ?sample.letter,
                    confidence = sample.confidence,
                    landmarks = sample.landmarks_detected,
                    "Sample delivered"
                );
                self.status.record_sample(now);
                self.consumer.on_sample(&sample, now);
            }
            Ok(TickOutcome::Failure(failure)) => self.on_failure(failure, now),
            Ok(TickOutcome::NoFrame(e)) => {
                debug!(error = %e, "No frame acquired");
                self.status.frames_missed += 1;
            }
            Err(e) => {
                error!(error = %e, "Classification task failed");
                self.on_failure(
                    ClassificationFailure::Transport {
                        message: format!("classification task failed: {}", e),
                    },
                    now,
                );
            }
        }

        self.publish();
        self.publish_status();
    }

    fn on_failure(&mut self, failure: ClassificationFailure, now: Instant) {
        warn!(
            error = %failure,
            consecutive = self.status.consecutive_failures.saturating_add(1),
            "Classification failed"
        );
        self.consumer.on_failure(&failure, now);
        self.status.record_failure(failure);
    }

    fn publish(&self) {
        let snapshot = self.consumer.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });
    }

    fn publish_status(&self) {
        let status = self.status.clone();
        self.status_tx.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            *current = status;
            true
        });
    }
}
