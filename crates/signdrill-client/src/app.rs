//! Screen runners behind each subcommand.

use std::future::Future;
use std::io::{self, Write};
use std::sync::Arc;

use tracing::{info, warn};

use signdrill_core::session::{ChallengeState, ChallengeStateMachine, HoldConfirmation};
use signdrill_core::{
    Classifier, ClassifierClient, Engine, Error, LinkStatus, Result, SampleConsumer, Screen,
};

use crate::cli::{Cli, Command};
use crate::frames::DirectoryFrameSource;
use crate::render::{render_challenge, render_hold, render_link, render_recognition};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The screen reached its end state (or the probe succeeded).
    Completed,
    /// Stopped by Ctrl-C.
    Interrupted,
    /// The classifier failed its health probe.
    Unhealthy,
}

impl RunOutcome {
    pub fn exit_code(self) -> i32 {
        match self {
            RunOutcome::Completed => 0,
            RunOutcome::Interrupted => 130,
            RunOutcome::Unhealthy => 1,
        }
    }
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Run the selected subcommand, writing status lines to stdout.
pub async fn run(cli: &Cli) -> Result<RunOutcome> {
    let client = ClassifierClient::new(cli.client_config())?;
    let mut out = io::stdout();

    if !cli.needs_frames() {
        return run_health(&client, &mut out).await;
    }

    let Some(dir) = cli.frames.as_deref() else {
        return Err(Error::InvalidConfig {
            message: "--frames <DIR> is required for this command".to_string(),
        });
    };
    let frames = DirectoryFrameSource::open(dir).await?;
    let engine = Engine::new(Arc::new(client), Arc::new(frames), cli.engine_config())?;

    match &cli.command {
        Command::Health => Ok(RunOutcome::Completed),
        Command::Recognize(_) => run_recognize(&engine, &mut out, shutdown_signal()).await,
        Command::Practice(args) => {
            run_practice(&engine, args.letter, &mut out, shutdown_signal())
                .await
                .map(|(outcome, _)| outcome)
        }
        Command::Challenge(_) => run_challenge(&engine, &mut out, shutdown_signal())
            .await
            .map(|(outcome, _)| outcome),
    }
}

pub async fn run_health(classifier: &dyn Classifier, out: &mut impl Write) -> Result<RunOutcome> {
    let endpoint = classifier.endpoint();
    if classifier.probe_health().await {
        writeln!(out, "classifier at {} is healthy", endpoint)?;
        Ok(RunOutcome::Completed)
    } else {
        writeln!(out, "classifier at {} is not healthy", endpoint)?;
        Ok(RunOutcome::Unhealthy)
    }
}

pub async fn run_recognize(
    engine: &Engine,
    out: &mut impl Write,
    shutdown: impl Future<Output = ()>,
) -> Result<RunOutcome> {
    let screen = match engine.activate_recognition().await {
        Ok(screen) => screen,
        Err(Error::BackendUnavailable { url }) => {
            writeln!(out, "classifier at {} is not healthy", url)?;
            return Ok(RunOutcome::Unhealthy);
        }
        Err(e) => return Err(e),
    };
    let (outcome, monitor) = drive(
        screen,
        out,
        shutdown,
        |snapshot, _| render_recognition(snapshot),
        |_| false,
    )
    .await?;
    let summary = monitor.snapshot();
    info!(
        samples = summary.samples_seen,
        failures = summary.failures_seen,
        "Recognition stopped"
    );
    Ok(outcome)
}

pub async fn run_practice(
    engine: &Engine,
    letter: signdrill_core::Letter,
    out: &mut impl Write,
    shutdown: impl Future<Output = ()>,
) -> Result<(RunOutcome, HoldConfirmation)> {
    let screen = engine.activate_practice(letter)?;
    drive(
        screen,
        out,
        shutdown,
        |snapshot, link| with_link(render_hold(snapshot), link),
        |snapshot| snapshot.completed,
    )
    .await
}

pub async fn run_challenge(
    engine: &Engine,
    out: &mut impl Write,
    shutdown: impl Future<Output = ()>,
) -> Result<(RunOutcome, ChallengeStateMachine)> {
    let screen = engine.activate_challenge()?;
    drive(
        screen,
        out,
        shutdown,
        |snapshot, link| with_link(render_challenge(snapshot), link),
        |snapshot| snapshot.state == ChallengeState::GameOver,
    )
    .await
}

fn with_link(mut line: String, link: &LinkStatus) -> String {
    if let Some(warning) = render_link(link) {
        line.push_str("  | ");
        line.push_str(&warning);
    }
    line
}

/// Print a line whenever the rendered snapshot changes, until the screen
/// finishes or `shutdown` resolves. The screen is always deactivated.
async fn drive<C, W, S, R, F>(
    screen: Screen<C>,
    out: &mut W,
    shutdown: S,
    render: R,
    finished: F,
) -> Result<(RunOutcome, C)>
where
    C: SampleConsumer,
    W: Write,
    S: Future<Output = ()>,
    R: Fn(&C::Snapshot, &LinkStatus) -> String,
    F: Fn(&C::Snapshot) -> bool,
{
    let mut rx = screen.subscribe();
    let mut status_rx = screen.subscribe_status();
    let mut last_line: Option<String> = None;
    tokio::pin!(shutdown);

    let outcome = loop {
        let snapshot = rx.borrow_and_update().clone();
        let status = status_rx.borrow_and_update().clone();
        let line = render(&snapshot, &status);
        if last_line.as_deref() != Some(line.as_str()) {
            writeln!(out, "{}", line)?;
            out.flush()?;
            last_line = Some(line);
        }
        if finished(&snapshot) {
            break RunOutcome::Completed;
        }

        tokio::select! {
            _ = &mut shutdown => break RunOutcome::Interrupted,
            changed = rx.changed() => {
                if changed.is_err() {
                    break RunOutcome::Completed;
                }
            }
            changed = status_rx.changed() => {
                if changed.is_err() {
                    break RunOutcome::Completed;
                }
            }
        }
    };

    let consumer = screen.deactivate().await?;
    Ok((outcome, consumer))
}
