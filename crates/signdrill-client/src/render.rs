//! One-line status rendering for each screen.

use std::fmt::Write;

use signdrill_core::session::{
    ChallengeSnapshot, ChallengeState, HoldSnapshot, RecognitionSnapshot, RoundResult,
};
use signdrill_core::{ConfidenceBand, LinkStatus, PredictionSample};

const BAR_WIDTH: usize = 20;

/// A `[#####.....]` bar for a percentage in `[0, 100]`.
pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    bar.extend(std::iter::repeat('#').take(filled));
    bar.extend(std::iter::repeat('.').take(width - filled));
    bar.push(']');
    bar
}

fn band_label(band: ConfidenceBand) -> &'static str {
    match band {
        ConfidenceBand::High => "high",
        ConfidenceBand::Medium => "medium",
        ConfidenceBand::Low => "low",
    }
}

/// `B 87% (high)`, or a note when no hand was seen.
pub fn describe_sample(sample: &PredictionSample) -> String {
    match sample.letter {
        Some(letter) if sample.landmarks_detected => format!(
            "{} {}% ({})",
            letter,
            sample.confidence_percent(),
            band_label(sample.confidence_band())
        ),
        _ => sample
            .diagnostic
            .clone()
            .unwrap_or_else(|| "no hand detected".to_string()),
    }
}

pub fn render_recognition(snapshot: &RecognitionSnapshot) -> String {
    if let Some(message) = &snapshot.failure_message {
        return format!("error: {}", message);
    }
    let Some(sample) = &snapshot.latest else {
        return "waiting for first classification".to_string();
    };

    let mut line = describe_sample(sample);
    if sample.top_predictions.len() > 1 {
        line.push_str("  top:");
        for ranked in &sample.top_predictions {
            let _ = write!(
                line,
                " {} {}%",
                ranked.letter,
                (ranked.confidence.clamp(0.0, 1.0) * 100.0).round() as u8
            );
        }
    }
    if let Some(ms) = sample.processing_time_ms {
        let _ = write!(line, "  ({:.0} ms)", ms);
    }
    line
}

pub fn render_hold(snapshot: &HoldSnapshot) -> String {
    if snapshot.completed {
        return format!(
            "{} held! {} completed. Reset to go again.",
            snapshot.target, snapshot.completions
        );
    }

    let mut line = format!(
        "sign {} {} {:>3.0}%",
        snapshot.target,
        progress_bar(snapshot.progress_percent, BAR_WIDTH),
        snapshot.progress_percent
    );
    if let Some(sample) = &snapshot.last_sample {
        let _ = write!(line, "  seeing {}", describe_sample(sample));
    }
    line
}

pub fn render_challenge(snapshot: &ChallengeSnapshot) -> String {
    let round = &snapshot.round;
    if snapshot.state == ChallengeState::GameOver {
        return format!(
            "GAME OVER  score {}  best streak {}  rounds {}",
            round.score, round.best_streak, round.rounds_played
        );
    }

    let mut line = format!(
        "sign {}  score {}  streak {}  lives {}/{}",
        round.target, round.score, round.streak, snapshot.lives_remaining, snapshot.max_failures
    );
    match round.last_result {
        Some(RoundResult::Correct) => line.push_str("  correct!"),
        Some(RoundResult::Wrong) => {
            let seen = snapshot
                .last_sample
                .as_ref()
                .and_then(|sample| sample.letter)
                .map(|letter| format!(" (saw {})", letter))
                .unwrap_or_default();
            let _ = write!(line, "  wrong{}", seen);
        }
        None => {}
    }
    line
}

/// Warning suffix while classification keeps failing.
pub fn render_link(status: &LinkStatus) -> Option<String> {
    let failure = status.last_failure.as_ref()?;
    if !status.is_degraded() {
        return None;
    }
    Some(format!(
        "classifier failing ({} in a row): {}",
        status.consecutive_failures,
        failure.user_message()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use signdrill_core::session::ChallengeRound;
    use signdrill_core::{ClassificationFailure, Letter, RankedLetter};

    fn sample(letter: char, confidence: f64) -> PredictionSample {
        PredictionSample::new(Some(Letter::new(letter)), confidence, true)
    }

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(progress_bar(0.0, 4), "[....]");
        assert_eq!(progress_bar(50.0, 4), "[##..]");
        assert_eq!(progress_bar(100.0, 4), "[####]");
        assert_eq!(progress_bar(250.0, 4), "[####]");
    }

    #[test]
    fn sample_descriptions() {
        assert_eq!(describe_sample(&sample('A', 0.87)), "A 87% (high)");
        assert_eq!(describe_sample(&sample('C', 0.55)), "C 55% (medium)");
        assert_eq!(
            describe_sample(&PredictionSample::no_hand()),
            "no hand detected"
        );
        let mut no_hand = PredictionSample::no_hand();
        no_hand.diagnostic = Some("No hand detected in image".into());
        assert_eq!(describe_sample(&no_hand), "No hand detected in image");
    }

    #[test]
    fn recognition_lines() {
        let mut snapshot = RecognitionSnapshot::default();
        assert_eq!(
            render_recognition(&snapshot),
            "waiting for first classification"
        );

        let mut latest = sample('B', 0.81);
        latest.top_predictions = vec![
            RankedLetter {
                letter: Letter::new('B'),
                confidence: 0.81,
            },
            RankedLetter {
                letter: Letter::new('D'),
                confidence: 0.12,
            },
        ];
        latest.processing_time_ms = Some(41.6);
        snapshot.latest = Some(latest);
        assert_eq!(
            render_recognition(&snapshot),
            "B 81% (high)  top: B 81% D 12%  (42 ms)"
        );

        snapshot.failure_message = Some("model not loaded".into());
        assert_eq!(render_recognition(&snapshot), "error: model not loaded");
    }

    #[test]
    fn hold_lines() {
        let mut snapshot = HoldSnapshot {
            target: Letter::new('A'),
            holding: true,
            progress_percent: 50.0,
            completed: false,
            completions: 0,
            last_sample: Some(sample('A', 0.9)),
            last_failure: None,
        };
        assert_eq!(
            render_hold(&snapshot),
            "sign A [##########..........]  50%  seeing A 90% (high)"
        );

        snapshot.completed = true;
        snapshot.completions = 1;
        assert_eq!(
            render_hold(&snapshot),
            "A held! 1 completed. Reset to go again."
        );
    }

    #[test]
    fn challenge_lines() {
        let mut snapshot = ChallengeSnapshot {
            round: ChallengeRound {
                target: Letter::new('C'),
                last_result: Some(RoundResult::Wrong),
                consecutive_failures: 1,
                score: 4,
                streak: 0,
                best_streak: 3,
                rounds_played: 6,
                is_game_over: false,
            },
            state: ChallengeState::ShowingFeedback,
            lives_remaining: 2,
            max_failures: 3,
            last_sample: Some(sample('D', 0.9)),
            last_failure: None,
        };
        assert_eq!(
            render_challenge(&snapshot),
            "sign C  score 4  streak 0  lives 2/3  wrong (saw D)"
        );

        snapshot.state = ChallengeState::GameOver;
        assert_eq!(
            render_challenge(&snapshot),
            "GAME OVER  score 4  best streak 3  rounds 6"
        );
    }

    #[test]
    fn link_warning_only_while_failing() {
        let mut status = LinkStatus::default();
        assert_eq!(render_link(&status), None);

        status.consecutive_failures = 2;
        status.last_failure = Some(ClassificationFailure::Timeout);
        assert_eq!(
            render_link(&status).as_deref(),
            Some("classifier failing (2 in a row): Request timed out. Check your connection.")
        );
    }
}
