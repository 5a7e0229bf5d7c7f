//! Default timing and scoring constants for signdrill.

use std::time::Duration;

// =============================================================================
// Classifier Constants
// =============================================================================

/// Default classifier base URL.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Path of the classification endpoint.
pub const PREDICT_PATH: &str = "predict";

/// Path of the liveness endpoint.
pub const HEALTH_PATH: &str = "health";

/// Status value reported by a live backend.
pub const HEALTHY_STATUS: &str = "healthy";

/// Upper bound on one classification call.
pub const CLASSIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on one liveness probe.
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// Sampling Constants
// =============================================================================

/// Sampling interval while practicing a single letter.
pub const PRACTICE_INTERVAL: Duration = Duration::from_millis(500);

/// Sampling interval during a challenge game.
pub const CHALLENGE_INTERVAL: Duration = Duration::from_millis(600);

/// Sampling interval for passive recognition.
pub const RECOGNITION_INTERVAL: Duration = Duration::from_millis(1500);

// =============================================================================
// Confirmation Constants
// =============================================================================

/// Minimum confidence for a sample to count.
pub const CONFIDENCE_THRESHOLD: f64 = 0.70;

/// How long a letter must be held continuously.
pub const HOLD_DURATION: Duration = Duration::from_millis(2000);

/// Hold progress recomputation interval.
pub const HOLD_REFRESH_INTERVAL: Duration = Duration::from_millis(50);

/// Consecutive wrong answers that end a challenge.
pub const MAX_FAILURES: u32 = 3;

/// Feedback window after a correct answer.
pub const CORRECT_FEEDBACK_HOLD: Duration = Duration::from_millis(800);

/// Feedback window after a wrong answer.
pub const WRONG_FEEDBACK_HOLD: Duration = Duration::from_millis(1000);

/// Letters the classifier currently supports.
pub const DEFAULT_LETTER_POOL: &[char] = &['A', 'B', 'C', 'D'];

// =============================================================================
// Display Constants
// =============================================================================

/// Confidence at or above which a prediction is shown as strong.
pub const HIGH_CONFIDENCE: f64 = 0.80;

/// Confidence at or above which a prediction is shown as moderate.
pub const MEDIUM_CONFIDENCE: f64 = 0.50;
