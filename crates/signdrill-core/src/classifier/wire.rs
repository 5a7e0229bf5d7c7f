//! JSON bodies exchanged with the classifier.

use serde::{Deserialize, Serialize};

use crate::error::ClassificationFailure;
use crate::sample::{Letter, PredictionSample, RankedLetter};

/// Body of `POST /predict`.
#[derive(Debug, Serialize)]
pub(crate) struct PredictRequest<'a> {
    pub image: &'a str,
}

#[derive(Debug, Deserialize)]
struct RankedWire {
    letter: String,
    confidence: f64,
}

/// Body of a successful `POST /predict`.
#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    letter: Option<String>,
    confidence: f64,
    landmarks_detected: bool,
    #[serde(default)]
    processing_time_ms: Option<f64>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    top_predictions: Vec<RankedWire>,
}

/// Body of a failed request.
#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
}

/// Body of `GET /health`.
#[derive(Debug, Deserialize)]
pub(crate) struct HealthResponse {
    pub status: String,
}

fn malformed(detail: impl std::fmt::Display) -> ClassificationFailure {
    ClassificationFailure::Server {
        message: format!("malformed response: {}", detail),
    }
}

/// Empty and missing labels mean "no letter".
fn decode_letter(label: Option<&str>) -> Result<Option<Letter>, ClassificationFailure> {
    match label {
        None | Some("") => Ok(None),
        Some(label) => label.parse::<Letter>().map(Some).map_err(malformed),
    }
}

/// Turn an HTTP status and body into a sample or a failure.
pub fn decode_prediction(status: u16, body: &[u8]) -> Result<PredictionSample, ClassificationFailure> {
    if !(200..300).contains(&status) {
        let error = serde_json::from_slice::<ErrorResponse>(body)
            .unwrap_or_default()
            .error
            .filter(|message| !message.is_empty());
        return Err(ClassificationFailure::Server {
            message: error.unwrap_or_else(|| format!("server error (status {})", status)),
        });
    }

    let response: PredictResponse = serde_json::from_slice(body).map_err(malformed)?;
    let letter = decode_letter(response.letter.as_deref())?;
    let top_predictions = response
        .top_predictions
        .iter()
        .map(|ranked| {
            Ok(RankedLetter {
                letter: ranked.letter.parse::<Letter>().map_err(malformed)?,
                confidence: ranked.confidence,
            })
        })
        .collect::<Result<Vec<_>, ClassificationFailure>>()?;

    Ok(PredictionSample {
        letter,
        confidence: response.confidence,
        landmarks_detected: response.landmarks_detected,
        processing_time_ms: response.processing_time_ms,
        diagnostic: response.error.filter(|message| !message.is_empty()),
        top_predictions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_image_field() {
        let body = serde_json::to_string(&PredictRequest { image: "aGVsbG8=" }).unwrap();
        assert_eq!(body, r#"{"image":"aGVsbG8="}"#);
    }

    #[test]
    fn decodes_minimal_prediction() {
        let body = br#"{"letter":"A","confidence":0.93,"landmarks_detected":true}"#;
        let sample = decode_prediction(200, body).unwrap();
        assert_eq!(sample.letter, Some(Letter::new('A')));
        assert_eq!(sample.confidence, 0.93);
        assert!(sample.landmarks_detected);
        assert!(sample.top_predictions.is_empty());
        assert_eq!(sample.diagnostic, None);
    }

    #[test]
    fn decodes_full_prediction() {
        let body = br#"{
            "letter": "B",
            "confidence": 0.81,
            "landmarks_detected": true,
            "processing_time_ms": 42.5,
            "error": "",
            "top_predictions": [
                {"letter": "B", "confidence": 0.81},
                {"letter": "D", "confidence": 0.11}
            ]
        }"#;
        let sample = decode_prediction(200, body).unwrap();
        assert_eq!(sample.processing_time_ms, Some(42.5));
        assert_eq!(sample.diagnostic, None);
        assert_eq!(sample.top_predictions.len(), 2);
        assert_eq!(sample.top_predictions[1].letter, Letter::new('D'));
    }

    #[test]
    fn no_hand_response_is_a_sample() {
        // The backend reports "no hand" as a 200 with an error string.
        let body = br#"{"letter":"","confidence":0.0,"landmarks_detected":false,"error":"No hand detected in image"}"#;
        let sample = decode_prediction(200, body).unwrap();
        assert_eq!(sample.letter, None);
        assert!(!sample.landmarks_detected);
        assert_eq!(sample.diagnostic.as_deref(), Some("No hand detected in image"));
    }

    #[test]
    fn null_letter_is_none() {
        let body = br#"{"letter":null,"confidence":0.2,"landmarks_detected":true}"#;
        assert_eq!(decode_prediction(200, body).unwrap().letter, None);
    }

    #[test]
    fn multi_char_label_is_malformed() {
        let body = br#"{"letter":"space","confidence":0.9,"landmarks_detected":true}"#;
        assert!(matches!(
            decode_prediction(200, body),
            Err(ClassificationFailure::Server { .. })
        ));
    }

    #[test]
    fn missing_required_field_is_malformed() {
        let body = br#"{"letter":"A"}"#;
        let err = decode_prediction(200, body).unwrap_err();
        match err {
            ClassificationFailure::Server { message } => {
                assert!(message.starts_with("malformed response"))
            }
            other => panic!("unexpected failure: {:?}", other),
        }
    }

    #[test]
    fn error_status_uses_error_field() {
        let body = br#"{"error":"model not loaded"}"#;
        assert_eq!(
            decode_prediction(500, body).unwrap_err(),
            ClassificationFailure::Server {
                message: "model not loaded".into()
            }
        );
    }

    #[test]
    fn error_status_without_body() {
        assert_eq!(
            decode_prediction(502, b"<html>bad gateway</html>").unwrap_err(),
            ClassificationFailure::Server {
                message: "server error (status 502)".into()
            }
        );
    }
}
