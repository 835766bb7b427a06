//! Integration tests for the comfort scoring pipeline.
//!
//! These tests exercise the public surface end to end: coefficient and
//! advisory documents loaded from disk, scoring, and advisory lookup.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use comfycast_comfort::{AdviceRules, ComfortCoefficients, ComfortScorer, DayWeather, Sex};
use std::io::Write;

/// Helper to write a document to a named temp file.
fn write_doc(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

fn coefficients_doc() -> &'static str {
    r#"{
        "formulas": {
            "comfort_temperature": {
                "intercept": 0.7,
                "coefficients": {"temperature": -0.2, "age": -0.01},
                "scaling_params": {
                    "temperature": {"mean": 15.0, "std": 10.0},
                    "humidity": {"mean": 60.0, "std": 20.0},
                    "wind_speed": {"mean": 4.0, "std": 2.0},
                    "UVA": {"mean": 3.0, "std": 2.0},
                    "AOD": {"mean": 0.2, "std": 0.15},
                    "age": {"mean": 40.0, "std": 15.0},
                    "height": {"mean": 170.0, "std": 10.0},
                    "weight": {"mean": 70.0, "std": 15.0},
                    "BMI": {"mean": 24.0, "std": 4.0},
                    "sex": {"mean": 0.5, "std": 0.5}
                }
            },
            "comfort_humidity": {
                "intercept": 0.6,
                "coefficients": {"humidity": -0.1}
            },
            "comfort_wind": {
                "intercept": 0.6,
                "coefficients": {"wind_speed": -0.15}
            },
            "comfort_UVA": {
                "intercept": 0.6,
                "coefficients": {"UVA": -0.08}
            },
            "comfort_AOD": {
                "intercept": 0.6,
                "coefficients": {"AOD": -0.12}
            }
        }
    }"#
}

fn rules_doc() -> &'static str {
    r#"{
        "uv": [
            {"operator": ">", "value": 5.0, "text": "Wear sunscreen outdoors."}
        ],
        "temperature": [
            {"operator": "<", "value": 5.0, "text": "Dress warmly."},
            {"operator": ">", "value": 28.0, "text": "Stay hydrated."}
        ]
    }"#
}

#[test]
fn test_score_from_documents_on_disk() {
    let coefficients_file = write_doc(coefficients_doc());
    let rules_file = write_doc(rules_doc());

    let coefficients = ComfortCoefficients::load_or_default(coefficients_file.path());
    let rules = AdviceRules::load_or_default(rules_file.path());
    let scorer = ComfortScorer::new(coefficients, rules);

    let weather = DayWeather {
        temperature: 31.0,
        humidity: 65.0,
        windspeed: 2.5,
        uv_index: 7,
        aod: 0.25,
    };
    let result = scorer.score(&weather, 35.0, 180.0, 80.0, Sex::Male);

    for score in [
        result.temperature,
        result.humidity,
        result.wind_speed,
        result.uva,
        result.aod,
        result.simple_avg,
        result.weighted_avg,
    ] {
        assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
    }

    // Advisory text comes verbatim from the loaded document
    assert_eq!(
        result.advice.get("temperature").map(String::as_str),
        Some("Stay hydrated.")
    );
    assert_eq!(
        result.advice.get("uv").map(String::as_str),
        Some("Wear sunscreen outdoors.")
    );
    assert!(!result.advice.contains_key("humidity"));
}

#[test]
fn test_missing_coefficient_document_degrades_to_zero_scores() {
    let dir = tempfile::tempdir().unwrap();
    let coefficients = ComfortCoefficients::load_or_default(dir.path().join("missing.json"));
    let rules = AdviceRules::load_or_default(dir.path().join("missing_rules.json"));
    let scorer = ComfortScorer::new(coefficients, rules);

    let result = scorer.score(&DayWeather::default(), 30.0, 175.0, 70.0, Sex::Female);
    assert_eq!(result.simple_avg, 0.0);
    assert_eq!(result.weighted_avg, 0.0);
}

#[test]
fn test_built_in_rules_apply_when_document_absent() {
    let coefficients_file = write_doc(coefficients_doc());
    let dir = tempfile::tempdir().unwrap();

    let scorer = ComfortScorer::new(
        ComfortCoefficients::load_or_default(coefficients_file.path()),
        AdviceRules::load_or_default(dir.path().join("missing.json")),
    );

    let scorching = DayWeather {
        temperature: 36.0,
        humidity: 50.0,
        windspeed: 1.0,
        uv_index: 2,
        aod: 0.1,
    };
    let result = scorer.score(&scorching, 30.0, 175.0, 70.0, Sex::Female);
    assert!(result.advice.contains_key("temperature"));
}
