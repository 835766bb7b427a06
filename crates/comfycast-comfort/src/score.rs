//! Comfort score evaluation.
//!
//! Combines a day's weather with a person's physical profile, normalizes the
//! inputs via the configured scaling parameters, evaluates each comfort
//! formula, and attaches threshold-based advisories.

use crate::coefficients::ComfortCoefficients;
use crate::rules::AdviceRules;
use comfycast_core::ComfortError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

/// Formula whose scaling parameters normalize every metric, regardless of
/// which formula the metric is later used in.
const REFERENCE_FORMULA: &str = "comfort_temperature";

/// M/s to km/h, for advisory thresholds that are stated in km/h.
const MS_TO_KMH: f64 = 3.6;

/// Biological sex as a model input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    /// Numeric encoding used by the scoring formulas: female 0, male 1.
    pub fn as_factor(self) -> f64 {
        match self {
            Sex::Female => 0.0,
            Sex::Male => 1.0,
        }
    }
}

impl FromStr for Sex {
    type Err = ComfortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "1" => Ok(Sex::Male),
            "female" | "f" | "0" => Ok(Sex::Female),
            other => Err(ComfortError::InvalidSex(other.to_string())),
        }
    }
}

/// The weather inputs the scorer consumes for a single day.
#[derive(Debug, Clone, Default)]
pub struct DayWeather {
    pub temperature: f64,
    pub humidity: f64,
    /// Wind speed in m/s.
    pub windspeed: f64,
    pub uv_index: i64,
    pub aod: f64,
}

/// Per-factor comfort scores plus aggregates and advisories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComfortResult {
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub uva: f64,
    pub aod: f64,
    pub simple_avg: f64,
    pub weighted_avg: f64,
    pub advice: BTreeMap<String, String>,
}

/// Evaluates comfort formulas against weather and profile inputs.
#[derive(Debug, Clone)]
pub struct ComfortScorer {
    coefficients: ComfortCoefficients,
    rules: AdviceRules,
}

/// Factor name in the result, the metric key carrying its raw value, and the
/// formula that scores it.
const FACTORS: [(&str, &str, &str); 5] = [
    ("temperature", "temperature", "comfort_temperature"),
    ("humidity", "humidity", "comfort_humidity"),
    ("wind_speed", "wind_speed", "comfort_wind"),
    ("uva", "UVA", "comfort_UVA"),
    ("aod", "AOD", "comfort_AOD"),
];

impl ComfortScorer {
    pub fn new(coefficients: ComfortCoefficients, rules: AdviceRules) -> Self {
        Self {
            coefficients,
            rules,
        }
    }

    /// Score one day of weather for one person.
    pub fn score(
        &self,
        weather: &DayWeather,
        age: f64,
        height_cm: f64,
        weight_kg: f64,
        sex: Sex,
    ) -> ComfortResult {
        let height_m = height_cm / 100.0;
        let bmi = if height_m != 0.0 {
            weight_kg / (height_m * height_m)
        } else {
            0.0
        };

        let raw: [(&str, f64); 10] = [
            ("temperature", weather.temperature),
            ("humidity", weather.humidity),
            ("wind_speed", weather.windspeed),
            ("UVA", weather.uv_index as f64),
            ("AOD", weather.aod),
            ("sex", sex.as_factor()),
            ("age", age),
            ("height", height_cm),
            ("weight", weight_kg),
            ("BMI", bmi),
        ];

        let metrics: HashMap<&str, f64> = raw
            .iter()
            .map(|&(name, value)| (name, self.normalize(name, value)))
            .collect();

        let mut scores = HashMap::new();
        for (factor, _, formula) in FACTORS {
            scores.insert(factor, self.evaluate(formula, &metrics));
        }

        let simple_avg = scores.values().sum::<f64>() / FACTORS.len() as f64;

        // Each factor is weighted by the magnitude of its own coefficient in
        // the formula that scores it.
        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;
        for (factor, metric, formula) in FACTORS {
            let weight = self
                .coefficients
                .formula(formula)
                .map(|f| f.coefficient(metric).abs())
                .unwrap_or(0.0);
            weighted_sum += scores.get(factor).copied().unwrap_or(0.0) * weight;
            total_weight += weight;
        }
        let weighted_avg = if total_weight > 0.0 {
            weighted_sum / total_weight
        } else {
            weighted_sum
        };

        let advice = self.collect_advice(weather);

        let score_of = |factor: &str| scores.get(factor).copied().unwrap_or(0.0);
        ComfortResult {
            temperature: score_of("temperature"),
            humidity: score_of("humidity"),
            wind_speed: score_of("wind_speed"),
            uva: score_of("uva"),
            aod: score_of("aod"),
            simple_avg,
            weighted_avg,
            advice,
        }
    }

    /// Z-score a raw value using the reference formula's scaling block. A
    /// zero std collapses the metric to 0 rather than dividing by zero.
    fn normalize(&self, metric: &str, value: f64) -> f64 {
        let scaling = match self.coefficients.formula(REFERENCE_FORMULA) {
            Some(formula) => formula.scaling(metric),
            None => return value,
        };
        if scaling.std == 0.0 {
            0.0
        } else {
            (value - scaling.mean) / scaling.std
        }
    }

    /// Evaluate one formula over the normalized metrics, clamped to [0, 1].
    /// A formula missing from the document scores 0.
    fn evaluate(&self, name: &str, metrics: &HashMap<&str, f64>) -> f64 {
        let Some(formula) = self.coefficients.formula(name) else {
            return 0.0;
        };
        let mut score = formula.intercept;
        for (metric, coefficient) in &formula.coefficients {
            score += coefficient * metrics.get(metric.as_str()).copied().unwrap_or(0.0);
        }
        score.clamp(0.0, 1.0)
    }

    /// Advisories for raw values crossing configured thresholds. Wind rules
    /// are stated in km/h while observations arrive in m/s.
    fn collect_advice(&self, weather: &DayWeather) -> BTreeMap<String, String> {
        let observed = [
            ("aod", weather.aod),
            ("uv", weather.uv_index as f64),
            ("humidity", weather.humidity),
            ("wind", weather.windspeed * MS_TO_KMH),
            ("temperature", weather.temperature),
        ];

        let mut advice = BTreeMap::new();
        for (factor, value) in observed {
            if let Some(text) = self.rules.first_match(factor, value) {
                advice.insert(factor.to_string(), text.to_string());
            }
        }
        advice
    }
}
