//! Comfort coefficient configuration.
//!
//! A document of named linear formulas, each with an intercept, a
//! factor-to-coefficient mapping, and per-factor scaling parameters used for
//! z-score normalization. Loaded once at startup and treated as immutable.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Scaling parameters for one metric: `(value - mean) / std`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaling {
    #[serde(default)]
    pub mean: f64,
    #[serde(default = "default_std")]
    pub std: f64,
}

fn default_std() -> f64 {
    1.0
}

impl Default for Scaling {
    fn default() -> Self {
        Self {
            mean: 0.0,
            std: default_std(),
        }
    }
}

/// One named linear formula.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Formula {
    #[serde(default)]
    pub intercept: f64,
    #[serde(default)]
    pub coefficients: HashMap<String, f64>,
    #[serde(default)]
    pub scaling_params: HashMap<String, Scaling>,
}

impl Formula {
    /// Coefficient for a factor, 0 when the factor is not configured.
    pub fn coefficient(&self, factor: &str) -> f64 {
        self.coefficients.get(factor).copied().unwrap_or(0.0)
    }

    /// Scaling parameters for a factor, mean 0 / std 1 when not configured.
    pub fn scaling(&self, factor: &str) -> Scaling {
        self.scaling_params.get(factor).cloned().unwrap_or_default()
    }
}

/// The full coefficient document: named formulas.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComfortCoefficients {
    #[serde(default)]
    pub formulas: HashMap<String, Formula>,
}

impl ComfortCoefficients {
    /// Load the document from `path`, falling back to an empty set when the
    /// file is missing or unreadable. A missing formula yields a zero score
    /// downstream, so an empty document is a valid degraded state.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(doc) => doc,
                Err(e) => {
                    tracing::warn!(
                        "Coefficient document {} is malformed ({}), using empty set",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(
                    "Coefficient document {} unreadable ({}), using empty set",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn formula(&self, name: &str) -> Option<&Formula> {
        self.formulas.get(name)
    }
}
