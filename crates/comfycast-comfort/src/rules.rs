//! Advisory rule configuration.
//!
//! Maps a factor name (aod, uv, humidity, wind, temperature) to an ordered
//! list of threshold rules. The first rule whose comparison holds against
//! the raw observed value supplies the advisory text for that factor.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Comparison operator, resolved from the document's operator strings once
/// at load time instead of re-branching on strings per evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "==")]
    Eq,
}

impl Op {
    /// Apply the comparison to an observed value and a rule threshold.
    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Op::Gt => value > threshold,
            Op::Lt => value < threshold,
            Op::Ge => value >= threshold,
            Op::Le => value <= threshold,
            Op::Eq => value == threshold,
        }
    }
}

/// One threshold rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceRule {
    pub operator: Op,
    pub value: f64,
    pub text: String,
}

/// The full advisory document: factor name to ordered rule list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdviceRules(pub HashMap<String, Vec<AdviceRule>>);

impl AdviceRules {
    /// Load the document from `path`, falling back to the built-in rule set
    /// when the file is missing or unreadable.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(doc) => doc,
                Err(e) => {
                    tracing::warn!(
                        "Advisory rule document {} is malformed ({}), using built-in rules",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "Advisory rule document {} not found, using built-in rules",
                    path.display()
                );
                Self::default()
            }
        }
    }

    /// First matching rule text for a factor, None when no rule matches.
    pub fn first_match(&self, factor: &str, value: f64) -> Option<&str> {
        let rules = self.0.get(factor)?;
        rules
            .iter()
            .find(|r| r.operator.holds(value, r.value) && !r.text.is_empty())
            .map(|r| r.text.as_str())
    }

    /// Ordered rules configured for a factor.
    pub fn for_factor(&self, factor: &str) -> &[AdviceRule] {
        self.0.get(factor).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for AdviceRules {
    fn default() -> Self {
        let rule = |operator, value, text: &str| AdviceRule {
            operator,
            value,
            text: text.to_string(),
        };

        let mut rules = HashMap::new();
        rules.insert(
            "aod".to_string(),
            vec![rule(
                Op::Gt,
                0.5,
                "Limit time outdoors, especially for people with respiratory conditions. \
                 Consider wearing a protective mask.",
            )],
        );
        rules.insert(
            "uv".to_string(),
            vec![rule(
                Op::Gt,
                6.0,
                "Avoid direct sunlight. Use sunscreen and wear a hat. People with skin \
                 conditions should stay indoors.",
            )],
        );
        rules.insert(
            "humidity".to_string(),
            vec![rule(
                Op::Gt,
                80.0,
                "Reduce physical exertion. People with cardiovascular conditions should \
                 stay in cool rooms.",
            )],
        );
        rules.insert(
            "wind".to_string(),
            vec![rule(
                Op::Gt,
                10.0,
                "People with allergies should limit time outdoors, as wind raises pollen \
                 and dust concentrations.",
            )],
        );
        rules.insert(
            "temperature".to_string(),
            vec![
                rule(
                    Op::Lt,
                    0.0,
                    "Dress warmly; people with circulation problems should avoid long walks.",
                ),
                rule(
                    Op::Gt,
                    30.0,
                    "Avoid overheating and drink plenty of water; people with heart \
                     conditions should stay in the cool.",
                ),
            ],
        );

        Self(rules)
    }
}
