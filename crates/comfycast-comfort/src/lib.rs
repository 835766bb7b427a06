//! Comfort scoring for Comfycast
//!
//! Evaluates how comfortable a person will find a day's weather, using a
//! configurable set of linear formulas over z-scored metrics plus
//! threshold-based advisory rules.

pub mod coefficients;
pub mod rules;
pub mod score;

pub use coefficients::{ComfortCoefficients, Formula, Scaling};
pub use rules::{AdviceRule, AdviceRules, Op};
pub use score::{ComfortResult, ComfortScorer, DayWeather, Sex};
