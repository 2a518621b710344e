//! Axis weights for the overall match score.
//!
//! Employers may store raw weights on a posting in any scale (e.g. percentages);
//! they are always renormalized so the four weights sum to 1.0.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisWeights {
    pub skills: f64,
    pub experience: f64,
    pub culture_fit: f64,
    pub growth_potential: f64,
}

impl AxisWeights {
    /// Distribution used when a posting has no usable weights. Renormalized on use.
    pub const DEFAULT: AxisWeights = AxisWeights {
        skills: 0.45,
        experience: 0.25,
        culture_fit: 0.15,
        growth_potential: 0.10,
    };

    /// Per-key fallbacks for a partially specified employer map.
    const KEY_FALLBACK: AxisWeights = AxisWeights {
        skills: 0.40,
        experience: 0.30,
        culture_fit: 0.15,
        growth_potential: 0.10,
    };

    /// Resolves a posting's raw `matching_weights` into normalized weights.
    pub fn resolve(raw: Option<&Value>) -> AxisWeights {
        let from_employer = match raw {
            Some(Value::Object(map)) if !map.is_empty() => Some(Self::from_map(map)),
            _ => None,
        };

        match from_employer.and_then(AxisWeights::normalized) {
            Some(weights) => weights,
            None => {
                if from_employer.is_some() {
                    warn!("Employer axis weights sum to zero; using defaults");
                }
                Self::default_normalized()
            }
        }
    }

    pub fn default_normalized() -> AxisWeights {
        Self::DEFAULT
            .normalized()
            .unwrap_or(Self::DEFAULT)
    }

    pub fn sum(&self) -> f64 {
        self.skills + self.experience + self.culture_fit + self.growth_potential
    }

    /// Weighted sum of the four axis scores.
    pub fn apply(&self, skills: f64, experience: f64, culture_fit: f64, growth: f64) -> f64 {
        skills * self.skills
            + experience * self.experience
            + culture_fit * self.culture_fit
            + growth * self.growth_potential
    }

    fn normalized(self) -> Option<AxisWeights> {
        let total = self.sum();
        (total > 0.0 && total.is_finite()).then(|| AxisWeights {
            skills: self.skills / total,
            experience: self.experience / total,
            culture_fit: self.culture_fit / total,
            growth_potential: self.growth_potential / total,
        })
    }

    fn from_map(map: &Map<String, Value>) -> AxisWeights {
        let fb = Self::KEY_FALLBACK;
        AxisWeights {
            skills: read_weight(map, &["skills"], fb.skills),
            experience: read_weight(map, &["experience"], fb.experience),
            culture_fit: read_weight(map, &["culture_fit"], fb.culture_fit),
            growth_potential: read_weight(map, &["growth_potential", "growth"], fb.growth_potential),
        }
    }
}

/// A present key counts even when unusable: negative or non-numeric values become 0.
fn read_weight(map: &Map<String, Value>, keys: &[&str], fallback: f64) -> f64 {
    let Some(value) = keys.iter().find_map(|k| map.get(*k)) else {
        return fallback;
    };
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(0.0)
}
