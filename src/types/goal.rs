use serde::{Deserialize, Serialize};

/// Minimum/maximum target for one goal level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalBand {
    pub level: String,
    pub min: f64,
    pub max: f64,
}

impl GoalBand {
    /// Source data does not guarantee `max >= min`, so `max` is clamped up to `min`.
    pub fn new(level: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            level: level.into(),
            min,
            max: max.max(min),
        }
    }

    /// Classify an actual value against this band.
    pub fn classify(&self, value: f64) -> Classification {
        Classification::of(value, self.min, self.max)
    }
}

/// Where an actual value sits relative to a goal band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Classification {
    Below,
    Met,
    Exceeded,
}

impl Classification {
    /// `value < min` is below, `value > max` is exceeded, both bounds count as met.
    pub fn of(value: f64, min: f64, max: f64) -> Self {
        if value < min {
            Classification::Below
        } else if value > max {
            Classification::Exceeded
        } else {
            Classification::Met
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Below => "below",
            Classification::Met => "met",
            Classification::Exceeded => "exceeded",
        }
    }
}
