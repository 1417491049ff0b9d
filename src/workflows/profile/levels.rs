use serde::{Deserialize, Serialize};

/// Lower bound (inclusive) of the `medium` band.
pub const DEFAULT_MEDIUM_FROM: f64 = 40.0;
/// Lower bound (inclusive) of the `high` band; the band is closed at 100.
pub const DEFAULT_HIGH_FROM: f64 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    Medium,
    High,
    InsufficientData,
}

impl Level {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::InsufficientData => "Insufficient data",
        }
    }
}

/// Cut points partitioning the 0-100 scale into low / medium / high.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelThresholds {
    pub medium_from: f64,
    pub high_from: f64,
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            medium_from: DEFAULT_MEDIUM_FROM,
            high_from: DEFAULT_HIGH_FROM,
        }
    }
}

impl LevelThresholds {
    pub fn is_valid(&self) -> bool {
        0.0 < self.medium_from && self.medium_from < self.high_from && self.high_from <= 100.0
    }

    pub fn classify(&self, score: Option<f64>) -> Level {
        match score {
            None => Level::InsufficientData,
            Some(value) if value.is_nan() => Level::InsufficientData,
            Some(value) if value < self.medium_from => Level::Low,
            Some(value) if value < self.high_from => Level::Medium,
            Some(_) => Level::High,
        }
    }
}
