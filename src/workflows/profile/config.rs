use super::levels::LevelThresholds;
use super::quality::QualityThresholds;
use serde::{Deserialize, Serialize};

/// Tunable scoring parameters shared by every assembly run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub levels: LevelThresholds,
    pub quality: QualityThresholds,
}
