use super::chronotype::{chronotype_balance, ChronotypeBalance};
use super::config::ScoringConfig;
use super::domain::{AdditionalIndexKind, Construct, Dimension, ResponseSet};
use super::levels::Level;
use super::quality::{QualityAssessor, ResponseQuality};
use super::registry::{ItemRegistry, RegistryError};
use super::scoring::{ConstructScore, ScoringEngine};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::sync::Arc;
use tracing::debug;

pub const PROFILE_SCHEMA_VERSION: &str = "0.2.1";

/// Scored core dimension as handed to presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionScore {
    #[serde(skip)]
    pub dimension: Dimension,
    pub raw_mean: Option<f64>,
    pub score: Option<f64>,
    pub level: Level,
    pub item_count_used: usize,
    pub missing_count: usize,
}

/// Scored supplementary construct; never folded into the core dimensions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdditionalIndex {
    #[serde(skip)]
    pub index: AdditionalIndexKind,
    pub raw_mean: Option<f64>,
    pub score: Option<f64>,
    pub level: Level,
    pub item_count_used: usize,
    pub missing_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<ChronotypeBalance>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileMeta {
    pub version: &'static str,
    pub generated_at: DateTime<Utc>,
    pub num_items_instrument: usize,
    pub num_items_answered: usize,
    pub num_items_main_scales: usize,
    pub num_items_additional: usize,
    /// Reverse-coded items in the main scales.
    #[serde(rename = "num_reversed_total")]
    pub num_reversed_items: usize,
}

/// The Learning Energy Profile for one respondent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub id: String,
    #[serde(serialize_with = "serialize_keyed")]
    pub dimensions: Vec<DimensionScore>,
    #[serde(serialize_with = "serialize_keyed")]
    pub additional_indices: Vec<AdditionalIndex>,
    pub response_quality: ResponseQuality,
    pub meta: ProfileMeta,
}

impl Profile {
    pub fn dimension(&self, dimension: Dimension) -> Option<&DimensionScore> {
        self.dimensions
            .iter()
            .find(|entry| entry.dimension == dimension)
    }

    pub fn additional_index(&self, index: AdditionalIndexKind) -> Option<&AdditionalIndex> {
        self.additional_indices
            .iter()
            .find(|entry| entry.index == index)
    }
}

trait Keyed {
    fn key(&self) -> &'static str;
}

impl Keyed for DimensionScore {
    fn key(&self) -> &'static str {
        self.dimension.id()
    }
}

impl Keyed for AdditionalIndex {
    fn key(&self) -> &'static str {
        self.index.id()
    }
}

/// Emits entries as a JSON object keyed by construct id, preserving order.
#[allow(clippy::ptr_arg)]
fn serialize_keyed<T, S>(entries: &Vec<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Keyed + Serialize,
    S: Serializer,
{
    serializer.collect_map(entries.iter().map(|entry| (entry.key(), entry)))
}

/// Runs scoring, classification, and quality assessment for one respondent.
#[derive(Debug, Clone)]
pub struct ProfileAssembler {
    registry: Arc<ItemRegistry>,
    config: ScoringConfig,
}

impl ProfileAssembler {
    pub fn new(registry: Arc<ItemRegistry>, config: ScoringConfig) -> Self {
        Self { registry, config }
    }

    /// Standard 88-item registry with default thresholds.
    pub fn standard() -> Result<Self, RegistryError> {
        Ok(Self::new(
            Arc::new(ItemRegistry::standard()?),
            ScoringConfig::default(),
        ))
    }

    pub fn registry(&self) -> &ItemRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn assemble(&self, id: impl Into<String>, responses: &ResponseSet) -> Profile {
        self.assemble_at(id, responses, Utc::now())
    }

    /// Same as [`ProfileAssembler::assemble`] with a caller-supplied timestamp.
    pub fn assemble_at(
        &self,
        id: impl Into<String>,
        responses: &ResponseSet,
        generated_at: DateTime<Utc>,
    ) -> Profile {
        let id = id.into();
        let registry = self.registry.as_ref();
        let sheet = ScoringEngine::new(registry).score(responses);
        let response_quality = QualityAssessor::new(registry, self.config.quality).assess(responses);
        let levels = self.config.levels;

        let mut dimensions = Vec::with_capacity(Dimension::ordered().len());
        let mut additional_indices = Vec::with_capacity(AdditionalIndexKind::ordered().len());

        for (construct, score) in sheet.iter() {
            let level = levels.classify(score.normalized_score);
            match construct {
                Construct::Dimension(dimension) => {
                    dimensions.push(dimension_entry(dimension, score, level));
                }
                Construct::Index(index) => {
                    let balance = match index {
                        AdditionalIndexKind::Chronotype => chronotype_balance(registry, responses),
                        AdditionalIndexKind::MotivationAvoidance => None,
                    };
                    additional_indices.push(index_entry(index, score, level, balance));
                }
            }
        }

        let meta = ProfileMeta {
            version: PROFILE_SCHEMA_VERSION,
            generated_at,
            num_items_instrument: registry.len(),
            num_items_answered: response_quality.answered_items,
            num_items_main_scales: registry.main_scale_count(),
            num_items_additional: registry.additional_count(),
            num_reversed_items: registry.main_reverse_count(),
        };

        debug!(
            profile_id = %id,
            answered = response_quality.answered_items,
            quality = ?response_quality.quality_flag,
            "profile assembled"
        );

        Profile {
            id,
            dimensions,
            additional_indices,
            response_quality,
            meta,
        }
    }
}

fn dimension_entry(dimension: Dimension, score: &ConstructScore, level: Level) -> DimensionScore {
    DimensionScore {
        dimension,
        raw_mean: score.raw_mean,
        score: score.normalized_score,
        level,
        item_count_used: score.item_count_used,
        missing_count: score.missing_count,
    }
}

fn index_entry(
    index: AdditionalIndexKind,
    score: &ConstructScore,
    level: Level,
    balance: Option<ChronotypeBalance>,
) -> AdditionalIndex {
    AdditionalIndex {
        index,
        raw_mean: score.raw_mean,
        score: score.normalized_score,
        level,
        item_count_used: score.item_count_used,
        missing_count: score.missing_count,
        balance,
    }
}
