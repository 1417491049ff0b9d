use super::domain::{Construct, ConstructId, Likert, ResponseSet};
use super::registry::ItemRegistry;
use serde::{Deserialize, Serialize, Serializer};

/// Population variance below which a respondent is treated as disengaged.
pub const DEFAULT_MIN_ENGAGEMENT_VARIANCE: f64 = 0.5;
pub const DEFAULT_EXTREME_RESPONSE_LIMIT: f64 = 0.5;
pub const DEFAULT_ACQUIESCENCE_LIMIT: f64 = 0.8;
pub const DEFAULT_MIN_CONSTRUCT_COVERAGE: f64 = 0.5;
/// Constructs scored from fewer answered items are reported as low coverage.
pub const MIN_ITEMS_PER_CONSTRUCT: usize = 2;

/// Tunable limits for the engagement diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    pub min_engagement_variance: f64,
    pub extreme_response_limit: f64,
    pub acquiescence_limit: f64,
    pub min_construct_coverage: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_engagement_variance: DEFAULT_MIN_ENGAGEMENT_VARIANCE,
            extreme_response_limit: DEFAULT_EXTREME_RESPONSE_LIMIT,
            acquiescence_limit: DEFAULT_ACQUIESCENCE_LIMIT,
            min_construct_coverage: DEFAULT_MIN_CONSTRUCT_COVERAGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityFlag {
    Ok,
    Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityWarning {
    StraightLining,
    LowVariance,
    ExtremeResponding,
    Acquiescence,
    Incomplete,
    LowCoverage,
}

impl QualityWarning {
    pub const fn label(self) -> &'static str {
        match self {
            Self::StraightLining => "only one distinct answer was given",
            Self::LowVariance => "answers vary less than the engagement minimum",
            Self::ExtremeResponding => "answers cluster at the scale endpoints",
            Self::Acquiescence => "answers lean strongly towards agreement",
            Self::Incomplete => "not every item was answered",
            Self::LowCoverage => "some constructs rest on too few answered items",
        }
    }
}

/// Engagement diagnostics for one respondent. Informational only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseQuality {
    pub completeness_ratio: f64,
    pub variance_flag: bool,
    pub extreme_response_ratio: f64,
    pub answered_items: usize,
    pub expected_items: usize,
    pub rating_variance: Option<f64>,
    #[serde(rename = "num_unique_responses")]
    pub unique_responses: usize,
    pub acquiescence_ratio: f64,
    pub low_coverage_constructs: Vec<ConstructId>,
    pub quality_flag: QualityFlag,
    /// Serialized as `null` when nothing was flagged.
    #[serde(serialize_with = "serialize_warnings")]
    pub warnings: Vec<QualityWarning>,
}

fn serialize_warnings<S>(warnings: &[QualityWarning], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if warnings.is_empty() {
        serializer.serialize_none()
    } else {
        serializer.collect_seq(warnings)
    }
}

impl ResponseQuality {
    pub fn has_warning(&self, warning: QualityWarning) -> bool {
        self.warnings.contains(&warning)
    }
}

pub struct QualityAssessor<'r> {
    registry: &'r ItemRegistry,
    thresholds: QualityThresholds,
}

impl<'r> QualityAssessor<'r> {
    pub fn new(registry: &'r ItemRegistry, thresholds: QualityThresholds) -> Self {
        Self {
            registry,
            thresholds,
        }
    }

    pub fn assess(&self, responses: &ResponseSet) -> ResponseQuality {
        let ratings: Vec<Likert> = self
            .registry
            .items()
            .iter()
            .filter_map(|item| responses.rating(item.code))
            .collect();

        let answered = ratings.len();
        let expected = self.registry.len();
        let completeness_ratio = ratio(answered, expected);
        let rating_variance = population_variance(&ratings);
        let variance_flag = rating_variance
            .map(|variance| variance < self.thresholds.min_engagement_variance)
            .unwrap_or(false);
        let (scale_min, scale_max) = self.registry.scale();
        let extreme_response_ratio = ratio(
            ratings
                .iter()
                .filter(|rating| rating.is_extreme(scale_min, scale_max))
                .count(),
            answered,
        );
        let acquiescence_ratio = ratio(
            ratings.iter().filter(|rating| rating.value() >= 4).count(),
            answered,
        );

        let mut distinct: Vec<u8> = ratings.iter().map(|rating| rating.value()).collect();
        distinct.sort_unstable();
        distinct.dedup();
        let unique_responses = distinct.len();

        let low_coverage_constructs = self.low_coverage_constructs(responses);

        let mut warnings = Vec::new();
        if answered >= 2 && unique_responses == 1 {
            warnings.push(QualityWarning::StraightLining);
        }
        if variance_flag {
            warnings.push(QualityWarning::LowVariance);
        }
        if answered > 0 && extreme_response_ratio >= self.thresholds.extreme_response_limit {
            warnings.push(QualityWarning::ExtremeResponding);
        }
        if answered > 0 && acquiescence_ratio >= self.thresholds.acquiescence_limit {
            warnings.push(QualityWarning::Acquiescence);
        }
        if answered < expected {
            warnings.push(QualityWarning::Incomplete);
        }
        if !low_coverage_constructs.is_empty() {
            warnings.push(QualityWarning::LowCoverage);
        }

        let quality_flag = if warnings.is_empty() {
            QualityFlag::Ok
        } else {
            QualityFlag::Check
        };

        ResponseQuality {
            completeness_ratio,
            variance_flag,
            extreme_response_ratio,
            answered_items: answered,
            expected_items: expected,
            rating_variance,
            unique_responses,
            acquiescence_ratio,
            low_coverage_constructs,
            quality_flag,
            warnings,
        }
    }

    fn low_coverage_constructs(&self, responses: &ResponseSet) -> Vec<ConstructId> {
        Construct::ordered()
            .into_iter()
            .filter(|&construct| {
                let (total, answered) = self.registry.items_for(construct).fold(
                    (0usize, 0usize),
                    |(total, answered), item| {
                        let hit = usize::from(responses.rating(item.code).is_some());
                        (total + 1, answered + hit)
                    },
                );
                answered < MIN_ITEMS_PER_CONSTRUCT
                    || ratio(answered, total) < self.thresholds.min_construct_coverage
            })
            .map(ConstructId)
            .collect()
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Population variance; undefined below two ratings.
fn population_variance(ratings: &[Likert]) -> Option<f64> {
    if ratings.len() < 2 {
        return None;
    }

    let count = ratings.len() as f64;
    let mean = ratings.iter().map(|r| f64::from(r.value())).sum::<f64>() / count;
    let squared = ratings
        .iter()
        .map(|r| (f64::from(r.value()) - mean).powi(2))
        .sum::<f64>();
    Some(squared / count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::profile::domain::{Dimension, ItemDefinition};

    fn registry() -> ItemRegistry {
        ItemRegistry::standard().expect("standard registry")
    }

    fn uniform(registry: &ItemRegistry, value: i64) -> ResponseSet {
        let rating = Likert::new(value).expect("valid rating");
        registry
            .items()
            .iter()
            .map(|item| (item.code, rating))
            .collect()
    }

    #[test]
    fn straight_lining_is_flagged() {
        let registry = registry();
        let quality = QualityAssessor::new(&registry, QualityThresholds::default())
            .assess(&uniform(&registry, 3));

        assert_eq!(quality.unique_responses, 1);
        assert_eq!(quality.rating_variance, Some(0.0));
        assert!(quality.variance_flag);
        assert_eq!(quality.quality_flag, QualityFlag::Check);
        assert!(quality.has_warning(QualityWarning::StraightLining));
        assert_eq!(quality.completeness_ratio, 1.0);
        assert_eq!(quality.extreme_response_ratio, 0.0);
    }

    #[test]
    fn rotating_answers_pass_cleanly() {
        let registry = registry();
        let responses: ResponseSet = registry
            .items()
            .iter()
            .enumerate()
            .map(|(i, item)| (item.code, Likert::new((i % 5) as i64 + 1).expect("valid")))
            .collect();

        let quality =
            QualityAssessor::new(&registry, QualityThresholds::default()).assess(&responses);

        assert_eq!(quality.unique_responses, 5);
        assert!(!quality.variance_flag);
        assert_eq!(quality.quality_flag, QualityFlag::Ok);
        assert!(quality.warnings.is_empty());
    }

    #[test]
    fn extreme_and_agreeing_patterns_are_reported() {
        let registry = registry();
        let quality = QualityAssessor::new(&registry, QualityThresholds::default())
            .assess(&uniform(&registry, 5));

        assert_eq!(quality.extreme_response_ratio, 1.0);
        assert_eq!(quality.acquiescence_ratio, 1.0);
        assert!(quality.has_warning(QualityWarning::ExtremeResponding));
        assert!(quality.has_warning(QualityWarning::Acquiescence));
    }

    #[test]
    fn completeness_tracks_registry_size_not_input_size() {
        let registry = registry();
        let rating = Likert::new(2).expect("valid");
        let mut responses: ResponseSet = registry
            .items()
            .iter()
            .take(10)
            .map(|item| (item.code, rating))
            .collect();
        responses.record("NOT_AN_ITEM", rating);

        let quality =
            QualityAssessor::new(&registry, QualityThresholds::default()).assess(&responses);

        assert_eq!(quality.answered_items, 10);
        assert_eq!(quality.expected_items, 88);
        assert!((quality.completeness_ratio - 10.0 / 88.0).abs() < 1e-12);
        assert!(quality.has_warning(QualityWarning::Incomplete));
    }

    #[test]
    fn completeness_is_monotonic_in_answers() {
        let registry = registry();
        let assessor = QualityAssessor::new(&registry, QualityThresholds::default());
        let rating = Likert::new(4).expect("valid");
        let mut responses = ResponseSet::new();
        let mut previous = assessor.assess(&responses).completeness_ratio;

        for item in registry.items() {
            responses.record(item.code, rating);
            let current = assessor.assess(&responses).completeness_ratio;
            assert!(current >= previous);
            previous = current;
        }
        assert_eq!(previous, 1.0);
    }

    #[test]
    fn sparse_constructs_are_low_coverage() {
        let registry = registry();
        let rating = Likert::new(4).expect("valid");
        let mut responses = uniform(&registry, 2);
        for item in registry.items_for(Construct::Dimension(Dimension::Sensory)) {
            responses.mark_missing(item.code);
        }
        responses.record("S1", rating);

        let quality =
            QualityAssessor::new(&registry, QualityThresholds::default()).assess(&responses);

        assert_eq!(
            quality.low_coverage_constructs,
            vec![ConstructId(Construct::Dimension(Dimension::Sensory))]
        );
        assert!(quality.has_warning(QualityWarning::LowCoverage));
    }

    #[test]
    fn empty_input_yields_no_variance() {
        let registry = registry();
        let quality = QualityAssessor::new(&registry, QualityThresholds::default())
            .assess(&ResponseSet::new());

        assert_eq!(quality.answered_items, 0);
        assert_eq!(quality.rating_variance, None);
        assert!(!quality.variance_flag);
        assert_eq!(quality.completeness_ratio, 0.0);
        assert_eq!(quality.low_coverage_constructs.len(), 8);
    }

    fn first_items(registry: &ItemRegistry, values: &[i64]) -> ResponseSet {
        registry
            .items()
            .iter()
            .zip(values)
            .map(|(item, &value)| (item.code, Likert::new(value).expect("valid rating")))
            .collect()
    }

    #[test]
    fn variance_at_the_engagement_minimum_is_not_flagged() {
        let registry = registry();
        let assessor = QualityAssessor::new(&registry, QualityThresholds::default());

        let at_limit = assessor.assess(&first_items(&registry, &[2, 3, 4, 3]));
        assert_eq!(at_limit.rating_variance, Some(0.5));
        assert!(!at_limit.variance_flag);
        assert!(!at_limit.has_warning(QualityWarning::LowVariance));

        let below = assessor.assess(&first_items(&registry, &[3, 3, 3, 4]));
        assert_eq!(below.rating_variance, Some(0.1875));
        assert!(below.variance_flag);
        assert!(below.has_warning(QualityWarning::LowVariance));
    }

    #[test]
    fn engagement_minimum_is_configurable() {
        let registry = registry();
        let thresholds = QualityThresholds {
            min_engagement_variance: 0.6,
            ..QualityThresholds::default()
        };

        let responses = first_items(&registry, &[2, 3, 4, 3]);
        let quality = QualityAssessor::new(&registry, thresholds).assess(&responses);
        assert!(quality.variance_flag);
    }

    #[test]
    fn extreme_ratio_uses_the_registry_scale() {
        let items = registry()
            .items()
            .iter()
            .map(|item| ItemDefinition {
                scale_max: 4,
                ..item.clone()
            })
            .collect();
        let registry = ItemRegistry::new(items).expect("four-point registry");

        let quality = QualityAssessor::new(&registry, QualityThresholds::default())
            .assess(&uniform(&registry, 4));
        assert_eq!(quality.extreme_response_ratio, 1.0);
        assert!(quality.has_warning(QualityWarning::ExtremeResponding));
    }

    #[test]
    fn quality_serializes_with_profile_keys() {
        let registry = registry();
        let responses: ResponseSet = registry
            .items()
            .iter()
            .enumerate()
            .map(|(i, item)| (item.code, Likert::new((i % 5) as i64 + 1).expect("valid")))
            .collect();
        let clean =
            QualityAssessor::new(&registry, QualityThresholds::default()).assess(&responses);

        let value = serde_json::to_value(&clean).expect("serialize quality");
        assert_eq!(value["num_unique_responses"], 5);
        assert!(value.get("unique_responses").is_none());
        assert!(value["warnings"].is_null());

        let flagged = QualityAssessor::new(&registry, QualityThresholds::default())
            .assess(&uniform(&registry, 3));
        let value = serde_json::to_value(&flagged).expect("serialize quality");
        assert_eq!(value["warnings"][0], "straight_lining");
    }
}
