use super::domain::{Construct, ResponseSet};
use super::registry::ItemRegistry;
use std::collections::BTreeMap;

/// Aggregate for one construct before level classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstructScore {
    pub raw_mean: Option<f64>,
    pub normalized_score: Option<f64>,
    pub item_count_used: usize,
    pub missing_count: usize,
}

impl ConstructScore {
    pub fn is_insufficient(&self) -> bool {
        self.normalized_score.is_none()
    }

    pub fn item_count_total(&self) -> usize {
        self.item_count_used + self.missing_count
    }
}

/// Construct scores keyed in canonical order (dimensions, then additional indices).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreSheet {
    scores: BTreeMap<Construct, ConstructScore>,
}

impl ScoreSheet {
    pub fn get(&self, construct: Construct) -> Option<&ConstructScore> {
        self.scores.get(&construct)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Construct, &ConstructScore)> {
        self.scores.iter().map(|(construct, score)| (*construct, score))
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Stateless item-to-construct aggregation over a shared registry.
pub struct ScoringEngine<'r> {
    registry: &'r ItemRegistry,
}

impl<'r> ScoringEngine<'r> {
    pub fn new(registry: &'r ItemRegistry) -> Self {
        Self { registry }
    }

    pub fn score(&self, responses: &ResponseSet) -> ScoreSheet {
        let scores = Construct::ordered()
            .into_iter()
            .map(|construct| (construct, self.score_construct(construct, responses)))
            .collect();

        ScoreSheet { scores }
    }

    pub fn score_construct(&self, construct: Construct, responses: &ResponseSet) -> ConstructScore {
        let (scale_min, scale_max) = self.registry.scale();
        let mut sum = 0u32;
        let mut used = 0usize;
        let mut missing = 0usize;

        for item in self.registry.items_for(construct) {
            match responses.rating(item.code) {
                Some(rating) => {
                    sum += u32::from(item.coded_value(rating));
                    used += 1;
                }
                None => missing += 1,
            }
        }

        let raw_mean = (used > 0).then(|| f64::from(sum) / used as f64);
        let normalized_score = raw_mean.map(|mean| normalize(mean, scale_min, scale_max));

        ConstructScore {
            raw_mean,
            normalized_score,
            item_count_used: used,
            missing_count: missing,
        }
    }
}

/// Linear rescale of a mean on `[min, max]` to `[0, 100]`, clamped.
pub fn normalize(mean: f64, scale_min: u8, scale_max: u8) -> f64 {
    let span = f64::from(scale_max) - f64::from(scale_min);
    ((mean - f64::from(scale_min)) / span * 100.0).clamp(0.0, 100.0)
}
