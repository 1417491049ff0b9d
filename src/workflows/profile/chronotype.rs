use super::domain::{AdditionalIndexKind, Construct, ResponseSet};
use super::registry::{ItemRegistry, CHRONOTYPE_EVENING, CHRONOTYPE_MORNING};
use serde::Serialize;

/// `|balance|` at or above this leans clearly towards one end.
pub const ORIENTATION_CUTOFF: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Morning,
    Neutral,
    Evening,
}

impl Orientation {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Morning => "Morning type",
            Self::Neutral => "Neutral",
            Self::Evening => "Evening type",
        }
    }
}

/// Morning/evening balance on raw ratings, from -1 (morning) to +1 (evening).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChronotypeBalance {
    pub morning_mean: f64,
    pub evening_mean: f64,
    pub balance_score: f64,
    pub orientation: Orientation,
}

pub fn chronotype_balance(
    registry: &ItemRegistry,
    responses: &ResponseSet,
) -> Option<ChronotypeBalance> {
    let construct = Construct::Index(AdditionalIndexKind::Chronotype);
    let (scale_min, scale_max) = registry.scale();
    let morning_mean = facet_mean(registry, construct, CHRONOTYPE_MORNING, responses)?;
    let evening_mean = facet_mean(registry, construct, CHRONOTYPE_EVENING, responses)?;

    let span = f64::from(scale_max) - f64::from(scale_min);
    let balance_score = ((evening_mean - morning_mean) / span).clamp(-1.0, 1.0);
    let orientation = if balance_score <= -ORIENTATION_CUTOFF {
        Orientation::Morning
    } else if balance_score >= ORIENTATION_CUTOFF {
        Orientation::Evening
    } else {
        Orientation::Neutral
    };

    Some(ChronotypeBalance {
        morning_mean,
        evening_mean,
        balance_score,
        orientation,
    })
}

fn facet_mean(
    registry: &ItemRegistry,
    construct: Construct,
    facet: &str,
    responses: &ResponseSet,
) -> Option<f64> {
    let (sum, count) = registry
        .items_in_facet(construct, facet)
        .filter_map(|item| responses.rating(item.code))
        .fold((0u32, 0u32), |(sum, count), rating| {
            (sum + u32::from(rating.value()), count + 1)
        });

    (count > 0).then(|| f64::from(sum) / f64::from(count))
}
