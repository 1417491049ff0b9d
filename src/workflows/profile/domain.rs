use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const LIKERT_MIN: u8 = 1;
pub const LIKERT_MAX: u8 = 5;

/// The six core constructs reported by the profile, in canonical report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Attention,
    Sensory,
    Social,
    Executive,
    Motivation,
    Regulation,
}

impl Dimension {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Attention,
            Self::Sensory,
            Self::Social,
            Self::Executive,
            Self::Motivation,
            Self::Regulation,
        ]
    }

    pub const fn id(self) -> &'static str {
        match self {
            Self::Attention => "attention",
            Self::Sensory => "sensory",
            Self::Social => "social",
            Self::Executive => "executive",
            Self::Motivation => "motivation",
            Self::Regulation => "regulation",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Attention => "Attention",
            Self::Sensory => "Sensory Processing",
            Self::Social => "Social Learning",
            Self::Executive => "Executive Functions",
            Self::Motivation => "Motivation",
            Self::Regulation => "Self-Regulation",
        }
    }
}

/// Supplementary constructs reported separately from the core dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdditionalIndexKind {
    Chronotype,
    MotivationAvoidance,
}

impl AdditionalIndexKind {
    pub const fn ordered() -> [Self; 2] {
        [Self::Chronotype, Self::MotivationAvoidance]
    }

    pub const fn id(self) -> &'static str {
        match self {
            Self::Chronotype => "chronotype",
            Self::MotivationAvoidance => "motivation_avoidance",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Chronotype => "Chronotype (morning orientation)",
            Self::MotivationAvoidance => "Motivation Avoidance",
        }
    }
}

/// Anything an item can be scored into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Construct {
    Dimension(Dimension),
    Index(AdditionalIndexKind),
}

impl Construct {
    /// Every construct: dimensions first, then additional indices.
    pub fn ordered() -> Vec<Self> {
        Dimension::ordered()
            .into_iter()
            .map(Self::Dimension)
            .chain(AdditionalIndexKind::ordered().into_iter().map(Self::Index))
            .collect()
    }

    pub const fn id(self) -> &'static str {
        match self {
            Self::Dimension(dimension) => dimension.id(),
            Self::Index(index) => index.id(),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Dimension(dimension) => dimension.label(),
            Self::Index(index) => index.label(),
        }
    }

    pub const fn is_main_scale(self) -> bool {
        matches!(self, Self::Dimension(_))
    }
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Serializes a construct as its flat id (`"sensory"`) instead of the tagged enum form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstructId(pub Construct);

impl Serialize for ConstructId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Normal,
    Reverse,
}

/// One questionnaire statement and how it feeds its construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDefinition {
    pub code: &'static str,
    pub construct: Construct,
    pub facet: &'static str,
    pub direction: Direction,
    pub scale_min: u8,
    pub scale_max: u8,
}

impl ItemDefinition {
    pub const fn likert(
        code: &'static str,
        construct: Construct,
        facet: &'static str,
        direction: Direction,
    ) -> Self {
        Self {
            code,
            construct,
            facet,
            direction,
            scale_min: LIKERT_MIN,
            scale_max: LIKERT_MAX,
        }
    }

    pub fn is_reverse(&self) -> bool {
        self.direction == Direction::Reverse
    }

    /// Rating after direction coding; reverse items map `r` to `min + max - r`.
    pub fn coded_value(&self, rating: Likert) -> u8 {
        match self.direction {
            Direction::Normal => rating.value(),
            Direction::Reverse => (self.scale_min + self.scale_max).saturating_sub(rating.value()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rating {0} is outside the Likert range 1-5")]
pub struct RatingOutOfRange(pub i64);

/// A validated 1-5 rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Likert(u8);

impl Likert {
    pub fn new(value: i64) -> Result<Self, RatingOutOfRange> {
        if (LIKERT_MIN as i64..=LIKERT_MAX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(RatingOutOfRange(value))
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    pub const fn reversed(self) -> Self {
        Self(LIKERT_MIN + LIKERT_MAX - self.0)
    }

    /// Whether the rating sits on either endpoint of `scale_min..=scale_max`.
    pub const fn is_extreme(self, scale_min: u8, scale_max: u8) -> bool {
        self.0 == scale_min || self.0 == scale_max
    }
}

/// Inverts a raw 1-5 rating (1<->5, 2<->4, 3->3).
pub fn reverse_likert(value: i64) -> Result<u8, RatingOutOfRange> {
    Likert::new(value).map(|rating| rating.reversed().value())
}

/// One respondent's answers keyed by item code. `None` marks an explicit "missing".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseSet {
    ratings: BTreeMap<String, Option<Likert>>,
}

impl ResponseSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, code: impl Into<String>, rating: Likert) {
        self.ratings.insert(code.into(), Some(rating));
    }

    pub fn mark_missing(&mut self, code: impl Into<String>) {
        self.ratings.insert(code.into(), None);
    }

    /// Builds a set from raw integers, rejecting anything outside 1-5.
    pub fn from_raw<I, K>(entries: I) -> Result<Self, RatingOutOfRange>
    where
        I: IntoIterator<Item = (K, Option<i64>)>,
        K: Into<String>,
    {
        let mut set = Self::new();
        for (code, raw) in entries {
            match raw {
                Some(value) => set.record(code, Likert::new(value)?),
                None => set.mark_missing(code),
            }
        }
        Ok(set)
    }

    /// Present rating for `code`; missing and unknown codes both yield `None`.
    pub fn rating(&self, code: &str) -> Option<Likert> {
        self.ratings.get(code).copied().flatten()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.ratings.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<Likert>)> {
        self.ratings.iter().map(|(code, rating)| (code.as_str(), *rating))
    }
}

impl<K: Into<String>> FromIterator<(K, Likert)> for ResponseSet {
    fn from_iter<T: IntoIterator<Item = (K, Likert)>>(iter: T) -> Self {
        let mut set = Self::new();
        for (code, rating) in iter {
            set.record(code, rating);
        }
        set
    }
}
