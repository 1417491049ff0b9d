//! Learning Energy Profile scoring.
//!
//! The item registry defines the instrument, the scoring engine turns answers into
//! 0-100 construct scores, and the assembler combines scores, levels, and response
//! quality into the [`Profile`] handed to reporting and the HTTP layer.

mod assembler;
pub mod chronotype;
mod config;
pub mod domain;
pub mod levels;
pub mod quality;
pub mod registry;
pub mod report;
pub mod router;
pub mod scoring;

pub use assembler::{
    AdditionalIndex, DimensionScore, Profile, ProfileAssembler, ProfileMeta,
    PROFILE_SCHEMA_VERSION,
};
pub use chronotype::{ChronotypeBalance, Orientation};
pub use config::ScoringConfig;
pub use domain::{
    AdditionalIndexKind, Construct, Dimension, Direction, ItemDefinition, Likert,
    RatingOutOfRange, ResponseSet,
};
pub use levels::{Level, LevelThresholds};
pub use quality::{QualityFlag, QualityThresholds, QualityWarning, ResponseQuality};
pub use registry::{ItemRegistry, RegistryError};
pub use report::TextReport;
pub use router::{profile_router, ProfileRequest, ProfileResponse};
pub use scoring::{ConstructScore, ScoreSheet, ScoringEngine};
