use super::domain::{
    AdditionalIndexKind, Construct, Dimension, Direction, ItemDefinition,
};
use std::collections::HashMap;

/// Malformed scoring definitions. Always fatal at startup, never per respondent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("item code '{0}' is defined more than once")]
    DuplicateCode(&'static str),
    #[error("construct '{0}' has no items mapped to it")]
    EmptyConstruct(Construct),
    #[error("item '{code}' has an invalid scale {min}-{max}")]
    InvalidScale {
        code: &'static str,
        min: u8,
        max: u8,
    },
    #[error("item '{code}' uses scale {min}-{max}, expected {expected_min}-{expected_max}")]
    MixedScales {
        code: &'static str,
        min: u8,
        max: u8,
        expected_min: u8,
        expected_max: u8,
    },
}

/// Immutable lookup of item definitions, built once and shared between runs.
#[derive(Debug, Clone)]
pub struct ItemRegistry {
    items: Vec<ItemDefinition>,
    index: HashMap<&'static str, usize>,
}

impl ItemRegistry {
    /// The canonical 88-item instrument.
    pub fn standard() -> Result<Self, RegistryError> {
        Self::new(standard_item_definitions())
    }

    pub fn new(items: Vec<ItemDefinition>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(items.len());
        let mut scale: Option<(u8, u8)> = None;

        for (position, item) in items.iter().enumerate() {
            if item.scale_min >= item.scale_max {
                return Err(RegistryError::InvalidScale {
                    code: item.code,
                    min: item.scale_min,
                    max: item.scale_max,
                });
            }

            match scale {
                None => scale = Some((item.scale_min, item.scale_max)),
                Some((min, max)) if (min, max) != (item.scale_min, item.scale_max) => {
                    return Err(RegistryError::MixedScales {
                        code: item.code,
                        min: item.scale_min,
                        max: item.scale_max,
                        expected_min: min,
                        expected_max: max,
                    });
                }
                Some(_) => {}
            }

            if index.insert(item.code, position).is_some() {
                return Err(RegistryError::DuplicateCode(item.code));
            }
        }

        for construct in Construct::ordered() {
            if !items.iter().any(|item| item.construct == construct) {
                return Err(RegistryError::EmptyConstruct(construct));
            }
        }

        Ok(Self { items, index })
    }

    pub fn lookup(&self, code: &str) -> Option<&ItemDefinition> {
        self.index.get(code).map(|&position| &self.items[position])
    }

    pub fn items(&self) -> &[ItemDefinition] {
        &self.items
    }

    pub fn items_for(&self, construct: Construct) -> impl Iterator<Item = &ItemDefinition> {
        self.items
            .iter()
            .filter(move |item| item.construct == construct)
    }

    pub fn items_in_facet<'a>(
        &'a self,
        construct: Construct,
        facet: &'a str,
    ) -> impl Iterator<Item = &'a ItemDefinition> {
        self.items_for(construct)
            .filter(move |item| item.facet == facet)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Shared `(scale_min, scale_max)`; validated uniform in [`ItemRegistry::new`].
    pub fn scale(&self) -> (u8, u8) {
        self.items
            .first()
            .map(|item| (item.scale_min, item.scale_max))
            .unwrap_or((super::domain::LIKERT_MIN, super::domain::LIKERT_MAX))
    }

    pub fn main_scale_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.construct.is_main_scale())
            .count()
    }

    pub fn additional_count(&self) -> usize {
        self.len() - self.main_scale_count()
    }

    pub fn reverse_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_reverse()).count()
    }

    /// Reverse-coded items inside the six core dimensions.
    pub fn main_reverse_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.construct.is_main_scale() && item.is_reverse())
            .count()
    }
}

pub(crate) const CHRONOTYPE_MORNING: &str = "morning";
pub(crate) const CHRONOTYPE_EVENING: &str = "evening";

const ATT: Construct = Construct::Dimension(Dimension::Attention);
const SEN: Construct = Construct::Dimension(Dimension::Sensory);
const SOC: Construct = Construct::Dimension(Dimension::Social);
const EXE: Construct = Construct::Dimension(Dimension::Executive);
const MOT: Construct = Construct::Dimension(Dimension::Motivation);
const REG: Construct = Construct::Dimension(Dimension::Regulation);
const CHRONO: Construct = Construct::Index(AdditionalIndexKind::Chronotype);
const AVOID: Construct = Construct::Index(AdditionalIndexKind::MotivationAvoidance);

fn standard_item_definitions() -> Vec<ItemDefinition> {
    use Direction::{Normal as N, Reverse as R};

    const TABLE: &[(&str, Construct, &str, Direction)] = &[
        // Attention
        ("A1", ATT, "focus", N),
        ("A2", ATT, "focus", R),
        ("A3", ATT, "focus", N),
        ("A4", ATT, "distractibility", N),
        ("A5", ATT, "distractibility", N),
        ("A6", ATT, "distractibility", R),
        ("A7", ATT, "distractibility", N),
        ("A8", CHRONO, CHRONOTYPE_MORNING, N),
        ("A9", CHRONO, CHRONOTYPE_EVENING, R),
        ("A10", ATT, "sustained", N),
        ("A11", ATT, "sustained", R),
        ("A12", ATT, "sustained", N),
        ("A13", CHRONO, CHRONOTYPE_MORNING, N),
        ("A14", CHRONO, CHRONOTYPE_MORNING, N),
        ("A15", CHRONO, CHRONOTYPE_MORNING, N),
        ("A16", CHRONO, CHRONOTYPE_EVENING, R),
        ("A17", ATT, "switching", N),
        ("A18", ATT, "switching", R),
        ("A19", ATT, "switching", N),
        ("A20", ATT, "switching", R),
        // Sensory
        ("S1", SEN, "sound", N),
        ("S2", SEN, "sound", N),
        ("S3", SEN, "sound", R),
        ("S4", SEN, "sound", N),
        ("S5", SEN, "light", N),
        ("S6", SEN, "light", N),
        ("S7", SEN, "light", R),
        ("S8", SEN, "touch", N),
        ("S9", SEN, "touch", N),
        ("S10", SEN, "touch", R),
        ("S11", SEN, "environment", N),
        ("S12", SEN, "environment", R),
        ("S13", SEN, "environment", N),
        // Social
        ("SO1", SOC, "group", N),
        ("SO2", SOC, "group", R),
        ("SO3", SOC, "group", N),
        ("SO4", SOC, "group", N),
        ("SO5", SOC, "solo", N),
        ("SO6", SOC, "solo", R),
        ("SO7", SOC, "solo", N),
        ("SO8", SOC, "feedback", N),
        ("SO9", SOC, "feedback", R),
        ("SO10", SOC, "feedback", N),
        ("SO11", SOC, "exchange", N),
        ("SO12", SOC, "exchange", N),
        ("SO13", SOC, "exchange", R),
        // Executive functions
        ("E1", EXE, "planning", N),
        ("E2", EXE, "planning", R),
        ("E3", EXE, "planning", N),
        ("E4", EXE, "planning", N),
        ("E5", EXE, "initiation", R),
        ("E6", EXE, "initiation", N),
        ("E7", EXE, "initiation", N),
        ("E8", EXE, "organization", R),
        ("E9", EXE, "organization", N),
        ("E10", EXE, "organization", N),
        ("E11", EXE, "organization", R),
        ("E12", EXE, "time_management", N),
        ("E13", EXE, "time_management", N),
        ("E14", EXE, "time_management", R),
        // Motivation
        ("M1", MOT, "interest", N),
        ("M2", MOT, "interest", N),
        ("M3", MOT, "interest", R),
        ("M4", MOT, "interest", N),
        ("M5", MOT, "goals", N),
        ("M6", MOT, "goals", R),
        ("M7", MOT, "goals", N),
        ("M8", MOT, "reward", N),
        ("M9", MOT, "reward", R),
        ("M10", MOT, "reward", N),
        ("M11", MOT, "persistence", N),
        ("M12", MOT, "persistence", R),
        ("M13", MOT, "persistence", N),
        ("M14", AVOID, "avoidance", N),
        ("M15", AVOID, "avoidance", N),
        // Regulation
        ("R1", REG, "stress", N),
        ("R2", REG, "stress", R),
        ("R3", REG, "stress", N),
        ("R4", REG, "stress", R),
        ("R5", REG, "emotion", N),
        ("R6", REG, "emotion", N),
        ("R7", REG, "emotion", R),
        ("R8", REG, "emotion", N),
        ("R9", REG, "recovery", N),
        ("R10", REG, "recovery", R),
        ("R11", REG, "recovery", N),
        ("R12", REG, "energy", N),
        ("R13", REG, "energy", R),
    ];

    TABLE
        .iter()
        .map(|&(code, construct, facet, direction)| {
            ItemDefinition::likert(code, construct, facet, direction)
        })
        .collect()
}
