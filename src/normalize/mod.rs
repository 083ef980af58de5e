// src/normalize/mod.rs
//! Pure label derivation: species, goal categories, tree types.
pub mod goals;
pub mod species;
pub mod tree_type;

pub use goals::{CategoryMatch, GoalCategorizer};
pub use species::SpeciesNormalizer;
pub use tree_type::TreeTypeAggregator;

use crate::config::PipelineConfig;

/// The three normalizers built from one configuration.
#[derive(Debug, Clone)]
pub struct Normalizers {
    pub species: SpeciesNormalizer,
    pub goals: GoalCategorizer,
    pub tree_types: TreeTypeAggregator,
}

impl Normalizers {
    pub fn from_config(cfg: &PipelineConfig) -> Self {
        Self {
            species: SpeciesNormalizer::from_config(cfg),
            goals: GoalCategorizer::from_config(cfg),
            tree_types: TreeTypeAggregator::from_config(cfg),
        }
    }
}
