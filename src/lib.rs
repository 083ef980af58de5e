// src/lib.rs
//! Data core for the tree-grant reporting dashboard: load the project and
//! annotation tables, join and clean them, derive species/goal/tree-type
//! labels, and compute the aggregate views.
pub mod cache;
pub mod config;
pub mod export;
pub mod normalize;
pub mod process;
pub mod report;
pub mod text;

pub use cache::{load_project_data, BuildCache, FileIdentity};
pub use config::PipelineConfig;
pub use normalize::{GoalCategorizer, Normalizers, SpeciesNormalizer, TreeTypeAggregator};
pub use process::{
    build, build_from_paths, BuildError, BuildOutput, BuildReport, EnrichedProjectRecord,
    EnrichedTable, Pipeline, RawTable, ALL_ORGANIZATIONS,
};
pub use report::Summary;
pub use text::{RuleLemmatizer, TextProcessor};
