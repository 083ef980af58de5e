// src/process/mod.rs
//! Loading, joining and cleaning of the two source tables.
pub mod enriched;
pub mod error;
pub mod literal;
pub mod merge;
pub mod raw_table;
pub mod state;
pub mod utils;

pub use enriched::{
    BuildOutput, BuildReport, DropReason, DroppedRow, EnrichedProjectRecord, EnrichedTable,
    JoinKey, ALL_ORGANIZATIONS,
};
pub use error::BuildError;
pub use merge::{build, build_from_paths, Pipeline};
pub use raw_table::RawTable;
pub use state::StateCanonicalizer;
