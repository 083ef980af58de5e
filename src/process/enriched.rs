use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

/// Values of the join columns for one row, in join-column order.
pub type JoinKey = Vec<String>;

/// A joined, cleaned and annotated project row. Never mutated after the
/// merger creates it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedProjectRecord {
    pub organization: String,
    pub description: String,
    pub city: String,
    /// Canonical state label; `None` when the source has no state column.
    pub state: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub trees: u64,
    /// Project columns not consumed by the pipeline, verbatim.
    pub extra: BTreeMap<String, String>,

    /// Species mention → extractor metadata.
    pub species_mentions: Map<String, Value>,
    pub usda_species: Vec<String>,
    pub goals: Vec<String>,
    /// `true` when an annotation row joined onto this project.
    pub annotated: bool,

    pub all_species: Vec<String>,
    pub cleaned_species: Vec<String>,
    pub goal_categories: Vec<String>,
}

/// Why a row was left out of the enriched table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropReason {
    Unparseable { column: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedRow {
    /// 1-based data row number in the project table.
    pub row: usize,
    pub key: JoinKey,
    pub reason: DropReason,
}

/// Counts and exceptions observed during one build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildReport {
    pub built_at: DateTime<Utc>,
    pub join_columns: Vec<String>,
    pub project_rows: usize,
    /// Annotation rows before removing exact duplicates.
    pub annotation_rows: usize,
    /// Annotation rows after removing exact duplicates.
    pub annotation_rows_deduped: usize,
    /// Keys still carried by more than one annotation row after
    /// de-duplication (differing payloads). The first row is joined.
    pub conflicting_keys: Vec<JoinKey>,
    pub unmatched_projects: usize,
    pub enriched_rows: usize,
    pub dropped: Vec<DroppedRow>,
}

/// The enriched dataset. Records are shared, so views over it are cheap.
#[derive(Debug, Clone, Default)]
pub struct EnrichedTable {
    pub join_columns: Vec<String>,
    records: Vec<Arc<EnrichedProjectRecord>>,
}

impl EnrichedTable {
    pub fn new(join_columns: Vec<String>, records: Vec<EnrichedProjectRecord>) -> Self {
        Self {
            join_columns,
            records: records.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn records(&self) -> &[Arc<EnrichedProjectRecord>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Borrowed view over every record.
    pub fn view(&self) -> Vec<&EnrichedProjectRecord> {
        self.records.iter().map(|r| r.as_ref()).collect()
    }

    /// Sorted distinct organization names.
    pub fn organization_names(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.organization.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Records whose organization is in `selected`. An empty selection, or
    /// one containing [`ALL_ORGANIZATIONS`], selects everything.
    pub fn filter_organizations<S: AsRef<str>>(&self, selected: &[S]) -> Vec<&EnrichedProjectRecord> {
        if selected.is_empty() || selected.iter().any(|s| s.as_ref() == ALL_ORGANIZATIONS) {
            return self.view();
        }
        let wanted: BTreeSet<&str> = selected.iter().map(|s| s.as_ref()).collect();
        self.records
            .iter()
            .filter(|r| wanted.contains(r.organization.as_str()))
            .map(|r| r.as_ref())
            .collect()
    }
}

/// Selection sentinel meaning "no organization filter".
pub const ALL_ORGANIZATIONS: &str = "All Organizations (Select All)";

/// A built table plus what happened while building it.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub table: EnrichedTable,
    pub report: BuildReport,
}
