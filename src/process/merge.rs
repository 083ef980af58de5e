use chrono::Utc;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::{
    collections::{BTreeSet, HashMap, HashSet},
    path::Path,
};
use tracing::{debug, info, warn};

use super::{
    enriched::{
        BuildOutput, BuildReport, DropReason, DroppedRow, EnrichedProjectRecord, EnrichedTable,
        JoinKey,
    },
    error::BuildError,
    literal::{parse_mapping, parse_sequence},
    raw_table::RawTable,
    state::StateCanonicalizer,
    utils::{parse_count, parse_f64},
};
use crate::{config::PipelineConfig, normalize::Normalizers};

/// Parsed annotation payload for one join key.
#[derive(Debug, Clone, Default)]
struct Annotation {
    species_mentions: Map<String, Value>,
    usda_species: Vec<String>,
    goals: Vec<String>,
}

/// Annotations keyed by join key, plus what de-duplication saw.
struct AnnotationIndex {
    by_key: HashMap<JoinKey, Annotation>,
    rows: usize,
    rows_deduped: usize,
    conflicting_keys: Vec<JoinKey>,
}

/// Joins, cleans and enriches the two source tables.
#[derive(Debug, Clone)]
pub struct Pipeline {
    cfg: PipelineConfig,
    normalizers: Normalizers,
    states: StateCanonicalizer,
    /// SHA-256 of the serialized configuration.
    fingerprint: String,
}

impl Pipeline {
    pub fn new(cfg: PipelineConfig) -> Self {
        let normalizers = Normalizers::from_config(&cfg);
        let states = StateCanonicalizer::new(&cfg.states);
        let fingerprint = hex::encode(Sha256::digest(
            serde_json::to_vec(&cfg).unwrap_or_default(),
        ));
        Self {
            cfg,
            normalizers,
            states,
            fingerprint,
        }
    }

    /// Identifies the configuration; two pipelines with equal tables share it.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    pub fn normalizers(&self) -> &Normalizers {
        &self.normalizers
    }

    /// Load both CSV files and build the enriched table.
    #[tracing::instrument(
        level = "info",
        skip(self, projects, annotations),
        fields(projects = %projects.as_ref().display(), annotations = %annotations.as_ref().display())
    )]
    pub fn build_from_paths<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        projects: P,
        annotations: Q,
    ) -> Result<BuildOutput, BuildError> {
        let projects = RawTable::from_path(projects)?;
        let annotations = RawTable::from_path(annotations)?;
        self.build(&projects, &annotations)
    }

    /// Left-join `annotations` onto `projects` and derive the enriched
    /// columns. Rows with unusable coordinates or tree counts are left out
    /// and listed in the report.
    pub fn build(
        &self,
        projects: &RawTable,
        annotations: &RawTable,
    ) -> Result<BuildOutput, BuildError> {
        let cols = &self.cfg.columns;

        // ─── 1) join columns ─────────────────────────────────────────────
        let join_columns: Vec<String> = cols
            .join_candidates
            .iter()
            .filter(|c| projects.has_column(c) && annotations.has_column(c))
            .cloned()
            .collect();
        if join_columns.is_empty() {
            return Err(BuildError::SchemaMismatch {
                candidates: cols.join_candidates.clone(),
            });
        }
        info!(?join_columns, "joining on");

        let required = |name: &str| {
            projects
                .column(name)
                .ok_or_else(|| BuildError::MissingColumn {
                    column: name.to_string(),
                })
        };
        let lat_idx = required(cols.latitude.as_str())?;
        let lon_idx = required(cols.longitude.as_str())?;
        let trees_idx = required(cols.trees.as_str())?;
        let org_idx = projects.column(&cols.organization);
        let desc_idx = projects.column(&cols.description);
        let city_idx = projects.column(&cols.city);
        let state_idx = projects.column(&cols.state);
        let key_idx: Vec<usize> = join_columns
            .iter()
            .filter_map(|c| projects.column(c))
            .collect();

        let consumed: HashSet<usize> = [
            Some(lat_idx),
            Some(lon_idx),
            Some(trees_idx),
            org_idx,
            desc_idx,
            city_idx,
            state_idx,
        ]
        .into_iter()
        .flatten()
        .chain(key_idx.iter().copied())
        .collect();

        // ─── 2) annotations ──────────────────────────────────────────────
        let index = self.index_annotations(annotations, &join_columns);

        // ─── 3) per-row clean + enrich ───────────────────────────────────
        let mut records = Vec::with_capacity(projects.rows.len());
        let mut dropped = Vec::new();
        let mut unmatched = 0usize;

        for (i, row) in projects.rows.iter().enumerate() {
            let key: JoinKey = key_idx.iter().map(|&k| at(row, k).to_string()).collect();

            let coords = (
                parse_f64(at(row, lat_idx)),
                parse_f64(at(row, lon_idx)),
                parse_count(at(row, trees_idx)),
            );
            let (latitude, longitude, trees) = match coords {
                (Some(lat), Some(lon), Some(n)) => (lat, lon, n),
                (lat, lon, _) => {
                    let (column, idx) = if lat.is_none() {
                        (&cols.latitude, lat_idx)
                    } else if lon.is_none() {
                        (&cols.longitude, lon_idx)
                    } else {
                        (&cols.trees, trees_idx)
                    };
                    debug!(row = i + 1, column = %column, value = %at(row, idx), "dropping row");
                    dropped.push(DroppedRow {
                        row: i + 1,
                        key,
                        reason: DropReason::Unparseable {
                            column: column.clone(),
                            value: at(row, idx).to_string(),
                        },
                    });
                    continue;
                }
            };

            let ann = match index.by_key.get(&key) {
                Some(a) => Some(a.clone()),
                None => {
                    unmatched += 1;
                    None
                }
            };
            let annotated = ann.is_some();
            let ann = ann.unwrap_or_default();

            let all_species: BTreeSet<&str> = ann
                .species_mentions
                .keys()
                .chain(ann.usda_species.iter())
                .map(String::as_str)
                .collect();
            let cleaned_species = self.normalizers.species.normalize(&all_species);
            let goal_categories = self.normalizers.goals.categorize(&ann.goals);
            let all_species: Vec<String> = all_species.into_iter().map(str::to_string).collect();

            let extra = projects
                .headers
                .iter()
                .enumerate()
                .filter(|(idx, _)| !consumed.contains(idx))
                .map(|(idx, h)| (h.clone(), at(row, idx).to_string()))
                .collect();

            records.push(EnrichedProjectRecord {
                organization: cell(row, org_idx),
                description: cell(row, desc_idx),
                city: cell(row, city_idx),
                state: state_idx.map(|s| self.states.canonical(at(row, s))),
                latitude,
                longitude,
                trees,
                extra,
                species_mentions: ann.species_mentions,
                usda_species: ann.usda_species,
                goals: ann.goals,
                annotated,
                all_species,
                cleaned_species,
                goal_categories,
            });
        }

        if !dropped.is_empty() {
            warn!(
                dropped = dropped.len(),
                "rows excluded for unparseable coordinates or tree counts"
            );
        }
        info!(
            projects = projects.rows.len(),
            enriched = records.len(),
            unmatched,
            "built enriched table"
        );

        let report = BuildReport {
            built_at: Utc::now(),
            join_columns: join_columns.clone(),
            project_rows: projects.rows.len(),
            annotation_rows: index.rows,
            annotation_rows_deduped: index.rows_deduped,
            conflicting_keys: index.conflicting_keys,
            unmatched_projects: unmatched,
            enriched_rows: records.len(),
            dropped,
        };
        Ok(BuildOutput {
            table: EnrichedTable::new(join_columns, records),
            report,
        })
    }

    /// Reduce annotation rows to key + payload columns, drop exact
    /// duplicates (first seen wins), and parse each key's payload.
    fn index_annotations(&self, annotations: &RawTable, join_columns: &[String]) -> AnnotationIndex {
        let cols = &self.cfg.columns;
        let key_idx: Vec<usize> = join_columns
            .iter()
            .filter_map(|c| annotations.column(c))
            .collect();
        let usda_idx = annotations.column(&cols.usda_species);
        let mentions_idx = annotations.column(&cols.species_mentions);
        let goals_idx = annotations.column(&cols.goals);
        let kept: Vec<usize> = key_idx
            .iter()
            .copied()
            .chain([usda_idx, mentions_idx, goals_idx].into_iter().flatten())
            .collect();

        let mut seen: HashSet<Vec<&str>> = HashSet::new();
        let mut by_key: HashMap<JoinKey, Annotation> = HashMap::new();
        let mut conflicts: BTreeSet<JoinKey> = BTreeSet::new();

        for row in &annotations.rows {
            let reduced: Vec<&str> = kept.iter().map(|&i| at(row, i)).collect();
            if !seen.insert(reduced) {
                continue;
            }
            let key: JoinKey = key_idx.iter().map(|&i| at(row, i).to_string()).collect();
            if by_key.contains_key(&key) {
                conflicts.insert(key);
                continue;
            }
            let get = |idx: Option<usize>| idx.map(|i| at(row, i));
            by_key.insert(
                key,
                Annotation {
                    species_mentions: parse_mapping(get(mentions_idx)),
                    usda_species: parse_sequence(get(usda_idx)),
                    goals: parse_sequence(get(goals_idx)),
                },
            );
        }

        let rows_deduped = seen.len();
        if rows_deduped != annotations.rows.len() {
            info!(
                before = annotations.rows.len(),
                after = rows_deduped,
                "removed duplicate annotation rows"
            );
        }
        if !conflicts.is_empty() {
            warn!(
                keys = conflicts.len(),
                "annotation rows share a join key with differing payloads; first row used"
            );
        }

        AnnotationIndex {
            by_key,
            rows: annotations.rows.len(),
            rows_deduped,
            conflicting_keys: conflicts.into_iter().collect(),
        }
    }
}

/// Cell text, empty when the row is shorter than the header.
fn at(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

fn cell(row: &[String], idx: Option<usize>) -> String {
    idx.map(|i| at(row, i).to_string()).unwrap_or_default()
}

/// One-shot build with an explicit configuration.
pub fn build(
    projects: &RawTable,
    annotations: &RawTable,
    cfg: &PipelineConfig,
) -> Result<BuildOutput, BuildError> {
    Pipeline::new(cfg.clone()).build(projects, annotations)
}

/// One-shot build from two CSV files, bypassing the cache.
pub fn build_from_paths<P: AsRef<Path>, Q: AsRef<Path>>(
    projects: P,
    annotations: Q,
    cfg: &PipelineConfig,
) -> Result<BuildOutput, BuildError> {
    Pipeline::new(cfg.clone()).build_from_paths(projects, annotations)
}
