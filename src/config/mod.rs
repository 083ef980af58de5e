// src/config/mod.rs
//! Lookup tables and column names that drive the pipeline.
//!
//! Every table the normalizers consult lives in [`PipelineConfig`]. The
//! defaults reproduce the grant program's vocabulary; a YAML or JSON file
//! can override any section (missing sections fall back to the defaults).

mod defaults;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};

/// Names of the CSV columns the pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Columns {
    /// Candidate join columns, in order. Only those present in both
    /// sources are used.
    pub join_candidates: Vec<String>,
    pub organization: String,
    pub description: String,
    pub city: String,
    pub state: String,
    pub latitude: String,
    pub longitude: String,
    pub trees: String,
    pub usda_species: String,
    pub species_mentions: String,
    pub goals: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            join_candidates: vec!["Organization Name".into(), "Project Description".into()],
            organization: "Organization Name".into(),
            description: "Project Description".into(),
            city: "Project Location City".into(),
            state: "Project Location State".into(),
            latitude: "Latitude".into(),
            longitude: "Longitude".into(),
            trees: "# Trees To Be Planted".into(),
            usda_species: "USDA Matched Species".into(),
            species_mentions: "Species from Ollama".into(),
            goals: "Goals from Ollama".into(),
        }
    }
}

impl Columns {
    /// Annotation payload columns, in the order they are carried through the join.
    pub fn annotation_payload(&self) -> [&str; 3] {
        [&self.usda_species, &self.species_mentions, &self.goals]
    }
}

/// State canonicalization table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateTable {
    /// Uppercased full name → abbreviation.
    pub full_names: BTreeMap<String, String>,
    pub valid: Vec<String>,
    /// Label for anything outside `valid`.
    pub invalid: String,
}

impl Default for StateTable {
    fn default() -> Self {
        Self {
            full_names: defaults::state_names(),
            valid: vec!["IL".into(), "IN".into(), "WI".into()],
            invalid: "Other/Invalid".into(),
        }
    }
}

/// All tables consulted by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub columns: Columns,
    /// Canonical species label → aliases (matched case-insensitively).
    pub species_aliases: BTreeMap<String, Vec<String>>,
    /// Impact category → keywords (substring matched).
    pub goal_keywords: BTreeMap<String, Vec<String>>,
    /// Category assigned when no keyword matches.
    pub default_category: String,
    /// Tree-type bucket → canonical species labels.
    pub tree_types: BTreeMap<String, Vec<String>>,
    /// Bucket for labels absent from `tree_types`.
    pub other_bucket: String,
    pub states: StateTable,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            columns: Columns::default(),
            species_aliases: defaults::species_aliases(),
            goal_keywords: defaults::goal_keywords(),
            default_category: "General Improvement".into(),
            tree_types: defaults::tree_types(),
            other_bucket: "Other".into(),
            states: StateTable::default(),
        }
    }
}

impl PipelineConfig {
    /// Load overrides from a `.yaml`/`.yml` or `.json` file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&text)
                .with_context(|| format!("parsing YAML config {}", path.display())),
            Some("json") => serde_json::from_str(&text)
                .with_context(|| format!("parsing JSON config {}", path.display())),
            _ => Err(anyhow!(
                "unsupported config format for {} (expected .yaml, .yml or .json)",
                path.display()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn yaml_override_keeps_other_defaults() -> Result<()> {
        let mut tmp = Builder::new().suffix(".yaml").tempfile()?;
        writeln!(
            tmp,
            "default_category: Misc\nstates:\n  valid: [IL, MI]\n  full_names:\n    MICHIGAN: MI\n"
        )?;

        let cfg = PipelineConfig::from_path(tmp.path())?;
        assert_eq!(cfg.default_category, "Misc");
        assert_eq!(cfg.states.valid, vec!["IL", "MI"]);
        assert_eq!(cfg.states.invalid, "Other/Invalid");
        assert_eq!(cfg.columns, Columns::default());
        assert_eq!(cfg.species_aliases, defaults::species_aliases());
        Ok(())
    }

    #[test]
    fn json_config_is_accepted() -> Result<()> {
        let mut tmp = Builder::new().suffix(".json").tempfile()?;
        write!(tmp, r#"{{"other_bucket": "Misc"}}"#)?;
        let cfg = PipelineConfig::from_path(tmp.path())?;
        assert_eq!(cfg.other_bucket, "Misc");
        Ok(())
    }

    #[test]
    fn unknown_extension_is_rejected() -> Result<()> {
        let tmp = Builder::new().suffix(".toml").tempfile()?;
        assert!(PipelineConfig::from_path(tmp.path()).is_err());
        Ok(())
    }
}
