// src/normalize/tree_type.rs
use std::collections::{BTreeMap, HashMap};

use crate::config::PipelineConfig;

/// Groups canonical species labels into coarse tree-type buckets.
#[derive(Debug, Clone)]
pub struct TreeTypeAggregator {
    /// canonical label → bucket
    buckets: HashMap<String, String>,
    other: String,
}

impl TreeTypeAggregator {
    pub fn new(table: &BTreeMap<String, Vec<String>>, other: &str) -> Self {
        let buckets = table
            .iter()
            .flat_map(|(bucket, labels)| labels.iter().map(move |l| (l.clone(), bucket.clone())))
            .collect();
        Self {
            buckets,
            other: other.to_string(),
        }
    }

    pub fn from_config(cfg: &PipelineConfig) -> Self {
        Self::new(&cfg.tree_types, &cfg.other_bucket)
    }

    /// Bucket for a canonical label; unknown labels land in the catch-all.
    pub fn bucket(&self, label: &str) -> &str {
        self.buckets
            .get(label)
            .map(String::as_str)
            .unwrap_or(self.other.as_str())
    }

    /// `true` when `label` has an explicit bucket.
    pub fn is_mapped(&self, label: &str) -> bool {
        self.buckets.contains_key(label)
    }

    /// Count of labels per bucket.
    pub fn bucket_all<I, S>(&self, labels: I) -> BTreeMap<String, usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts = BTreeMap::new();
        for l in labels {
            *counts.entry(self.bucket(l.as_ref()).to_string()).or_insert(0) += 1;
        }
        counts
    }

    pub fn other_bucket(&self) -> &str {
        &self.other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::SpeciesNormalizer;

    #[test]
    fn every_canonical_species_has_a_bucket() {
        let cfg = PipelineConfig::default();
        let species = SpeciesNormalizer::from_config(&cfg);
        let types = TreeTypeAggregator::from_config(&cfg);
        let unmapped: Vec<&str> = species
            .labels()
            .into_iter()
            .filter(|l| !types.is_mapped(l))
            .collect();
        assert!(unmapped.is_empty(), "labels without a bucket: {unmapped:?}");
    }

    #[test]
    fn buckets_known_labels() {
        let types = TreeTypeAggregator::from_config(&PipelineConfig::default());
        assert_eq!(types.bucket("Apple"), "Fruit & Nut");
        assert_eq!(types.bucket("Oak"), "Shade Trees");
        assert_eq!(types.bucket("Redbud"), "Ornamental/Flowering");
        assert_eq!(types.bucket("Spruce"), "Evergreens/Conifers");
        assert_eq!(types.bucket("Unspecified/Generic"), "Unspecified/Native");
    }

    #[test]
    fn fallback_labels_bucket_to_other() {
        let types = TreeTypeAggregator::from_config(&PipelineConfig::default());
        assert_eq!(types.bucket("Ziziphus Jujuba"), "Other");
        assert_eq!(types.bucket(""), "Other");
    }

    #[test]
    fn bucket_all_counts_per_bucket() {
        let types = TreeTypeAggregator::from_config(&PipelineConfig::default());
        let counts = types.bucket_all(["Apple", "Pear", "Oak", "Mystery"]);
        assert_eq!(counts.get("Fruit & Nut"), Some(&2));
        assert_eq!(counts.get("Shade Trees"), Some(&1));
        assert_eq!(counts.get("Other"), Some(&1));
        assert_eq!(counts.len(), 3);
    }
}
