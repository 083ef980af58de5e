// src/report/mod.rs
//! Read-only aggregations over a view of the enriched table.
//!
//! Every function takes a slice of record references (a view produced by
//! [`EnrichedTable::view`](crate::process::EnrichedTable::view) or
//! [`filter_organizations`](crate::process::EnrichedTable::filter_organizations))
//! and returns plain data for a renderer to draw.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{
    normalize::{Normalizers, TreeTypeAggregator},
    process::EnrichedProjectRecord,
    text::TextProcessor,
};

/// Words dropped from the goal word-frequency view.
pub const GOAL_STOPWORDS: &[&str] = &[
    "of", "the", "for", "a", "in", "with", "project", "tree", "to", "planting", "through",
    "provide", "create", "help", "well", "also", "area", "will", "plan", "our", "place", "campus",
    "effort", "surrounding", "natural", "goal", "ha", "student", "program", "new", "year", "work",
    "member", "organization", "group", "city", "state", "local", "partner", "people", "site",
    "ground", "chicago", "illinois", "indiana", "wisconsin", "hand", "etc", "use", "need",
    "enhance", "additional", "make", "ensure", "within", "around", "including", "and",
];

/// Species shown in the diversity chart must appear in more than this many projects.
pub const SPECIES_MIN_PROJECTS: usize = 1;

/// Default size of the goal word-frequency list.
pub const MAX_WORDS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelTrees {
    pub label: String,
    pub trees: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyMetrics {
    pub total_trees: u64,
    pub organizations: usize,
    pub cities: usize,
    pub states: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiGoalSummary {
    pub projects: usize,
    pub multi_category: usize,
    /// Share of projects with more than one category, 0–100.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub trees: u64,
    pub organization: String,
    /// Canonical species joined with ", ", or "N/A".
    pub species: String,
}

/// Everything the dashboard pages show, computed in one pass over a view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub metrics: KeyMetrics,
    pub species: Vec<LabelCount>,
    pub categories: Vec<LabelCount>,
    pub multi_goal: MultiGoalSummary,
    pub trees_per_category: Vec<LabelTrees>,
    pub tree_types: Vec<LabelCount>,
    pub goal_words: Vec<LabelCount>,
}

impl Summary {
    pub fn compute(
        records: &[&EnrichedProjectRecord],
        normalizers: &Normalizers,
        text: &dyn TextProcessor,
    ) -> Self {
        Self {
            metrics: key_metrics(records),
            species: species_diversity(records, SPECIES_MIN_PROJECTS),
            categories: impact_categories(records),
            multi_goal: multi_goal_summary(records),
            trees_per_category: trees_per_category(records),
            tree_types: tree_type_distribution(records, &normalizers.tree_types),
            goal_words: goal_word_frequencies(records, text, MAX_WORDS),
        }
    }
}

pub fn key_metrics(records: &[&EnrichedProjectRecord]) -> KeyMetrics {
    KeyMetrics {
        total_trees: records.iter().map(|r| r.trees).sum(),
        organizations: distinct(records.iter().map(|r| r.organization.as_str())),
        cities: distinct(records.iter().map(|r| r.city.as_str())),
        states: distinct(records.iter().filter_map(|r| r.state.as_deref())),
    }
}

/// Number of distinct non-empty values.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> usize {
    values
        .filter(|s| !s.is_empty())
        .collect::<BTreeSet<_>>()
        .len()
}

/// Projects per canonical species, keeping species seen in more than
/// `more_than` projects. Sorted by count descending, then name.
pub fn species_diversity(records: &[&EnrichedProjectRecord], more_than: usize) -> Vec<LabelCount> {
    let counts = count_labels(records.iter().flat_map(|r| r.cleaned_species.iter()));
    counts.into_iter().filter(|c| c.count > more_than).collect()
}

/// Projects per impact category (a project counts once per category).
pub fn impact_categories(records: &[&EnrichedProjectRecord]) -> Vec<LabelCount> {
    count_labels(records.iter().flat_map(|r| r.goal_categories.iter()))
}

pub fn multi_goal_summary(records: &[&EnrichedProjectRecord]) -> MultiGoalSummary {
    let projects = records.len();
    let multi_category = records
        .iter()
        .filter(|r| r.goal_categories.len() > 1)
        .count();
    let percent = if projects > 0 {
        multi_category as f64 / projects as f64 * 100.0
    } else {
        0.0
    };
    MultiGoalSummary {
        projects,
        multi_category,
        percent,
    }
}

/// Trees planted per impact category; a project's full count goes to each
/// of its categories. Sorted by trees descending, then name.
pub fn trees_per_category(records: &[&EnrichedProjectRecord]) -> Vec<LabelTrees> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for r in records {
        for c in &r.goal_categories {
            *totals.entry(c.as_str()).or_insert(0) += r.trees;
        }
    }
    let mut out: Vec<LabelTrees> = totals
        .into_iter()
        .map(|(label, trees)| LabelTrees {
            label: label.to_string(),
            trees,
        })
        .collect();
    out.sort_by(|a, b| b.trees.cmp(&a.trees).then_with(|| a.label.cmp(&b.label)));
    out
}

/// Projects per tree-type bucket (a project counts once per bucket).
pub fn tree_type_distribution(
    records: &[&EnrichedProjectRecord],
    types: &TreeTypeAggregator,
) -> Vec<LabelCount> {
    count_labels(records.iter().flat_map(|r| {
        r.cleaned_species
            .iter()
            .map(|s| types.bucket(s))
            .collect::<BTreeSet<_>>()
    }))
}

pub fn map_points(records: &[&EnrichedProjectRecord]) -> Vec<MapPoint> {
    records
        .iter()
        .map(|r| MapPoint {
            latitude: r.latitude,
            longitude: r.longitude,
            trees: r.trees,
            organization: r.organization.clone(),
            species: if r.cleaned_species.is_empty() {
                "N/A".to_string()
            } else {
                r.cleaned_species.join(", ")
            },
        })
        .collect()
}

/// Lemmatized word counts over every goal phrase, stopwords and tokens
/// without letters removed. Returns at most `max_words` entries, most
/// frequent first.
pub fn goal_word_frequencies(
    records: &[&EnrichedProjectRecord],
    text: &dyn TextProcessor,
    max_words: usize,
) -> Vec<LabelCount> {
    let blob = records
        .iter()
        .flat_map(|r| r.goals.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ");
    if blob.is_empty() {
        return Vec::new();
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    for token in text.tokenize(&blob) {
        let word = text.lemmatize(&token.to_lowercase());
        if !word.chars().any(char::is_alphabetic) || GOAL_STOPWORDS.contains(&word.as_str()) {
            continue;
        }
        *counts.entry(word).or_insert(0) += 1;
    }

    let mut out: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount { label, count })
        .collect();
    sort_counts(&mut out);
    out.truncate(max_words);
    out
}

fn count_labels<I, S>(labels: I) -> Vec<LabelCount>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for l in labels {
        *counts.entry(l.as_ref().to_string()).or_insert(0) += 1;
    }
    let mut out: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount { label, count })
        .collect();
    sort_counts(&mut out);
    out
}

fn sort_counts(v: &mut [LabelCount]) {
    v.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
}
