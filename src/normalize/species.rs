// src/normalize/species.rs
use std::collections::{BTreeSet, HashMap};
use tracing::trace;

use crate::config::PipelineConfig;

/// Maps raw species mentions onto canonical species labels.
#[derive(Debug, Clone)]
pub struct SpeciesNormalizer {
    /// lowercased alias → canonical label
    aliases: HashMap<String, String>,
}

impl SpeciesNormalizer {
    /// Build from a canonical → aliases table. Aliases are lowercased here so
    /// lookups only ever compare lowercased text. The canonical label is
    /// always registered as an alias of itself.
    pub fn new<'a, I, A>(table: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, A)>,
        A: IntoIterator<Item = &'a String>,
    {
        let mut aliases = HashMap::new();
        for (canonical, names) in table {
            for name in names {
                aliases.insert(name.to_lowercase(), canonical.clone());
            }
            aliases
                .entry(canonical.to_lowercase())
                .or_insert_with(|| canonical.clone());
        }
        Self { aliases }
    }

    pub fn from_config(cfg: &PipelineConfig) -> Self {
        Self::new(cfg.species_aliases.iter())
    }

    /// Canonical label for one raw mention.
    ///
    /// The mention is lowercased but not trimmed; unknown mentions become
    /// their own title-cased label.
    pub fn canonical(&self, raw: &str) -> String {
        match self.aliases.get(&raw.to_lowercase()) {
            Some(label) => label.clone(),
            None => {
                trace!(raw, "species alias miss, using title case");
                title_case(raw)
            }
        }
    }

    /// Sorted, de-duplicated canonical labels for a set of raw mentions.
    pub fn normalize<I, S>(&self, raw_names: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raw_names
            .into_iter()
            .map(|s| self.canonical(s.as_ref()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Every label the alias table can produce.
    pub fn labels(&self) -> BTreeSet<&str> {
        self.aliases.values().map(String::as_str).collect()
    }

    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(a, c)| (a.as_str(), c.as_str()))
    }
}

/// Uppercase the first letter of every run of letters, lowercase the rest.
/// Any non-letter (space, digit, punctuation) starts a new run.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
