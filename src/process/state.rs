use std::collections::{HashMap, HashSet};

use crate::config::StateTable;

/// Canonicalizes free-text state fields to a known abbreviation.
#[derive(Debug, Clone)]
pub struct StateCanonicalizer {
    full_names: HashMap<String, String>,
    valid: HashSet<String>,
    invalid: String,
}

impl StateCanonicalizer {
    pub fn new(table: &StateTable) -> Self {
        Self {
            full_names: table
                .full_names
                .iter()
                .map(|(k, v)| (k.trim().to_uppercase(), v.trim().to_uppercase()))
                .collect(),
            valid: table.valid.iter().map(|s| s.trim().to_uppercase()).collect(),
            invalid: table.invalid.clone(),
        }
    }

    /// Trim, uppercase, expand full names; anything outside the valid set
    /// becomes the invalid label.
    pub fn canonical(&self, raw: &str) -> String {
        let upper = raw.trim().to_uppercase();
        let abbrev = self.full_names.get(&upper).cloned().unwrap_or(upper);
        if self.valid.contains(&abbrev) {
            abbrev
        } else {
            self.invalid.clone()
        }
    }
}
