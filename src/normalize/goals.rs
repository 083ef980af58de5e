// src/normalize/goals.rs
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::PipelineConfig;

/// One category that fired, with the keywords responsible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryMatch {
    pub category: String,
    pub keywords: Vec<String>,
}

/// Multi-label keyword classifier over a project's goal statements.
///
/// Matching is plain substring containment on the lowercased, space-joined
/// goal text, so a keyword also matches inside a longer word.
#[derive(Debug, Clone)]
pub struct GoalCategorizer {
    /// category → lowercased keywords
    keywords: BTreeMap<String, Vec<String>>,
    default_category: String,
}

impl GoalCategorizer {
    pub fn new(keywords: &BTreeMap<String, Vec<String>>, default_category: &str) -> Self {
        let keywords = keywords
            .iter()
            .map(|(cat, kws)| (cat.clone(), kws.iter().map(|k| k.to_lowercase()).collect()))
            .collect();
        Self {
            keywords,
            default_category: default_category.to_string(),
        }
    }

    pub fn from_config(cfg: &PipelineConfig) -> Self {
        Self::new(&cfg.goal_keywords, &cfg.default_category)
    }

    /// Sorted category labels; never empty.
    pub fn categorize<I, S>(&self, goals: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let matched: Vec<String> = self
            .explain(goals)
            .into_iter()
            .map(|m| m.category)
            .collect();
        if matched.is_empty() {
            vec![self.default_category.clone()]
        } else {
            matched
        }
    }

    /// Matched categories (sorted) with the keywords that hit. Empty when
    /// nothing matches; the default category is not reported here.
    pub fn explain<I, S>(&self, goals: I) -> Vec<CategoryMatch>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let text = join_lower(goals);
        self.keywords
            .iter()
            .filter_map(|(category, kws)| {
                let hits: Vec<String> = kws
                    .iter()
                    .filter(|k| text.contains(k.as_str()))
                    .cloned()
                    .collect();
                (!hits.is_empty()).then(|| CategoryMatch {
                    category: category.clone(),
                    keywords: hits,
                })
            })
            .collect()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.keywords.keys().map(String::as_str)
    }

    pub fn default_category(&self) -> &str {
        &self.default_category
    }
}

fn join_lower<I, S>(goals: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut text = String::new();
    for (i, g) in goals.into_iter().enumerate() {
        if i > 0 {
            text.push(' ');
        }
        text.push_str(g.as_ref());
    }
    text.to_lowercase()
}
