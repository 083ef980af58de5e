// src/text/mod.rs
//! Tokenizer/lemmatizer seam used by the goal word-frequency view.
//!
//! Callers with a real lexical toolkit implement [`TextProcessor`]; the
//! crate ships [`RuleLemmatizer`], which handles regular English plurals
//! and leaves everything else alone.

use once_cell::sync::Lazy;
use regex::Regex;

pub trait TextProcessor {
    /// Split text into word and punctuation tokens.
    fn tokenize(&self, text: &str) -> Vec<String>;
    /// Dictionary form of a (lowercased) word.
    fn lemmatize(&self, word: &str) -> String;
}

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w+(?:'\w+)?|[^\w\s]").expect("token regex is valid"));

/// Words ending in `s` that are not plurals.
const KEEP_S: &[&str] = &["us", "ss", "is", "ous", "ics"];

#[derive(Debug, Clone, Copy, Default)]
pub struct RuleLemmatizer;

impl TextProcessor for RuleLemmatizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        TOKEN_RE
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn lemmatize(&self, word: &str) -> String {
        let len = word.chars().count();
        if len <= 3 || !word.ends_with('s') || KEEP_S.iter().any(|k| word.ends_with(k)) {
            return word.to_string();
        }
        if let Some(stem) = word.strip_suffix("ies") {
            if len > 4 {
                return format!("{stem}y");
            }
        }
        for suffix in ["sses", "shes", "ches", "xes", "zes"] {
            if word.ends_with(suffix) {
                return word[..word.len() - 2].to_string();
            }
        }
        word[..word.len() - 1].to_string()
    }
}
