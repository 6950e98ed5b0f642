//! Canonical player identities.
//!
//! Built from the stats table. Scraped or hand-typed names are resolved
//! to the canonical spelling before they reach the matcher, which only
//! does exact comparisons.

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::types::PlayerStatRecord;

/// Name suffixes ignored when folding.
const SUFFIXES: &[&str] = &["jr", "sr", "ii", "iii", "iv"];

/// Fold a name to a lookup key: lowercase, common Latin diacritics
/// removed, punctuation dropped, generational suffixes stripped.
pub fn fold_name(name: &str) -> String {
    let mut folded = String::with_capacity(name.len());
    for c in name.chars().flat_map(char::to_lowercase) {
        let base = match c {
            'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ā' => 'a',
            'ç' | 'ć' | 'č' => 'c',
            'đ' | 'ď' => 'd',
            'é' | 'è' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' => 'e',
            'í' | 'ì' | 'î' | 'ï' | 'ī' => 'i',
            'ł' | 'ľ' => 'l',
            'ñ' | 'ń' | 'ň' => 'n',
            'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ø' | 'ō' => 'o',
            'ř' => 'r',
            'š' | 'ś' | 'ș' | 'ş' => 's',
            'ť' | 'ț' | 'ţ' => 't',
            'ú' | 'ù' | 'û' | 'ü' | 'ū' | 'ů' => 'u',
            'ý' | 'ÿ' => 'y',
            'ž' | 'ź' | 'ż' => 'z',
            other => other,
        };
        if base.is_alphanumeric() || base.is_whitespace() || base == '-' {
            folded.push(if base == '-' { ' ' } else { base });
        }
    }

    let words: Vec<&str> = folded.split_whitespace().collect();
    let end = match words.last() {
        Some(last) if words.len() > 2 && SUFFIXES.contains(last) => words.len() - 1,
        _ => words.len(),
    };
    words[..end].join(" ")
}

/// Canonical names keyed by their folded form.
#[derive(Debug, Clone, Default)]
pub struct PlayerRegistry {
    by_key: HashMap<String, String>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a normalized stats table.
    pub fn from_records(records: &[PlayerStatRecord]) -> Self {
        let mut registry = Self::new();
        for record in records {
            registry.insert(&record.player_name);
        }
        debug!(players = registry.len(), "Player registry built");
        registry
    }

    /// Register a canonical name. Returns false if the folded key was taken
    /// by a different spelling (first one wins).
    pub fn insert(&mut self, canonical: &str) -> bool {
        let key = fold_name(canonical);
        if key.is_empty() {
            return false;
        }
        match self.by_key.get(&key) {
            Some(existing) if existing != canonical => {
                warn!(
                    existing = %existing,
                    ignored = %canonical,
                    "Two registry names fold to the same key"
                );
                false
            }
            Some(_) => true,
            None => {
                self.by_key.insert(key, canonical.to_string());
                true
            }
        }
    }

    /// Canonical spelling for a name, if the player is known.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.by_key.get(&fold_name(name)).map(String::as_str)
    }

    /// Folded keys with their canonical names, longest first (for text scans).
    pub fn keys_longest_first(&self) -> Vec<(&str, &str)> {
        let mut keys: Vec<(&str, &str)> = self
            .by_key
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        keys.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));
        keys
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
