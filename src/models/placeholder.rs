use serde::ser::{Serialize, SerializeMap, Serializer};

use super::PhaseMapping;

/// Phase key that expands to both total placeholders
pub const TOTAL_PHASE: &str = "total";
pub const TOTAL_PLACEHOLDERS: [&str; 2] = ["{TOTAL}", "{PROJECTTOTAL}"];

/// Ordered placeholder token -> value mapping.
///
/// Keeps first-insertion order; re-inserting a key replaces its value in
/// place. Substitution iterates in this order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMap {
    entries: Vec<(String, String)>,
}

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; returns the previous value for the key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => Some(std::mem::replace(v, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Overlay `other` on top of `self`; `other` wins on key collisions
    pub fn merged_with(&self, other: &PlaceholderMap) -> PlaceholderMap {
        let mut merged = self.clone();
        for (k, v) in other.iter() {
            merged.insert(k, v);
        }
        merged
    }

    /// Apply every replacement, in order, as a literal substring replace
    pub fn apply(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (key, value) in self.iter() {
            if out.contains(key) {
                out = out.replace(key, value);
            }
        }
        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PlaceholderMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = PlaceholderMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for PlaceholderMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Placeholder token for a non-total phase: uppercased, spaces and
/// ampersands removed, wrapped in braces
pub fn phase_placeholder(phase: &str) -> String {
    let token: String = phase
        .to_uppercase()
        .chars()
        .filter(|c| *c != ' ' && *c != '&')
        .collect();
    format!("{{{}}}", token)
}

/// Derive the budget placeholders from a phase mapping
pub fn budget_placeholders(phases: &PhaseMapping) -> PlaceholderMap {
    let mut map = PlaceholderMap::new();
    for (phase, amount) in phases.iter() {
        if phase == TOTAL_PHASE {
            for key in TOTAL_PLACEHOLDERS {
                map.insert(key, amount);
            }
        } else {
            map.insert(phase_placeholder(phase), amount);
        }
    }
    map
}
