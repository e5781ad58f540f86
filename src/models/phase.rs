use serde::ser::{Serialize, SerializeMap, Serializer};

/// Ordered lowercase phase name -> formatted amount mapping.
///
/// Order is Budget-sheet order and decides which phase wins when a table row
/// matches several phases. Re-inserting a phase overwrites its amount without
/// moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseMapping {
    entries: Vec<(String, String)>,
}

impl PhaseMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a phase; the name is lowercased
    pub fn insert(&mut self, phase: &str, amount: impl Into<String>) {
        let phase = phase.to_lowercase();
        let amount = amount.into();
        match self.entries.iter_mut().find(|(p, _)| *p == phase) {
            Some((_, a)) => *a = amount,
            None => self.entries.push((phase, amount)),
        }
    }

    pub fn get(&self, phase: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == phase)
            .map(|(_, a)| a.as_str())
    }

    pub fn contains(&self, phase: &str) -> bool {
        self.get(phase).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, a)| (p.as_str(), a.as_str()))
    }

    pub fn phases(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for PhaseMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (p, a) in &self.entries {
            map.serialize_entry(p, a)?;
        }
        map.end()
    }
}

/// Format an amount as whole dollars with thousands separators.
///
/// The fractional part is truncated, not rounded. Non-finite and
/// out-of-range values have no representation.
pub fn format_amount(amount: f64) -> Option<String> {
    if !amount.is_finite() || amount.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(format!("${}", group_thousands(amount.trunc() as i64)))
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
