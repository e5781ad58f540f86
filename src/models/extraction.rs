use serde::Serialize;

use super::{PhaseMapping, PlaceholderMap};

/// Everything the extractor derives from one workbook
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extraction {
    /// Key/value pairs from the Variables sheet, dates normalized
    pub variables: PlaceholderMap,
    /// Placeholders derived from the phase mapping
    pub budget: PlaceholderMap,
    /// Variables overlaid by budget placeholders; what substitution uses
    pub replacements: PlaceholderMap,
    /// Lowercase phase name -> formatted amount
    pub phases: PhaseMapping,
}

impl Extraction {
    pub fn new(variables: PlaceholderMap, phases: PhaseMapping) -> Self {
        let budget = super::budget_placeholders(&phases);
        let replacements = variables.merged_with(&budget);
        Self {
            variables,
            budget,
            replacements,
            phases,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_merges_budget_over_variables() {
        let variables: PlaceholderMap = [("{CLIENT NAME}", "Acme Co"), ("{TOTAL}", "stale")]
            .into_iter()
            .collect();
        let mut phases = PhaseMapping::new();
        phases.insert("total", "$20,000");

        let extraction = Extraction::new(variables, phases);

        assert_eq!(extraction.replacements.get("{TOTAL}"), Some("$20,000"));
        assert_eq!(extraction.replacements.get("{PROJECTTOTAL}"), Some("$20,000"));
        assert_eq!(extraction.replacements.get("{CLIENT NAME}"), Some("Acme Co"));
        assert_eq!(extraction.variables.get("{TOTAL}"), Some("stale"));
        assert_eq!(extraction.budget.len(), 2);
    }
}
