use crate::models::PhaseMapping;

/// Bidirectional containment: either name contains the other.
///
/// Both sides are expected lowercased. An empty row label is contained in
/// every phase name and therefore matches.
pub fn phases_match(row_phase: &str, mapping_phase: &str) -> bool {
    mapping_phase.contains(row_phase) || row_phase.contains(mapping_phase)
}

/// First phase in mapping order that matches a row label
pub fn match_phase<'a>(row_phase: &str, phases: &'a PhaseMapping) -> Option<&'a str> {
    let row_phase = row_phase.trim().to_lowercase();
    phases.phases().find(|p| phases_match(&row_phase, p))
}

/// Whether a row label marks a total row
pub fn is_total_label(row_phase: &str, marker: &str) -> bool {
    row_phase.trim().to_lowercase().contains(marker)
}

/// Capitalize the first letter of every word and lowercase the rest.
///
/// A word starts after any character that is not a letter, so digits and
/// apostrophes also start a new word ("2a" -> "2A").
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_cased = false;
    for c in s.chars() {
        if prev_cased {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_cased = c.is_alphabetic();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(phases: &[&str]) -> PhaseMapping {
        let mut m = PhaseMapping::new();
        for p in phases {
            m.insert(p, "$1");
        }
        m
    }

    #[test]
    fn test_match_is_bidirectional() {
        let phases = mapping(&["discovery", "build"]);
        assert_eq!(match_phase("Discovery Phase", &phases), Some("discovery"));
        assert_eq!(match_phase("Build", &phases), Some("build"));
        assert_eq!(match_phase("disc", &phases), Some("discovery"));
        assert_eq!(match_phase("Legacy Phase", &phases), None);
    }

    #[test]
    fn test_first_match_wins() {
        // "design review" contains "design", and "design" is in "design review"
        let phases = mapping(&["design review", "design"]);
        assert_eq!(match_phase("Design", &phases), Some("design review"));

        let phases = mapping(&["design", "design review"]);
        assert_eq!(match_phase("Design Review", &phases), Some("design"));
    }

    #[test]
    fn test_blank_label_matches_first_phase() {
        let phases = mapping(&["discovery", "build"]);
        assert_eq!(match_phase("   ", &phases), Some("discovery"));
        assert_eq!(match_phase("", &PhaseMapping::new()), None);
    }

    #[test]
    fn test_is_total_label() {
        assert!(is_total_label("Total", "total"));
        assert!(is_total_label(" Estimated TOTAL ", "total"));
        assert!(!is_total_label("Build", "total"));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("discovery"), "Discovery");
        assert_eq!(title_case("ux & design"), "Ux & Design");
        assert_eq!(title_case("phase 2a build"), "Phase 2A Build");
        assert_eq!(title_case("QA"), "Qa");
    }
}
