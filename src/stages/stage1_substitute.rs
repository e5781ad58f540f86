use tracing::{debug, info};

use crate::docx::{Document, Paragraph};
use crate::models::PlaceholderMap;

/// Result of Stage 1 substitution
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SubstitutionResult {
    /// Paragraphs examined (body plus table cells)
    pub paragraphs_scanned: usize,
    /// Paragraphs whose text changed and whose runs were collapsed
    pub paragraphs_changed: usize,
}

/// Execute Stage 1: replace placeholders in body paragraphs and in the
/// paragraphs of every body-level table cell.
///
/// Each paragraph's text is flattened, every replacement applied as a literal
/// substring replace in map order, and a changed paragraph rewritten as a
/// single run. Formatting that spanned several runs of a changed paragraph is
/// lost; the first run keeps its properties.
pub fn replace_text_in_doc(doc: &mut Document, replacements: &PlaceholderMap) -> SubstitutionResult {
    let mut result = SubstitutionResult::default();

    for paragraph in doc.paragraphs_mut() {
        substitute_paragraph(paragraph, replacements, &mut result);
    }

    for table in doc.tables_mut() {
        for row in table.rows_mut() {
            for cell in row.cells_mut() {
                for paragraph in cell.paragraphs_mut() {
                    substitute_paragraph(paragraph, replacements, &mut result);
                }
            }
        }
    }

    info!(
        "Stage 1: {} of {} paragraphs changed",
        result.paragraphs_changed, result.paragraphs_scanned
    );

    result
}

fn substitute_paragraph(
    paragraph: &mut Paragraph,
    replacements: &PlaceholderMap,
    result: &mut SubstitutionResult,
) {
    result.paragraphs_scanned += 1;

    let original = paragraph.text();
    let replaced = replacements.apply(&original);
    if replaced != original {
        debug!("Substituted: {:?} -> {:?}", original, replaced);
        paragraph.replace_text(&replaced);
        result.paragraphs_changed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<w:document xmlns:w="w"><w:body><w:p><w:r><w:rPr><w:i/></w:rPr><w:t xml:space="preserve">Client: {CLIENT </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>NAME}</w:t></w:r></w:p><w:p><w:r><w:t>No placeholders here</w:t></w:r></w:p><w:tbl><w:tr><w:tc><w:p><w:r><w:t>Total: {TOTAL}</w:t></w:r></w:p></w:tc></w:tr></w:tbl></w:body></w:document>"#;

    fn replacements() -> PlaceholderMap {
        [("{CLIENT NAME}", "Acme Co"), ("{TOTAL}", "$20,000")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_replaces_across_runs_and_cells() {
        let mut doc = Document::from_xml(DOC).unwrap();
        let result = replace_text_in_doc(&mut doc, &replacements());

        assert_eq!(result.paragraphs_scanned, 3);
        assert_eq!(result.paragraphs_changed, 2);

        let first = doc.paragraphs().next().unwrap();
        assert_eq!(first.text(), "Client: Acme Co");
        // Collapsed into the first run, which keeps its own formatting only
        let runs: Vec<_> = first.runs().collect();
        assert_eq!(runs[0].text(), "Client: Acme Co");
        assert!(!runs[0].is_bold());
        assert_eq!(runs[1].text(), "");

        let cell = doc.tables().next().unwrap().row(0).unwrap().cell(0).unwrap();
        assert_eq!(cell.text(), "Total: $20,000");
    }

    #[test]
    fn test_unchanged_paragraphs_keep_their_runs() {
        let mut doc = Document::from_xml(DOC).unwrap();
        let before = doc.paragraphs().nth(1).unwrap().clone();
        replace_text_in_doc(&mut doc, &replacements());
        assert_eq!(doc.paragraphs().nth(1).unwrap(), &before);
    }

    #[test]
    fn test_second_pass_is_a_no_op() {
        let mut doc = Document::from_xml(DOC).unwrap();
        replace_text_in_doc(&mut doc, &replacements());
        let once = doc.clone();

        let result = replace_text_in_doc(&mut doc, &replacements());
        assert_eq!(result.paragraphs_changed, 0);
        assert_eq!(doc, once);
    }

    #[test]
    fn test_empty_map_changes_nothing() {
        let mut doc = Document::from_xml(DOC).unwrap();
        let original = doc.clone();
        let result = replace_text_in_doc(&mut doc, &PlaceholderMap::new());
        assert_eq!(result.paragraphs_changed, 0);
        assert_eq!(doc, original);
    }
}
