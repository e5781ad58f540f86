use tracing::{debug, info};

use crate::error::{Result, SowError};
use crate::heuristics::{DEFAULT_DATE_FORMAT, normalize_variable};
use crate::io::{CellValue, SheetGrid, Workbook};
use crate::models::{Extraction, PhaseMapping, PlaceholderMap, format_amount};

/// Configuration for Stage 0 extraction
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Sheet holding placeholder/value pairs
    pub variables_sheet: String,
    /// Header of the placeholder column
    pub key_column: String,
    /// Header of the value column
    pub value_column: String,
    /// Sheet holding budget phases
    pub budget_sheet: String,
    /// Column of phase names in the budget sheet (A)
    pub phase_column: usize,
    /// Column of amounts in the budget sheet (F)
    pub amount_column: usize,
    /// strftime format for dates
    pub date_format: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            variables_sheet: "Variables".to_string(),
            key_column: "Variable Component".to_string(),
            value_column: "Example Value".to_string(),
            budget_sheet: "Budget".to_string(),
            phase_column: 0,
            amount_column: 5,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

/// Execute Stage 0: build the placeholder and phase mappings from a workbook.
///
/// Both sheets are validated before anything is derived, so a schema error
/// yields no partial mapping.
pub fn extract_placeholders(workbook: &Workbook, config: &ExtractConfig) -> Result<Extraction> {
    let variables_sheet = workbook.require_sheet(&config.variables_sheet)?;
    let budget_sheet = workbook.require_sheet(&config.budget_sheet)?;

    let variables = read_variables(variables_sheet, config)?;
    let phases = read_phases(budget_sheet, config)?;

    let extraction = Extraction::new(variables, phases);
    info!(
        "Stage 0: {} variables, {} phases, {} placeholders",
        extraction.variables.len(),
        extraction.phases.len(),
        extraction.replacements.len()
    );

    Ok(extraction)
}

/// Read the key/value columns of the Variables sheet; the first row is the
/// header
fn read_variables(sheet: &SheetGrid, config: &ExtractConfig) -> Result<PlaceholderMap> {
    let header = sheet.row(0);
    let key_col = find_column(header, &config.key_column).ok_or_else(|| SowError::MissingColumn {
        sheet: sheet.name.clone(),
        column: config.key_column.clone(),
    })?;
    let value_col = find_column(header, &config.value_column).ok_or_else(|| SowError::MissingColumn {
        sheet: sheet.name.clone(),
        column: config.value_column.clone(),
    })?;

    let mut variables = PlaceholderMap::new();
    for row in 1..sheet.height() {
        let Some(key) = sheet
            .get(row, key_col)
            .as_text()
            .filter(|k| !k.trim().is_empty())
        else {
            continue;
        };
        let value = normalize_variable(sheet.get(row, value_col), &config.date_format);
        variables.insert(key, value);
    }

    Ok(variables)
}

fn find_column(header: &[CellValue], name: &str) -> Option<usize> {
    header
        .iter()
        .position(|cell| cell.as_text().is_some_and(|text| text == name))
}

/// Read phase/amount pairs from the Budget sheet; the first row is always
/// skipped. A non-empty sheet must reach both the phase and amount columns.
fn read_phases(sheet: &SheetGrid, config: &ExtractConfig) -> Result<PhaseMapping> {
    if sheet.height() > 0 {
        for col in [config.phase_column, config.amount_column] {
            if col >= sheet.width() {
                return Err(SowError::MissingColumn {
                    sheet: sheet.name.clone(),
                    column: column_letter(col),
                });
            }
        }
    }

    let mut phases = PhaseMapping::new();

    for row in 1..sheet.height() {
        let phase = sheet
            .get(row, config.phase_column)
            .as_text()
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        if phase.is_empty() || phase.eq_ignore_ascii_case("nan") {
            continue;
        }

        let amount = format_budget_amount(sheet.get(row, config.amount_column));
        debug!("Phase '{}' -> '{}'", phase, amount);
        phases.insert(&phase, amount);
    }

    Ok(phases)
}

/// Spreadsheet column name for a zero-based index (0 -> A, 27 -> AB)
fn column_letter(mut col: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    name.iter().rev().map(|&b| b as char).collect()
}

/// Coerce an amount cell to "$N,NNN"; blank or non-numeric gives ""
fn format_budget_amount(cell: &CellValue) -> String {
    let value = match cell {
        CellValue::Number(n) => Some(*n),
        CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        CellValue::Text(s) if !s.trim().is_empty() => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match value.and_then(format_amount) {
        Some(formatted) => formatted,
        None => {
            if !cell.is_blank() {
                debug!("Amount {:?} is not numeric, leaving blank", cell);
            }
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn budget_row(phase: CellValue, amount: CellValue) -> Vec<CellValue> {
        let mut row = vec![phase];
        row.extend(std::iter::repeat_n(CellValue::Empty, 4));
        row.push(amount);
        row
    }

    fn workbook(variables: Vec<Vec<CellValue>>, budget: Vec<Vec<CellValue>>) -> Workbook {
        Workbook::new(vec![
            SheetGrid::new("Variables", variables),
            SheetGrid::new("Budget", budget),
        ])
    }

    fn variables_header() -> Vec<CellValue> {
        vec![text("Variable Component"), text("Example Value")]
    }

    #[test]
    fn test_extracts_variables_and_phases() {
        let wb = workbook(
            vec![
                variables_header(),
                vec![text("{CLIENT NAME}"), text("Acme Co")],
                vec![text("{START DATE}"), text("2025-08-13 00:00:00")],
            ],
            vec![
                budget_row(text("Phase"), text("Amount")),
                budget_row(text("Discovery"), CellValue::Number(5000.0)),
                budget_row(text(" Build "), CellValue::Number(15000.75)),
                budget_row(text("Total"), CellValue::Number(20000.0)),
            ],
        );

        let extraction = extract_placeholders(&wb, &ExtractConfig::default()).unwrap();

        assert_eq!(extraction.variables.get("{CLIENT NAME}"), Some("Acme Co"));
        assert_eq!(extraction.variables.get("{START DATE}"), Some("13-Aug-25"));

        let phases: Vec<_> = extraction.phases.iter().collect();
        assert_eq!(
            phases,
            vec![("discovery", "$5,000"), ("build", "$15,000"), ("total", "$20,000")]
        );

        assert_eq!(extraction.replacements.get("{DISCOVERY}"), Some("$5,000"));
        assert_eq!(extraction.replacements.get("{BUILD}"), Some("$15,000"));
        assert_eq!(extraction.replacements.get("{TOTAL}"), Some("$20,000"));
        assert_eq!(extraction.replacements.get("{PROJECTTOTAL}"), Some("$20,000"));
    }

    #[test]
    fn test_budget_row_zero_is_always_skipped() {
        let wb = workbook(
            vec![variables_header()],
            vec![
                budget_row(text("Discovery"), CellValue::Number(1.0)),
                budget_row(text("Build"), CellValue::Number(2.0)),
            ],
        );
        let extraction = extract_placeholders(&wb, &ExtractConfig::default()).unwrap();
        assert!(!extraction.phases.contains("discovery"));
        assert_eq!(extraction.phases.get("build"), Some("$2"));
    }

    #[test]
    fn test_blank_and_bad_amounts_become_empty() {
        let wb = workbook(
            vec![variables_header()],
            vec![
                budget_row(text("Phase"), CellValue::Empty),
                budget_row(text("Discovery"), CellValue::Empty),
                budget_row(text("Build"), text("TBD")),
                budget_row(text("Launch"), text(" 2500.9 ")),
                budget_row(text("nan"), CellValue::Number(9.0)),
                budget_row(CellValue::Empty, CellValue::Number(9.0)),
            ],
        );
        let extraction = extract_placeholders(&wb, &ExtractConfig::default()).unwrap();

        assert_eq!(extraction.phases.get("discovery"), Some(""));
        assert_eq!(extraction.phases.get("build"), Some(""));
        assert_eq!(extraction.phases.get("launch"), Some("$2,500"));
        assert_eq!(extraction.phases.len(), 3);
    }

    #[test]
    fn test_duplicate_phase_overwrites() {
        let wb = workbook(
            vec![variables_header()],
            vec![
                budget_row(text("Phase"), CellValue::Empty),
                budget_row(text("Build"), CellValue::Number(1000.0)),
                budget_row(text("BUILD"), CellValue::Number(2000.0)),
            ],
        );
        let extraction = extract_placeholders(&wb, &ExtractConfig::default()).unwrap();
        assert_eq!(extraction.phases.len(), 1);
        assert_eq!(extraction.phases.get("build"), Some("$2,000"));
    }

    #[test]
    fn test_variables_columns_found_by_header() {
        let wb = workbook(
            vec![
                vec![text("Notes"), text("Example Value"), text("Variable Component")],
                vec![text("ignored"), CellValue::Number(42.0), text("{TERM}")],
                vec![text("no key"), text("x"), CellValue::Empty],
            ],
            vec![],
        );
        let extraction = extract_placeholders(&wb, &ExtractConfig::default()).unwrap();
        assert_eq!(extraction.variables.get("{TERM}"), Some("42"));
        assert_eq!(extraction.variables.len(), 1);
    }

    #[test]
    fn test_missing_sheet_is_schema_error() {
        let wb = Workbook::new(vec![SheetGrid::new("Variables", vec![variables_header()])]);
        let err = extract_placeholders(&wb, &ExtractConfig::default()).unwrap_err();
        assert!(matches!(err, SowError::MissingSheet(ref s) if s == "Budget"));
    }

    #[test]
    fn test_budget_sheet_without_amount_column_is_schema_error() {
        let wb = workbook(
            vec![variables_header()],
            vec![
                vec![text("Phase")],
                vec![text("Discovery"), CellValue::Number(5000.0)],
            ],
        );
        let err = extract_placeholders(&wb, &ExtractConfig::default()).unwrap_err();
        assert!(err.is_schema_error());
        assert!(matches!(
            err,
            SowError::MissingColumn { ref sheet, ref column } if sheet == "Budget" && column == "F"
        ));
    }

    #[test]
    fn test_empty_budget_sheet_has_no_phases() {
        let wb = workbook(vec![variables_header()], vec![]);
        let extraction = extract_placeholders(&wb, &ExtractConfig::default()).unwrap();
        assert!(extraction.phases.is_empty());
    }

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(5), "F");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(27), "AB");
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let wb = workbook(vec![vec![text("Variable Component"), text("Value")]], vec![]);
        let err = extract_placeholders(&wb, &ExtractConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            SowError::MissingColumn { ref column, .. } if column == "Example Value"
        ));
        assert!(err.is_schema_error());
    }
}
