use std::io::Write;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use tracing::debug;

use crate::docx::DocxPackage;
use crate::error::{Result, SowError};

static EMPTY: CellValue = CellValue::Empty;

/// A typed spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Error(String),
}

impl CellValue {
    /// Empty, or text that is only whitespace
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// The cell rendered as text; `None` for an empty cell
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => Some(format_number(*n)),
            CellValue::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
            CellValue::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            CellValue::Error(e) => Some(e.clone()),
        }
    }

    fn from_calamine(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(n) => CellValue::Number(*n),
            Data::Int(n) => CellValue::Number(*n as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::Error(e) => CellValue::Error(format!("#{:?}", e)),
            // Assumes the 1900 date system, as calamine does not expose the flag
            Data::DateTime(dt) => serial_to_datetime(dt.as_f64())
                .map(CellValue::DateTime)
                .unwrap_or(CellValue::Number(dt.as_f64())),
            Data::DateTimeIso(s) => parse_iso_datetime(s)
                .map(CellValue::DateTime)
                .unwrap_or_else(|| CellValue::Text(s.clone())),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
        }
    }
}

/// Integers without decimals, everything else as-is
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Convert an Excel serial date (1900 system) to a timestamp
fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(TimeDelta::try_milliseconds(millis)?)
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// One worksheet as a dense grid addressed from A1
#[derive(Debug, Clone, PartialEq)]
pub struct SheetGrid {
    pub name: String,
    rows: Vec<Vec<CellValue>>,
}

impl SheetGrid {
    pub fn new(name: &str, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.to_string(),
            rows,
        }
    }

    /// Cell at absolute (row, col); out-of-range cells are empty
    pub fn get(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    pub fn row(&self, row: usize) -> &[CellValue] {
        self.rows.get(row).map(|r| r.as_slice()).unwrap_or(&[])
    }

    /// Number of rows up to the last populated one
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns of the widest row
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// The sheets of a loaded spreadsheet, in workbook order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<SheetGrid>,
}

impl Workbook {
    pub fn new(sheets: Vec<SheetGrid>) -> Self {
        Self { sheets }
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetGrid> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Like [`Workbook::sheet`] but a missing sheet is a schema error
    pub fn require_sheet(&self, name: &str) -> Result<&SheetGrid> {
        self.sheet(name)
            .ok_or_else(|| SowError::MissingSheet(name.to_string()))
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }
}

/// Load every sheet of a spreadsheet file (xlsx, xlsm, xls, xlsb, ods)
pub fn load_workbook(path: &Path) -> Result<Workbook> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|source| SowError::Workbook {
            context: format!("{:?}", path),
            source,
        })?;

    let mut sheets = Vec::new();
    for sheet_name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|source| SowError::Workbook {
                context: format!("sheet '{}'", sheet_name),
                source,
            })?;

        // Range start offset (data may not begin at A1)
        let (start_row, start_col) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));

        let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); start_row];
        for row in range.rows() {
            let mut cells = vec![CellValue::Empty; start_col];
            cells.extend(row.iter().map(CellValue::from_calamine));
            rows.push(cells);
        }

        debug!("Read sheet '{}' ({} rows)", sheet_name, rows.len());
        sheets.push(SheetGrid::new(&sheet_name, rows));
    }

    Ok(Workbook::new(sheets))
}

/// Load a spreadsheet held in memory.
///
/// The bytes are staged in a named temporary file carrying `extension` so the
/// reader can pick the format; the file is removed when this returns, on
/// success or failure.
pub fn load_workbook_bytes(bytes: &[u8], extension: &str) -> Result<Workbook> {
    let mut staged = tempfile::Builder::new()
        .prefix("sowfill-")
        .suffix(&format!(".{}", extension.trim_start_matches('.')))
        .tempfile()?;
    staged.write_all(bytes)?;
    staged.flush()?;

    debug!("Staged {} spreadsheet bytes at {:?}", bytes.len(), staged.path());
    load_workbook(staged.path())
}

/// Load a `.docx` template from disk
pub fn load_template(path: &Path) -> Result<DocxPackage> {
    Ok(DocxPackage::open(path)?)
}

/// Load a `.docx` template held in memory
pub fn load_template_bytes(bytes: &[u8]) -> Result<DocxPackage> {
    Ok(DocxPackage::from_bytes(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_to_datetime() {
        let dt = serial_to_datetime(45882.0).unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2025-08-13 00:00:00");

        let noon = serial_to_datetime(45882.5).unwrap();
        assert_eq!(noon.format("%H:%M").to_string(), "12:00");

        assert!(serial_to_datetime(f64::NAN).is_none());
    }

    #[test]
    fn test_cell_as_text() {
        assert_eq!(CellValue::Number(5000.0).as_text().as_deref(), Some("5000"));
        assert_eq!(CellValue::Number(0.15).as_text().as_deref(), Some("0.15"));
        assert_eq!(CellValue::Bool(true).as_text().as_deref(), Some("True"));
        assert_eq!(CellValue::Empty.as_text(), None);
        assert!(CellValue::Text("  ".into()).is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
    }

    #[test]
    fn test_parse_iso_datetime() {
        assert!(parse_iso_datetime("2025-08-13T09:30:00").is_some());
        assert!(parse_iso_datetime("2025-08-13").is_some());
        assert!(parse_iso_datetime("not a date").is_none());
    }

    #[test]
    fn test_grid_out_of_range_is_empty() {
        let grid = SheetGrid::new("Budget", vec![vec![CellValue::Text("Phase".into())]]);
        assert_eq!(grid.get(0, 0), &CellValue::Text("Phase".into()));
        assert_eq!(grid.get(0, 5), &CellValue::Empty);
        assert_eq!(grid.get(9, 0), &CellValue::Empty);
        assert!(grid.row(3).is_empty());
        assert_eq!(grid.width(), 1);
        assert_eq!(SheetGrid::new("Empty", vec![]).width(), 0);
    }

    #[test]
    fn test_require_sheet() {
        let workbook = Workbook::new(vec![SheetGrid::new("Variables", vec![])]);
        assert!(workbook.require_sheet("Variables").is_ok());
        let err = workbook.require_sheet("Budget").unwrap_err();
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_load_workbook_bytes_rejects_garbage() {
        let err = load_workbook_bytes(b"not a spreadsheet", "xlsx").unwrap_err();
        assert!(matches!(err, SowError::Workbook { .. }));
    }
}
