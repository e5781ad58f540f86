use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::docx::{Alignment, Document, Row, Table};
use crate::heuristics::{BudgetColumns, detect_budget_columns, is_total_label, match_phase, title_case};
use crate::models::{PhaseMapping, TOTAL_PHASE};

/// Configuration for Stage 2 reconciliation
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Minimum rows (header included) for a table to be a budget table
    pub min_rows: usize,
    /// Minimum header cells for a table to be a budget table
    pub min_header_cells: usize,
    /// Unmatched row labels that are kept instead of removed
    pub protected_labels: Vec<String>,
    /// Substring identifying the total row
    pub total_marker: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_header_cells: 3,
            protected_labels: vec!["total".to_string(), "estimated total".to_string()],
            total_marker: "total".to_string(),
        }
    }
}

/// A row that could not be processed; the row is left as it was
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("row {row} has no cell at column {column}")]
    MissingCell { row: usize, column: usize },

    #[error("new rows have {cells} cells, column {column} is out of range")]
    NarrowRow { cells: usize, column: usize },
}

/// What happened to one existing data row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// Matched a phase; estimate overwritten
    Updated { row: usize, phase: String },
    /// Unmatched total row, left in place
    Kept { row: usize },
    /// Unmatched template row, removed
    Removed { row: usize, label: String },
    /// Malformed row, left untouched
    Skipped { row: usize, error: RowError },
}

/// Result of Stage 2 reconciliation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileResult {
    /// Index among body tables of the reconciled table, if one qualified
    pub table_index: Option<usize>,
    /// Per-row outcome for the table's original data rows
    pub outcomes: Vec<RowOutcome>,
    /// Phases appended as new rows
    pub rows_added: usize,
    /// Whether a total row received the total amount
    pub total_updated: bool,
}

impl ReconcileResult {
    pub fn rows_updated(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Updated { .. }))
    }

    pub fn rows_removed(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Removed { .. }))
    }

    pub fn rows_skipped(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Skipped { .. }))
    }

    fn count(&self, pred: impl Fn(&RowOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

enum RowAction {
    Updated(String),
    Kept,
    Stale(String),
}

/// Execute Stage 2: make the first budget table match the phase mapping.
///
/// Only the first qualifying table is touched. When none qualifies the
/// document is left alone and `table_index` is `None`.
///
/// 1. Data rows matching a phase get its amount; unmatched rows other than
///    total rows are marked stale
/// 2. Stale rows are removed
/// 3. Phases with no row are inserted before the total row (or appended)
/// 4. The total row receives the total amount
pub fn sync_budget_table(
    doc: &mut Document,
    phases: &PhaseMapping,
    config: &ReconcileConfig,
) -> ReconcileResult {
    let mut result = ReconcileResult::default();

    for (table_index, table) in doc.tables_mut().enumerate() {
        let Some(columns) = detect_budget_columns(table, config.min_rows, config.min_header_cells)
        else {
            continue;
        };

        debug!(
            "Budget table {} (phase column {}, estimate column {})",
            table_index, columns.phase, columns.estimate
        );
        result.table_index = Some(table_index);
        reconcile_table(table, columns, phases, config, &mut result);

        info!(
            "Stage 2: {} rows updated, {} removed, {} added, {} skipped",
            result.rows_updated(),
            result.rows_removed(),
            result.rows_added,
            result.rows_skipped()
        );
        return result;
    }

    info!("Stage 2: no budget table found");
    result
}

fn reconcile_table(
    table: &mut Table,
    columns: BudgetColumns,
    phases: &PhaseMapping,
    config: &ReconcileConfig,
    result: &mut ReconcileResult,
) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut stale: Vec<(usize, String)> = Vec::new();

    for row_idx in 1..table.row_count() {
        let Some(row) = table.row_mut(row_idx) else {
            break;
        };
        match process_row(row, row_idx, columns, phases, config) {
            Ok(RowAction::Updated(phase)) => {
                seen.insert(phase.clone());
                result.outcomes.push(RowOutcome::Updated { row: row_idx, phase });
            }
            Ok(RowAction::Kept) => result.outcomes.push(RowOutcome::Kept { row: row_idx }),
            Ok(RowAction::Stale(label)) => stale.push((row_idx, label)),
            Err(error) => {
                warn!("Skipping budget row {}: {}", row_idx, error);
                result.outcomes.push(RowOutcome::Skipped { row: row_idx, error });
            }
        }
    }

    // Descending order keeps the remaining indices valid
    for (row_idx, label) in stale.into_iter().rev() {
        if table.remove_row(row_idx).is_some() {
            debug!("Removed stale row {} ({:?})", row_idx, label);
            result.outcomes.push(RowOutcome::Removed { row: row_idx, label });
        }
    }

    let mut total_row = find_total_row(table, columns, &config.total_marker);
    for (phase, amount) in phases.iter() {
        if phase == TOTAL_PHASE || seen.contains(phase) {
            continue;
        }
        match build_phase_row(table, columns, phase, amount) {
            Ok(row) => {
                match total_row {
                    Some(at) => {
                        table.insert_row(at, row);
                        total_row = Some(at + 1);
                    }
                    None => table.insert_row(usize::MAX, row),
                }
                result.rows_added += 1;
            }
            Err(error) => warn!("Could not add phase '{}': {}", phase, error),
        }
    }

    if let Some(total_amount) = phases.get(TOTAL_PHASE) {
        let estimate_cell = find_total_row(table, columns, &config.total_marker)
            .and_then(|at| table.row_mut(at))
            .and_then(|row| row.cell_mut(columns.estimate));
        if let Some(cell) = estimate_cell {
            cell.write(total_amount, Alignment::Center, false);
            result.total_updated = true;
        }
    }
}

fn process_row(
    row: &mut Row,
    row_idx: usize,
    columns: BudgetColumns,
    phases: &PhaseMapping,
    config: &ReconcileConfig,
) -> Result<RowAction, RowError> {
    let phase_text = row
        .cell(columns.phase)
        .ok_or(RowError::MissingCell {
            row: row_idx,
            column: columns.phase,
        })?
        .text();
    let estimate_cell = row.cell_mut(columns.estimate).ok_or(RowError::MissingCell {
        row: row_idx,
        column: columns.estimate,
    })?;

    let label = phase_text.trim().to_lowercase();
    match match_phase(&label, phases) {
        Some(phase) => {
            estimate_cell.write(phases.get(phase).unwrap_or_default(), Alignment::Center, false);
            Ok(RowAction::Updated(phase.to_string()))
        }
        None if config.protected_labels.iter().any(|l| *l == label) => Ok(RowAction::Kept),
        None => Ok(RowAction::Stale(label)),
    }
}

/// First data row whose phase label contains the total marker
fn find_total_row(table: &Table, columns: BudgetColumns, marker: &str) -> Option<usize> {
    table
        .rows()
        .enumerate()
        .skip(1)
        .find(|(_, row)| {
            row.cell(columns.phase)
                .is_some_and(|cell| is_total_label(&cell.text(), marker))
        })
        .map(|(i, _)| i)
}

/// A new row for a phase: bold title-cased name and centred amount
fn build_phase_row(
    table: &Table,
    columns: BudgetColumns,
    phase: &str,
    amount: &str,
) -> Result<Row, RowError> {
    let mut row = table.blank_row();
    let cells = row.cell_count();

    row.cell_mut(columns.phase)
        .ok_or(RowError::NarrowRow {
            cells,
            column: columns.phase,
        })?
        .write(&title_case(phase), Alignment::Center, true);
    row.cell_mut(columns.estimate)
        .ok_or(RowError::NarrowRow {
            cells,
            column: columns.estimate,
        })?
        .write(amount, Alignment::Center, false);

    Ok(row)
}
