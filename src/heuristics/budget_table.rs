use crate::docx::Table;

/// Column positions of a recognised budget table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetColumns {
    pub phase: usize,
    pub estimate: usize,
}

/// Recognise a budget table from its header row.
///
/// The table needs at least `min_rows` rows and a header of at least
/// `min_header_cells` cells. A header cell containing "phase" marks the phase
/// column; otherwise one containing "estimate" or "cost" marks the estimate
/// column. When several cells qualify the last one wins.
pub fn detect_budget_columns(
    table: &Table,
    min_rows: usize,
    min_header_cells: usize,
) -> Option<BudgetColumns> {
    if table.row_count() < min_rows {
        return None;
    }
    let header = table.row(0)?;
    if header.cell_count() < min_header_cells {
        return None;
    }

    let mut phase = None;
    let mut estimate = None;
    for (i, cell) in header.cells().enumerate() {
        let label = cell.text().trim().to_lowercase();
        if label.contains("phase") {
            phase = Some(i);
        } else if label.contains("estimate") || label.contains("cost") {
            estimate = Some(i);
        }
    }

    Some(BudgetColumns {
        phase: phase?,
        estimate: estimate?,
    })
}
