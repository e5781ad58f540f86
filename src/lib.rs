pub mod docx;
pub mod error;
pub mod heuristics;
pub mod io;
pub mod models;
pub mod stages;

pub use docx::{Document, DocxPackage};
pub use error::{Result, SowError};
pub use io::{MappingReport, PreviewReport, Workbook, load_workbook, load_workbook_bytes, output_filename};
pub use models::{Extraction, PhaseMapping, PlaceholderMap};
pub use stages::{
    ExtractConfig, ReconcileConfig, Rendered, SowConfig, extract_placeholders, generate, preview,
    render, render_files, replace_text_in_doc, sync_budget_table,
};
