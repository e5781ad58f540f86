use std::path::Path;

use tracing::info;

use crate::docx::DocxPackage;
use crate::error::Result;
use crate::io::{PreviewReport, Workbook, load_template, load_template_bytes, load_workbook, load_workbook_bytes};
use crate::models::Extraction;

use super::{
    ExtractConfig, ReconcileConfig, ReconcileResult, SubstitutionResult, extract_placeholders,
    replace_text_in_doc, sync_budget_table,
};

/// Configuration for the whole fill pipeline
#[derive(Debug, Clone, Default)]
pub struct SowConfig {
    pub extract: ExtractConfig,
    pub reconcile: ReconcileConfig,
}

/// A filled template and what each stage did to it
#[derive(Debug, Clone)]
pub struct Rendered {
    pub package: DocxPackage,
    pub extraction: Extraction,
    pub substitution: SubstitutionResult,
    pub reconcile: ReconcileResult,
}

impl Rendered {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.package.to_bytes()?)
    }

    pub fn preview(&self) -> String {
        PreviewReport::new(&self.package.document).format()
    }
}

/// Execute Stage 3: fill `template` from `workbook`.
///
/// Substitution runs before budget reconciliation, so budget placeholders the
/// table sync does not consume still get filled.
pub fn render(workbook: &Workbook, template: DocxPackage, config: &SowConfig) -> Result<Rendered> {
    let extraction = extract_placeholders(workbook, &config.extract)?;

    let mut package = template;
    let substitution = replace_text_in_doc(&mut package.document, &extraction.replacements);
    let reconcile = sync_budget_table(&mut package.document, &extraction.phases, &config.reconcile);

    Ok(Rendered {
        package,
        extraction,
        substitution,
        reconcile,
    })
}

/// Fill a template from in-memory spreadsheet and template bytes, returning
/// the filled `.docx` bytes
pub fn generate(
    spreadsheet: &[u8],
    extension: &str,
    template: &[u8],
    config: &SowConfig,
) -> Result<Vec<u8>> {
    let rendered = render_bytes(spreadsheet, extension, template, config)?;
    let bytes = rendered.to_bytes()?;
    info!("Stage 3: generated {} bytes", bytes.len());
    Ok(bytes)
}

/// Same as [`generate`], but flatten the result to a text preview
pub fn preview(
    spreadsheet: &[u8],
    extension: &str,
    template: &[u8],
    config: &SowConfig,
) -> Result<String> {
    Ok(render_bytes(spreadsheet, extension, template, config)?.preview())
}

fn render_bytes(
    spreadsheet: &[u8],
    extension: &str,
    template: &[u8],
    config: &SowConfig,
) -> Result<Rendered> {
    let workbook = load_workbook_bytes(spreadsheet, extension)?;
    let package = load_template_bytes(template)?;
    render(&workbook, package, config)
}

/// Fill a template from files on disk
pub fn render_files(excel: &Path, template: &Path, config: &SowConfig) -> Result<Rendered> {
    info!("Loading workbook from {:?}", excel);
    let workbook = load_workbook(excel)?;
    info!("Loading template from {:?}", template);
    let package = load_template(template)?;
    render(&workbook, package, config)
}
