//! Minimal WordprocessingML support: enough of the `.docx` object model to
//! read paragraph and table text, rewrite runs, restructure table rows, set
//! alignment and bold, and write the package back out.

pub mod document;
pub mod package;
pub mod xml;

pub use document::*;
pub use package::DocxPackage;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("Invalid .docx archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed XML: {0}")]
    Xml(String),

    #[error("Package part '{0}' not found")]
    MissingPart(String),

    #[error("Document has no body")]
    MissingBody,
}
