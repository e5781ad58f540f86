use thiserror::Error;

use crate::docx::DocxError;

/// Errors that abort a generate/preview/extract call
#[derive(Debug, Error)]
pub enum SowError {
    #[error("Required sheet '{0}' not found in workbook")]
    MissingSheet(String),

    #[error("Required column '{column}' not found in sheet '{sheet}'")]
    MissingColumn { sheet: String, column: String },

    #[error("Failed to read workbook {context}: {source}")]
    Workbook {
        context: String,
        #[source]
        source: calamine::Error,
    },

    #[error("Failed to process template: {0}")]
    Docx(#[from] DocxError),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SowError {
    /// True for the spreadsheet-shape failures (missing sheet or column)
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::MissingSheet(_) | Self::MissingColumn { .. })
    }
}

pub type Result<T> = std::result::Result<T, SowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_errors_keep_their_kind() {
        let err: SowError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, SowError::Json(_)));
        assert!(err.to_string().starts_with("Failed to serialize report"));
        assert!(!err.is_schema_error());
    }
}
