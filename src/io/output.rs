use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::docx::Document;
use crate::error::Result;
use crate::models::{Extraction, PlaceholderMap};

const CLIENT_PLACEHOLDER: &str = "{CLIENT NAME}";
const UNKNOWN_CLIENT: &str = "Unknown_Client";

/// Plain-text rendering of a filled document for review before download
pub struct PreviewReport<'a> {
    document: &'a Document,
}

impl<'a> PreviewReport<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Non-blank body paragraphs, then every table as pipe-joined rows
    pub fn format(&self) -> String {
        let mut lines: Vec<String> = vec![
            "DOCUMENT PREVIEW".to_string(),
            "=".repeat(50),
            String::new(),
        ];

        for paragraph in self.document.paragraphs() {
            let text = paragraph.text();
            if !text.trim().is_empty() {
                lines.push(text);
            }
        }

        for (table_idx, table) in self.document.tables().enumerate() {
            lines.push(format!("\n--- TABLE {} ---", table_idx + 1));
            for row in table.rows() {
                let row_text = row
                    .cells()
                    .map(|c| c.text().trim().to_string())
                    .collect::<Vec<_>>()
                    .join(" | ");
                if !row_text.trim().is_empty() {
                    lines.push(row_text);
                }
            }
        }

        lines.join("\n")
    }

    /// Write to a text file
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

/// Where a placeholder came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingSource {
    Variables,
    Budget,
}

/// One placeholder and its value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingEntry {
    pub placeholder: String,
    pub value: String,
    pub source: MappingSource,
}

/// Variable and budget placeholders side by side, for review and search
#[derive(Debug, Clone, Serialize)]
pub struct MappingReport {
    pub variables: Vec<MappingEntry>,
    pub budget: Vec<MappingEntry>,
}

impl MappingReport {
    pub fn from_extraction(extraction: &Extraction) -> Self {
        Self {
            variables: entries(&extraction.variables, MappingSource::Variables),
            budget: entries(&extraction.budget, MappingSource::Budget),
        }
    }

    /// Entries from both views whose placeholder contains `term`,
    /// case-insensitively; variables first
    pub fn search(&self, term: &str) -> Vec<&MappingEntry> {
        let needle = term.to_lowercase();
        self.variables
            .iter()
            .chain(self.budget.iter())
            .filter(|e| e.placeholder.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn format(&self) -> String {
        let mut output = String::new();
        for (title, list) in [("Variables", &self.variables), ("Budget", &self.budget)] {
            output.push_str(&format!("{}\n{}\n", title, "-".repeat(title.len())));
            if list.is_empty() {
                output.push_str(&format!("No {} placeholders found\n", title.to_lowercase()));
            }
            for entry in list {
                output.push_str(&format!("{} -> {}\n", entry.placeholder, entry.value));
            }
            output.push('\n');
        }
        output
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn entries(map: &PlaceholderMap, source: MappingSource) -> Vec<MappingEntry> {
    map.iter()
        .map(|(k, v)| MappingEntry {
            placeholder: k.to_string(),
            value: v.to_string(),
            source,
        })
        .collect()
}

/// File name for a generated SOW: `SOW_<client>_<YYYYMMDD>.docx`
pub fn output_filename(replacements: &PlaceholderMap, date: NaiveDate) -> String {
    let client = replacements
        .get(CLIENT_PLACEHOLDER)
        .unwrap_or(UNKNOWN_CLIENT);
    format!("SOW_{}_{}.docx", client, date.format("%Y%m%d"))
}
