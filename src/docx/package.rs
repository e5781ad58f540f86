use std::io::{Cursor, Read, Write};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;
use zip::ZipArchive;
use zip::write::SimpleFileOptions;

use super::{DocxError, Document};

const PACKAGE_RELS: &str = "_rels/.rels";
const DEFAULT_MAIN_PART: &str = "word/document.xml";
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";

const MINIMAL_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const MINIMAL_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// A `.docx` package: every zip part carried through verbatim except the
/// main document part, which is parsed into a [`Document`]
#[derive(Debug, Clone)]
pub struct DocxPackage {
    parts: Vec<(String, Vec<u8>)>,
    main_part: String,
    pub document: Document,
}

impl DocxPackage {
    /// Load a package from a file on disk
    pub fn open(path: &Path) -> Result<Self, DocxError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Load a package from its bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocxError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            parts.push((name, data));
        }

        let main_part = parts
            .iter()
            .find(|(name, _)| name == PACKAGE_RELS)
            .and_then(|(_, data)| resolve_main_part(&String::from_utf8_lossy(data)))
            .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string());

        let xml = parts
            .iter()
            .find(|(name, _)| *name == main_part)
            .map(|(_, data)| String::from_utf8_lossy(data).into_owned())
            .ok_or_else(|| DocxError::MissingPart(main_part.clone()))?;

        debug!("Loaded {} package parts, main part {}", parts.len(), main_part);

        Ok(Self {
            document: Document::from_xml(&xml)?,
            parts,
            main_part,
        })
    }

    /// Build a single-part package around a `w:document` XML string
    pub fn minimal(document_xml: &str) -> Result<Self, DocxError> {
        Ok(Self {
            parts: vec![
                ("[Content_Types].xml".to_string(), MINIMAL_CONTENT_TYPES.as_bytes().to_vec()),
                (PACKAGE_RELS.to_string(), MINIMAL_RELS.as_bytes().to_vec()),
                (DEFAULT_MAIN_PART.to_string(), Vec::new()),
            ],
            main_part: DEFAULT_MAIN_PART.to_string(),
            document: Document::from_xml(document_xml)?,
        })
    }

    pub fn main_part_name(&self) -> &str {
        &self.main_part
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(name, _)| name.as_str())
    }

    /// Serialize the package, writing the current state of the document
    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        let document_xml = self.document.to_xml();

        for (name, data) in &self.parts {
            writer.start_file(name.as_str(), options)?;
            if *name == self.main_part {
                writer.write_all(document_xml.as_bytes())?;
            } else {
                writer.write_all(data)?;
            }
        }

        Ok(writer.finish()?.into_inner())
    }

    pub fn save(&self, path: &Path) -> Result<(), DocxError> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}

/// Find the officeDocument relationship target in `_rels/.rels`
fn resolve_main_part(rels_xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(rels_xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut rel_type = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Type" => rel_type = Some(String::from_utf8_lossy(&attr.value).into_owned()),
                        b"Target" => target = Some(String::from_utf8_lossy(&attr.value).into_owned()),
                        _ => {}
                    }
                }
                if let (Some(rel_type), Some(target)) = (rel_type, target) {
                    if rel_type.ends_with(OFFICE_DOCUMENT_REL) {
                        return Some(target.trim_start_matches('/').to_string());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Hello {NAME}</w:t></w:r></w:p></w:body></w:document>"#;

    #[test]
    fn test_resolve_main_part() {
        assert_eq!(resolve_main_part(MINIMAL_RELS).as_deref(), Some("word/document.xml"));

        let custom = r#"<Relationships><Relationship Id="rId1" Type="http://x/officeDocument" Target="/word/document2.xml"/></Relationships>"#;
        assert_eq!(resolve_main_part(custom).as_deref(), Some("word/document2.xml"));

        assert_eq!(resolve_main_part("<Relationships/>"), None);
    }

    #[test]
    fn test_package_bytes_roundtrip() {
        let mut package = DocxPackage::minimal(DOC).unwrap();
        package
            .document
            .paragraphs_mut()
            .next()
            .unwrap()
            .replace_text("Hello Acme");

        let bytes = package.to_bytes().unwrap();
        let reloaded = DocxPackage::from_bytes(&bytes).unwrap();

        assert_eq!(reloaded.main_part_name(), "word/document.xml");
        assert_eq!(reloaded.part_names().count(), 3);
        assert_eq!(
            reloaded.document.paragraphs().next().unwrap().text(),
            "Hello Acme"
        );
    }

    #[test]
    fn test_not_a_zip() {
        let err = DocxPackage::from_bytes(b"plain text").unwrap_err();
        assert!(matches!(err, DocxError::Zip(_)));
    }
}
