use anyhow::{bail, Result};
use lopdf::{Document as PdfDocument, Object};
use search_core::{DocumentRecord, IngestionError};
use serde::de::Error as _;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Records read from the corpus, plus the ones that could not be read.
#[derive(Debug, Default)]
pub struct Corpus {
    pub records: Vec<DocumentRecord>,
    pub failures: Vec<IngestionError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    /// One record object, or an array of them.
    Json,
    /// One record object per line.
    JsonLines,
    /// A raw page or extracted text; the file itself is the record.
    Raw,
    /// Page text of a PDF, titled from its document information.
    Pdf,
}

fn kind_of(path: &Path) -> Option<SourceKind> {
    match path.extension().and_then(|s| s.to_str())? {
        "json" => Some(SourceKind::Json),
        "jsonl" => Some(SourceKind::JsonLines),
        "html" | "htm" | "txt" => Some(SourceKind::Raw),
        "pdf" => Some(SourceKind::Pdf),
        _ => None,
    }
}

/// Read every record under `input`, a single file or a directory walked in
/// file-name order so ids are stable across builds.
pub fn read_corpus(input: &Path) -> Result<Corpus> {
    if !input.exists() {
        bail!("input {} does not exist", input.display());
    }
    let mut corpus = Corpus::default();
    if input.is_file() {
        corpus.read_file(input, kind_of(input).unwrap_or(SourceKind::Raw));
        return Ok(corpus);
    }
    for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        match kind_of(path) {
            Some(kind) => corpus.read_file(path, kind),
            None => tracing::debug!(path = %path.display(), "skipping unsupported file"),
        }
    }
    Ok(corpus)
}

impl Corpus {
    fn read_file(&mut self, path: &Path, kind: SourceKind) {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(source) => {
                self.failures.push(IngestionError::Read { path: path.to_path_buf(), source });
                return;
            }
        };
        match kind {
            SourceKind::Json => self.read_json(path, &bytes),
            SourceKind::JsonLines => self.read_jsonl(path, &bytes),
            SourceKind::Raw => {
                let text = String::from_utf8_lossy(&bytes);
                self.records.push(DocumentRecord::new(path.display().to_string(), None, text));
            }
            SourceKind::Pdf => self.read_pdf(path, &bytes),
        }
    }

    fn read_pdf(&mut self, path: &Path, bytes: &[u8]) {
        let url = path.display().to_string();
        let extracted = PdfDocument::load_mem(bytes).and_then(|doc| {
            let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
            let text = doc.extract_text(&pages)?;
            Ok((pdf_title(&doc), text))
        });
        match extracted {
            Ok((title, text)) => self.records.push(DocumentRecord::new(url, title, text)),
            Err(err) => {
                tracing::debug!(%url, %err, "pdf text extraction failed");
                self.failures.push(IngestionError::Undecodable { url });
            }
        }
    }

    fn read_json(&mut self, path: &Path, bytes: &[u8]) {
        let location = path.display().to_string();
        let value: serde_json::Value = match serde_json::from_slice(bytes) {
            Ok(value) => value,
            Err(source) => return self.failures.push(IngestionError::Malformed { location, source }),
        };
        match value {
            serde_json::Value::Array(items) => {
                for (i, item) in items.into_iter().enumerate() {
                    self.push_value(item, format!("{location}[{i}]"));
                }
            }
            value @ serde_json::Value::Object(_) => self.push_value(value, location),
            _ => self.failures.push(IngestionError::Malformed {
                location,
                source: serde_json::Error::custom("expected a record object or an array of records"),
            }),
        }
    }

    fn read_jsonl(&mut self, path: &Path, bytes: &[u8]) {
        let text = String::from_utf8_lossy(bytes);
        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let location = format!("{}:{}", path.display(), i + 1);
            match serde_json::from_str::<DocumentRecord>(line) {
                Ok(record) => self.records.push(record),
                Err(source) => self.failures.push(IngestionError::Malformed { location, source }),
            }
        }
    }

    fn push_value(&mut self, value: serde_json::Value, location: String) {
        match serde_json::from_value::<DocumentRecord>(value) {
            Ok(record) => self.records.push(record),
            Err(source) => self.failures.push(IngestionError::Malformed { location, source }),
        }
    }
}

/// `Title` entry of the trailer's document information dictionary.
fn pdf_title(doc: &PdfDocument) -> Option<String> {
    let info = match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };
    let title = decode_pdf_string(info.get(b"Title").ok()?.as_str().ok()?);
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// PDF text strings are UTF-16BE behind a byte order mark, else a Latin-1 superset.
fn decode_pdf_string(raw: &[u8]) -> String {
    match raw.strip_prefix(&[0xFE, 0xFF]) {
        Some(utf16) => {
            let units: Vec<u16> = utf16.chunks_exact(2).map(|pair| u16::from_be_bytes([pair[0], pair[1]])).collect();
            String::from_utf16_lossy(&units)
        }
        None => raw.iter().map(|&b| char::from(b)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Stream};
    use tempfile::tempdir;

    fn write_pdf(path: &Path, title: &str, text: &str) {
        let mut doc = PdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn reads_arrays_objects_and_lines_in_name_order() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("b.json"),
            r#"[{"url": "https://b/1", "text": "<p>uno</p>"}, {"url": "https://b/2", "title": "Dos", "text": "dos"}]"#,
        )
        .unwrap();
        fs::write(dir.path().join("a.json"), r#"{"url": "https://a", "body": "alpha"}"#).unwrap();
        fs::write(
            dir.path().join("c.jsonl"),
            "{\"url\": \"https://c/1\", \"text\": \"c1\"}\n\n{\"url\": \"https://c/2\", \"text\": \"c2\"}\n",
        )
        .unwrap();
        fs::write(dir.path().join("ignored.csv"), "x,y").unwrap();

        let corpus = read_corpus(dir.path()).unwrap();
        assert!(corpus.failures.is_empty(), "{:?}", corpus.failures);
        let urls: Vec<&str> = corpus.records.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a", "https://b/1", "https://b/2", "https://c/1", "https://c/2"]);
        assert_eq!(corpus.records[2].title.as_deref(), Some("Dos"));
        assert_eq!(corpus.records[0].raw_text, "alpha");
    }

    #[test]
    fn malformed_records_are_collected_not_fatal() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.json"), r#"[{"url": "ok", "text": "fine"}, {"url": "no text"}, 7]"#).unwrap();
        fs::write(dir.path().join("b.jsonl"), "not json\n{\"url\": \"ok2\", \"text\": \"t\"}\n").unwrap();
        fs::write(dir.path().join("c.json"), "{ broken").unwrap();
        fs::write(dir.path().join("d.json"), "\"just a string\"").unwrap();

        let corpus = read_corpus(dir.path()).unwrap();
        let urls: Vec<&str> = corpus.records.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["ok", "ok2"]);
        assert_eq!(corpus.failures.len(), 5);
        assert!(corpus.failures.iter().all(|f| matches!(f, IngestionError::Malformed { .. })));
        assert!(corpus.failures[2].to_string().contains("b.jsonl:1"));
    }

    #[test]
    fn raw_files_become_records() {
        let dir = tempdir().unwrap();
        let page = dir.path().join("page.html");
        fs::write(&page, "<h1>Grado</h1>").unwrap();
        let corpus = read_corpus(&page).unwrap();
        assert_eq!(corpus.records.len(), 1);
        assert_eq!(corpus.records[0].url, page.display().to_string());
        assert_eq!(corpus.records[0].raw_text, "<h1>Grado</h1>");
    }

    #[test]
    fn pdf_text_and_title_are_extracted_and_broken_pdfs_reported() {
        let dir = tempdir().unwrap();
        write_pdf(&dir.path().join("a-plan.pdf"), "Plan de estudios", "Grado en Medicina");
        fs::write(dir.path().join("b-broken.pdf"), b"%PDF-1.4\nnot really a pdf").unwrap();

        let corpus = read_corpus(dir.path()).unwrap();
        assert_eq!(corpus.records.len(), 1);
        let record = &corpus.records[0];
        assert!(record.url.ends_with("a-plan.pdf"));
        assert_eq!(record.title.as_deref(), Some("Plan de estudios"));
        assert!(record.raw_text.contains("Grado en Medicina"), "{:?}", record.raw_text);

        assert_eq!(corpus.failures.len(), 1);
        assert!(matches!(&corpus.failures[0], IngestionError::Undecodable { url } if url.ends_with("b-broken.pdf")));
    }

    #[test]
    fn utf16_pdf_strings_decode() {
        assert_eq!(decode_pdf_string(&[0xFE, 0xFF, 0x00, 0x4D, 0x00, 0xE1]), "Má");
        assert_eq!(decode_pdf_string(b"Plan"), "Plan");
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(read_corpus(&dir.path().join("absent")).is_err());
    }
}
