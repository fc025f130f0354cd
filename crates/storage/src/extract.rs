use std::path::{Path, PathBuf};

use lopdf::Document;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path}: {message}")]
    Pdf { path: PathBuf, message: String },
    #[error("{0}")]
    Unsupported(String),
}

pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// PDF files yield their pages' text in page order; anything else is read as UTF-8.
pub fn extract_text(path: &Path) -> Result<String, ExtractError> {
    if is_pdf(path) {
        extract_pdf_text(path)
    } else {
        std::fs::read_to_string(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn extract_pdf_text(path: &Path) -> Result<String, ExtractError> {
    let pdf_error = |err: lopdf::Error| ExtractError::Pdf {
        path: path.to_path_buf(),
        message: err.to_string(),
    };

    let document = Document::load(path).map_err(pdf_error)?;
    let mut text = String::new();

    for page_number in document.get_pages().keys() {
        let page_text = document.extract_text(&[*page_number]).map_err(pdf_error)?;
        text.push_str(&page_text);
    }

    tracing::debug!(path = %path.display(), chars = text.len(), "pdf text extracted");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    use super::*;

    fn write_pdf(path: &Path, pages: &[&str]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages.len() as i64,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn pdf_pages_are_concatenated_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Guide.PDF");
        write_pdf(&path, &["First page", "Second page"]);

        let text = extract_text(&path).unwrap();
        let first = text.find("First page").expect("first page text");
        let second = text.find("Second page").expect("second page text");
        assert!(first < second, "{text}");
    }

    #[test]
    fn detects_pdf_extension_case_insensitively() {
        assert!(is_pdf(Path::new("paper.pdf")));
        assert!(is_pdf(Path::new("PAPER.PDF")));
        assert!(!is_pdf(Path::new("paper.pdf.txt")));
        assert!(!is_pdf(Path::new("README")));
    }

    #[test]
    fn non_utf8_text_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.txt");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0xc3]).unwrap();
        assert!(matches!(extract_text(&path), Err(ExtractError::Io { .. })));
    }

    #[test]
    fn corrupt_pdf_is_a_pdf_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not really a pdf").unwrap();
        assert!(matches!(extract_text(&path), Err(ExtractError::Pdf { .. })));
    }
}
