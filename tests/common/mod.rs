//! Shared helpers for the integration tests.
#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pdfqa::{MockLlmClient, PageExtractor, PdfQaError, Session, SharedLlmClient};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Build a PDF with one line of Helvetica text per page.
pub fn build_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode page content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => pages.len() as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialize PDF");
    bytes
}

/// Page extractor returning fixed page texts and counting its calls.
pub struct FakePages {
    pages: Vec<String>,
    pub calls: Arc<AtomicUsize>,
}

impl FakePages {
    pub fn new(pages: &[&str]) -> Self {
        Self {
            pages: pages.iter().map(|p| p.to_string()).collect(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl PageExtractor for FakePages {
    fn extract_pages(&self, _bytes: &[u8]) -> Result<Vec<String>, PdfQaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pages.clone())
    }
}

/// Page extractor that fails the way a broken page would.
pub struct FailingPages(pub &'static str);

impl PageExtractor for FailingPages {
    fn extract_pages(&self, _bytes: &[u8]) -> Result<Vec<String>, PdfQaError> {
        Err(PdfQaError::Extraction(self.0.to_string()))
    }
}

/// Panics like a PDF library choking on a malformed file.
pub struct PanickingPages;

impl PageExtractor for PanickingPages {
    fn extract_pages(&self, _bytes: &[u8]) -> Result<Vec<String>, PdfQaError> {
        panic!("unexpected end of xref table")
    }
}

/// A session whose clients are all `mock`, plus a count of clients built.
pub fn mock_session(mock: Arc<MockLlmClient>) -> (Session, Arc<AtomicUsize>) {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();
    let session = Session::new(Box::new(move |_: &str| -> SharedLlmClient {
        counter.fetch_add(1, Ordering::SeqCst);
        mock.clone()
    }));
    (session, built)
}
