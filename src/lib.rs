//! # extractkit
//!
//! Multi-modal PDF extraction for Rust.
//!
//! A document is split into typed layout regions (text, tables, formulas,
//! images), each region is handed to a specialized extractor, and the
//! results are assembled into one [`Document`] with stable identifiers and
//! aggregate metadata, then rendered as JSON, HTML or Markdown.
//!
//! Two strategies exist behind the same traits: a model strategy backed by
//! opaque detectors supplied through a [`CapabilityLoader`], and a
//! structure-based fallback that reads the PDF content streams directly.
//! The [`StrategySelector`] picks one and degrades gracefully when the
//! models cannot be loaded.
//!
//! ## Quick Start
//!
//! ```no_run
//! use extractkit::{extract_file, ExtractOptions, OutputFormat};
//!
//! fn main() -> extractkit::Result<()> {
//!     let options = ExtractOptions::new().with_format(OutputFormat::Markdown);
//!     let markdown = extract_file("document.pdf", &options)?;
//!     println!("{}", markdown);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Layout-driven dispatch**: every region goes to the matching extractor
//! - **Graceful degradation**: failed regions become zero-confidence placeholders
//! - **Parallel pages**: bounded Rayon pool, deterministic output order
//! - **Backpressure**: [`ExtractionService`] rejects work when saturated

pub mod detect;
pub mod error;
pub mod extract;
pub mod handle;
pub mod layout;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod strategy;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf_bytes, PdfFormat};
pub use error::{Error, ErrorKind, Result};
pub use extract::{
    CapabilityLoader, ExtractorSet, FnLoader, FormulaExtractor, ImageExtractor, LayoutDetector,
    ModelSuite, TableExtractor, TextExtractor, UnavailableLoader,
};
pub use handle::DocumentHandle;
pub use layout::{FallbackLayoutProvider, LayoutProvider};
pub use model::{
    BBox, Document, Element, ElementKind, ExtractionMethod, Formula, FormulaKind, Image,
    ImageKind, Metadata, Page, Table,
};
pub use pipeline::{
    DocumentAssembler, ExtractFlags, ExtractOptions, ExtractionService, JobHandle, JobInput,
    ServiceConfig,
};
pub use render::{JsonFormat, OutputFormat};
pub use strategy::{CapabilityStatus, StrategySelector, StrategyState};

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// Extract a PDF file and render it in `options.output_format`.
///
/// Uses the fallback strategy unless a model backend is configured through
/// an [`Extractor`].
///
/// # Example
///
/// ```no_run
/// use extractkit::{extract_file, ExtractOptions};
///
/// let json = extract_file("document.pdf", &ExtractOptions::default()).unwrap();
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> Result<String> {
    let extractor = Extractor::new().with_options(options.clone());
    extractor.extract(&DocumentHandle::open(path)?)
}

/// Extract a PDF held in memory and render it.
pub fn extract_bytes(data: &[u8], options: &ExtractOptions) -> Result<String> {
    let extractor = Extractor::new().with_options(options.clone());
    extractor.extract(&DocumentHandle::from_bytes(data)?)
}

/// Extract a PDF from a reader and render it.
///
/// # Example
///
/// ```no_run
/// use extractkit::{extract_reader, ExtractOptions};
/// use std::fs::File;
///
/// let file = File::open("document.pdf").unwrap();
/// let json = extract_reader(file, &ExtractOptions::default()).unwrap();
/// ```
pub fn extract_reader<R: Read>(reader: R, options: &ExtractOptions) -> Result<String> {
    let extractor = Extractor::new().with_options(options.clone());
    extractor.extract(&DocumentHandle::from_reader(reader)?)
}

/// Extract a PDF file on Tokio's blocking pool.
#[cfg(feature = "async")]
pub async fn extract_file_async<P: AsRef<Path>>(
    path: P,
    options: ExtractOptions,
) -> Result<String> {
    let path = path.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || extract_file(path, &options))
        .await
        .map_err(|e| Error::WorkerPool(e.to_string()))?
}

/// Builder tying a strategy selector to extraction options.
///
/// # Example
///
/// ```no_run
/// use extractkit::{Extractor, DocumentHandle};
///
/// let extractor = Extractor::new().sequential();
/// let handle = DocumentHandle::open("document.pdf")?;
/// let doc = extractor.extract_document(&handle)?;
/// println!("{} tables", doc.metadata.total_tables);
/// # Ok::<(), extractkit::Error>(())
/// ```
#[derive(Debug)]
pub struct Extractor {
    selector: Arc<StrategySelector>,
    options: ExtractOptions,
}

impl Extractor {
    /// Create an extractor with no model backend.
    pub fn new() -> Self {
        Self {
            selector: Arc::new(StrategySelector::default()),
            options: ExtractOptions::default(),
        }
    }

    /// Use a shared strategy selector.
    pub fn with_selector(mut self, selector: Arc<StrategySelector>) -> Self {
        self.selector = selector;
        self
    }

    /// Load models through `loader`.
    pub fn with_loader(mut self, loader: Arc<dyn CapabilityLoader>) -> Self {
        self.selector = Arc::new(StrategySelector::new(loader));
        self
    }

    /// Replace all options.
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.options = self.options.with_format(format);
        self
    }

    /// Set which element kinds are extracted.
    pub fn with_flags(mut self, flags: ExtractFlags) -> Self {
        self.options = self.options.with_flags(flags);
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// The strategy selector in use.
    pub fn selector(&self) -> &Arc<StrategySelector> {
        &self.selector
    }

    /// The options in use.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract a document without rendering it.
    pub fn extract_document(&self, handle: &DocumentHandle) -> Result<Document> {
        let extractors = self.selector.extractors();
        DocumentAssembler::new(&extractors, &self.options).process(handle)
    }

    /// Extract a document and render it in the configured format.
    pub fn extract(&self, handle: &DocumentHandle) -> Result<String> {
        let doc = self.extract_document(handle)?;
        render::render_with(&doc, self.options.output_format, self.options.json_format)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}
