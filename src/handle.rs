//! Opened documents.

use std::io::{Read, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use lopdf::{Document as LopdfDocument, ObjectId};
use tempfile::NamedTempFile;

use crate::detect::{detect_format_from_bytes, detect_format_from_path, PdfFormat};
use crate::error::{Error, Result};
use crate::parser::{self, PageContent};

type PageSlot = OnceLock<std::result::Result<Arc<PageContent>, String>>;

/// A parsed PDF, scoped to one extraction request.
///
/// Holds a filesystem path for path-based capability providers. When the
/// document came from memory the bytes are spooled to a temporary file that
/// is removed when the handle is dropped. Page content is parsed lazily and
/// cached, so concurrent extractors reading the same page share one parse.
pub struct DocumentHandle {
    doc: LopdfDocument,
    path: PathBuf,
    format: PdfFormat,
    page_ids: Vec<ObjectId>,
    pages: Vec<PageSlot>,
    _spool: Option<NamedTempFile>,
}

impl std::fmt::Debug for DocumentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentHandle")
            .field("path", &self.path)
            .field("version", &self.format.version)
            .field("pages", &self.page_ids.len())
            .finish()
    }
}

impl DocumentHandle {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let format = detect_format_from_path(path)?;
        let doc = load_guarded(|| LopdfDocument::load(path))?;
        Self::build(doc, path.to_path_buf(), format, None)
    }

    /// Open a PDF held in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let format = detect_format_from_bytes(data)?;

        let mut spool = tempfile::Builder::new()
            .prefix("extractkit-")
            .suffix(".pdf")
            .tempfile()?;
        spool.write_all(data)?;
        spool.flush()?;

        let doc = load_guarded(|| LopdfDocument::load_mem(data))?;
        let path = spool.path().to_path_buf();
        Self::build(doc, path, format, Some(spool))
    }

    /// Open a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    fn build(
        doc: LopdfDocument,
        path: PathBuf,
        format: PdfFormat,
        spool: Option<NamedTempFile>,
    ) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }

        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        let pages = (0..page_ids.len()).map(|_| OnceLock::new()).collect();

        log::debug!(
            "Opened {} (PDF {}, {} pages)",
            path.display(),
            format.version,
            page_ids.len()
        );

        Ok(Self {
            doc,
            path,
            format,
            page_ids,
            pages,
            _spool: spool,
        })
    }

    /// Number of physical pages.
    pub fn page_count(&self) -> u32 {
        self.page_ids.len() as u32
    }

    /// Path of the document on disk (a temporary file for in-memory input).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// PDF header version (e.g., "1.7").
    pub fn version(&self) -> &str {
        &self.format.version
    }

    /// The underlying lopdf document.
    pub fn lopdf(&self) -> &LopdfDocument {
        &self.doc
    }

    fn page_id(&self, page_number: u32) -> Result<ObjectId> {
        if page_number == 0 {
            return Err(Error::PageOutOfRange(page_number, self.page_count()));
        }
        self.page_ids
            .get((page_number - 1) as usize)
            .copied()
            .ok_or(Error::PageOutOfRange(page_number, self.page_count()))
    }

    /// Page dimensions in points.
    pub fn page_size(&self, page_number: u32) -> Result<(f32, f32)> {
        let id = self.page_id(page_number)?;
        Ok(parser::page_size(&self.doc, id))
    }

    /// Parsed content of a page, computed on first access.
    ///
    /// A page whose content stream cannot be parsed fails with
    /// [`Error::PageProcessing`], and keeps failing on later calls.
    pub fn page_content(&self, page_number: u32) -> Result<Arc<PageContent>> {
        let id = self.page_id(page_number)?;
        let slot = &self.pages[(page_number - 1) as usize];

        let cached = slot.get_or_init(|| {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                parser::read_page(&self.doc, page_number, id)
            }));
            match result {
                Ok(Ok(content)) => Ok(Arc::new(content)),
                Ok(Err(e)) => Err(e.to_string()),
                Err(_) => Err("content stream parser panicked".to_string()),
            }
        });

        cached.clone().map_err(|reason| Error::PageProcessing {
            page: page_number,
            reason,
        })
    }
}

/// Run a lopdf load, mapping parser panics on malformed input to
/// [`Error::Corrupted`].
fn load_guarded<F>(load: F) -> Result<LopdfDocument>
where
    F: FnOnce() -> std::result::Result<LopdfDocument, lopdf::Error>,
{
    match panic::catch_unwind(AssertUnwindSafe(load)) {
        Ok(Ok(doc)) => Ok(doc),
        Ok(Err(lopdf::Error::Decryption(_))) => Err(Error::Encrypted),
        Ok(Err(e)) => Err(Error::from(e)),
        Err(_) => Err(Error::Corrupted("PDF parser panicked".to_string())),
    }
}
