//! Input validation and PDF header detection.
//!
//! Runs before any parsing so that empty or foreign inputs are rejected with
//! an input error instead of reaching the PDF parser.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

/// What the header of a PDF declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFormat {
    /// Declared version, `major.minor`
    pub version: String,
    /// Byte offset of the `%PDF-` marker (non-zero when junk precedes it)
    pub header_offset: usize,
}

impl fmt::Display for PdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PDF-{} (header at byte {})", self.version, self.header_offset)
    }
}

const HEADER_MARKER: &[u8] = b"%PDF-";

/// Readers tolerate garbage before the header within the first kilobyte.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Validate a file path and detect its PDF header.
///
/// Missing files and zero-length files are input errors; anything else that
/// lacks a PDF header is [`Error::UnknownFormat`].
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<PdfFormat> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::MissingInput(path.display().to_string()));
    }

    let mut prefix = Vec::with_capacity(HEADER_SEARCH_WINDOW);
    File::open(path)?
        .take(HEADER_SEARCH_WINDOW as u64)
        .read_to_end(&mut prefix)?;
    detect_format_from_bytes(&prefix)
}

/// Detect the PDF header in an in-memory prefix of a document.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<PdfFormat> {
    if data.is_empty() {
        return Err(Error::EmptyInput);
    }

    let window = &data[..data.len().min(HEADER_SEARCH_WINDOW)];
    let header_offset = window
        .windows(HEADER_MARKER.len())
        .position(|w| w == HEADER_MARKER)
        .ok_or(Error::UnknownFormat)?;

    let start = header_offset + HEADER_MARKER.len();
    let Some(&[major, dot, minor]) = data.get(start..start + 3) else {
        return Err(Error::UnknownFormat);
    };
    let version = String::from_utf8_lossy(&[major, dot, minor]).into_owned();
    if !(major.is_ascii_digit() && dot == b'.' && minor.is_ascii_digit()) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(PdfFormat {
        version,
        header_offset,
    })
}

/// Whether `data` starts (within the search window) with a PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}
