//! Error types for extractkit.

use std::io;
use thiserror::Error;

use crate::model::ElementKind;

/// Result type alias for extractkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during document extraction.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No input document was provided (zero bytes).
    #[error("Input document is empty")]
    EmptyInput,

    /// The input document does not exist.
    #[error("Input document not found: {0}")]
    MissingInput(String),

    /// An option value could not be understood.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted and requires a password.
    #[error("Document is encrypted")]
    Encrypted,

    /// The PDF structure is corrupted or malformed.
    #[error("Corrupted PDF structure: {0}")]
    Corrupted(String),

    /// A model capability could not be acquired.
    #[error("Capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// A single region could not be extracted.
    #[error("Failed to extract {kind} region on page {page}: {reason}")]
    RegionExtraction {
        page: u32,
        kind: ElementKind,
        reason: String,
    },

    /// A single page could not be processed.
    #[error("Failed to process page {page}: {reason}")]
    PageProcessing { page: u32, reason: String },

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Error during rendering (JSON, HTML, Markdown).
    #[error("Rendering error: {0}")]
    Render(String),

    /// The extraction service queue is full.
    #[error("Extraction service is saturated, try again later")]
    Busy,

    /// The extraction service could not run a job.
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

/// Coarse classification of an [`Error`], used to decide how a caller recovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing, empty or malformed request input.
    Input,
    /// One region failed; replaced by a placeholder.
    RegionExtraction,
    /// One page failed; emitted without elements.
    PageProcessing,
    /// A model capability is missing; the fallback strategy takes over.
    CapabilityUnavailable,
    /// The document cannot be opened or parsed at all.
    DocumentFatal,
    /// Output serialization failed.
    Render,
    /// The worker pool rejected or lost the job.
    Service,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(e) if e.kind() == io::ErrorKind::NotFound => ErrorKind::Input,
            Error::EmptyInput | Error::MissingInput(_) | Error::InvalidOption(_) => {
                ErrorKind::Input
            }
            Error::Io(_)
            | Error::UnknownFormat
            | Error::UnsupportedVersion(_)
            | Error::PdfParse(_)
            | Error::Encrypted
            | Error::Corrupted(_) => ErrorKind::DocumentFatal,
            Error::CapabilityUnavailable(_) => ErrorKind::CapabilityUnavailable,
            Error::RegionExtraction { .. } => ErrorKind::RegionExtraction,
            Error::PageProcessing { .. } | Error::PageOutOfRange(..) => ErrorKind::PageProcessing,
            Error::Render(_) => ErrorKind::Render,
            Error::Busy | Error::WorkerPool(_) => ErrorKind::Service,
        }
    }

    /// Whether the pipeline recovers from this error locally instead of
    /// failing the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::RegionExtraction | ErrorKind::PageProcessing | ErrorKind::CapabilityUnavailable
        )
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Corrupted(format!("image data: {}", err))
    }
}
