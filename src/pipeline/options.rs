//! Extraction options and configuration.

use std::time::Duration;

use crate::model::ElementKind;
use crate::render::{JsonFormat, OutputFormat};

/// Which element kinds are extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractFlags {
    pub text: bool,
    pub tables: bool,
    pub images: bool,
    pub formulas: bool,
}

impl Default for ExtractFlags {
    fn default() -> Self {
        Self {
            text: true,
            tables: true,
            images: true,
            formulas: true,
        }
    }
}

impl ExtractFlags {
    /// Whether elements of `kind` should be dispatched.
    pub fn allows(&self, kind: ElementKind) -> bool {
        match kind {
            ElementKind::Text | ElementKind::Title | ElementKind::Header => self.text,
            ElementKind::Table => self.tables,
            ElementKind::Formula => self.formulas,
            ElementKind::Image | ElementKind::Figure => self.images,
        }
    }
}

/// Options for extracting documents.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Element kinds to extract
    pub flags: ExtractFlags,

    /// Output format of the rendered result
    pub output_format: OutputFormat,

    /// JSON layout, when rendering JSON
    pub json_format: JsonFormat,

    /// Whether to process pages in parallel
    pub parallel: bool,

    /// Worker threads for page processing (0 = one per CPU)
    pub max_workers: usize,

    /// Per-document deadline
    pub timeout: Option<Duration>,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set all flags at once.
    pub fn with_flags(mut self, flags: ExtractFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Enable or disable text extraction.
    pub fn extract_text(mut self, enabled: bool) -> Self {
        self.flags.text = enabled;
        self
    }

    /// Enable or disable table extraction.
    pub fn extract_tables(mut self, enabled: bool) -> Self {
        self.flags.tables = enabled;
        self
    }

    /// Enable or disable image extraction.
    pub fn extract_images(mut self, enabled: bool) -> Self {
        self.flags.images = enabled;
        self
    }

    /// Enable or disable formula extraction.
    pub fn extract_formulas(mut self, enabled: bool) -> Self {
        self.flags.formulas = enabled;
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Use compact JSON.
    pub fn compact(mut self) -> Self {
        self.json_format = JsonFormat::Compact;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the number of worker threads.
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers;
        self
    }

    /// Set the per-document deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            flags: ExtractFlags::default(),
            output_format: OutputFormat::Json,
            json_format: JsonFormat::Pretty,
            parallel: true,
            max_workers: 0,
            timeout: None,
        }
    }
}
