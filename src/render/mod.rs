//! Rendering of extracted documents into output formats.

mod html;
mod json;
mod markdown;
mod table;

use std::fmt;
use std::str::FromStr;

pub use html::to_html;
pub use json::{from_json, to_json, JsonFormat};
pub use markdown::to_markdown;
pub use table::{table_to_html, table_to_markdown};

use crate::error::{Error, Result};
use crate::model::Document;

/// Output format for [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Structured JSON
    #[default]
    Json,
    /// Standalone HTML page
    Html,
    /// Markdown
    Markdown,
}

impl OutputFormat {
    /// MIME type of the rendered output.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Json => "application/json",
            OutputFormat::Html => "text/html",
            OutputFormat::Markdown => "text/markdown",
        }
    }

    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Html => "html",
            OutputFormat::Markdown => "md",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Html => write!(f, "html"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(Error::InvalidOption(format!(
                "unknown output format '{}', expected json, html or markdown",
                other
            ))),
        }
    }
}

/// Render a document in the given format. JSON is pretty-printed.
pub fn render(doc: &Document, format: OutputFormat) -> Result<String> {
    render_with(doc, format, JsonFormat::Pretty)
}

/// Render a document, choosing the JSON layout explicitly.
pub fn render_with(doc: &Document, format: OutputFormat, json: JsonFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(doc, json),
        OutputFormat::Html => Ok(to_html(doc)),
        OutputFormat::Markdown => Ok(to_markdown(doc)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("HTML".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!(
            "markdown".parse::<OutputFormat>().unwrap(),
            OutputFormat::Markdown
        );
        assert!(matches!(
            "pdf".parse::<OutputFormat>(),
            Err(Error::InvalidOption(_))
        ));
    }

    #[test]
    fn test_default_is_json() {
        assert_eq!(OutputFormat::default(), OutputFormat::Json);
        assert_eq!(OutputFormat::Json.mime_type(), "application/json");
        assert_eq!(OutputFormat::Markdown.extension(), "md");
    }

    #[test]
    fn test_render_empty_document() {
        let doc = Document::new();
        for format in [OutputFormat::Json, OutputFormat::Html, OutputFormat::Markdown] {
            assert!(render(&doc, format).is_ok());
        }
    }
}
