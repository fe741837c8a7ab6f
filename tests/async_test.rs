//! Tests for the Tokio entry point. Run with `--features async`.

#![cfg(feature = "async")]

mod common;

use std::io::Write;

use extractkit::render::from_json;
use extractkit::{extract_file_async, Error, ExtractOptions, OutputFormat};

#[tokio::test]
async fn test_extract_file_async() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&common::hello_and_table_pdf()).unwrap();

    let json = extract_file_async(file.path(), ExtractOptions::default())
        .await
        .unwrap();
    let doc = from_json(&json).unwrap();
    assert_eq!(doc.metadata.total_pages, 2);
    assert_eq!(doc.metadata.total_tables, 1);
    assert!(doc.text.starts_with("Hello "));

    let md = extract_file_async(
        file.path(),
        ExtractOptions::new().with_format(OutputFormat::Markdown),
    )
    .await
    .unwrap();
    assert!(md.starts_with("# Extracted Document"));
}

#[tokio::test]
async fn test_extract_file_async_missing_input() {
    let result = extract_file_async("/nonexistent/input.pdf", ExtractOptions::default()).await;
    assert!(matches!(result, Err(Error::MissingInput(_))));
}
