//! Integration tests for the bounded extraction service.

mod common;

use std::sync::Arc;

use crossbeam_channel::bounded;
use extractkit::{
    Error, ExtractOptions, ExtractionMethod, ExtractionService, FnLoader, JobInput,
    ServiceConfig, StrategySelector,
};

#[test]
fn test_saturated_service_rejects_with_busy() {
    // The loader blocks until released, pinning the only worker on the
    // first job.
    let (release, gate) = bounded::<()>(0);
    let loader = FnLoader(move || {
        let _ = gate.recv();
        Err(Error::CapabilityUnavailable("no backend".into()))
    });
    let selector = Arc::new(StrategySelector::new(Arc::new(loader)));
    let service = ExtractionService::new(
        selector,
        ServiceConfig::default().workers(1).queue_capacity(1),
    )
    .unwrap();

    let pdf = common::hello_and_table_pdf();
    let first = service
        .submit(JobInput::Bytes(pdf.clone()), ExtractOptions::default())
        .unwrap();
    // Blocks until the worker has taken the first job, then fills the queue.
    let second = service
        .submit(JobInput::Bytes(pdf.clone()), ExtractOptions::default())
        .unwrap();
    assert_eq!(service.queued(), 1);

    let rejected = service.try_submit(JobInput::Bytes(pdf), ExtractOptions::default());
    assert!(matches!(rejected, Err(Error::Busy)));

    drop(release);
    for handle in [first, second] {
        let doc = handle.wait().unwrap();
        assert_eq!(doc.metadata.total_pages, 2);
        assert_eq!(doc.metadata.extraction_method, ExtractionMethod::Fallback);
    }
}

#[test]
fn test_jobs_run_on_multiple_workers() {
    let selector = Arc::new(StrategySelector::default());
    let service =
        ExtractionService::new(selector, ServiceConfig::default().workers(3)).unwrap();

    let handles: Vec<_> = (0..6)
        .map(|_| {
            service
                .submit(
                    JobInput::Bytes(common::hello_and_table_pdf()),
                    ExtractOptions::new().sequential(),
                )
                .unwrap()
        })
        .collect();

    for handle in handles {
        let doc = handle.wait().unwrap();
        assert_eq!(doc.text, "Hello ");
    }
}

#[test]
fn test_missing_path_reports_input_error() {
    let service = ExtractionService::new(
        Arc::new(StrategySelector::default()),
        ServiceConfig::default().workers(1),
    )
    .unwrap();
    let handle = service
        .try_submit(
            JobInput::Path("/nonexistent/input.pdf".into()),
            ExtractOptions::default(),
        )
        .unwrap();
    assert!(matches!(handle.wait(), Err(Error::MissingInput(_))));
}
