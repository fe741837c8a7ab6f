//! Assembly of a [`Document`] from layout detections and region extractors.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Instant;

use rayon::prelude::*;
use rayon::ThreadPool;

use super::options::ExtractOptions;
use crate::error::{Error, Result};
use crate::extract::ExtractorSet;
use crate::handle::DocumentHandle;
use crate::model::{
    mime_type_for, region_id, Document, Element, ElementKind, Formula, FormulaKind, Image, Page,
    Table,
};

/// Everything extracted from one page, before folding into the document.
#[derive(Debug, Default)]
struct PageOutput {
    page: Option<Page>,
    texts: Vec<String>,
    tables: Vec<Table>,
    images: Vec<Image>,
    formulas: Vec<Formula>,
    timed_out: bool,
}

/// Builds documents with one strategy's extractors.
///
/// Pages are processed independently, in parallel when enabled; results are
/// folded in page order and then in detection order, so the output does not
/// depend on scheduling.
pub struct DocumentAssembler<'a> {
    extractors: &'a ExtractorSet,
    options: &'a ExtractOptions,
}

impl<'a> DocumentAssembler<'a> {
    pub fn new(extractors: &'a ExtractorSet, options: &'a ExtractOptions) -> Self {
        Self {
            extractors,
            options,
        }
    }

    /// Extract every page of `handle` into a new document.
    pub fn process(&self, handle: &DocumentHandle) -> Result<Document> {
        let started = Instant::now();
        let deadline = self.options.timeout.map(|t| started + t);
        let page_count = handle.page_count();

        let outputs: Vec<PageOutput> = if self.options.parallel && page_count > 1 {
            let run = || -> Vec<PageOutput> {
                (1..=page_count)
                    .into_par_iter()
                    .map(|n| self.process_page(handle, n, deadline))
                    .collect()
            };
            match self.options.max_workers {
                0 => run(),
                workers => sized_pool(workers)?.install(run),
            }
        } else {
            (1..=page_count)
                .map(|n| self.process_page(handle, n, deadline))
                .collect()
        };

        let mut doc = Document::new();
        for output in outputs {
            for text in output.texts {
                doc.text.push_str(&text);
                doc.text.push(' ');
            }
            doc.tables.extend(output.tables);
            doc.images.extend(output.images);
            doc.formulas.extend(output.formulas);
            doc.metadata.timed_out |= output.timed_out;
            if let Some(page) = output.page {
                doc.pages.push(page);
            }
        }

        doc.metadata.extraction_method = self.extractors.method();
        doc.refresh_metadata();

        if doc.metadata.timed_out {
            log::warn!(
                "Extraction deadline expired after {:?}; returning partial document",
                started.elapsed()
            );
        }
        log::info!(
            "Extracted {} pages ({} tables, {} images, {} formulas, {} chars) via {} in {:?}",
            doc.metadata.total_pages,
            doc.metadata.total_tables,
            doc.metadata.total_images,
            doc.metadata.total_formulas,
            doc.metadata.text_length,
            doc.metadata.extraction_method,
            started.elapsed()
        );

        Ok(doc)
    }

    fn process_page(
        &self,
        handle: &DocumentHandle,
        page_number: u32,
        deadline: Option<Instant>,
    ) -> PageOutput {
        let mut output = PageOutput::default();

        // Layout always runs so every page reports its regions; the deadline
        // only gates dispatch.
        let mut page = self
            .extractors
            .layout()
            .detect_page_or_empty(handle, page_number);

        for element in &mut page.elements {
            if !self.options.flags.allows(element.kind) {
                continue;
            }
            if expired(deadline) {
                element.confidence = 0.0;
                element.content = None;
                output.timed_out = true;
                continue;
            }
            self.dispatch(handle, page_number, element, &mut output);
        }

        output.page = Some(page);
        output
    }

    fn dispatch(
        &self,
        handle: &DocumentHandle,
        page_number: u32,
        element: &mut Element,
        output: &mut PageOutput,
    ) {
        let bbox = element.bbox;
        let ex = self.extractors;

        log::debug!(
            "Page {}: dispatching {} region {:?}",
            page_number,
            element.kind,
            bbox
        );

        match element.kind {
            ElementKind::Text | ElementKind::Title | ElementKind::Header => {
                let content = ex.text(handle, page_number, &bbox);
                output.texts.push(content.text.clone());
                element.content = Some(content.text);
            }
            ElementKind::Table => {
                let content = ex.table(handle, page_number, &bbox);
                element.content = Some(format!("Table with {} rows", content.data.len()));
                output.tables.push(Table {
                    id: region_id("table", page_number, &bbox),
                    bbox,
                    data: content.data,
                    headers: content.headers,
                    html: content.html,
                    markdown: content.markdown,
                    confidence: content.confidence,
                    page_number,
                });
            }
            ElementKind::Formula => {
                let content = ex.formula(handle, page_number, &bbox);
                element.content = Some(content.latex.clone());
                output.formulas.push(Formula {
                    id: region_id("formula", page_number, &bbox),
                    bbox,
                    kind: FormulaKind::for_bbox(&bbox),
                    latex: content.latex,
                    confidence: content.confidence,
                    page_number,
                });
            }
            ElementKind::Image | ElementKind::Figure => {
                let content = ex.image(handle, page_number, &bbox);
                element.content = Some("Image".to_string());
                output.images.push(Image {
                    id: region_id("image", page_number, &bbox),
                    bbox,
                    mime_type: mime_type_for(&content.data).to_string(),
                    data: content.data,
                    kind: content.kind,
                    confidence: content.confidence,
                    page_number,
                    width: content.width,
                    height: content.height,
                });
            }
        }
    }
}

fn expired(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

/// Page pool with `workers` threads, built on first use and shared by every
/// later document asking for the same size.
fn sized_pool(workers: usize) -> Result<Arc<ThreadPool>> {
    static POOLS: OnceLock<Mutex<HashMap<usize, Arc<ThreadPool>>>> = OnceLock::new();

    let mut pools = POOLS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(|e| e.into_inner());
    if let Some(pool) = pools.get(&workers) {
        return Ok(Arc::clone(pool));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(move |i| format!("extractkit-page-{}-{}", workers, i))
        .build()
        .map_err(|e| Error::WorkerPool(e.to_string()))?;
    log::debug!("Built page pool with {} threads", workers);
    let pool = Arc::new(pool);
    pools.insert(workers, Arc::clone(&pool));
    Ok(pool)
}
