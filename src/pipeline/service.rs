//! A bounded pool of extraction workers.
//!
//! Jobs wait in a bounded queue; when it is full, [`ExtractionService::try_submit`]
//! rejects with [`Error::Busy`] and [`ExtractionService::submit`] blocks until
//! a worker frees a slot.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use super::assembler::DocumentAssembler;
use super::options::ExtractOptions;
use crate::error::{Error, Result};
use crate::handle::DocumentHandle;
use crate::model::Document;
use crate::strategy::StrategySelector;

/// Source document of a job.
#[derive(Debug, Clone)]
pub enum JobInput {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl JobInput {
    fn open(&self) -> Result<DocumentHandle> {
        match self {
            JobInput::Path(path) => DocumentHandle::open(path),
            JobInput::Bytes(data) => DocumentHandle::from_bytes(data),
        }
    }
}

/// Sizing of an [`ExtractionService`].
#[derive(Debug, Clone, Copy)]
pub struct ServiceConfig {
    /// Worker threads
    pub workers: usize,
    /// Jobs that may wait for a worker
    pub queue_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(2);
        Self {
            workers,
            queue_capacity: workers * 4,
        }
    }
}

impl ServiceConfig {
    /// Set the number of workers and return self.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the queue capacity and return self.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }
}

struct Job {
    input: JobInput,
    options: ExtractOptions,
    reply: Sender<Result<Document>>,
}

/// Pending result of a submitted job.
#[derive(Debug)]
pub struct JobHandle {
    receiver: Receiver<Result<Document>>,
}

impl JobHandle {
    /// Block until the job finishes.
    pub fn wait(self) -> Result<Document> {
        self.receiver
            .recv()
            .map_err(|_| Error::WorkerPool("worker exited before replying".to_string()))?
    }
}

/// Runs extraction jobs on a fixed set of worker threads.
pub struct ExtractionService {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl ExtractionService {
    /// Start the workers.
    pub fn new(selector: Arc<StrategySelector>, config: ServiceConfig) -> Result<Self> {
        if config.workers == 0 {
            return Err(Error::InvalidOption(
                "extraction service needs at least one worker".to_string(),
            ));
        }

        let (sender, receiver) = bounded::<Job>(config.queue_capacity);
        let mut workers = Vec::with_capacity(config.workers);
        for id in 0..config.workers {
            let receiver = receiver.clone();
            let selector = Arc::clone(&selector);
            let worker = thread::Builder::new()
                .name(format!("extractkit-worker-{}", id))
                .spawn(move || worker_loop(id, &receiver, &selector))
                .map_err(|e| Error::WorkerPool(e.to_string()))?;
            workers.push(worker);
        }

        log::info!(
            "Extraction service started with {} workers, queue capacity {}",
            config.workers,
            config.queue_capacity
        );

        Ok(Self {
            sender: Some(sender),
            workers,
        })
    }

    fn sender(&self) -> Result<&Sender<Job>> {
        self.sender
            .as_ref()
            .ok_or_else(|| Error::WorkerPool("service is shut down".to_string()))
    }

    /// Queue a job, waiting for room if the queue is full.
    pub fn submit(&self, input: JobInput, options: ExtractOptions) -> Result<JobHandle> {
        let (job, handle) = new_job(input, options);
        self.sender()?
            .send(job)
            .map_err(|_| Error::WorkerPool("all workers have exited".to_string()))?;
        Ok(handle)
    }

    /// Queue a job, failing with [`Error::Busy`] if the queue is full.
    pub fn try_submit(&self, input: JobInput, options: ExtractOptions) -> Result<JobHandle> {
        let (job, handle) = new_job(input, options);
        match self.sender()?.try_send(job) {
            Ok(()) => Ok(handle),
            Err(TrySendError::Full(_)) => {
                log::debug!("Extraction queue full, rejecting job");
                Err(Error::Busy)
            }
            Err(TrySendError::Disconnected(_)) => {
                Err(Error::WorkerPool("all workers have exited".to_string()))
            }
        }
    }

    /// Jobs waiting for a worker.
    pub fn queued(&self) -> usize {
        self.sender.as_ref().map_or(0, |s| s.len())
    }
}

impl Drop for ExtractionService {
    fn drop(&mut self) {
        // Closing the queue ends each worker's loop once it drains.
        self.sender.take();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::warn!("Extraction worker panicked during shutdown");
            }
        }
    }
}

fn new_job(input: JobInput, options: ExtractOptions) -> (Job, JobHandle) {
    let (reply, receiver) = bounded(1);
    (
        Job {
            input,
            options,
            reply,
        },
        JobHandle { receiver },
    )
}

fn worker_loop(id: usize, jobs: &Receiver<Job>, selector: &StrategySelector) {
    for job in jobs.iter() {
        let result = panic::catch_unwind(AssertUnwindSafe(|| run_job(&job, selector)))
            .unwrap_or_else(|_| Err(Error::WorkerPool("extraction job panicked".to_string())));
        if let Err(e) = &result {
            log::debug!("Worker {}: job failed: {}", id, e);
        }
        // The submitter may have dropped its handle.
        let _ = job.reply.send(result);
    }
    log::debug!("Worker {} stopped", id);
}

fn run_job(job: &Job, selector: &StrategySelector) -> Result<Document> {
    let extractors = selector.extractors();
    let handle = job.input.open()?;
    DocumentAssembler::new(&extractors, &job.options).process(&handle)
}
