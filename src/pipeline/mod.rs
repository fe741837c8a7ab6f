//! The extraction pipeline: options, document assembly and the worker
//! service in front of it.

mod assembler;
mod options;
mod service;

pub use assembler::DocumentAssembler;
pub use options::{ExtractFlags, ExtractOptions};
pub use service::{ExtractionService, JobHandle, JobInput, ServiceConfig};
