//! Choice between the model and fallback extraction strategies.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::extract::{CapabilityLoader, ExtractorSet, UnavailableLoader};
use crate::model::ExtractionMethod;

/// Lifecycle of the model suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyState {
    /// No load has been attempted since creation or the last reset.
    NotAttempted,
    /// The model suite is loaded.
    Ready,
    /// Loading failed; the fallback strategy is in use.
    Degraded(String),
}

impl fmt::Display for StrategyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyState::NotAttempted => write!(f, "not attempted"),
            StrategyState::Ready => write!(f, "ready"),
            StrategyState::Degraded(reason) => write!(f, "degraded ({})", reason),
        }
    }
}

/// Availability of each capability, as reported by [`StrategySelector::status`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityStatus {
    pub method: ExtractionMethod,
    pub layout: bool,
    pub text: bool,
    pub table: bool,
    pub formula: bool,
    pub image: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

struct Inner {
    state: StrategyState,
    model: Option<ExtractorSet>,
}

/// Loads the model suite at most once and hands out the extractor set for
/// the current state.
///
/// The lock is held across the load, so concurrent first callers wait for
/// the single attempt instead of starting their own.
pub struct StrategySelector {
    loader: Arc<dyn CapabilityLoader>,
    fallback: ExtractorSet,
    inner: Mutex<Inner>,
}

impl fmt::Debug for StrategySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategySelector")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Default for StrategySelector {
    fn default() -> Self {
        Self::new(Arc::new(UnavailableLoader))
    }
}

impl StrategySelector {
    pub fn new(loader: Arc<dyn CapabilityLoader>) -> Self {
        Self {
            loader,
            fallback: ExtractorSet::fallback(),
            inner: Mutex::new(Inner {
                state: StrategyState::NotAttempted,
                model: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicking loader leaves the state untouched, so the data is
        // still consistent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Attempt the model load if it has not been attempted yet.
    pub fn ensure_ready(&self) -> StrategyState {
        let mut inner = self.lock();
        self.load_once(&mut inner);
        inner.state.clone()
    }

    fn load_once(&self, inner: &mut Inner) {
        if inner.state != StrategyState::NotAttempted {
            return;
        }

        log::debug!("Loading model suite");
        match self.loader.load() {
            Ok(suite) => {
                inner.model = Some(ExtractorSet::from_suite(suite));
                inner.state = StrategyState::Ready;
                log::info!("Model suite loaded, using model extraction");
            }
            Err(e) => {
                inner.model = None;
                inner.state = StrategyState::Degraded(e.to_string());
                log::info!("Model suite unavailable, using fallback extraction: {}", e);
            }
        }
    }

    /// Current state, without triggering a load.
    pub fn state(&self) -> StrategyState {
        self.lock().state.clone()
    }

    /// Forget the outcome of the last load so the next call retries.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.state = StrategyState::NotAttempted;
        inner.model = None;
        log::info!("Extraction strategy reset");
    }

    /// Extractors for the current state, loading the model suite first if
    /// needed.
    pub fn extractors(&self) -> ExtractorSet {
        let mut inner = self.lock();
        self.load_once(&mut inner);
        match &inner.model {
            Some(set) => set.clone(),
            None => self.fallback.clone(),
        }
    }

    /// Per-capability availability after ensuring a load was attempted.
    pub fn status(&self) -> CapabilityStatus {
        let state = self.ensure_ready();
        let ready = state == StrategyState::Ready;
        CapabilityStatus {
            method: if ready {
                ExtractionMethod::Model
            } else {
                ExtractionMethod::Fallback
            },
            layout: ready,
            text: ready,
            table: ready,
            formula: ready,
            image: true,
            reason: match state {
                StrategyState::Degraded(reason) => Some(reason),
                _ => None,
            },
        }
    }
}
