//! Completion session controller
//!
//! Drives one request per input event through resolving, generating and
//! ranking. Submitting a new request cancels the one in flight; a superseded
//! request reports [`Emission::Superseded`] instead of a list, so stale
//! dynamic results never reach the consumer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::candidate::Candidate;
use super::context::{CompletionRequest, ResolutionContext};
use super::engine::CompletionEngine;

/// Observable phase of the most recent request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Resolving,
    Generating,
    Ranking,
}

/// Outcome of one submitted request
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    /// Final ordered list, possibly empty
    Candidates(Vec<Candidate>),
    /// A newer request replaced this one before it finished
    Superseded,
}

impl Emission {
    /// The emitted list, or `None` if superseded
    pub fn into_candidates(self) -> Option<Vec<Candidate>> {
        match self {
            Emission::Candidates(candidates) => Some(candidates),
            Emission::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Emission::Superseded)
    }
}

struct Live {
    generation: u64,
    cancel: CancellationToken,
    state: SessionState,
}

/// Serialises completion requests over a shared engine
pub struct CompletionSession {
    engine: Arc<CompletionEngine>,
    live: Mutex<Live>,
    next_generation: AtomicU64,
}

impl CompletionSession {
    pub fn new(engine: Arc<CompletionEngine>) -> Self {
        Self {
            engine,
            live: Mutex::new(Live {
                generation: 0,
                cancel: CancellationToken::new(),
                state: SessionState::Idle,
            }),
            next_generation: AtomicU64::new(1),
        }
    }

    /// Current phase of the latest request
    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// Clear cached generator output
    pub fn refresh(&self) {
        self.engine.refresh();
    }

    /// Complete `request`, superseding any request still in flight
    pub async fn submit(&self, request: CompletionRequest) -> Emission {
        let ctx = self.begin(request);
        let generation = ctx.generation;

        let plan = self.engine.plan(ctx.stream());
        if plan.is_dynamic() {
            self.transition(generation, SessionState::Generating);
        }

        let Some(batches) = self.engine.gather(&plan, &ctx).await else {
            debug!("Request {} superseded while generating", generation);
            return Emission::Superseded;
        };

        self.transition(generation, SessionState::Ranking);
        let candidates = self.engine.rank(batches, ctx.prefix());

        if ctx.is_cancelled() {
            debug!("Request {} superseded before emission", generation);
            return Emission::Superseded;
        }
        self.transition(generation, SessionState::Idle);
        debug!(
            "Request {} emitted {} candidates",
            generation,
            candidates.len()
        );
        Emission::Candidates(candidates)
    }

    /// Cancel the live request and register a new one
    fn begin(&self, request: CompletionRequest) -> ResolutionContext {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let cancel = CancellationToken::new();

        let mut live = self.lock();
        live.cancel.cancel();
        *live = Live {
            generation,
            cancel: cancel.clone(),
            state: SessionState::Resolving,
        };
        drop(live);

        ResolutionContext::new(request, cancel, generation)
    }

    /// Update the state only while `generation` is still the live request
    fn transition(&self, generation: u64, state: SessionState) {
        let mut live = self.lock();
        if live.generation == generation {
            live.state = state;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Live> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
