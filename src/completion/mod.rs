//! Spec-driven completion
//!
//! Given a [`Spec`](crate::spec::Spec) and a partially typed command line,
//! this module produces the ranked list of candidates for the token under
//! the cursor. Dynamic values come from external generator commands that
//! are cached, cancellable and time-limited.
//!
//! # Architecture
//!
//! - **TokenStream**: shell words with cursor awareness
//! - **Resolver**: walks the spec tree to decide what the active token is
//! - **Executor**: runs generators, with a result cache
//! - **Ranker**: filters, deduplicates and orders candidates
//! - **Engine**: plans sources per request and gathers them concurrently
//! - **Session**: one live request at a time, superseding older ones
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use specomp::completion::{CompletionEngine, CompletionRequest};
//! use specomp::config::Config;
//! use specomp::spec::Spec;
//!
//! # async fn demo() -> specomp::error::Result<()> {
//! let spec = Arc::new(Spec::jenv()?);
//! let engine = CompletionEngine::from_config(spec, &Config::default());
//!
//! let candidates = engine
//!     .complete(CompletionRequest::from_line("jenv global 17", 14))
//!     .await;
//! # Ok(())
//! # }
//! ```

mod cache;
mod candidate;
mod context;
mod engine;
mod generator;
mod ranker;
mod resolver;
mod session;
mod template;
mod token_stream;

pub use cache::{CacheKey, GeneratorCache};
pub use candidate::{Candidate, CandidateKind, CandidateSource};
pub use context::{CompletionRequest, ResolutionContext};
pub use engine::{CompletionEngine, CompletionPlan, PlannedSource};
pub use generator::{CommandRunner, GeneratorExecutor, ShellRunner};
pub use ranker::{CandidateBatch, MatchQuality, Ranker, match_candidate};
pub use resolver::{Expectation, GrammarMismatch, PathResolver, Resolution};
pub use session::{CompletionSession, Emission, SessionState};
pub use template::list_paths;
pub use token_stream::{Token, TokenStream};
