//! Completion engine - orchestrates the completion flow
//!
//! Ties the completion components together: the token stream is resolved
//! against the spec into a plan of suggestion sources, dynamic sources are
//! gathered concurrently, and the ranker produces the final list.

use std::sync::Arc;

use futures::future::join_all;

use super::candidate::{Candidate, CandidateKind};
use super::context::{CompletionRequest, ResolutionContext};
use super::generator::{CommandRunner, GeneratorExecutor, ShellRunner};
use super::ranker::{CandidateBatch, Ranker};
use super::resolver::{Expectation, PathResolver, Resolution};
use super::template::list_paths;
use super::token_stream::TokenStream;
use crate::config::Config;
use crate::spec::{Argument, FilterStrategy, Generator, OptionSpec, PathTemplate, Spec, ValueSource};

/// One source of suggestions for the active token
#[derive(Debug, Clone)]
pub enum PlannedSource<'a> {
    /// Candidates known without running anything
    Static(CandidateBatch),
    /// Output of an external command
    Generator {
        generator: &'a Generator,
        strategy: FilterStrategy,
    },
    /// Filesystem listing
    Template {
        template: PathTemplate,
        strategy: FilterStrategy,
    },
}

/// Sources to consult for one request, in generation order
#[derive(Debug, Clone, Default)]
pub struct CompletionPlan<'a> {
    pub sources: Vec<PlannedSource<'a>>,
}

impl CompletionPlan<'_> {
    /// Whether gathering needs to wait on anything
    pub fn is_dynamic(&self) -> bool {
        self.sources
            .iter()
            .any(|source| !matches!(source, PlannedSource::Static(_)))
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Main completion engine
pub struct CompletionEngine {
    spec: Arc<Spec>,
    executor: GeneratorExecutor,
    ranker: Ranker,
}

impl CompletionEngine {
    pub fn new(spec: Arc<Spec>, executor: GeneratorExecutor, ranker: Ranker) -> Self {
        Self {
            spec,
            executor,
            ranker,
        }
    }

    /// Build an engine running generators through the configured shell
    pub fn from_config(spec: Arc<Spec>, config: &Config) -> Self {
        let runner = Arc::new(ShellRunner::new(config.generator.shell.clone()));
        Self::with_runner(spec, runner, config)
    }

    /// Build an engine with a custom command runner
    pub fn with_runner(spec: Arc<Spec>, runner: Arc<dyn CommandRunner>, config: &Config) -> Self {
        let executor = GeneratorExecutor::new(runner, config.cache_ttl(), config.generator_timeout())
            .with_cache_env(config.generator.cache_env.clone());
        Self::new(spec, executor, Ranker::new(config.max_results()))
    }

    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    /// Complete a single request, never cancelled
    pub async fn complete(&self, request: CompletionRequest) -> Vec<Candidate> {
        let ctx = ResolutionContext::detached(request);
        let plan = self.plan(ctx.stream());
        match self.gather(&plan, &ctx).await {
            Some(batches) => self.rank(batches, ctx.prefix()),
            None => Vec::new(),
        }
    }

    /// Decide which sources apply to the active token
    pub fn plan(&self, stream: &TokenStream) -> CompletionPlan<'_> {
        if stream.is_command_position() {
            return CompletionPlan::default();
        }

        let resolver = PathResolver::new(&self.spec);
        let resolution = match resolver.resolve(stream.tokens_before_cursor()) {
            Ok(resolution) => resolution,
            Err(_) => return CompletionPlan::default(),
        };

        let mut sources = Vec::new();
        match resolution.expectation {
            Expectation::OptionValue { argument, .. } => {
                push_argument_source(&mut sources, argument);
                if argument.is_optional {
                    sources.push(PlannedSource::Static(option_batch(
                        &resolver,
                        &resolution,
                        stream.current_prefix(),
                    )));
                }
            }
            Expectation::Name {
                subcommands,
                options,
                argument,
            } => {
                if subcommands {
                    sources.push(PlannedSource::Static(subcommand_batch(&resolution)));
                }
                if let Some(argument) = argument {
                    push_argument_source(&mut sources, argument);
                }
                if options {
                    sources.push(PlannedSource::Static(option_batch(
                        &resolver,
                        &resolution,
                        stream.current_prefix(),
                    )));
                }
            }
        }

        CompletionPlan { sources }
    }

    /// Resolve every planned source concurrently.
    ///
    /// Returns `None` when the context is cancelled before all sources
    /// finish; partial results of a superseded request are discarded.
    pub async fn gather(
        &self,
        plan: &CompletionPlan<'_>,
        ctx: &ResolutionContext,
    ) -> Option<Vec<CandidateBatch>> {
        self.executor.cache().observe_cwd(ctx.cwd());

        let pending = plan.sources.iter().map(|source| async move {
            match source {
                PlannedSource::Static(batch) => batch.clone(),
                PlannedSource::Generator {
                    generator,
                    strategy,
                } => CandidateBatch::new(*strategy, self.executor.execute(generator, ctx).await),
                PlannedSource::Template { template, strategy } => CandidateBatch::new(
                    *strategy,
                    list_paths(*template, ctx.prefix(), ctx.cwd()).await,
                ),
            }
        });

        tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => None,
            batches = join_all(pending) => (!ctx.is_cancelled()).then_some(batches),
        }
    }

    /// Filter and order gathered candidates against the partial token
    pub fn rank(&self, batches: Vec<CandidateBatch>, partial: &str) -> Vec<Candidate> {
        self.ranker.rank(batches, partial)
    }

    /// Drop all cached generator output
    pub fn refresh(&self) {
        self.executor.cache().refresh();
    }
}

fn push_argument_source<'a>(sources: &mut Vec<PlannedSource<'a>>, argument: &'a Argument) {
    let strategy = argument.filter_strategy;
    match &argument.source {
        Some(ValueSource::Static { choices }) => sources.push(PlannedSource::Static(
            CandidateBatch::new(strategy, choices.iter().map(|c| c.to_candidate()).collect()),
        )),
        Some(ValueSource::Template { template }) => sources.push(PlannedSource::Template {
            template: *template,
            strategy,
        }),
        Some(ValueSource::Generator(generator)) => {
            sources.push(PlannedSource::Generator {
                generator,
                strategy,
            })
        }
        None => {}
    }
}

fn subcommand_batch(resolution: &Resolution<'_>) -> CandidateBatch {
    let candidates = resolution
        .node()
        .subcommands
        .iter()
        .map(|node| {
            Candidate::new(node.name.clone(), CandidateKind::Subcommand)
                .with_description(node.description.clone())
                .with_priority(node.priority)
                .with_icon(node.icon.clone())
        })
        .collect();
    CandidateBatch::new(FilterStrategy::Prefix, candidates)
}

fn option_batch<'a>(
    resolver: &PathResolver<'a>,
    resolution: &Resolution<'a>,
    prefix: &str,
) -> CandidateBatch {
    let candidates = resolver
        .applicable_options(&resolution.path)
        .into_iter()
        .filter(|option| option.is_repeatable || !resolution.is_used(option))
        .map(|option| option_candidate(option, prefix))
        .collect();
    CandidateBatch::new(FilterStrategy::Prefix, candidates)
}

/// One candidate per option; inserts the alias the user started typing
fn option_candidate(option: &OptionSpec, prefix: &str) -> Candidate {
    let value = option
        .aliases()
        .iter()
        .find(|alias| !prefix.is_empty() && alias.starts_with(prefix))
        .map(String::as_str)
        .unwrap_or_else(|| option.primary_name());

    let mut candidate = Candidate::new(value, CandidateKind::Option)
        .with_description(option.description.clone())
        .with_priority(option.priority)
        .with_icon(option.icon.clone());
    if option.aliases().len() > 1 {
        candidate.label = Some(option.aliases().join(", "));
    }
    candidate
}
