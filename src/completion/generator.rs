//! Generator execution
//!
//! Runs the shell command behind a generator-backed argument, maps its
//! stdout through the generator's line mapper and caches the raw output.
//! Every failure (spawn error, non-zero exit, timeout, cancellation) is
//! absorbed here and turns into an empty candidate list.

use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::cache::{CacheKey, GeneratorCache};
use super::candidate::Candidate;
use super::context::ResolutionContext;
use crate::error::GeneratorError;
use crate::spec::Generator;

/// Executes a generator command and returns its stdout
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        command: &str,
        cwd: &Path,
        env: &HashMap<String, String>,
    ) -> Result<String, GeneratorError>;
}

/// Runs commands as `<shell> -c <command>`
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
}

impl ShellRunner {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new("sh")
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(
        &self,
        command: &str,
        cwd: &Path,
        env: &HashMap<String, String>,
    ) -> Result<String, GeneratorError> {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(command)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if !env.is_empty() {
            cmd.env_clear().envs(env);
        }

        let output = cmd.output().await.map_err(GeneratorError::Spawn)?;
        debug!(
            target: "specomp::generator",
            status = ?output.status.code(),
            bytes = output.stdout.len(),
            "Generator exited"
        );
        if !output.status.success() {
            return Err(GeneratorError::ExitStatus(output.status.code()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Generator executor with a result cache
pub struct GeneratorExecutor {
    runner: Arc<dyn CommandRunner>,
    cache: GeneratorCache,
    default_timeout: Duration,
    /// Variables folded into every cache key
    cache_env: Vec<String>,
}

impl GeneratorExecutor {
    pub fn new(runner: Arc<dyn CommandRunner>, cache_ttl: Duration, default_timeout: Duration) -> Self {
        Self {
            runner,
            cache: GeneratorCache::new(cache_ttl),
            default_timeout,
            cache_env: Vec::new(),
        }
    }

    pub fn with_cache_env(mut self, names: Vec<String>) -> Self {
        self.cache_env = names;
        self
    }

    pub fn cache(&self) -> &GeneratorCache {
        &self.cache
    }

    /// Run a generator, degrading every failure to an empty list
    pub async fn execute(&self, generator: &Generator, ctx: &ResolutionContext) -> Vec<Candidate> {
        match self.try_execute(generator, ctx).await {
            Ok(candidates) => candidates,
            Err(GeneratorError::Cancelled) => {
                debug!(
                    target: "specomp::generator",
                    command = %generator.command,
                    generation = ctx.generation,
                    "Generator cancelled"
                );
                Vec::new()
            }
            Err(e) => {
                warn!(
                    target: "specomp::generator",
                    command = %generator.command,
                    "Generator failed: {}",
                    e
                );
                Vec::new()
            }
        }
    }

    /// Run a generator, reporting why it produced nothing
    pub async fn try_execute(
        &self,
        generator: &Generator,
        ctx: &ResolutionContext,
    ) -> Result<Vec<Candidate>, GeneratorError> {
        let key = self.cache_key(generator, ctx);
        if let Some(output) = self.cache.get(&key) {
            debug!(target: "specomp::generator", command = %generator.command, "Cache hit");
            return Ok(generator.post_process.apply(&output));
        }

        let timeout = generator
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(self.default_timeout);
        debug!(
            target: "specomp::generator",
            command = %generator.command,
            cwd = %ctx.cwd().display(),
            timeout_ms = timeout.as_millis() as u64,
            "Spawning generator"
        );

        let run = self.runner.run(&generator.command, ctx.cwd(), ctx.env());
        let output = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => return Err(GeneratorError::Cancelled),
            result = tokio::time::timeout(timeout, run) => match result {
                Ok(output) => output?,
                Err(_) => return Err(GeneratorError::Timeout(timeout)),
            },
        };

        self.cache.insert(key, output.clone());
        if ctx.is_cancelled() {
            return Err(GeneratorError::Cancelled);
        }
        Ok(generator.post_process.apply(&output))
    }

    fn cache_key(&self, generator: &Generator, ctx: &ResolutionContext) -> CacheKey {
        let env = generator
            .env
            .iter()
            .chain(self.cache_env.iter())
            .filter_map(|name| {
                ctx.env()
                    .get(name)
                    .map(|value| (name.clone(), value.clone()))
            })
            .collect();
        CacheKey::new(generator.command.clone(), ctx.cwd(), env)
    }
}
