//! Generator output cache
//!
//! Raw stdout of successful generator runs, keyed by everything that can
//! change it: the command, the working directory and the relevant
//! environment values. Entries expire after a TTL and are dropped wholesale
//! when the working directory changes or on an explicit refresh.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use tracing::debug;

/// Identity of one generator invocation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    command: String,
    cwd: PathBuf,
    /// Relevant variables, sorted by name
    env: Vec<(String, String)>,
}

impl CacheKey {
    pub fn new(command: impl Into<String>, cwd: impl Into<PathBuf>, env: Vec<(String, String)>) -> Self {
        let mut env = env;
        env.sort();
        env.dedup();
        Self {
            command: command.into(),
            cwd: cwd.into(),
            env,
        }
    }
}

struct CacheEntry {
    output: String,
    stored_at: Instant,
}

/// TTL cache shared by every request of a session
pub struct GeneratorCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
}

impl GeneratorCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Cached output for `key`, if present and not expired
    pub fn get(&self, key: &CacheKey) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.output.clone())
    }

    /// Store the output of a successful run
    pub fn insert(&self, key: CacheKey, output: String) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        entries.insert(
            key,
            CacheEntry {
                output,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop every entry recorded for a directory other than `cwd`
    pub fn observe_cwd(&self, cwd: &Path) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|key, _| key.cwd == cwd);
        if entries.len() != before {
            debug!(
                "Working directory changed to {}, dropped {} cached entries",
                cwd.display(),
                before - entries.len()
            );
        }
    }

    /// Clear the cache
    pub fn refresh(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
