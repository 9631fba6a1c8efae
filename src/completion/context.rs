//! Per-request completion state
//!
//! A [`CompletionRequest`] is what the caller hands in: a tokenized command
//! line plus the working directory and environment snapshot generators run
//! against. The engine wraps it into a [`ResolutionContext`] that also owns
//! the cancellation handle of everything the request spawns.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use super::token_stream::TokenStream;

/// One completion request as received from the consumer
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub stream: TokenStream,
    /// Directory generators execute in
    pub cwd: PathBuf,
    /// Environment snapshot generators execute with
    pub env: HashMap<String, String>,
}

impl CompletionRequest {
    /// Build a request from a raw line and a byte cursor
    pub fn from_line(line: &str, cursor: usize) -> Self {
        Self::from_stream(TokenStream::tokenize(line, cursor))
    }

    /// Build a request from pre-split words and the index of the active word
    pub fn from_words<I, S>(words: I, active: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_stream(TokenStream::from_words(words, active))
    }

    /// Build a request for the process's current directory and environment
    pub fn from_stream(stream: TokenStream) -> Self {
        Self {
            stream,
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env: std::env::vars().collect(),
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Partial text of the active token
    pub fn prefix(&self) -> &str {
        self.stream.current_prefix()
    }
}

/// Working state of one request while it is being resolved.
///
/// Lives for a single request and is dropped once its list is emitted or it
/// is superseded.
#[derive(Debug, Clone)]
pub struct ResolutionContext {
    pub request: CompletionRequest,
    /// Cancelled when a newer request supersedes this one
    pub cancel: CancellationToken,
    /// Sequence number assigned by the session
    pub generation: u64,
}

impl ResolutionContext {
    pub fn new(request: CompletionRequest, cancel: CancellationToken, generation: u64) -> Self {
        Self {
            request,
            cancel,
            generation,
        }
    }

    /// Context that is never cancelled, for one-shot completions
    pub fn detached(request: CompletionRequest) -> Self {
        Self::new(request, CancellationToken::new(), 0)
    }

    pub fn stream(&self) -> &TokenStream {
        &self.request.stream
    }

    pub fn cwd(&self) -> &Path {
        &self.request.cwd
    }

    pub fn env(&self) -> &HashMap<String, String> {
        &self.request.env
    }

    pub fn prefix(&self) -> &str {
        self.request.prefix()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_line() {
        let request = CompletionRequest::from_line("jenv global 17", 14).with_cwd("/tmp");

        assert_eq!(request.prefix(), "17");
        assert_eq!(request.cwd, PathBuf::from("/tmp"));
        assert_eq!(request.stream.tokens_before_cursor().len(), 2);
    }

    #[test]
    fn test_request_from_words() {
        let env = HashMap::from([("JENV_ROOT".to_string(), "/opt/jenv".to_string())]);
        let request = CompletionRequest::from_words(["jenv", "local"], 2).with_env(env);

        assert_eq!(request.prefix(), "");
        assert_eq!(request.env.get("JENV_ROOT").map(String::as_str), Some("/opt/jenv"));
    }

    #[test]
    fn test_context_cancellation() {
        let token = CancellationToken::new();
        let context =
            ResolutionContext::new(CompletionRequest::from_line("jenv ", 5), token.clone(), 3);

        assert!(!context.is_cancelled());
        token.cancel();
        assert!(context.is_cancelled());
        assert_eq!(context.generation, 3);
    }
}
