//! Filesystem path suggestions for `filepaths` / `folders` templates

use std::path::{Path, PathBuf};

use tracing::debug;

use super::candidate::{Candidate, CandidateKind};
use crate::spec::PathTemplate;

/// List entries of the directory the partial token points into.
///
/// Values keep the directory part exactly as typed so that prefix matching
/// against the partial token works unchanged. Directories carry a trailing
/// `/`; hidden entries are listed only when the partial name starts with `.`.
pub async fn list_paths(template: PathTemplate, partial: &str, cwd: &Path) -> Vec<Candidate> {
    let (dir_part, file_part) = match partial.rfind('/') {
        Some(idx) => partial.split_at(idx + 1),
        None => ("", partial),
    };
    let directory = resolve_directory(dir_part, cwd);
    let show_hidden = file_part.starts_with('.');

    let mut reader = match tokio::fs::read_dir(&directory).await {
        Ok(reader) => reader,
        Err(e) => {
            debug!("Cannot list {}: {}", directory.display(), e);
            return Vec::new();
        }
    };

    let mut entries: Vec<(String, bool)> = Vec::new();
    loop {
        let entry = match reader.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                debug!("Stopped listing {}: {}", directory.display(), e);
                break;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') && !show_hidden {
            continue;
        }
        // Follows symlinks, so a link to a directory counts as one
        let is_dir = tokio::fs::metadata(entry.path())
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if template == PathTemplate::Folders && !is_dir {
            continue;
        }
        entries.push((name, is_dir));
    }
    entries.sort();

    entries
        .into_iter()
        .map(|(name, is_dir)| {
            let suffix = if is_dir { "/" } else { "" };
            Candidate::new(format!("{dir_part}{name}{suffix}"), CandidateKind::Path).generated()
        })
        .collect()
}

fn resolve_directory(dir_part: &str, cwd: &Path) -> PathBuf {
    if dir_part.is_empty() {
        return cwd.to_path_buf();
    }
    if let Some(rest) = dir_part.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    let path = Path::new(dir_part);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CandidateSource;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join("Cargo.toml"), "").unwrap();
        std::fs::write(dir.path().join(".java-version"), "17").unwrap();
        std::fs::write(dir.path().join("src").join("main.rs"), "").unwrap();
        dir
    }

    fn values(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.value.as_str()).collect()
    }

    #[tokio::test]
    async fn test_filepaths_skip_hidden() {
        let dir = fixture();
        let candidates = list_paths(PathTemplate::Filepaths, "", dir.path()).await;

        assert_eq!(values(&candidates), vec!["Cargo.toml", "src/"]);
        assert!(candidates.iter().all(|c| c.kind == CandidateKind::Path));
        assert!(candidates.iter().all(|c| c.source == CandidateSource::Generated));
    }

    #[tokio::test]
    async fn test_hidden_entries_with_dot_prefix() {
        let dir = fixture();
        let candidates = list_paths(PathTemplate::Filepaths, ".j", dir.path()).await;

        // Narrowing by name is left to the ranker
        assert_eq!(
            values(&candidates),
            vec![".git/", ".java-version", "Cargo.toml", "src/"]
        );
    }

    #[tokio::test]
    async fn test_folders_only_directories() {
        let dir = fixture();
        let candidates = list_paths(PathTemplate::Folders, "", dir.path()).await;

        assert_eq!(values(&candidates), vec!["src/"]);
    }

    #[tokio::test]
    async fn test_nested_and_absolute_directories() {
        let dir = fixture();

        let nested = list_paths(PathTemplate::Filepaths, "src/ma", dir.path()).await;
        assert_eq!(values(&nested), vec!["src/main.rs"]);

        let absolute = format!("{}/", dir.path().join("src").display());
        let candidates = list_paths(PathTemplate::Filepaths, &absolute, Path::new("/")).await;
        assert_eq!(values(&candidates), vec![format!("{absolute}main.rs")]);
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let dir = fixture();
        let candidates = list_paths(PathTemplate::Filepaths, "nope/", dir.path()).await;

        assert!(candidates.is_empty());
    }
}
