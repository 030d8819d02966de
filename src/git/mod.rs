//! Git metadata for template resolution.
//!
//! Reads the branch, remote origin URI, and most recent reachable tag of
//! the repository enclosing the project. Every value is optional at probe
//! time; the template resolver turns an absent value into
//! [`crate::Error::MissingGitMetadata`] only when the corresponding
//! variable is actually used, never into a silent empty string.

use git2::{DescribeFormatOptions, DescribeOptions, Repository};
use std::path::Path;

/// Version-control metadata of the enclosing repository.
///
/// Probed once per invocation as part of building the
/// [`ConfigContext`](crate::template::ConfigContext).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitMetadata {
    /// Current branch name. `None` for detached or unborn HEAD.
    pub branch: Option<String>,
    /// URL of the `origin` remote.
    pub remote_origin: Option<String>,
    /// Most recent tag reachable from HEAD.
    pub latest_tag: Option<String>,
}

impl GitMetadata {
    /// Probes the repository containing `path`.
    ///
    /// Uses `git2::Repository::discover()` to find the repository root,
    /// traversing parent directories if necessary. A path outside any git
    /// repository yields a metadata value with every field `None`.
    #[must_use]
    pub fn probe(path: &Path) -> Self {
        let Ok(repo) = Repository::discover(path) else {
            return Self::default();
        };

        Self {
            branch: detect_branch(&repo),
            remote_origin: detect_remote_origin(&repo),
            latest_tag: detect_latest_tag(&repo),
        }
    }
}

/// Detects the current branch name.
///
/// Returns `None` if HEAD is detached or unborn (empty repository).
fn detect_branch(repo: &Repository) -> Option<String> {
    let head = repo.head().ok()?;
    if !head.is_branch() {
        return None;
    }
    head.shorthand().map(String::from)
}

/// Returns the URL of the `origin` remote, if configured.
fn detect_remote_origin(repo: &Repository) -> Option<String> {
    repo.find_remote("origin")
        .ok()
        .and_then(|remote| remote.url().map(String::from))
}

/// Returns the most recent tag reachable from HEAD.
///
/// Lightweight and annotated tags both count; `None` when the repository
/// has no reachable tag at all.
fn detect_latest_tag(repo: &Repository) -> Option<String> {
    let describe = repo
        .describe(DescribeOptions::new().describe_tags())
        .ok()?;
    // abbreviated_size(0) yields the bare tag name without a commit suffix
    describe
        .format(Some(DescribeFormatOptions::new().abbreviated_size(0)))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use tempfile::TempDir;

    fn init_repo_with_commit(dir: &Path) -> Repository {
        let repo = Repository::init(dir).unwrap();
        {
            let sig = Signature::now("Test User", "test@example.org").unwrap();
            let tree_id = {
                let mut index = repo.index().unwrap();
                index.write_tree().unwrap()
            };
            let tree = repo.find_tree(tree_id).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
                .unwrap();
        }
        repo
    }

    #[test]
    fn test_probe_outside_repo() {
        let tmp = TempDir::new().unwrap();
        let meta = GitMetadata::probe(tmp.path());
        assert_eq!(meta, GitMetadata::default());
    }

    #[test]
    fn test_probe_detects_branch() {
        let tmp = TempDir::new().unwrap();
        init_repo_with_commit(tmp.path());

        let meta = GitMetadata::probe(tmp.path());
        assert!(meta.branch.is_some());
        assert!(meta.remote_origin.is_none());
        assert!(meta.latest_tag.is_none());
    }

    #[test]
    fn test_probe_detects_remote_origin() {
        let tmp = TempDir::new().unwrap();
        let repo = init_repo_with_commit(tmp.path());
        repo.remote("origin", "https://github.com/example/project.git")
            .unwrap();

        let meta = GitMetadata::probe(tmp.path());
        assert_eq!(
            meta.remote_origin.as_deref(),
            Some("https://github.com/example/project.git")
        );
    }

    #[test]
    fn test_probe_detects_latest_tag() {
        let tmp = TempDir::new().unwrap();
        let repo = init_repo_with_commit(tmp.path());
        {
            let head = repo.head().unwrap().target().unwrap();
            let object = repo.find_object(head, None).unwrap();
            repo.tag_lightweight("v0.1.0", &object, false).unwrap();
        }

        let meta = GitMetadata::probe(tmp.path());
        assert_eq!(meta.latest_tag.as_deref(), Some("v0.1.0"));
    }

    #[test]
    fn test_unborn_head_has_no_branch() {
        let tmp = TempDir::new().unwrap();
        Repository::init(tmp.path()).unwrap();

        let meta = GitMetadata::probe(tmp.path());
        assert!(meta.branch.is_none());
    }
}
