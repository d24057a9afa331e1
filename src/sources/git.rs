//! Git sources - releases tracked as branches, tags, or revisions.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use git2::{Repository, ResetType};
use url::Url;

use crate::core::recipe::GitReference;
use crate::util::fs::ensure_dir;
use crate::util::hash::sha256_bytes;

/// A cached git checkout for one (remote, reference) pair.
pub struct GitSource {
    /// Remote repository URL
    remote: Url,

    /// Git reference (branch, tag, rev)
    reference: GitReference,

    /// Local checkout path
    checkout_path: PathBuf,

    /// Resolved commit hash after `obtain`
    precise: Option<String>,
}

impl GitSource {
    /// Create a new git source rooted in `cache_dir`.
    pub fn new(remote: &str, reference: GitReference, cache_dir: &Path) -> Result<Self> {
        let remote = Url::parse(remote).with_context(|| format!("invalid git url: {}", remote))?;

        let dir_name = format!(
            "{}-{}",
            sanitize_url_for_path(&remote),
            &sha256_bytes(format!("{:?}", reference).as_bytes())[..8]
        );

        Ok(GitSource {
            remote,
            reference,
            checkout_path: cache_dir.join(dir_name),
            precise: None,
        })
    }

    /// The resolved commit hash, once obtained.
    pub fn precise(&self) -> Option<&str> {
        self.precise.as_deref()
    }

    /// Clone or update the checkout, pin it to the reference, and
    /// return its path.
    pub fn obtain(&mut self) -> Result<&Path> {
        if self.checkout_path.exists() {
            self.update()?;
        } else {
            self.clone_fresh()?;
        }
        self.pin()?;
        Ok(&self.checkout_path)
    }

    fn clone_fresh(&self) -> Result<()> {
        tracing::info!("cloning {}", self.remote);

        ensure_dir(self.checkout_path.parent().expect("cache path has a parent"))?;

        Repository::clone(self.remote.as_str(), &self.checkout_path)
            .with_context(|| format!("failed to clone {}", self.remote))?;

        Ok(())
    }

    fn update(&self) -> Result<()> {
        tracing::info!("updating {}", self.remote);

        let repo = Repository::open(&self.checkout_path)
            .with_context(|| format!("failed to open checkout at {}", self.checkout_path.display()))?;

        let mut remote = repo.find_remote("origin")?;
        remote.fetch(
            &["refs/heads/*:refs/heads/*", "refs/tags/*:refs/tags/*"],
            None,
            None,
        )?;

        Ok(())
    }

    fn pin(&mut self) -> Result<()> {
        let repo = Repository::open(&self.checkout_path)?;

        let commit = match &self.reference {
            GitReference::DefaultBranch => repo.head()?.peel_to_commit()?,
            GitReference::Branch(branch) => repo
                .find_branch(branch, git2::BranchType::Local)
                .with_context(|| format!("branch `{}` not found in {}", branch, self.remote))?
                .get()
                .peel_to_commit()?,
            GitReference::Tag(tag) => repo
                .find_reference(&format!("refs/tags/{}", tag))
                .with_context(|| format!("tag `{}` not found in {}", tag, self.remote))?
                .peel_to_commit()?,
            GitReference::Rev(rev) => {
                let oid = git2::Oid::from_str(rev)
                    .with_context(|| format!("invalid revision `{}`", rev))?;
                repo.find_commit(oid)?
            }
        };

        self.precise = Some(commit.id().to_string());
        repo.reset(commit.as_object(), ResetType::Hard, None)?;

        Ok(())
    }
}

/// Turn a URL into a directory-name-safe string.
fn sanitize_url_for_path(url: &Url) -> String {
    let mut name = String::new();
    if let Some(host) = url.host_str() {
        name.push_str(host);
    }
    for segment in url.path_segments().into_iter().flatten() {
        if !segment.is_empty() {
            name.push('-');
            name.push_str(&segment.replace(['/', '\\', ':'], "-"));
        }
    }
    name.trim_end_matches(".git").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitized_checkout_paths_differ_per_reference() {
        let tmp = TempDir::new().unwrap();

        let tag = GitSource::new(
            "https://github.com/ggml-org/llama.cpp.git",
            GitReference::Tag("b6276".to_string()),
            tmp.path(),
        )
        .unwrap();
        let branch = GitSource::new(
            "https://github.com/ggml-org/llama.cpp.git",
            GitReference::Branch("master".to_string()),
            tmp.path(),
        )
        .unwrap();

        assert_ne!(tag.checkout_path, branch.checkout_path);
        assert!(tag
            .checkout_path
            .to_string_lossy()
            .contains("github.com-ggml-org-llama.cpp"));
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let tmp = TempDir::new().unwrap();
        assert!(GitSource::new("not a url", GitReference::DefaultBranch, tmp.path()).is_err());
    }

    #[test]
    fn test_obtain_local_repository() {
        // Build a small repository, then check it out through GitSource.
        let tmp = TempDir::new().unwrap();
        let origin = tmp.path().join("origin");
        let repo = Repository::init(&origin).unwrap();

        std::fs::write(origin.join("README"), "hello").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("README")).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = git2::Signature::now("test", "test@example.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
            .unwrap();

        let url = Url::from_file_path(&origin).unwrap();
        let cache = tmp.path().join("cache");
        let mut source =
            GitSource::new(url.as_str(), GitReference::DefaultBranch, &cache).unwrap();

        let checkout = source.obtain().unwrap().to_path_buf();
        assert!(checkout.join("README").exists());
        assert!(source.precise().is_some());
    }
}
