use std::path::Path;

use git2::Repository as Git2Repo;

use crate::error::{Result, SemrelError};
use crate::vcs::{RawCommit, Repository, TagRef};

/// Read-only wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from an existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Name of the currently checked-out branch
    pub fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        head.shorthand()
            .map(str::to_string)
            .ok_or_else(|| SemrelError::internal("HEAD is not on a named branch"))
    }

    fn raw_commit(&self, commit: &git2::Commit<'_>) -> RawCommit {
        RawCommit {
            id: commit.id().to_string(),
            parents: commit.parent_ids().map(|oid| oid.to_string()).collect(),
            message: commit.message().unwrap_or("(empty message)").to_string(),
            author: commit.author().name().unwrap_or("unknown").to_string(),
        }
    }
}

impl Repository for Git2Repository {
    fn branch_head(&self, branch_name: &str) -> Result<String> {
        let branch = self
            .repo
            .find_branch(branch_name, git2::BranchType::Local)
            .map_err(|e| {
                SemrelError::internal(format!("cannot find branch '{}': {}", branch_name, e))
            })?;

        let oid = branch.get().target().ok_or_else(|| {
            SemrelError::internal(format!("branch '{}' has no target", branch_name))
        })?;

        Ok(oid.to_string())
    }

    fn find_commit(&self, id: &str) -> Result<RawCommit> {
        let oid = git2::Oid::from_str(id)
            .map_err(|e| SemrelError::internal(format!("invalid commit id '{}': {}", id, e)))?;
        let commit = self.repo.find_commit(oid)?;

        Ok(self.raw_commit(&commit))
    }

    fn all_tags(&self) -> Result<Vec<TagRef>> {
        let names = self.repo.tag_names(None)?;
        let mut tags = Vec::new();

        for name in names.iter().flatten() {
            let reference = self.repo.find_reference(&format!("refs/tags/{}", name))?;
            let commit = reference.peel_to_commit()?;

            // An annotated tag carries its own tagger and date; a
            // lightweight tag borrows them from the tagged commit.
            let (tagger, tagged_date) = match reference.peel_to_tag() {
                Ok(tag) => match tag.tagger() {
                    Some(sig) => (
                        sig.name().unwrap_or("unknown").to_string(),
                        sig.when().seconds(),
                    ),
                    None => (
                        commit.author().name().unwrap_or("unknown").to_string(),
                        commit.time().seconds(),
                    ),
                },
                Err(_) => (
                    commit.author().name().unwrap_or("unknown").to_string(),
                    commit.time().seconds(),
                ),
            };

            tags.push(TagRef {
                name: name.to_string(),
                target: commit.id().to_string(),
                tagger,
                committer: commit.committer().name().unwrap_or("unknown").to_string(),
                tagged_date,
            });
        }

        Ok(tags)
    }
}

// SAFETY: Git2Repository wraps git2::Repository which is Send + Sync.
// git2 library is thread-safe for read operations via libgit2's thread-safe design.
unsafe impl Sync for Git2Repository {}
