use std::collections::HashMap;

use crate::error::{Result, SemrelError};
use crate::vcs::{RawCommit, Repository, TagRef};

/// In-memory repository for testing without actual git operations
#[derive(Default)]
pub struct MockRepository {
    commits: HashMap<String, RawCommit>,
    tags: Vec<TagRef>,
    branch_heads: HashMap<String, String>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a commit with explicit parent edges
    pub fn add_commit(&mut self, id: impl Into<String>, parents: &[&str], message: impl Into<String>) {
        let id = id.into();
        self.commits.insert(
            id.clone(),
            RawCommit {
                id,
                parents: parents.iter().map(|p| p.to_string()).collect(),
                message: message.into(),
                author: "Test Author".to_string(),
            },
        );
    }

    /// Add a tag pointing at a commit
    pub fn add_tag(&mut self, name: impl Into<String>, target: impl Into<String>, tagged_date: i64) {
        self.tags.push(TagRef {
            name: name.into(),
            target: target.into(),
            tagger: "Test Tagger".to_string(),
            committer: "Test Committer".to_string(),
            tagged_date,
        });
    }

    /// Set a branch head
    pub fn set_branch_head(&mut self, branch: impl Into<String>, id: impl Into<String>) {
        self.branch_heads.insert(branch.into(), id.into());
    }
}

impl Repository for MockRepository {
    fn branch_head(&self, branch_name: &str) -> Result<String> {
        self.branch_heads.get(branch_name).cloned().ok_or_else(|| {
            SemrelError::internal(format!("branch not found: {}", branch_name))
        })
    }

    fn find_commit(&self, id: &str) -> Result<RawCommit> {
        self.commits
            .get(id)
            .cloned()
            .ok_or_else(|| SemrelError::internal(format!("commit not found: {}", id)))
    }

    fn all_tags(&self) -> Result<Vec<TagRef>> {
        Ok(self.tags.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_basic() {
        let mut repo = MockRepository::new();
        repo.add_commit("a1", &[], "feat: initial");
        repo.set_branch_head("main", "a1");

        assert_eq!(repo.branch_head("main").unwrap(), "a1");
        assert_eq!(repo.find_commit("a1").unwrap().message, "feat: initial");
    }

    #[test]
    fn test_mock_repository_parent_edges() {
        let mut repo = MockRepository::new();
        repo.add_commit("a1", &[], "feat: initial");
        repo.add_commit("a2", &["a1"], "fix: bug");

        let commit = repo.find_commit("a2").unwrap();
        assert_eq!(commit.parents, vec!["a1".to_string()]);
    }

    #[test]
    fn test_mock_repository_tags() {
        let mut repo = MockRepository::new();
        repo.add_commit("a1", &[], "feat: initial");
        repo.add_tag("v1.0.0", "a1", 1000);

        let tags = repo.all_tags().unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "v1.0.0");
        assert_eq!(tags[0].target, "a1");
    }

    #[test]
    fn test_mock_repository_missing_lookups_fail() {
        let repo = MockRepository::new();
        assert!(repo.branch_head("main").is_err());
        assert!(repo.find_commit("deadbeef").is_err());
    }
}
