//! VCS abstraction layer
//!
//! The versioning core never talks to git directly; it consumes commit and
//! tag data through the [Repository] trait. The concrete implementations
//! are:
//!
//! - [git::Git2Repository]: a read-only implementation using the `git2` crate
//! - [mock::MockRepository]: an in-memory commit graph for testing
//!
//! Most code should depend on the trait rather than a concrete
//! implementation.

pub mod git;
pub mod mock;

pub use git::Git2Repository;
pub use mock::MockRepository;

use crate::error::Result;

/// Raw commit data as delivered by the VCS, before any parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommit {
    /// Full commit identifier (hex SHA for git)
    pub id: String,
    /// Parent commit identifiers in source order (first parent first)
    pub parents: Vec<String>,
    /// The complete commit message
    pub message: String,
    /// The commit author
    pub author: String,
}

impl RawCommit {
    /// Shortened identifier for display
    pub fn short_id(&self) -> &str {
        if self.id.len() > 7 {
            &self.id[..7]
        } else {
            &self.id
        }
    }
}

/// A VCS tag with the metadata a release record needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRef {
    /// Tag name (e.g. "v1.2.3")
    pub name: String,
    /// Identifier of the tagged commit
    pub target: String,
    /// Who created the tag (the commit author for lightweight tags)
    pub tagger: String,
    /// Who committed the tagged commit
    pub committer: String,
    /// Tag creation time as unix seconds
    pub tagged_date: i64,
}

/// Read-only view of a repository's commit graph and tags.
///
/// All implementors must be `Send + Sync`; the core itself holds no
/// mutable repository state and may be shared across threads.
pub trait Repository: Send + Sync {
    /// Get the commit id at the tip of a branch
    fn branch_head(&self, branch_name: &str) -> Result<String>;

    /// Look up a single commit with its parent edges
    fn find_commit(&self, id: &str) -> Result<RawCommit>;

    /// List every tag in the repository
    fn all_tags(&self) -> Result<Vec<TagRef>>;
}
