//! Release history reconstruction
//!
//! Rebuilds the ordered list of releases from VCS tags through the
//! configured tag format, and walks the commit graph to find the commits
//! that belong to a release range or are still unreleased. Tags that do
//! not match the tag format are skipped silently: not every tag is a
//! release tag.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::domain::{TagFormat, Version};
use crate::error::Result;
use crate::parser::{CommitParser, ParseResult};
use crate::vcs::{RawCommit, Repository, TagRef};

/// One historical release: a tag recognized by the tag format
#[derive(Debug, Clone)]
pub struct Release {
    pub version: Version,
    pub tag_name: String,
    pub tagger: String,
    pub committer: String,
    /// Tag creation time as unix seconds
    pub tagged_date: i64,
    /// The tagged commit, which bounds this release's commit range
    pub commit_id: String,
    /// Parsed commits in this release's range (empty until populated)
    pub commits: Vec<ParseResult>,
}

/// Read-only record of every recognized release, newest first
#[derive(Debug, Clone, Default)]
pub struct ReleaseHistory {
    releases: Vec<Release>,
}

impl ReleaseHistory {
    /// Recognize releases among VCS tags and order them newest first.
    ///
    /// Tags not matching the format are skipped; a tag that matches the
    /// format but carries an invalid version is skipped with a warning.
    pub fn releases_from_tags(tags: &[TagRef], tag_format: &TagFormat) -> Self {
        let mut releases = Vec::new();

        for tag in tags {
            match tag_format.version_from_tag(&tag.name) {
                None => {
                    debug!(tag = %tag.name, "tag does not match tag format, skipping");
                }
                Some(Err(error)) => {
                    warn!(tag = %tag.name, %error, "tag matches format but version is invalid, skipping");
                }
                Some(Ok(version)) => releases.push(Release {
                    version,
                    tag_name: tag.name.clone(),
                    tagger: tag.tagger.clone(),
                    committer: tag.committer.clone(),
                    tagged_date: tag.tagged_date,
                    commit_id: tag.target.clone(),
                    commits: Vec::new(),
                }),
            }
        }

        releases.sort_by(|a, b| b.version.cmp(&a.version));
        ReleaseHistory { releases }
    }

    /// Build the full history of a repository, including each release's
    /// parsed commit range (the commits between it and its predecessor)
    pub fn from_repository<R: Repository + ?Sized>(
        repo: &R,
        tag_format: &TagFormat,
        parser: &dyn CommitParser,
    ) -> Result<Self> {
        let tags = repo.all_tags()?;
        let mut history = Self::releases_from_tags(&tags, tag_format);

        let mut walker = CommitWalker::new();
        let boundaries: Vec<Option<String>> = (0..history.releases.len())
            .map(|i| history.releases.get(i + 1).map(|r| r.commit_id.clone()))
            .collect();

        for (release, boundary) in history.releases.iter_mut().zip(boundaries) {
            let raw_commits =
                walker.commits_since(repo, &release.commit_id, boundary.as_deref())?;
            release.commits = raw_commits
                .iter()
                .flat_map(|commit| parser.parse(commit))
                .collect();
        }

        Ok(history)
    }

    /// All recognized releases, newest first
    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    /// The most recent release, optionally skipping prereleases
    pub fn last_release(&self, ignore_prereleases: bool) -> Option<&Release> {
        self.last_release_where(|version| !ignore_prereleases || !version.is_prerelease())
    }

    /// The most recent release whose version satisfies a predicate
    pub fn last_release_where(&self, predicate: impl Fn(&Version) -> bool) -> Option<&Release> {
        self.releases
            .iter()
            .find(|release| predicate(&release.version))
    }

    /// Commits reachable from `head` that no release covers yet: the walk
    /// stops at (and excludes) the last release's tagged commit
    pub fn unreleased_commits<R: Repository + ?Sized>(
        &self,
        repo: &R,
        head: &str,
    ) -> Result<Vec<RawCommit>> {
        let boundary = self.last_release(false).map(|release| release.commit_id.clone());
        CommitWalker::new().commits_since(repo, head, boundary.as_deref())
    }
}

/// Commit-graph walker with per-range memoization.
///
/// History is immutable for a given repository state, so ranges are cached
/// for the lifetime of the walker, keyed by (head, boundary) commit ids.
#[derive(Default)]
pub struct CommitWalker {
    cache: HashMap<(String, Option<String>), Vec<RawCommit>>,
}

impl CommitWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// All commits reachable from `head`, stopping at (and excluding) the
    /// `boundary` commit.
    ///
    /// Depth-first: parents are pushed in source order, so the rightmost
    /// parent of a merge is expanded before the leftmost and every
    /// reachable commit is visited exactly once, on first encounter.
    pub fn commits_since<R: Repository + ?Sized>(
        &mut self,
        repo: &R,
        head: &str,
        boundary: Option<&str>,
    ) -> Result<Vec<RawCommit>> {
        let key = (head.to_string(), boundary.map(str::to_string));
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached.clone());
        }

        let mut commits = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut stack: Vec<String> = vec![head.to_string()];

        while let Some(id) = stack.pop() {
            if !visited.insert(id.clone()) {
                continue;
            }
            if boundary == Some(id.as_str()) {
                continue;
            }

            let commit = repo.find_commit(&id)?;
            stack.extend(commit.parents.iter().cloned());
            commits.push(commit);
        }

        debug!(
            head,
            boundary = boundary.unwrap_or("<root>"),
            count = commits.len(),
            "walked commit range"
        );
        self.cache.insert(key, commits.clone());
        Ok(commits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ConventionalCommitParser;
    use crate::vcs::MockRepository;

    fn tag(name: &str, target: &str, date: i64) -> TagRef {
        TagRef {
            name: name.to_string(),
            target: target.to_string(),
            tagger: "Tagger".to_string(),
            committer: "Committer".to_string(),
            tagged_date: date,
        }
    }

    #[test]
    fn test_releases_from_tags_skips_foreign_tags() {
        let format = TagFormat::new("v{version}").unwrap();
        let tags = vec![
            tag("v1.0.0", "a1", 100),
            tag("nightly-2024", "a2", 200),
            tag("v1.1.0", "a3", 300),
            tag("deploy-marker", "a4", 400),
        ];

        let history = ReleaseHistory::releases_from_tags(&tags, &format);
        let names: Vec<_> = history.releases().iter().map(|r| r.tag_name.as_str()).collect();
        assert_eq!(names, vec!["v1.1.0", "v1.0.0"]);
    }

    #[test]
    fn test_releases_sorted_descending_with_prereleases() {
        let format = TagFormat::new("v{version}").unwrap();
        let tags = vec![
            tag("v1.0.0", "a1", 100),
            tag("v1.1.0-rc.1", "a2", 200),
            tag("v1.1.0", "a3", 300),
            tag("v0.9.0", "a0", 50),
        ];

        let history = ReleaseHistory::releases_from_tags(&tags, &format);
        let versions: Vec<String> =
            history.releases().iter().map(|r| r.version.to_string()).collect();
        assert_eq!(versions, vec!["1.1.0", "1.1.0-rc.1", "1.0.0", "0.9.0"]);
    }

    #[test]
    fn test_last_release_filters_prereleases() {
        let format = TagFormat::new("v{version}").unwrap();
        let tags = vec![tag("v1.0.0", "a1", 100), tag("v1.1.0-rc.1", "a2", 200)];
        let history = ReleaseHistory::releases_from_tags(&tags, &format);

        assert_eq!(
            history.last_release(false).unwrap().version.to_string(),
            "1.1.0-rc.1"
        );
        assert_eq!(
            history.last_release(true).unwrap().version.to_string(),
            "1.0.0"
        );
    }

    #[test]
    fn test_last_release_by_predicate() {
        let format = TagFormat::new("v{version}").unwrap();
        let tags = vec![
            tag("v2.0.0-beta.2", "a3", 300),
            tag("v2.0.0-alpha.1", "a2", 200),
            tag("v1.0.0", "a1", 100),
        ];
        let history = ReleaseHistory::releases_from_tags(&tags, &format);

        let release = history
            .last_release_where(|v| v.prerelease_token() == Some("alpha"))
            .unwrap();
        assert_eq!(release.version.to_string(), "2.0.0-alpha.1");
    }

    #[test]
    fn test_empty_history() {
        let format = TagFormat::new("v{version}").unwrap();
        let history = ReleaseHistory::releases_from_tags(&[], &format);
        assert!(history.last_release(false).is_none());
    }

    fn linear_repo() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.add_commit("a1", &[], "feat: initial");
        repo.add_commit("a2", &["a1"], "fix: one");
        repo.add_commit("a3", &["a2"], "feat: two");
        repo.add_commit("a4", &["a3"], "chore: cleanup");
        repo.set_branch_head("main", "a4");
        repo
    }

    #[test]
    fn test_walk_stops_at_boundary() {
        let repo = linear_repo();
        let mut walker = CommitWalker::new();

        let commits = walker.commits_since(&repo, "a4", Some("a2")).unwrap();
        let ids: Vec<_> = commits.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a4", "a3"]);
    }

    #[test]
    fn test_walk_without_boundary_reaches_root() {
        let repo = linear_repo();
        let mut walker = CommitWalker::new();

        let commits = walker.commits_since(&repo, "a4", None).unwrap();
        assert_eq!(commits.len(), 4);
        assert_eq!(commits[0].id, "a4");
        assert_eq!(commits[3].id, "a1");
    }

    #[test]
    fn test_walk_merge_expands_rightmost_parent_first() {
        let mut repo = MockRepository::new();
        repo.add_commit("base", &[], "feat: base");
        repo.add_commit("left", &["base"], "fix: left");
        repo.add_commit("right", &["base"], "fix: right");
        repo.add_commit("merge", &["left", "right"], "Merge branch 'topic'");

        let mut walker = CommitWalker::new();
        let commits = walker.commits_since(&repo, "merge", None).unwrap();
        let ids: Vec<_> = commits.iter().map(|c| c.id.as_str()).collect();
        // Parents pushed in source order, so the rightmost pops first; the
        // shared base is visited once, on first encounter
        assert_eq!(ids, vec!["merge", "right", "base", "left"]);
    }

    #[test]
    fn test_walk_is_cached() {
        let repo = linear_repo();
        let mut walker = CommitWalker::new();

        let first = walker.commits_since(&repo, "a4", Some("a1")).unwrap();
        let second = walker.commits_since(&repo, "a4", Some("a1")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unreleased_commits_stop_at_last_release() {
        let mut repo = linear_repo();
        repo.add_tag("v1.0.0", "a2", 100);

        let format = TagFormat::new("v{version}").unwrap();
        let history = ReleaseHistory::releases_from_tags(&repo.all_tags().unwrap(), &format);

        let unreleased = history.unreleased_commits(&repo, "a4").unwrap();
        let ids: Vec<_> = unreleased.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a4", "a3"]);
    }

    #[test]
    fn test_from_repository_populates_release_ranges() {
        let mut repo = linear_repo();
        repo.add_tag("v1.0.0", "a1", 100);
        repo.add_tag("v1.1.0", "a3", 300);

        let format = TagFormat::new("v{version}").unwrap();
        let parser = ConventionalCommitParser::with_defaults();
        let history = ReleaseHistory::from_repository(&repo, &format, &parser).unwrap();

        let releases = history.releases();
        assert_eq!(releases.len(), 2);

        // v1.1.0 spans a3 and a2, stopping before v1.0.0's commit
        let latest: Vec<_> = releases[0]
            .commits
            .iter()
            .map(|r| r.as_ref().unwrap().commit.id.as_str())
            .collect();
        assert_eq!(latest, vec!["a3", "a2"]);

        // v1.0.0 reaches the root
        let oldest: Vec<_> = releases[1]
            .commits
            .iter()
            .map(|r| r.as_ref().unwrap().commit.id.as_str())
            .collect();
        assert_eq!(oldest, vec!["a1"]);
    }
}
