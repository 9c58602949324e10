//! Version analysis orchestration
//!
//! Ties the pieces together for one branch: release history from tags,
//! unreleased commits from the graph walk, parsed results from the
//! configured grammar, and the next-version decision procedure.

pub mod next_version;

pub use next_version::{next_version, BumpPolicy};

use tracing::debug;

use crate::domain::{BranchTable, TagFormat, Version};
use crate::error::Result;
use crate::history::ReleaseHistory;
use crate::parser::{CommitParser, ParseResult};
use crate::vcs::{RawCommit, Repository};

/// Policy knobs shared by every analysis run
#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    /// Baseline when the repository has no release yet
    pub default_initial_version: Version,
    pub major_on_zero: bool,
    pub allow_zero_version: bool,
    pub strict: bool,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        AnalyzerOptions {
            default_initial_version: Version::new(0, 0, 0),
            major_on_zero: true,
            allow_zero_version: true,
            strict: false,
        }
    }
}

/// Analyzes commit history to determine the next release version
pub struct VersionAnalyzer {
    parser: Box<dyn CommitParser>,
    tag_format: TagFormat,
    branches: BranchTable,
    options: AnalyzerOptions,
}

impl VersionAnalyzer {
    /// Create a new version analyzer
    pub fn new(
        parser: Box<dyn CommitParser>,
        tag_format: TagFormat,
        branches: BranchTable,
        options: AnalyzerOptions,
    ) -> Self {
        VersionAnalyzer {
            parser,
            tag_format,
            branches,
            options,
        }
    }

    pub fn tag_format(&self) -> &TagFormat {
        &self.tag_format
    }

    /// Parse one raw commit with the configured grammar
    pub fn parse_commit(&self, commit: &RawCommit) -> Vec<ParseResult> {
        self.parser.parse(commit)
    }

    /// Compute the next version for a branch, using that branch's release
    /// channel to decide prerelease behavior
    pub fn next_version<R: Repository + ?Sized>(&self, repo: &R, branch: &str) -> Result<Version> {
        self.next_version_with(repo, branch, None, None)
    }

    /// Compute the next version with explicit overrides.
    ///
    /// `prerelease_override` replaces the channel's prerelease flag;
    /// `build_metadata` is appended to the result.
    pub fn next_version_with<R: Repository + ?Sized>(
        &self,
        repo: &R,
        branch: &str,
        prerelease_override: Option<bool>,
        build_metadata: Option<&str>,
    ) -> Result<Version> {
        let channel = self.branches.channel_for(branch)?;
        let prerelease = prerelease_override.unwrap_or(channel.prerelease);

        let tags = repo.all_tags()?;
        let history = ReleaseHistory::releases_from_tags(&tags, &self.tag_format);

        let last_release = history.last_release(false);
        let last_version = last_release
            .map(|release| release.version.clone())
            .unwrap_or_else(|| self.options.default_initial_version.clone());
        let last_full_version = history
            .last_release(true)
            .map(|release| release.version.clone())
            .unwrap_or_else(|| self.options.default_initial_version.clone());

        let head = repo.branch_head(branch)?;
        let raw_commits = history.unreleased_commits(repo, &head)?;

        debug!(
            branch,
            %last_version,
            %last_full_version,
            unreleased = raw_commits.len(),
            "analyzing branch"
        );

        let parsed: Vec<ParseResult> = raw_commits
            .iter()
            .flat_map(|commit| self.parser.parse(commit))
            .collect();

        let policy = BumpPolicy {
            prerelease,
            prerelease_token: channel.prerelease_token.clone(),
            major_on_zero: self.options.major_on_zero,
            allow_zero_version: self.options.allow_zero_version,
            build_metadata: build_metadata.map(str::to_string),
            strict: self.options.strict,
        };

        next_version::next_version(&last_version, &last_full_version, &parsed, &policy)
    }

    /// Full release history with each release's parsed commit range
    pub fn release_history<R: Repository + ?Sized>(&self, repo: &R) -> Result<ReleaseHistory> {
        ReleaseHistory::from_repository(repo, &self.tag_format, self.parser.as_ref())
    }
}
