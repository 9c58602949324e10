use regex::Regex;

use crate::error::{Result, SemrelError};

/// Release channel for branches matching a pattern.
///
/// Determines whether releases cut from a matching branch are prereleases
/// and which prerelease token they carry.
#[derive(Debug, Clone)]
pub struct ReleaseChannel {
    pattern: Regex,
    pub prerelease: bool,
    pub prerelease_token: String,
}

impl ReleaseChannel {
    /// Create a channel from a branch-name regex.
    ///
    /// The pattern is anchored so that "main" does not match "maintenance".
    pub fn new(pattern: &str, prerelease: bool, prerelease_token: impl Into<String>) -> Result<Self> {
        let anchored = format!("^(?:{})$", pattern);
        let pattern = Regex::new(&anchored)
            .map_err(|e| SemrelError::config(format!("Invalid branch pattern '{}': {}", pattern, e)))?;

        Ok(ReleaseChannel {
            pattern,
            prerelease,
            prerelease_token: prerelease_token.into(),
        })
    }

    pub fn matches(&self, branch_name: &str) -> bool {
        self.pattern.is_match(branch_name)
    }
}

/// Ordered table of release channels; the first matching entry wins
#[derive(Debug, Clone, Default)]
pub struct BranchTable {
    channels: Vec<ReleaseChannel>,
}

impl BranchTable {
    pub fn new(channels: Vec<ReleaseChannel>) -> Self {
        BranchTable { channels }
    }

    /// Find the release channel for a branch
    pub fn channel_for(&self, branch_name: &str) -> Result<&ReleaseChannel> {
        self.channels
            .iter()
            .find(|channel| channel.matches(branch_name))
            .ok_or_else(|| {
                SemrelError::not_a_release_branch(format!(
                    "branch '{}' does not match any configured release channel",
                    branch_name
                ))
            })
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
