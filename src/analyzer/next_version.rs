//! The next-version decision procedure.
//!
//! Deterministic and order-sensitive: aggregate the bump level, apply the
//! no-op and prerelease-opt-in guards, apply the zero-version policy, then
//! resolve prerelease continuation against the last full release before
//! bumping. The steps must run in exactly this order; in particular the
//! zero-version cap is applied to the level *before* the continuation
//! comparison, while the continuation diff itself is computed purely from
//! the two prior versions.

use tracing::debug;

use crate::domain::{LevelBump, Version};
use crate::error::{Result, SemrelError};
use crate::parser::{max_bump, ParseResult};

/// Policy inputs for one next-version computation
#[derive(Debug, Clone)]
pub struct BumpPolicy {
    /// Whether the caller wants the result to be a prerelease
    pub prerelease: bool,
    /// Prerelease token for the target release channel
    pub prerelease_token: String,
    /// When false, breaking changes on 0.x only bump the minor digit
    pub major_on_zero: bool,
    /// When false, any qualifying change on 0.x promotes to 1.0.0
    pub allow_zero_version: bool,
    /// Build metadata appended to every returned version
    pub build_metadata: Option<String>,
    /// Strict mode turns the no-change guards into errors
    pub strict: bool,
}

impl Default for BumpPolicy {
    fn default() -> Self {
        BumpPolicy {
            prerelease: false,
            prerelease_token: crate::domain::DEFAULT_PRERELEASE_TOKEN.to_string(),
            major_on_zero: true,
            allow_zero_version: true,
            build_metadata: None,
            strict: false,
        }
    }
}

impl BumpPolicy {
    fn finish(&self, version: Version) -> Version {
        match &self.build_metadata {
            Some(build) => version.add_build_metadata(build),
            None => version,
        }
    }
}

/// Compute the next version from the unreleased commit set.
///
/// `last_version` is the most recent release of any kind and
/// `last_full_version` the most recent non-prerelease release; both fall
/// back to the configured initial version when no such release exists.
pub fn next_version(
    last_version: &Version,
    last_full_version: &Version,
    unreleased_commits: &[ParseResult],
    policy: &BumpPolicy,
) -> Result<Version> {
    let mut level = max_bump(unreleased_commits);
    debug!(%level, %last_version, %last_full_version, "aggregated bump level");

    if level == LevelBump::NoRelease {
        if policy.strict {
            return Err(SemrelError::no_bump(
                "no releasable change found in the unreleased commits",
            ));
        }
        return Ok(policy.finish(last_version.clone()));
    }

    if level == LevelBump::PrereleaseRevision && !policy.prerelease {
        if policy.strict {
            return Err(SemrelError::no_bump(
                "the unreleased commits only warrant a prerelease revision, \
                 but a full release was requested",
            ));
        }
        return Ok(policy.finish(last_version.clone()));
    }

    // Zero-version policy; never applied to prerelease-revision bumps
    if last_version.major == 0 && level >= LevelBump::Patch {
        if !policy.allow_zero_version {
            level = LevelBump::Major;
        } else if !policy.major_on_zero {
            level = level.min(LevelBump::Minor);
        }
    }

    let baseline = if last_version.is_prerelease() {
        // The bump already represented by the active prerelease, relative
        // to the last full release; independent of the requested level
        let diff = last_version - last_full_version;
        if level <= diff {
            // The new change fits inside the prerelease's existing scope
            return Ok(policy.finish(if policy.prerelease {
                last_version.to_prerelease(Some(&policy.prerelease_token), None)
            } else {
                last_version.finalize_version()
            }));
        }
        // The change exceeds the prerelease's scope: consume it and bump
        // freshly from the last full release
        last_full_version
    } else {
        last_version
    };

    if level == LevelBump::PrereleaseRevision {
        // Only reachable with a full-release baseline and prerelease=true
        return Ok(policy.finish(baseline.to_prerelease(Some(&policy.prerelease_token), None)));
    }

    let next = baseline.bump(level);
    Ok(policy.finish(if policy.prerelease {
        next.to_prerelease(Some(&policy.prerelease_token), None)
    } else {
        next
    }))
}
