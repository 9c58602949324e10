//! Semantic version value type with prerelease and build-metadata state.
//!
//! Grammar: `MAJOR.MINOR.PATCH[-TOKEN[.REVISION]][+BUILD]` where the numeric
//! fields reject leading zeros and TOKEN is `[A-Za-z-][A-Za-z0-9-]*`.
//! Build metadata is preserved in the rendered string but ignored by
//! equality, ordering, and hashing.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Sub;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::level::LevelBump;
use crate::error::{Result, SemrelError};

/// Token used when a prerelease is created without an explicit token.
pub const DEFAULT_PRERELEASE_TOKEN: &str = "rc";

/// Identity tag format: the tag is the version string itself.
pub const DEFAULT_TAG_FORMAT: &str = "{version}";

fn version_grammar() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<major>0|[1-9]\d*)\.(?P<minor>0|[1-9]\d*)\.(?P<patch>0|[1-9]\d*)(?:-(?P<token>[A-Za-z-][0-9A-Za-z-]*)(?:\.(?P<revision>0|[1-9]\d*))?)?(?:\+(?P<build>[0-9A-Za-z.-]+))?$",
        )
        .expect("version grammar is valid")
    })
}

/// Prerelease qualifier: a token plus an optional numeric revision.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Prerelease {
    pub token: String,
    pub revision: Option<u32>,
}

impl fmt::Display for Prerelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token)?;
        if let Some(rev) = self.revision {
            write!(f, ".{}", rev)?;
        }
        Ok(())
    }
}

/// Immutable semantic version. Every transform returns a new instance.
#[derive(Debug, Clone)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    prerelease: Option<Prerelease>,
    build_metadata: Option<String>,
    tag_format: String,
}

impl Version {
    /// Create a full (non-prerelease) version
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Version {
            major,
            minor,
            patch,
            prerelease: None,
            build_metadata: None,
            tag_format: DEFAULT_TAG_FORMAT.to_string(),
        }
    }

    /// Parse a version string against the strict semantic-version grammar
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with_tag_format(text, DEFAULT_TAG_FORMAT)
    }

    /// Parse a version string and attach a tag format for `as_tag`
    pub fn parse_with_tag_format(text: &str, tag_format: &str) -> Result<Self> {
        check_tag_format(tag_format)?;

        let caps = version_grammar().captures(text).ok_or_else(|| {
            SemrelError::invalid_version(format!(
                "'{}' does not match MAJOR.MINOR.PATCH[-TOKEN.REVISION][+BUILD]",
                text
            ))
        })?;

        // The grammar guarantees the numeric captures parse, except for
        // values beyond u32 range.
        let number = |name: &str| -> Result<u32> {
            caps[name].parse::<u32>().map_err(|_| {
                SemrelError::invalid_version(format!(
                    "{} component of '{}' is out of range",
                    name, text
                ))
            })
        };

        let prerelease = match caps.name("token") {
            Some(token) => Some(Prerelease {
                token: token.as_str().to_string(),
                revision: match caps.name("revision") {
                    Some(rev) => Some(rev.as_str().parse::<u32>().map_err(|_| {
                        SemrelError::invalid_version(format!(
                            "prerelease revision of '{}' is out of range",
                            text
                        ))
                    })?),
                    None => None,
                },
            }),
            None => None,
        };

        Ok(Version {
            major: number("major")?,
            minor: number("minor")?,
            patch: number("patch")?,
            prerelease,
            build_metadata: caps.name("build").map(|m| m.as_str().to_string()),
            tag_format: tag_format.to_string(),
        })
    }

    /// A version is a prerelease iff it carries a prerelease token
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    pub fn prerelease_token(&self) -> Option<&str> {
        self.prerelease.as_ref().map(|p| p.token.as_str())
    }

    pub fn prerelease_revision(&self) -> Option<u32> {
        self.prerelease.as_ref().and_then(|p| p.revision)
    }

    pub fn build_metadata(&self) -> Option<&str> {
        self.build_metadata.as_deref()
    }

    pub fn tag_format(&self) -> &str {
        &self.tag_format
    }

    /// Return a copy carrying the given tag format.
    ///
    /// Fails unless the format contains exactly one `{version}` placeholder.
    pub fn with_tag_format(&self, tag_format: impl Into<String>) -> Result<Self> {
        let tag_format = tag_format.into();
        check_tag_format(&tag_format)?;
        let mut version = self.clone();
        version.tag_format = tag_format;
        Ok(version)
    }

    /// Render this version through its tag format
    pub fn as_tag(&self) -> String {
        self.tag_format.replace("{version}", &self.to_string())
    }

    /// Apply a level bump.
    ///
    /// `NoRelease` is the identity. `PrereleaseRevision` increments the
    /// revision (starting a `rc.1` prerelease from a full version). The
    /// numeric levels increment their digit, zero all lower digits, and
    /// clear prerelease state and build metadata.
    pub fn bump(&self, level: LevelBump) -> Self {
        let (major, minor, patch) = match level {
            LevelBump::NoRelease => return self.clone(),
            LevelBump::PrereleaseRevision => {
                let prerelease = match &self.prerelease {
                    Some(pre) => Prerelease {
                        token: pre.token.clone(),
                        revision: Some(pre.revision.unwrap_or(0) + 1),
                    },
                    None => Prerelease {
                        token: DEFAULT_PRERELEASE_TOKEN.to_string(),
                        revision: Some(1),
                    },
                };
                let mut version = self.clone();
                version.prerelease = Some(prerelease);
                return version;
            }
            LevelBump::Patch => (self.major, self.minor, self.patch + 1),
            LevelBump::Minor => (self.major, self.minor + 1, 0),
            LevelBump::Major => (self.major + 1, 0, 0),
        };

        Version {
            major,
            minor,
            patch,
            prerelease: None,
            build_metadata: None,
            tag_format: self.tag_format.clone(),
        }
    }

    /// Convert to a prerelease of the same numeric triple.
    ///
    /// With `revision` omitted: a full version starts at revision 1, a
    /// matching token increments the existing revision, and a differing
    /// token resets the revision to 1.
    pub fn to_prerelease(&self, token: Option<&str>, revision: Option<u32>) -> Self {
        let current_token = self.prerelease_token();
        let target_token = token
            .or(current_token)
            .unwrap_or(DEFAULT_PRERELEASE_TOKEN)
            .to_string();

        let target_revision = revision.unwrap_or_else(|| match &self.prerelease {
            Some(pre) if pre.token == target_token => pre.revision.unwrap_or(0) + 1,
            _ => 1,
        });

        let mut version = self.clone();
        version.prerelease = Some(Prerelease {
            token: target_token,
            revision: Some(target_revision),
        });
        version
    }

    /// Strip prerelease state, keeping the numeric triple
    pub fn finalize_version(&self) -> Self {
        let mut version = self.clone();
        version.prerelease = None;
        version
    }

    /// Attach build metadata (an empty string clears it)
    pub fn add_build_metadata(&self, text: &str) -> Self {
        let mut version = self.clone();
        version.build_metadata = if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        };
        version
    }
}

/// Validate that a tag format contains exactly one `{version}` placeholder
pub fn check_tag_format(tag_format: &str) -> Result<()> {
    match tag_format.matches("{version}").count() {
        1 => Ok(()),
        n => Err(SemrelError::config(format!(
            "Invalid tag format '{}': expected exactly one {{version}} placeholder, found {}",
            tag_format, n
        ))),
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.prerelease {
            write!(f, "-{}", pre)?;
        }
        if let Some(build) = &self.build_metadata {
            write!(f, "+{}", build)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = SemrelError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

// Build metadata and tag format do not participate in equality, ordering,
// or hashing.
impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.major == other.major
            && self.minor == other.minor
            && self.patch == other.patch
            && self.prerelease == other.prerelease
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.major.hash(state);
        self.minor.hash(state);
        self.patch.hash(state);
        self.prerelease.hash(state);
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                // A prerelease orders below its finalized counterpart
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => a
                    .token
                    .cmp(&b.token)
                    .then_with(|| a.revision.cmp(&b.revision)),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq<str> for Version {
    fn eq(&self, other: &str) -> bool {
        Version::parse(other).map(|v| *self == v).unwrap_or(false)
    }
}

impl PartialEq<&str> for Version {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl PartialEq<String> for Version {
    fn eq(&self, other: &String) -> bool {
        self == other.as_str()
    }
}

impl PartialOrd<str> for Version {
    fn partial_cmp(&self, other: &str) -> Option<Ordering> {
        Version::parse(other).ok().map(|v| self.cmp(&v))
    }
}

impl PartialOrd<&str> for Version {
    fn partial_cmp(&self, other: &&str) -> Option<Ordering> {
        self.partial_cmp(*other)
    }
}

/// The minimal level bump separating two versions, symmetric in its
/// operands: the most significant digit that differs wins, and versions
/// differing only in prerelease state are a revision apart.
impl Sub for &Version {
    type Output = LevelBump;

    fn sub(self, other: &Version) -> LevelBump {
        if self.major != other.major {
            LevelBump::Major
        } else if self.minor != other.minor {
            LevelBump::Minor
        } else if self.patch != other.patch {
            LevelBump::Patch
        } else if self.prerelease != other.prerelease {
            LevelBump::PrereleaseRevision
        } else {
            LevelBump::NoRelease
        }
    }
}

impl Sub for Version {
    type Output = LevelBump;

    fn sub(self, other: Version) -> LevelBump {
        &self - &other
    }
}
