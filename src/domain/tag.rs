use regex::Regex;

use crate::domain::version::{check_tag_format, Version};
use crate::error::{Result, SemrelError};

/// Tag naming format with a single `{version}` placeholder
/// (e.g. "v{version}", "release-{version}")
#[derive(Debug, Clone)]
pub struct TagFormat {
    pattern: String,
    from_tag: Regex,
}

impl TagFormat {
    /// Create a validated tag format.
    ///
    /// The format must contain exactly one `{version}` placeholder; the
    /// inverted matcher is derived by escaping the literal parts and
    /// substituting the version grammar for the placeholder.
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        check_tag_format(&pattern)?;

        let escaped = regex::escape(&pattern);
        let regex_pattern = escaped.replace(
            r"\{version\}",
            r"(?P<version>\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?(?:\+[0-9A-Za-z.-]+)?)",
        );
        let from_tag = Regex::new(&format!("^{}$", regex_pattern))
            .map_err(|e| SemrelError::config(format!("Invalid tag format '{}': {}", pattern, e)))?;

        Ok(TagFormat { pattern, from_tag })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Render a version into a tag name
    pub fn format(&self, version: &Version) -> String {
        self.pattern.replace("{version}", &version.to_string())
    }

    /// Parse the version embedded in a tag name.
    ///
    /// Returns `None` when the tag does not match the format at all (not
    /// every tag is a release tag), and an error only when the embedded
    /// text matches the format but fails the strict version grammar.
    pub fn version_from_tag(&self, tag: &str) -> Option<Result<Version>> {
        let captures = self.from_tag.captures(tag)?;
        let embedded = captures.name("version").map(|m| m.as_str())?;
        Some(Version::parse_with_tag_format(embedded, &self.pattern))
    }

    /// Check whether a tag name matches this format
    pub fn matches(&self, tag: &str) -> bool {
        self.from_tag.is_match(tag)
    }
}

impl Default for TagFormat {
    fn default() -> Self {
        TagFormat::new("v{version}").expect("default tag format is valid")
    }
}
