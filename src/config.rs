use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analyzer::{AnalyzerOptions, VersionAnalyzer};
use crate::domain::{BranchTable, ReleaseChannel, TagFormat, Version};
use crate::error::{Result, SemrelError};
use crate::parser::{
    CommitParser, ConventionalCommitParser, ConventionalParserOptions, EmojiCommitParser,
    EmojiParserOptions, TypeRule,
};

/// Represents the complete configuration for semrel.
///
/// Contains the tag format, release-channel rules, zero-version policy and
/// commit-parser selection. Validation is eager: [Config::build_analyzer]
/// rejects invalid patterns before any parsing begins.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_tag_format")]
    pub tag_format: String,

    #[serde(default = "default_initial_version")]
    pub default_initial_version: String,

    #[serde(default = "default_true")]
    pub major_on_zero: bool,

    #[serde(default = "default_true")]
    pub allow_zero_version: bool,

    #[serde(default)]
    pub strict: bool,

    #[serde(default = "default_branches")]
    pub branches: Vec<BranchConfig>,

    #[serde(default)]
    pub parser: ParserConfig,
}

/// One release-channel rule: a branch-name regex with its prerelease policy
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BranchConfig {
    pub pattern: String,

    #[serde(default)]
    pub prerelease: bool,

    #[serde(default = "default_prerelease_token")]
    pub prerelease_token: String,
}

/// Commit-parser selection and shared grammar options
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ParserConfig {
    /// "conventional" or "emoji"
    #[serde(default = "default_parser_kind")]
    pub kind: String,

    /// Type tags (conventional) or emoji codes (emoji) per bump tier;
    /// omitted tiers use the grammar's defaults
    #[serde(default)]
    pub major_tags: Option<Vec<String>>,

    #[serde(default)]
    pub minor_tags: Option<Vec<String>>,

    #[serde(default)]
    pub patch_tags: Option<Vec<String>>,

    #[serde(default)]
    pub other_allowed_tags: Option<Vec<String>>,

    #[serde(default = "default_true")]
    pub parse_squash_commits: bool,

    #[serde(default = "default_true")]
    pub ignore_merge_commits: bool,

    #[serde(default)]
    pub strict_scope: bool,
}

fn default_tag_format() -> String {
    "v{version}".to_string()
}

fn default_initial_version() -> String {
    "0.0.0".to_string()
}

fn default_prerelease_token() -> String {
    "rc".to_string()
}

fn default_parser_kind() -> String {
    "conventional".to_string()
}

fn default_true() -> bool {
    true
}

/// Returns the default release-channel rules.
fn default_branches() -> Vec<BranchConfig> {
    vec![
        BranchConfig {
            pattern: "main|master".to_string(),
            prerelease: false,
            prerelease_token: default_prerelease_token(),
        },
        BranchConfig {
            pattern: "develop|dev".to_string(),
            prerelease: true,
            prerelease_token: default_prerelease_token(),
        },
    ]
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            kind: default_parser_kind(),
            major_tags: None,
            minor_tags: None,
            patch_tags: None,
            other_allowed_tags: None,
            parse_squash_commits: true,
            ignore_merge_commits: true,
            strict_scope: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tag_format: default_tag_format(),
            default_initial_version: default_initial_version(),
            major_on_zero: true,
            allow_zero_version: true,
            strict: false,
            branches: default_branches(),
            parser: ParserConfig::default(),
        }
    }
}

impl Config {
    /// Compile the tag format
    pub fn tag_format(&self) -> Result<TagFormat> {
        TagFormat::new(self.tag_format.clone())
    }

    /// Compile the release-channel table
    pub fn branch_table(&self) -> Result<BranchTable> {
        let mut channels = Vec::new();
        for branch in &self.branches {
            channels.push(ReleaseChannel::new(
                &branch.pattern,
                branch.prerelease,
                branch.prerelease_token.clone(),
            )?);
        }
        Ok(BranchTable::new(channels))
    }

    /// Parse the configured initial version
    pub fn initial_version(&self) -> Result<Version> {
        Version::parse(&self.default_initial_version)
    }

    /// Construct the configured commit parser
    pub fn build_parser(&self) -> Result<Box<dyn CommitParser>> {
        let as_rules = |tags: &[String]| -> Vec<TypeRule> {
            tags.iter().map(|tag| TypeRule::any(tag.as_str())).collect()
        };

        match self.parser.kind.as_str() {
            "conventional" => {
                let mut options = ConventionalParserOptions::default();
                if let Some(tags) = &self.parser.minor_tags {
                    options.minor_tags = as_rules(tags);
                }
                if let Some(tags) = &self.parser.patch_tags {
                    options.patch_tags = as_rules(tags);
                }
                if let Some(tags) = &self.parser.other_allowed_tags {
                    options.other_allowed_tags = as_rules(tags);
                }
                options.parse_squash_commits = self.parser.parse_squash_commits;
                options.ignore_merge_commits = self.parser.ignore_merge_commits;
                options.strict_scope = self.parser.strict_scope;
                Ok(Box::new(ConventionalCommitParser::new(options)?))
            }
            "emoji" => {
                let mut options = EmojiParserOptions::default();
                if let Some(tags) = &self.parser.major_tags {
                    options.major_tags = tags.clone();
                }
                if let Some(tags) = &self.parser.minor_tags {
                    options.minor_tags = tags.clone();
                }
                if let Some(tags) = &self.parser.patch_tags {
                    options.patch_tags = tags.clone();
                }
                Ok(Box::new(EmojiCommitParser::new(options)))
            }
            other => Err(SemrelError::config(format!(
                "unknown parser kind '{}': expected 'conventional' or 'emoji'",
                other
            ))),
        }
    }

    /// Validate the whole configuration and assemble the analyzer
    pub fn build_analyzer(&self) -> Result<VersionAnalyzer> {
        let options = AnalyzerOptions {
            default_initial_version: self.initial_version()?,
            major_on_zero: self.major_on_zero,
            allow_zero_version: self.allow_zero_version,
            strict: self.strict,
        };

        Ok(VersionAnalyzer::new(
            self.build_parser()?,
            self.tag_format()?,
            self.branch_table()?,
            options,
        ))
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `semrel.toml` in current directory
/// 3. `semrel.toml` in the user config directory
/// 4. Default configuration if no file found
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new("./semrel.toml").exists() {
        fs::read_to_string("./semrel.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join("semrel.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    toml::from_str(&config_str)
        .map_err(|e| SemrelError::config(format!("cannot parse configuration: {}", e)))
}
