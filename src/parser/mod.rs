//! Commit parsing strategies
//!
//! A [CommitParser] turns one raw VCS commit into structured parse results.
//! Malformed commits are values, not failures: the parser returns a
//! [ParseError] entry instead of raising, so one bad message never aborts
//! analysis of the rest of the history. A single VCS commit may expand to
//! several results when it is a squashed merge.

pub mod conventional;
pub mod emoji;

pub use conventional::{ConventionalCommitParser, ConventionalParserOptions, TypeRule};
pub use emoji::{EmojiCommitParser, EmojiParserOptions};

use crate::domain::LevelBump;
use crate::error::SemrelError;
use crate::vcs::RawCommit;

/// Structured interpretation of one logical commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommit {
    pub bump: LevelBump,
    pub commit_type: String,
    pub scope: String,
    pub descriptions: Vec<String>,
    pub breaking_descriptions: Vec<String>,
    pub linked_issues: Vec<String>,
    pub linked_merge_request: String,
    /// The VCS commit this result came from
    pub commit: RawCommit,
}

impl ParsedCommit {
    pub fn short_id(&self) -> &str {
        self.commit.short_id()
    }
}

/// A commit the parser could not interpret.
///
/// Carried as a value; call [ParseError::into_error] if the caller decides
/// an unparsable commit should abort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub commit: RawCommit,
    pub error: String,
}

impl ParseError {
    pub fn new(commit: RawCommit, error: impl Into<String>) -> Self {
        ParseError {
            commit,
            error: error.into(),
        }
    }

    pub fn short_id(&self) -> &str {
        self.commit.short_id()
    }

    /// Promote this value to a raised error
    pub fn into_error(self) -> SemrelError {
        SemrelError::commit_parse(self.error)
    }
}

/// Outcome of parsing one logical commit
pub type ParseResult = std::result::Result<ParsedCommit, ParseError>;

/// Strategy interface for commit-message grammars.
///
/// Implementations are selected by configuration and share the same result
/// contract, so the analyzer is independent of the grammar in use.
pub trait CommitParser: Send + Sync {
    /// Parse one raw commit into one or more results
    fn parse(&self, commit: &RawCommit) -> Vec<ParseResult>;
}

/// The highest bump level present in a set of parse results.
///
/// Parse errors contribute nothing.
pub fn max_bump(results: &[ParseResult]) -> LevelBump {
    results
        .iter()
        .filter_map(|result| result.as_ref().ok())
        .map(|parsed| parsed.bump)
        .max()
        .unwrap_or(LevelBump::NoRelease)
}

/// Split a text block into paragraphs on blank lines, collapsing single
/// line breaks into spaces. Carriage returns are removed first to handle
/// Windows line endings.
pub fn parse_paragraphs(text: &str) -> Vec<String> {
    text.replace('\r', "")
        .split("\n\n")
        .map(|paragraph| {
            paragraph
                .split('\n')
                .map(str::trim)
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string()
        })
        .filter(|paragraph| !paragraph.is_empty())
        .collect()
}
