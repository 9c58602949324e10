//! Emoji (gitmoji) commit parser
//!
//! The subject line is scanned for configured emoji codes in priority
//! order; the first hit's tier decides the bump. This grammar has no
//! failure mode: an unrecognized message classifies as type "Other" with
//! the configured default bump.

use regex::Regex;
use tracing::debug;

use crate::domain::LevelBump;
use crate::parser::{parse_paragraphs, CommitParser, ParseResult, ParsedCommit};
use crate::vcs::RawCommit;

/// Options for [EmojiCommitParser]
#[derive(Debug, Clone)]
pub struct EmojiParserOptions {
    /// Emoji codes that produce a major bump
    pub major_tags: Vec<String>,
    /// Emoji codes that produce a minor bump
    pub minor_tags: Vec<String>,
    /// Emoji codes that produce a patch bump
    pub patch_tags: Vec<String>,
    /// Bump level for commits without any recognized emoji
    pub default_bump_level: LevelBump,
}

impl Default for EmojiParserOptions {
    fn default() -> Self {
        let strings = |tags: &[&str]| tags.iter().map(|t| t.to_string()).collect();
        EmojiParserOptions {
            major_tags: strings(&[":boom:"]),
            minor_tags: strings(&[
                ":sparkles:",
                ":children_crossing:",
                ":lipstick:",
                ":iphone:",
                ":egg:",
                ":chart_with_upwards_trend:",
            ]),
            patch_tags: strings(&[
                ":ambulance:",
                ":lock:",
                ":bug:",
                ":zap:",
                ":goal_net:",
                ":alien:",
                ":wheelchair:",
                ":speech_balloon:",
                ":mag:",
                ":apple:",
                ":penguin:",
                ":checkered_flag:",
                ":robot:",
                ":green_apple:",
            ]),
            default_bump_level: LevelBump::NoRelease,
        }
    }
}

/// Parser keyed on emoji codes in the subject line
pub struct EmojiCommitParser {
    options: EmojiParserOptions,
    mr_selector: Regex,
}

impl EmojiCommitParser {
    pub fn new(options: EmojiParserOptions) -> Self {
        EmojiCommitParser {
            options,
            // Same merge-request reference forms as the conventional parser
            mr_selector: Regex::new(r"[\t ]\((?:pull request )?(?P<mr_number>[#!]\d+)\)[\t ]*$")
                .unwrap(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(EmojiParserOptions::default())
    }

    pub fn options(&self) -> &EmojiParserOptions {
        &self.options
    }
}

impl CommitParser for EmojiCommitParser {
    fn parse(&self, commit: &RawCommit) -> Vec<ParseResult> {
        let message = commit.message.as_str();
        let subject = message.lines().next().unwrap_or("");

        let linked_merge_request = self
            .mr_selector
            .captures(subject)
            .and_then(|caps| caps.name("mr_number"))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        // Scan tiers from most to least impactful so the highest-priority
        // emoji in the subject wins
        let tiers = [
            (&self.options.major_tags, LevelBump::Major),
            (&self.options.minor_tags, LevelBump::Minor),
            (&self.options.patch_tags, LevelBump::Patch),
        ];
        let (primary_emoji, bump) = tiers
            .iter()
            .flat_map(|(tags, level)| tags.iter().map(move |tag| (tag.as_str(), *level)))
            .find(|(tag, _)| subject.contains(tag))
            .unwrap_or(("Other", self.options.default_bump_level));

        debug!(commit = commit.short_id(), %bump, emoji = primary_emoji, "classified commit");

        // The emojis stay part of the descriptions; for a major bump every
        // paragraph after the subject doubles as a breaking description,
        // since this grammar has no dedicated breaking-change footer.
        let descriptions = parse_paragraphs(message);
        let breaking_descriptions = if bump == LevelBump::Major {
            descriptions.iter().skip(1).cloned().collect()
        } else {
            Vec::new()
        };

        vec![Ok(ParsedCommit {
            bump,
            commit_type: primary_emoji.to_string(),
            scope: String::new(),
            descriptions,
            breaking_descriptions,
            linked_issues: Vec::new(),
            linked_merge_request,
            commit: commit.clone(),
        })]
    }
}
