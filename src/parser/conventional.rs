//! Conventional-commit (angular style) message parser
//!
//! Subject grammar: `type(scope)!: subject`. The body is split into
//! paragraphs: `BREAKING CHANGE:` paragraphs become breaking descriptions,
//! `closes|fixes|resolves:` footers become linked issues, everything else
//! accumulates as plain descriptions. Squashed merge commits can be split
//! back into their constituent logical commits.

use regex::Regex;
use tracing::debug;

use crate::domain::LevelBump;
use crate::error::{Result, SemrelError};
use crate::parser::{parse_paragraphs, CommitParser, ParseError, ParseResult, ParsedCommit};
use crate::vcs::RawCommit;

/// A commit-type tag with the scope patterns it accepts
#[derive(Debug, Clone)]
pub struct TypeRule {
    pub tag: String,
    pub scopes: Vec<String>,
}

impl TypeRule {
    /// A type tag accepting any scope (including none)
    pub fn any(tag: impl Into<String>) -> Self {
        TypeRule {
            tag: tag.into(),
            scopes: vec![".*?".to_string()],
        }
    }

    /// A type tag restricted to the given scope patterns
    pub fn scoped(tag: impl Into<String>, scopes: &[&str]) -> Self {
        TypeRule {
            tag: tag.into(),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Options for [ConventionalCommitParser], validated at parser construction
#[derive(Debug, Clone)]
pub struct ConventionalParserOptions {
    /// Type tags (and scopes) that produce a minor bump
    pub minor_tags: Vec<TypeRule>,
    /// Type tags (and scopes) that produce a patch bump
    pub patch_tags: Vec<TypeRule>,
    /// Type tags that are valid but produce no bump on their own
    pub other_allowed_tags: Vec<TypeRule>,
    /// Bump level for structurally valid commits with no matching rule
    pub default_bump_level: LevelBump,
    /// Split squashed merge commits into their embedded logical commits
    pub parse_squash_commits: bool,
    /// Return a parse error for merge commits instead of classifying them
    pub ignore_merge_commits: bool,
    /// Reject commits whose scope matches no declared pattern for the type
    pub strict_scope: bool,
}

impl Default for ConventionalParserOptions {
    fn default() -> Self {
        ConventionalParserOptions {
            minor_tags: vec![TypeRule::any("feat")],
            patch_tags: vec![
                TypeRule::any("fix"),
                TypeRule::any("perf"),
                TypeRule::scoped("build", &["deps"]),
            ],
            other_allowed_tags: vec![
                TypeRule::any("build"),
                TypeRule::any("chore"),
                TypeRule::any("ci"),
                TypeRule::any("docs"),
                TypeRule::any("style"),
                TypeRule::any("refactor"),
                TypeRule::any("test"),
                TypeRule::any("revert"),
            ],
            default_bump_level: LevelBump::NoRelease,
            parse_squash_commits: true,
            ignore_merge_commits: true,
            strict_scope: false,
        }
    }
}

impl ConventionalParserOptions {
    /// Every allowed type tag, most impactful first, without duplicates
    pub fn allowed_tags(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for rule in self
            .minor_tags
            .iter()
            .chain(self.patch_tags.iter())
            .chain(self.other_allowed_tags.iter())
        {
            if !seen.contains(&rule.tag.as_str()) {
                seen.push(rule.tag.as_str());
            }
        }
        seen
    }
}

/// One compiled (type, scope-pattern) entry with its bump level
struct ScopedLevel {
    tag: String,
    scope_patterns: Vec<Regex>,
    level: LevelBump,
}

/// Parser for the angular flavor of conventional commits
pub struct ConventionalCommitParser {
    options: ConventionalParserOptions,
    subject_re: Regex,
    mr_selector: Regex,
    issue_selector: Regex,
    issue_separator: Regex,
    breaking_re: Regex,
    commit_prefix: Regex,
    squash_filters: Vec<(Regex, &'static str)>,
    scoped_levels: Vec<ScopedLevel>,
}

impl ConventionalCommitParser {
    /// Build a parser, validating every configured scope pattern eagerly
    pub fn new(options: ConventionalParserOptions) -> Result<Self> {
        let mut scoped_levels = Vec::new();
        // Most impactful tier first, so the first match always wins
        for (rules, level) in [
            (&options.minor_tags, LevelBump::Minor),
            (&options.patch_tags, LevelBump::Patch),
            (&options.other_allowed_tags, LevelBump::NoRelease),
        ] {
            for rule in rules {
                scoped_levels.push(ScopedLevel {
                    tag: rule.tag.clone(),
                    scope_patterns: compile_scope_patterns(rule)?,
                    level,
                });
            }
        }

        let all_types = options
            .allowed_tags()
            .iter()
            .map(|tag| regex::escape(tag))
            .collect::<Vec<_>>()
            .join("|");
        if all_types.is_empty() {
            return Err(SemrelError::config(
                "conventional parser requires at least one allowed commit type",
            ));
        }

        let subject_re = Regex::new(&format!(
            r"^(?P<type>{})(?:\((?P<scope>[^\n]+)\))?(?P<break>!)?:\s+(?P<subject>[^\n]+)(?:\n\n(?P<text>(?s:.+)))?",
            all_types
        ))
        .map_err(|e| SemrelError::config(format!("invalid commit type configuration: {}", e)))?;

        let commit_prefix = Regex::new(&format!(
            r"^(?:{})(?:\([^)]+\))?!?:\s+",
            all_types
        ))
        .map_err(|e| SemrelError::config(format!("invalid commit type configuration: {}", e)))?;

        // Boilerplate stripping for `git merge --squash` style messages
        let squash_filters = vec![
            (Regex::new(r"(\S)  +(\S)").unwrap(), "${1} ${2}"),
            (Regex::new(r"(?m)^[\t ]*commit [0-9a-f]+$\n?").unwrap(), ""),
            (Regex::new(r"(?m)^[\t ]*Author: .+$\n?").unwrap(), ""),
            (Regex::new(r"(?m)^[\t ]*Date: .+$\n?").unwrap(), ""),
            (
                Regex::new(r"(?m)^[\t ]*Squashed commit of the following:.*$\n?").unwrap(),
                "",
            ),
            (
                // Move an embedded commit-type prefix (after a bullet point
                // or indentation) to the start of its line
                Regex::new(&format!(r"(?m)^(?:[\t ]*[*-][\t ]+|[\t ]+)({})\b", all_types)).unwrap(),
                "${1}",
            ),
        ];

        Ok(ConventionalCommitParser {
            options,
            subject_re,
            // GitHub & Gitea use (#123), GitLab uses (!123), and BitBucket
            // uses (pull request #123)
            mr_selector: Regex::new(r"[\t ]\((?:pull request )?(?P<mr_number>[#!]\d+)\)[\t ]*$")
                .unwrap(),
            issue_selector: Regex::new(
                r"(?mi)^(?:close[sd]?|fix(?:es|ed)?|resolve[sd]?):[\t ]+(?P<issue_predicate>.+?)[\t ]*$",
            )
            .unwrap(),
            issue_separator: Regex::new(r" *[,;/ ] *").unwrap(),
            breaking_re: Regex::new(r"^BREAKING[ -]CHANGE:\s?(?P<description>.*)").unwrap(),
            commit_prefix,
            squash_filters,
            scoped_levels,
        })
    }

    /// Build a parser with the default option set
    pub fn with_defaults() -> Self {
        Self::new(ConventionalParserOptions::default())
            .expect("default conventional parser options are valid")
    }

    pub fn options(&self) -> &ConventionalParserOptions {
        &self.options
    }

    /// The bump level for a (type, scope) pair, most impactful rule first.
    ///
    /// Returns `None` when the type declares no pattern accepting the scope.
    fn level_for(&self, commit_type: &str, scope: &str) -> Option<LevelBump> {
        for entry in &self.scoped_levels {
            if entry.tag == commit_type
                && entry.scope_patterns.iter().any(|p| p.is_match(scope))
            {
                return Some(entry.level);
            }
        }
        None
    }

    fn parse_one(&self, commit: &RawCommit) -> ParseResult {
        let message = commit.message.as_str();
        let Some(parsed) = self.subject_re.captures(message) else {
            return Err(ParseError::new(
                commit.clone(),
                format!("Unable to parse commit message: {}", message),
            ));
        };

        let commit_type = parsed.name("type").map(|m| m.as_str()).unwrap_or("");
        let scope = parsed.name("scope").map(|m| m.as_str()).unwrap_or("");
        let has_break_marker = parsed.name("break").is_some();
        let subject = parsed.name("subject").map(|m| m.as_str()).unwrap_or("");
        let body = parsed.name("text").map(|m| m.as_str()).unwrap_or("");

        let type_level = self.level_for(commit_type, scope);
        if type_level.is_none() && self.options.strict_scope && !scope.is_empty() {
            return Err(ParseError::new(
                commit.clone(),
                format!(
                    "Scope '{}' is not allowed for commit type '{}'",
                    scope, commit_type
                ),
            ));
        }

        let linked_merge_request = self
            .mr_selector
            .captures(subject)
            .and_then(|caps| caps.name("mr_number"))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        let mut descriptions = Vec::new();
        let mut breaking_descriptions = Vec::new();
        let mut linked_issues = Vec::new();

        // The subject is classified like any other paragraph
        for paragraph in std::iter::once(subject.to_string()).chain(parse_paragraphs(body)) {
            if let Some(caps) = self.breaking_re.captures(&paragraph) {
                breaking_descriptions.push(caps["description"].to_string());
            } else if let Some(caps) = self.issue_selector.captures(&paragraph) {
                let predicate = self
                    .issue_separator
                    .replace_all(&caps["issue_predicate"], ",");
                linked_issues.extend(
                    predicate
                        .split(',')
                        .filter(|issue| !issue.is_empty())
                        .map(str::to_string),
                );
            }
            descriptions.push(paragraph);
        }

        let bump = if has_break_marker || !breaking_descriptions.is_empty() {
            LevelBump::Major
        } else {
            type_level.unwrap_or(self.options.default_bump_level)
        };

        debug!(
            commit = commit.short_id(),
            %bump,
            commit_type,
            "classified commit"
        );

        Ok(ParsedCommit {
            bump,
            commit_type: commit_type.to_string(),
            scope: scope.to_string(),
            descriptions,
            breaking_descriptions,
            linked_issues,
            linked_merge_request,
            commit: commit.clone(),
        })
    }

    /// Split a squashed commit message into the embedded logical commits.
    ///
    /// Paragraphs are normalized (VCS boilerplate headers removed, embedded
    /// commit-type prefixes moved to line starts); each paragraph opening
    /// with a commit-type prefix starts a new artificial commit and
    /// trailing paragraphs attach to the one before them. Returns the
    /// original commit when no embedded subjects are found.
    fn unsquash_commit(&self, commit: &RawCommit) -> Vec<RawCommit> {
        let mut separate_commit_msgs: Vec<String> = Vec::new();
        let mut current_msg = String::new();

        let normalized = commit.message.replace('\r', "");
        for paragraph in normalized.trim().split("\n\n") {
            let clean_paragraph = self
                .squash_filters
                .iter()
                .fold(paragraph.to_string(), |text, (pattern, replacement)| {
                    if text.is_empty() {
                        text
                    } else {
                        pattern.replace_all(&text, *replacement).into_owned()
                    }
                });

            // Drop paragraphs the filters emptied out (the git headers)
            if clean_paragraph.trim().is_empty() {
                continue;
            }

            if !self.commit_prefix.is_match(&clean_paragraph) {
                // Not a new subject: body text of the previous commit
                if !current_msg.is_empty() {
                    current_msg.push_str("\n\n");
                    current_msg.push_str(&dedent(&clean_paragraph));
                }
                continue;
            }

            if !current_msg.is_empty() {
                separate_commit_msgs.push(std::mem::take(&mut current_msg));
            }
            current_msg = clean_paragraph;
        }

        if !current_msg.is_empty() {
            separate_commit_msgs.push(current_msg);
        }

        if separate_commit_msgs.is_empty() {
            return vec![commit.clone()];
        }

        separate_commit_msgs
            .into_iter()
            .map(|message| RawCommit {
                message,
                ..commit.clone()
            })
            .collect()
    }
}

impl CommitParser for ConventionalCommitParser {
    fn parse(&self, commit: &RawCommit) -> Vec<ParseResult> {
        if self.options.ignore_merge_commits && commit.parents.len() > 1 {
            debug!(commit = commit.short_id(), "ignoring merge commit");
            return vec![Err(ParseError::new(
                commit.clone(),
                format!("Ignoring merge commit: {}", commit.short_id()),
            ))];
        }

        let separate_commits = if self.options.parse_squash_commits {
            self.unsquash_commit(commit)
        } else {
            vec![commit.clone()]
        };

        let mut parsed_commits: Vec<ParseResult> = separate_commits
            .iter()
            .map(|artificial| self.parse_one(artificial))
            .collect();

        // One PR per squash: the lead commit's merge request applies to all
        let lead_merge_request = match parsed_commits.first() {
            Some(Ok(lead)) if !lead.linked_merge_request.is_empty() => {
                lead.linked_merge_request.clone()
            }
            _ => return parsed_commits,
        };
        for result in parsed_commits.iter_mut().skip(1) {
            if let Ok(parsed) = result {
                parsed.linked_merge_request = lead_merge_request.clone();
            }
        }

        parsed_commits
    }
}

/// Validate and compile the scope patterns of one type rule
fn compile_scope_patterns(rule: &TypeRule) -> Result<Vec<Regex>> {
    if rule.tag.is_empty() {
        return Err(SemrelError::config(
            "commit type tags must be non-empty strings",
        ));
    }
    if rule.scopes.is_empty() {
        return Err(SemrelError::config(format!(
            "commit type '{}' declares no scope patterns",
            rule.tag
        )));
    }

    let mut compiled = Vec::new();
    for scope in &rule.scopes {
        if scope.is_empty() {
            return Err(SemrelError::config(format!(
                "empty scope pattern for commit type '{}'",
                rule.tag
            )));
        }
        if scope.starts_with('^') || scope.ends_with('$') {
            return Err(SemrelError::config(format!(
                "scope pattern '{}' for '{}' must not carry '^' or '$' anchors",
                scope, rule.tag
            )));
        }
        if scope.starts_with('(') || scope.ends_with(')') {
            return Err(SemrelError::config(format!(
                "scope pattern '{}' for '{}' must not be wrapped in parentheses",
                scope, rule.tag
            )));
        }

        let normalized = match scope.as_str() {
            "*" | ".*" => ".*?".to_string(),
            s if s.ends_with(".*") => format!("{}?", s),
            s => s.to_string(),
        };

        compiled.push(
            Regex::new(&format!("^(?:{})$", normalized)).map_err(|e| {
                SemrelError::config(format!(
                    "invalid scope pattern '{}' for commit type '{}': {}",
                    scope, rule.tag, e
                ))
            })?,
        );
    }
    Ok(compiled)
}

/// Strip the common leading whitespace from every line of a block
fn dedent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    text.lines()
        .map(|line| if line.len() >= indent { &line[indent..] } else { line })
        .collect::<Vec<_>>()
        .join("\n")
}
