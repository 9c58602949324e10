// tests/next_version_test.rs
//
// End-to-end next-version scenarios: mock repositories with tagged release
// histories, analyzed through the configured parser and branch channels.

use semrel::analyzer::{AnalyzerOptions, VersionAnalyzer};
use semrel::config::{Config, ParserConfig};
use semrel::domain::{BranchTable, ReleaseChannel, TagFormat, Version};
use semrel::parser::ConventionalCommitParser;
use semrel::vcs::MockRepository;

fn analyzer_with(options: AnalyzerOptions, token: &str) -> VersionAnalyzer {
    let branches = BranchTable::new(vec![
        ReleaseChannel::new("main", false, token).unwrap(),
        ReleaseChannel::new("develop", true, token).unwrap(),
    ]);
    VersionAnalyzer::new(
        Box::new(ConventionalCommitParser::with_defaults()),
        TagFormat::new("v{version}").unwrap(),
        branches,
        options,
    )
}

fn analyzer(token: &str) -> VersionAnalyzer {
    analyzer_with(AnalyzerOptions::default(), token)
}

/// Git-flow style repo: full release 1.1.1, then a minor prerelease
/// 1.2.0-alpha.2 cut from the develop branch.
fn git_flow_repo(unreleased: &[&str]) -> MockRepository {
    let mut repo = MockRepository::new();
    repo.add_commit("c1", &[], "feat: initial");
    repo.add_commit("c2", &["c1"], "fix: stabilize");
    repo.add_commit("c3", &["c2"], "feat: new surface");
    repo.add_tag("v1.1.1", "c2", 100);
    repo.add_tag("v1.2.0-alpha.2", "c3", 200);

    let mut head = "c3".to_string();
    for (i, message) in unreleased.iter().enumerate() {
        let id = format!("u{}", i + 1);
        repo.add_commit(id.clone(), &[head.as_str()], *message);
        head = id;
    }
    repo.set_branch_head("develop", head.clone());
    repo.set_branch_head("main", head);
    repo
}

#[test]
fn test_patch_commit_continues_prerelease() {
    // diff(1.2.0-alpha.2, 1.1.1) = MINOR; PATCH fits inside it
    let repo = git_flow_repo(&["fix: bug"]);
    let next = analyzer("alpha").next_version(&repo, "develop").unwrap();
    assert_eq!(next, Version::parse("1.2.0-alpha.3").unwrap());
}

#[test]
fn test_minor_commit_continues_prerelease() {
    let repo = git_flow_repo(&["feat: more work"]);
    let next = analyzer("alpha").next_version(&repo, "develop").unwrap();
    assert_eq!(next, Version::parse("1.2.0-alpha.3").unwrap());
}

#[test]
fn test_patch_commit_finalizes_on_release_branch() {
    let repo = git_flow_repo(&["fix: bug"]);
    let next = analyzer("alpha").next_version(&repo, "main").unwrap();
    assert_eq!(next, Version::parse("1.2.0").unwrap());
}

#[test]
fn test_major_commit_consumes_prerelease() {
    let repo = git_flow_repo(&["feat!: breaking api"]);

    let next = analyzer("alpha").next_version(&repo, "develop").unwrap();
    assert_eq!(next, Version::parse("2.0.0-alpha.1").unwrap());

    let full = analyzer("alpha").next_version(&repo, "main").unwrap();
    assert_eq!(full, Version::parse("2.0.0").unwrap());
}

#[test]
fn test_chore_commits_leave_last_version_unchanged() {
    let repo = git_flow_repo(&["chore: dev tooling"]);
    let next = analyzer("alpha").next_version(&repo, "develop").unwrap();
    assert_eq!(next, Version::parse("1.2.0-alpha.2").unwrap());
}

#[test]
fn test_configured_token_differs_from_history_token() {
    // The active prerelease used "alpha"; the channel now wants "beta", so
    // the continuation restarts that token's revision at 1
    let repo = git_flow_repo(&["fix: bug"]);
    let next = analyzer("beta").next_version(&repo, "develop").unwrap();
    assert_eq!(next, Version::parse("1.2.0-beta.1").unwrap());
}

#[test]
fn test_simple_minor_release() {
    let mut repo = MockRepository::new();
    repo.add_commit("c1", &[], "feat: initial");
    repo.add_commit("c2", &["c1"], "feat: add X");
    repo.add_tag("v1.1.1", "c1", 100);
    repo.set_branch_head("main", "c2");

    let next = analyzer("rc").next_version(&repo, "main").unwrap();
    assert_eq!(next, Version::parse("1.2.0").unwrap());
}

#[test]
fn test_strict_mode_errors_without_changes() {
    let mut repo = MockRepository::new();
    repo.add_commit("c1", &[], "feat: initial");
    repo.add_tag("v1.0.0", "c1", 100);
    repo.set_branch_head("main", "c1");

    let strict = analyzer_with(
        AnalyzerOptions {
            strict: true,
            ..Default::default()
        },
        "rc",
    );
    let err = strict.next_version(&repo, "main").unwrap_err();
    assert!(err.to_string().contains("No version bump"));

    // Non-strict returns the last version unchanged
    let next = analyzer("rc").next_version(&repo, "main").unwrap();
    assert_eq!(next, Version::parse("1.0.0").unwrap());
}

#[test]
fn test_zero_version_policy_matrix() {
    let repo = {
        let mut repo = MockRepository::new();
        repo.add_commit("c1", &[], "feat: initial");
        repo.add_commit("c2", &["c1"], "feat!: breaking api");
        repo.add_tag("v0.1.1", "c1", 100);
        repo.set_branch_head("main", "c2");
        repo
    };

    // major_on_zero=true: breaking change promotes to 1.0.0
    let next = analyzer("rc").next_version(&repo, "main").unwrap();
    assert_eq!(next, Version::parse("1.0.0").unwrap());

    // major_on_zero=false: the breaking change is absorbed into the minor
    let capped = analyzer_with(
        AnalyzerOptions {
            major_on_zero: false,
            ..Default::default()
        },
        "rc",
    );
    assert_eq!(
        capped.next_version(&repo, "main").unwrap(),
        Version::parse("0.2.0").unwrap()
    );

    // allow_zero_version=false: any qualifying change forces 1.0.0,
    // regardless of major_on_zero
    let promoted = analyzer_with(
        AnalyzerOptions {
            allow_zero_version: false,
            major_on_zero: false,
            ..Default::default()
        },
        "rc",
    );
    assert_eq!(
        promoted.next_version(&repo, "main").unwrap(),
        Version::parse("1.0.0").unwrap()
    );
}

#[test]
fn test_unreleased_commits_bounded_by_last_release_tag() {
    // Commits already covered by the last release tag must not count again
    let mut repo = MockRepository::new();
    repo.add_commit("c1", &[], "feat!: huge rework");
    repo.add_commit("c2", &["c1"], "feat: released minor work");
    repo.add_commit("c3", &["c2"], "fix: small bug");
    repo.add_tag("v2.0.0", "c2", 100);
    repo.set_branch_head("main", "c3");

    let next = analyzer("rc").next_version(&repo, "main").unwrap();
    assert_eq!(next, Version::parse("2.0.1").unwrap());
}

#[test]
fn test_foreign_tags_are_ignored() {
    let mut repo = MockRepository::new();
    repo.add_commit("c1", &[], "feat: initial");
    repo.add_commit("c2", &["c1"], "fix: bug");
    repo.add_tag("v1.0.0", "c1", 100);
    repo.add_tag("deploy-2024-06-01", "c2", 200);
    repo.set_branch_head("main", "c2");

    let next = analyzer("rc").next_version(&repo, "main").unwrap();
    assert_eq!(next, Version::parse("1.0.1").unwrap());
}

#[test]
fn test_emoji_configured_pipeline() {
    let config = Config {
        parser: ParserConfig {
            kind: "emoji".to_string(),
            ..Default::default()
        },
        ..Default::default()
    };
    let analyzer = config.build_analyzer().unwrap();

    let mut repo = MockRepository::new();
    repo.add_commit("c1", &[], ":sparkles: first feature");
    repo.add_commit("c2", &["c1"], ":bug: quick fix");
    repo.add_tag("v0.3.0", "c1", 100);
    repo.set_branch_head("main", "c2");

    let next = analyzer.next_version(&repo, "main").unwrap();
    assert_eq!(next, Version::parse("0.3.1").unwrap());
}

#[test]
fn test_custom_tag_format_recognizes_only_its_own_tags() {
    let branches = BranchTable::new(vec![ReleaseChannel::new("main", false, "rc").unwrap()]);
    let analyzer = VersionAnalyzer::new(
        Box::new(ConventionalCommitParser::with_defaults()),
        TagFormat::new("release-{version}").unwrap(),
        branches,
        AnalyzerOptions::default(),
    );

    let mut repo = MockRepository::new();
    repo.add_commit("c1", &[], "feat: initial");
    repo.add_commit("c2", &["c1"], "feat: add X");
    // The v-prefixed tag belongs to some other tool and must be ignored
    repo.add_tag("v9.9.9", "c1", 100);
    repo.add_tag("release-1.0.0", "c1", 100);
    repo.set_branch_head("main", "c2");

    let next = analyzer.next_version(&repo, "main").unwrap();
    assert_eq!(next, Version::parse("1.1.0").unwrap());
}

#[test]
fn test_build_metadata_appended_to_result() {
    let repo = git_flow_repo(&["fix: bug"]);
    let next = analyzer("alpha")
        .next_version_with(&repo, "develop", None, Some("build.2024"))
        .unwrap();
    assert_eq!(next.to_string(), "1.2.0-alpha.3+build.2024");
}

#[test]
fn test_merge_commits_do_not_contribute() {
    let mut repo = MockRepository::new();
    repo.add_commit("c1", &[], "feat: initial");
    repo.add_commit("c2", &["c1"], "fix: on topic branch");
    repo.add_commit("c3", &["c1"], "docs: on main");
    repo.add_commit("m1", &["c3", "c2"], "Merge branch 'topic'");
    repo.add_tag("v1.0.0", "c1", 100);
    repo.set_branch_head("main", "m1");

    // The merge commit itself parses to an ignored error; the fix commit
    // reached through the merge drives the bump
    let next = analyzer("rc").next_version(&repo, "main").unwrap();
    assert_eq!(next, Version::parse("1.0.1").unwrap());
}
