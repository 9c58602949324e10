// tests/history_test.rs
//
// Release reconstruction and commit-walk behavior over a mock repository.

use semrel::domain::TagFormat;
use semrel::history::{CommitWalker, ReleaseHistory};
use semrel::parser::ConventionalCommitParser;
use semrel::vcs::{MockRepository, Repository};

/// Repo with a merge: main takes a topic branch between two releases.
///
/// ```text
/// c1 -- c2 ----- m1 -- c5   (main)
///    \         /
///     t1 -- t2             (topic)
/// ```
fn merged_repo() -> MockRepository {
    let mut repo = MockRepository::new();
    repo.add_commit("c1", &[], "feat: initial");
    repo.add_commit("c2", &["c1"], "fix: groundwork");
    repo.add_commit("t1", &["c1"], "feat: topic start");
    repo.add_commit("t2", &["t1"], "fix: topic polish");
    repo.add_commit("m1", &["c2", "t2"], "Merge branch 'topic'");
    repo.add_commit("c5", &["m1"], "fix: after merge");
    repo.add_tag("v1.0.0", "c1", 100);
    repo.add_tag("v1.1.0", "m1", 200);
    repo.set_branch_head("main", "c5");
    repo
}

#[test]
fn test_walk_order_is_depth_first_with_rightmost_parent_first() {
    let repo = merged_repo();
    let mut walker = CommitWalker::new();

    let commits = walker.commits_since(&repo, "c5", Some("c1")).unwrap();
    let ids: Vec<_> = commits.iter().map(|c| c.id.as_str()).collect();
    // From c5: m1, then m1's rightmost parent chain (t2, t1), then the
    // first-parent side (c2); the boundary c1 is excluded everywhere
    assert_eq!(ids, vec!["c5", "m1", "t2", "t1", "c2"]);
}

#[test]
fn test_walk_visits_shared_ancestors_once() {
    let repo = merged_repo();
    let mut walker = CommitWalker::new();

    let commits = walker.commits_since(&repo, "c5", None).unwrap();
    let ids: Vec<_> = commits.iter().map(|c| c.id.as_str()).collect();
    let unique: std::collections::HashSet<_> = ids.iter().collect();
    assert_eq!(ids.len(), unique.len(), "no commit may be visited twice");
    assert_eq!(ids.len(), 6);
}

#[test]
fn test_release_ranges_partition_the_graph() {
    let repo = merged_repo();
    let format = TagFormat::new("v{version}").unwrap();
    let parser = ConventionalCommitParser::with_defaults();

    let history = ReleaseHistory::from_repository(&repo, &format, &parser).unwrap();
    let releases = history.releases();
    assert_eq!(releases.len(), 2);
    assert_eq!(releases[0].tag_name, "v1.1.0");
    assert_eq!(releases[1].tag_name, "v1.0.0");

    // v1.1.0 contains everything between m1 and c1; the merge commit
    // parses to an ignored-merge error but is still part of the range
    let range: Vec<_> = releases[0]
        .commits
        .iter()
        .map(|result| match result {
            Ok(parsed) => parsed.commit.id.clone(),
            Err(error) => error.commit.id.clone(),
        })
        .collect();
    assert_eq!(range, vec!["m1", "t2", "t1", "c2"]);
}

#[test]
fn test_release_metadata_carried_from_tags() {
    let repo = merged_repo();
    let format = TagFormat::new("v{version}").unwrap();
    let history = ReleaseHistory::releases_from_tags(&repo.all_tags().unwrap(), &format);

    let release = history.last_release(false).unwrap();
    assert_eq!(release.tag_name, "v1.1.0");
    assert_eq!(release.tagged_date, 200);
    assert_eq!(release.commit_id, "m1");
    assert_eq!(release.tagger, "Test Tagger");
}

#[test]
fn test_mixed_full_and_prerelease_filters() {
    let mut repo = MockRepository::new();
    repo.add_commit("c1", &[], "feat: initial");
    repo.add_commit("c2", &["c1"], "feat: more");
    repo.add_tag("v1.0.0", "c1", 100);
    repo.add_tag("v1.1.0-rc.1", "c2", 200);
    repo.set_branch_head("main", "c2");

    let format = TagFormat::new("v{version}").unwrap();
    let parser = ConventionalCommitParser::with_defaults();
    let history = ReleaseHistory::from_repository(&repo, &format, &parser).unwrap();

    assert_eq!(
        history.last_release(false).unwrap().version.to_string(),
        "1.1.0-rc.1"
    );
    assert_eq!(
        history.last_release(true).unwrap().version.to_string(),
        "1.0.0"
    );
    assert!(history
        .last_release_where(|v| v.major >= 2)
        .is_none());
}
