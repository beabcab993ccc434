//! Repository sync tests against local scratch repositories.

use std::fs;
use std::path::Path;

use cheridemo::git;
use cheridemo::models::RepoSpec;
use tempfile::tempdir;

fn commit_file(repo: &git2::Repository, name: &str, content: &str, message: &str) -> git2::Oid {
    let workdir = repo.workdir().expect("bare repo");
    fs::write(workdir.join(name), content).expect("failed to write file");

    let mut index = repo.index().expect("failed to get index");
    index.add_path(Path::new(name)).expect("failed to add file");
    index.write().expect("failed to write index");
    let tree_id = index.write_tree().expect("failed to write tree");
    let tree = repo.find_tree(tree_id).expect("failed to find tree");
    let sig = git2::Signature::now("Test User", "test@example.com")
        .expect("failed to create signature");

    let parents: Vec<git2::Commit<'_>> = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().expect("failed to peel HEAD")],
        Err(_) => vec![],
    };
    let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .expect("failed to commit")
}

#[test]
fn sync_clones_and_is_idempotent() {
    let temp = tempdir().expect("failed to create temp dir");
    let source = temp.path().join("source");
    let dest = temp.path().join("clone");

    let repo = git2::Repository::init(&source).expect("failed to init source repo");
    commit_file(&repo, "README.md", "# demo", "initial commit");

    let spec = RepoSpec {
        url: source.to_str().unwrap().to_string(),
        branch: None,
        commit: None,
    };

    git::sync_repo(&spec, &dest).expect("first sync failed");
    assert!(dest.join(".git").exists());
    assert!(dest.join("README.md").exists());

    // A second sync must leave the existing checkout alone.
    git::sync_repo(&spec, &dest).expect("second sync failed");
}

#[test]
fn sync_pins_to_configured_commit() {
    let temp = tempdir().expect("failed to create temp dir");
    let source = temp.path().join("source");
    let dest = temp.path().join("clone");

    let repo = git2::Repository::init(&source).expect("failed to init source repo");
    let first = commit_file(&repo, "a.txt", "one", "first");
    let _second = commit_file(&repo, "b.txt", "two", "second");

    let spec = RepoSpec {
        url: source.to_str().unwrap().to_string(),
        branch: None,
        commit: Some(first.to_string()),
    };

    git::sync_repo(&spec, &dest).expect("sync failed");
    let head = git::head_commit(&dest).expect("failed to read HEAD");
    assert_eq!(head, first.to_string());
}

#[test]
fn sync_checks_out_remote_branches() {
    let temp = tempdir().expect("failed to create temp dir");
    let source = temp.path().join("source");
    let dest = temp.path().join("clone");

    let repo = git2::Repository::init(&source).expect("failed to init source repo");
    let first = commit_file(&repo, "a.txt", "one", "first");
    let first_commit = repo.find_commit(first).expect("failed to find commit");
    repo.branch("demo", &first_commit, false)
        .expect("failed to create branch");
    let _second = commit_file(&repo, "b.txt", "two", "second");

    let spec = RepoSpec {
        url: source.to_str().unwrap().to_string(),
        branch: Some("demo".to_string()),
        commit: None,
    };

    // 'demo' only exists as a remote-tracking branch in the fresh
    // clone; sync must still resolve it.
    git::sync_repo(&spec, &dest).expect("sync failed");
    let head = git::head_commit(&dest).expect("failed to read HEAD");
    assert_eq!(head, first.to_string());
}

#[test]
fn sync_reports_unresolvable_refs() {
    let temp = tempdir().expect("failed to create temp dir");
    let source = temp.path().join("source");
    let dest = temp.path().join("clone");

    let repo = git2::Repository::init(&source).expect("failed to init source repo");
    commit_file(&repo, "a.txt", "one", "first");

    let spec = RepoSpec {
        url: source.to_str().unwrap().to_string(),
        branch: Some("does-not-exist".to_string()),
        commit: None,
    };

    let err = git::sync_repo(&spec, &dest).unwrap_err();
    assert!(err.to_string().contains("does-not-exist"));
}
