//! Helpers for building throwaway upstream repositories.

#![allow(dead_code)]

use git2::{Commit, Oid, Repository, Signature};
use std::fs;
use std::path::Path;

pub fn signature() -> Signature<'static> {
    Signature::now("Fusel Test", "test@example.com").expect("Failed to create signature")
}

/// Write `name` with `content` and commit it on the current branch.
pub fn commit_file(repo: &Repository, name: &str, content: &str, message: &str) -> Oid {
    let workdir = repo.workdir().expect("upstream must have a workdir");
    fs::write(workdir.join(name), content).expect("Failed to write file");

    let mut index = repo.index().expect("Failed to open index");
    index.add_path(Path::new(name)).expect("Failed to stage file");
    index.write().expect("Failed to write index");
    let tree_id = index.write_tree().expect("Failed to write tree");
    let tree = repo.find_tree(tree_id).expect("Failed to find tree");

    let sig = signature();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .expect("Failed to commit")
}

pub struct Upstream {
    pub repo: Repository,
    /// Tagged `v1.0` (lightweight), branch `release`.
    pub first: Oid,
    /// Tagged `v2.0` (annotated), tip of the default branch.
    pub second: Oid,
}

/// Two commits touching `lib.txt`: "one" then "two".
pub fn create_upstream(path: &Path) -> Upstream {
    let repo = Repository::init(path).expect("Failed to init upstream");
    let first = commit_file(&repo, "lib.txt", "one\n", "first");
    let second = commit_file(&repo, "lib.txt", "two\n", "second");

    {
        let first_obj = repo.find_object(first, None).expect("first commit");
        repo.tag_lightweight("v1.0", &first_obj, false)
            .expect("Failed to tag v1.0");
        let first_commit = repo.find_commit(first).expect("first commit");
        repo.branch("release", &first_commit, false)
            .expect("Failed to create branch");

        let second_obj = repo.find_object(second, None).expect("second commit");
        repo.tag("v2.0", &second_obj, &signature(), "version 2", false)
            .expect("Failed to tag v2.0");
    }

    Upstream {
        repo,
        first,
        second,
    }
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("Failed to read checked out file")
}
