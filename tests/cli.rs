//! End-to-end tests for the `fusel` binary.

mod common;

use common::{create_upstream, read};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn fusel(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fusel"))
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to execute fusel")
}

/// Run with HOME and XDG_CONFIG_HOME inside `dir` so no user manifest leaks in.
fn fusel_isolated(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fusel"))
        .args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .output()
        .expect("Failed to execute fusel")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn write_manifest(dir: &Path, upstream: &Path) -> String {
    let manifest = dir.join("fusel.toml");
    fs::write(
        &manifest,
        format!(
            r#"[settings]
dest = "deps"
prompt = false

[projects.lib]
href = "{}"
tag = "v1.0"
"#,
            upstream.display()
        ),
    )
    .expect("Failed to write manifest");
    manifest.to_string_lossy().to_string()
}

#[test]
fn test_named_request_from_manifest() {
    let tmp = tempfile::tempdir().unwrap();
    let upstream = tmp.path().join("upstream");
    create_upstream(&upstream);
    let manifest = write_manifest(tmp.path(), &upstream);

    let output = fusel(tmp.path(), &["--quiet", "--manifest", &manifest, "lib"]);

    assert!(output.status.success(), "stdout: {}", stdout(&output));
    assert_eq!(read(&tmp.path().join("deps").join("lib").join("lib.txt")), "one\n");
}

#[test]
fn test_request_ref_overrides_manifest_tag() {
    let tmp = tempfile::tempdir().unwrap();
    let upstream = tmp.path().join("upstream");
    create_upstream(&upstream);
    let manifest = write_manifest(tmp.path(), &upstream);

    let output = fusel(tmp.path(), &["-q", "-m", &manifest, "lib@v2.0"]);

    assert!(output.status.success(), "stdout: {}", stdout(&output));
    assert_eq!(read(&tmp.path().join("deps").join("lib").join("lib.txt")), "two\n");
}

#[test]
fn test_inline_url_request() {
    let tmp = tempfile::tempdir().unwrap();
    let upstream = tmp.path().join("upstream");
    create_upstream(&upstream);
    let manifest = write_manifest(tmp.path(), &upstream);
    let request = format!("inline=file://{}#v2.0", upstream.display());

    let output = fusel(
        tmp.path(),
        &["-q", "--no-prompt", "-m", &manifest, "--dest", "vendor", &request],
    );

    assert!(output.status.success(), "stdout: {}", stdout(&output));
    assert_eq!(read(&tmp.path().join("vendor").join("inline").join("lib.txt")), "two\n");
}

#[test]
fn test_unsatisfiable_request_exits_zero() {
    let tmp = tempfile::tempdir().unwrap();
    let upstream = tmp.path().join("upstream");
    create_upstream(&upstream);
    let manifest = write_manifest(tmp.path(), &upstream);

    let output = fusel(tmp.path(), &["-q", "-m", &manifest, "lib", "missing"]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("The request is not satisfiable!"), "stdout: {}", out);
    assert!(out.contains("missing"));
    assert!(!tmp.path().join("deps").join("lib").exists());
}

#[test]
fn test_different_origin_reports_error() {
    let tmp = tempfile::tempdir().unwrap();
    let upstream = tmp.path().join("upstream");
    let fork = tmp.path().join("fork");
    create_upstream(&upstream);
    create_upstream(&fork);
    let manifest = write_manifest(tmp.path(), &upstream);

    let first = fusel(tmp.path(), &["-q", "-m", &manifest, "lib"]);
    assert!(first.status.success(), "stdout: {}", stdout(&first));

    let request = format!("lib=file://{}#v1.0", fork.display());
    let output = fusel(tmp.path(), &["-q", "-m", &manifest, "-d", "deps", &request]);

    assert!(!output.status.success());
    #[cfg(unix)]
    assert_eq!(output.status.code(), Some(255));
    assert!(stdout(&output).contains("Error: different origin"));
}

#[test]
fn test_completions() {
    let tmp = tempfile::tempdir().unwrap();
    let output = fusel(tmp.path(), &["--completions", "bash"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("fusel"));
}

#[test]
fn test_manifest_in_working_directory_is_used_by_default() {
    let tmp = tempfile::tempdir().unwrap();
    let upstream = tmp.path().join("upstream");
    create_upstream(&upstream);
    write_manifest(tmp.path(), &upstream);

    let output = fusel_isolated(tmp.path(), &["-q", "lib"]);

    assert!(output.status.success(), "stdout: {}", stdout(&output));
    assert_eq!(read(&tmp.path().join("deps").join("lib").join("lib.txt")), "one\n");
}

#[test]
fn test_no_manifest_means_no_named_projects() {
    let tmp = tempfile::tempdir().unwrap();
    let upstream = tmp.path().join("upstream");
    create_upstream(&upstream);

    let named = fusel_isolated(tmp.path(), &["-q", "lib"]);
    assert!(named.status.success());
    assert!(stdout(&named).contains("The request is not satisfiable!"));

    let request = format!("lib=file://{}#v1.0", upstream.display());
    let inline = fusel_isolated(tmp.path(), &["-q", "--no-prompt", &request]);
    assert!(inline.status.success(), "stdout: {}", stdout(&inline));
    assert_eq!(read(&tmp.path().join("lib").join("lib.txt")), "one\n");
}

#[test]
fn test_empty_request_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();

    let output = fusel_isolated(tmp.path(), &["-q", ""]);

    assert!(!output.status.success());
    #[cfg(unix)]
    assert_eq!(output.status.code(), Some(255));
    assert!(stdout(&output).contains("Error: Bad request"));
}
