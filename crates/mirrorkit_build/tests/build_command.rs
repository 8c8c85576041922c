use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const C_COMPLETE: &str = "Build complete! Files copied to public directory.";

fn write_text(path: &Path, txt: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, txt).expect("write text");
}

fn build_command(path_dir_project: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mirrorkit-build").expect("binary built");
    cmd.current_dir(path_dir_project).env_remove("RUST_LOG");
    cmd
}

fn list_names(path_dir: &Path) -> Vec<String> {
    let mut l_names: Vec<String> = fs::read_dir(path_dir)
        .expect("read dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().to_string())
        .collect();
    l_names.sort();
    l_names
}

#[test]
fn build_copies_project_and_skips_denied_names() {
    let tmp = TempDir::new().expect("tempdir");
    let project = tmp.path();
    write_text(&project.join("a.txt"), "hi");
    fs::create_dir_all(project.join("public")).expect("mkdir public");
    write_text(&project.join("node_modules/dep/index.js"), "js");
    write_text(&project.join(".git/HEAD"), "ref: refs/heads/main");
    write_text(&project.join("mirrorkit-build"), "tool");

    build_command(project)
        .assert()
        .success()
        .stdout(predicate::str::contains(C_COMPLETE));

    assert_eq!(list_names(&project.join("public")), vec!["a.txt"]);
    assert_eq!(
        fs::read_to_string(project.join("public/a.txt")).expect("read"),
        "hi"
    );
}

#[test]
fn build_twice_reuses_existing_output() {
    let tmp = TempDir::new().expect("tempdir");
    let project = tmp.path();
    write_text(&project.join("docs/readme.md"), "# docs");

    build_command(project).assert().success();
    let bytes_first = fs::read(project.join("public/docs/readme.md")).expect("first");

    build_command(project)
        .assert()
        .success()
        .stderr(predicate::str::contains("Error copying").not());
    let bytes_second = fs::read(project.join("public/docs/readme.md")).expect("second");

    assert_eq!(bytes_first, bytes_second);
}

#[test]
fn build_reports_failed_directory_and_still_completes() {
    let tmp = TempDir::new().expect("tempdir");
    let project = tmp.path();
    write_text(&project.join("brokenDir/page.html"), "<p></p>");
    write_text(&project.join("ok.txt"), "x");
    // A file where the directory copy must go makes that entry fail.
    write_text(&project.join("public/brokenDir"), "blocker");

    build_command(project)
        .assert()
        .success()
        .stdout(predicate::str::contains(C_COMPLETE))
        .stderr(predicate::str::contains("Error copying brokenDir"));

    assert_eq!(
        fs::read_to_string(project.join("public/ok.txt")).expect("read"),
        "x"
    );
}

#[test]
fn build_aborts_when_a_top_level_file_cannot_be_copied() {
    let tmp = TempDir::new().expect("tempdir");
    let project = tmp.path();
    write_text(&project.join("index.html"), "<html></html>");
    fs::create_dir_all(project.join("public/index.html")).expect("blocking dir");

    build_command(project)
        .assert()
        .failure()
        .stdout(predicate::str::contains(C_COMPLETE).not())
        .stderr(predicate::str::contains("Build failed"));
}

#[test]
fn build_rejects_operands() {
    let tmp = TempDir::new().expect("tempdir");

    build_command(tmp.path()).arg("elsewhere").assert().failure();
    assert!(!tmp.path().join("public").exists());
}
