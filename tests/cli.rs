use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const BOOK: &str = "[row type],[en],[es-x-ai-piglatin],[fr]\n\
                    Row type,English,Spanish,French\n\
                    [page content],Hello world,,Bonjour\n\
                    [topic],Animal Stories,,\n";

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("bloom-translate-spreadsheet").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_book(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("book.csv");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn scan_run_fills_incomplete_columns() {
    let dir = TempDir::new().unwrap();
    let input = write_book(dir.path(), BOOK);
    let output = dir.path().join("out.csv");

    cmd()
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("Found ai columns:"))
        .stderr(predicate::str::contains("[es-x-ai-piglatin] has empty cells"));

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("[row type],[en],[es-x-ai-piglatin],[fr]"));
    assert!(written.contains("[page content],Hello world,elloHay orldway,Bonjour"));
    assert!(written.contains("[topic],Animal Stories,,"));
}

#[test]
fn explicit_target_uses_default_output_name() {
    let dir = TempDir::new().unwrap();
    let input = write_book(dir.path(), BOOK);

    cmd()
        .current_dir(dir.path())
        .arg(&input)
        .args(["--target", "de-x-ai-piglatin"])
        .assert()
        .success();

    let written = std::fs::read_to_string(dir.path().join("book-de-x-ai-piglatin.csv")).unwrap();
    assert!(written.starts_with("[row type],[en],[de-x-ai-piglatin],[es-x-ai-piglatin],[fr]"));
    assert!(written.contains("elloHay orldway"));
}

#[test]
fn complete_sheet_is_nothing_to_do() {
    let dir = TempDir::new().unwrap();
    let input = write_book(
        dir.path(),
        "[en],[es-x-ai-piglatin]\n\
         English,Spanish\n\
         Cat,atCay\n",
    );
    let output = dir.path().join("out.csv");

    cmd()
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("has no missing translations"));

    assert!(!output.exists());
}

#[test]
fn retranslate_rewrites_complete_columns() {
    let dir = TempDir::new().unwrap();
    let input = write_book(
        dir.path(),
        "[en],[es-x-ai-piglatin]\n\
         English,Spanish\n\
         Cat,stale\n",
    );
    let output = dir.path().join("out.csv");

    cmd()
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--retranslate")
        .assert()
        .success()
        .stderr(predicate::str::contains("(will retranslate)"));

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("Cat,atCay"));
}

#[test]
fn missing_input_fails() {
    let dir = TempDir::new().unwrap();

    cmd()
        .arg(dir.path().join("absent.xlsx"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("absent.xlsx"));
}

#[test]
fn missing_source_column_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_book(dir.path(), BOOK);

    cmd()
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("out.csv"))
        .args(["--source", "tpi"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[tpi]"));
}

#[test]
fn missing_backend_credentials_fail() {
    let dir = TempDir::new().unwrap();
    let input = write_book(dir.path(), BOOK);

    cmd()
        .env_remove("BLOOM_ACTS2_KEY")
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("out.csv"))
        .args(["--target", "es-x-ai-acts2"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("BLOOM_ACTS2_KEY"));
}

#[test]
fn unwritable_output_fails_before_translating() {
    let dir = TempDir::new().unwrap();
    let input = write_book(dir.path(), BOOK);

    cmd()
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("no-such-dir").join("out.csv"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Found ai columns").not());
}

#[test]
fn scan_run_missing_google_credentials_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let input = write_book(
        dir.path(),
        "[row type],[en],[es-x-ai-piglatin],[fr-x-ai-google]\n\
         Row type,English,Spanish,French\n\
         [page content],Cat,,\n",
    );
    let output = dir.path().join("out.csv");

    cmd()
        .env_remove("BLOOM_GOOGLE_TRANSLATION_SERVICE_ACCOUNT_EMAIL")
        .env_remove("BLOOM_GOOGLE_TRANSLATION_SERVICE_PRIVATE_KEY")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "BLOOM_GOOGLE_TRANSLATION_SERVICE_ACCOUNT_EMAIL",
        ));

    assert!(!output.exists());
}
