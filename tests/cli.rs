//! Integration tests driving the invfile binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const CORPUS: &str = "\
$DOC A
$TITLE
Pets at home
$BODY
cat dog cat
$DOC B
$BODY
dog dog bird
$DOC C
$BODY
fish
";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    /// Corpus on disk, indexed through the CLI
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(dir.path().join("corpus.txt"), CORPUS).expect("Failed to write corpus");
        let fixture = Self { dir };

        let (stdout, stderr, ok) = fixture.run(&[
            "index",
            "--quiet",
            fixture.corpus().to_str().unwrap(),
            "-o",
            fixture.index_dir().to_str().unwrap(),
        ]);
        assert!(ok, "invfile index failed: {}", stderr);
        assert!(stdout.contains("Documents: 3"), "stdout: {}", stdout);
        fixture
    }

    fn corpus(&self) -> PathBuf {
        self.dir.path().join("corpus.txt")
    }

    fn index_dir(&self) -> PathBuf {
        self.dir.path().join("idx")
    }

    /// Run the binary with a config path that never exists, so the user's
    /// own configuration cannot leak into the tests
    fn run(&self, args: &[&str]) -> (String, String, bool) {
        run_in(self.dir.path(), args)
    }
}

fn run_in(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_invfile"))
        .arg("--config")
        .arg(dir.join("no-config.json"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to run invfile");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

#[test]
fn test_index_writes_artifacts() {
    let fixture = Fixture::new();
    for name in ["dictionary.txt", "postings.txt", "docids.txt"] {
        assert!(fixture.index_dir().join(name).exists(), "missing {}", name);
    }
    let documents = fs::read_to_string(fixture.index_dir().join("docids.txt")).unwrap();
    assert_eq!(documents, "3\nA 0\nB 5\nC 8\n");
}

#[test]
fn test_search_ranks_and_shows_titles() {
    let fixture = Fixture::new();
    let index = fixture.index_dir();
    let corpus = fixture.corpus();
    let (stdout, stderr, ok) = fixture.run(&[
        "search",
        "--no-color",
        "-i",
        index.to_str().unwrap(),
        "-c",
        corpus.to_str().unwrap(),
        "dog",
        "bird",
    ]);
    assert!(ok, "stderr: {}", stderr);

    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines[0], "Results 1-2 of 2 (page 1/1)");
    assert!(lines[1].starts_with("   1. "));
    assert!(lines[1].ends_with("  B  <no title>"), "line: {}", lines[1]);
    assert!(lines[2].ends_with("  A  Pets at home"), "line: {}", lines[2]);
    assert_eq!(lines.len(), 3);
}

#[test]
fn test_search_pages() {
    let fixture = Fixture::new();
    let index = fixture.index_dir();
    let (stdout, _, ok) = fixture.run(&[
        "search",
        "--no-color",
        "-i",
        index.to_str().unwrap(),
        "-n",
        "1",
        "-p",
        "2",
        "dog",
        "bird",
    ]);
    assert!(ok);
    assert!(stdout.starts_with("Results 2-2 of 2 (page 2/2)\n"));
    assert!(stdout.contains("  A\n"));
}

#[test]
fn test_search_without_matches() {
    let fixture = Fixture::new();
    let index = fixture.index_dir();
    let (stdout, _, ok) = fixture.run(&["search", "-i", index.to_str().unwrap(), "unicorn"]);
    assert!(ok);
    assert_eq!(stdout, "No matching documents.\n");
}

#[test]
fn test_search_without_index_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nowhere");
    let (_, stderr, ok) = run_in(dir.path(), &["search", "-i", missing.to_str().unwrap(), "cat"]);
    assert!(!ok);
    assert!(stderr.contains("Failed to load index"), "stderr: {}", stderr);
}

#[test]
fn test_stats() {
    let fixture = Fixture::new();
    let index = fixture.index_dir();
    let (stdout, _, ok) = fixture.run(&["stats", "-i", index.to_str().unwrap(), "--top", "1"]);
    assert!(ok);
    assert!(stdout.contains("Documents:        3"));
    assert!(stdout.contains("Terms:            7"));
    assert!(stdout.contains("dog"));
}
