//! Grammar conformance tests — every YAML fixture under `fixtures/`.
//!
//! These fixtures use the same wire shapes every client of the Vector
//! backend must accept or reject identically. Valid fixtures additionally
//! assert the round-trip property (`parse` then `to_json` reproduces the
//! input).
//!
//! Run with: cargo test -p geovec-test --test conformance

use geovec_test::ExprFixture;
use std::fs;
use std::path::{Path, PathBuf};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

fn run_fixture_file(path: &Path) {
    let yaml = fs::read_to_string(path).expect("read fixture file");
    let fixtures = ExprFixture::from_yaml_multi(&yaml)
        .unwrap_or_else(|e| panic!("failed to parse {}: {e}", path.display()));

    assert!(
        !fixtures.is_empty(),
        "no fixtures in {}",
        path.display()
    );

    let mut failures = Vec::new();
    for fixture in &fixtures {
        println!("  Running: {}", fixture.name);
        if let Err(mismatch) = fixture.run() {
            failures.push(format!("{}: {mismatch}", fixture.name));
        }
    }

    assert!(
        failures.is_empty(),
        "{} fixture(s) failed in {}:\n  {}",
        failures.len(),
        path.display(),
        failures.join("\n  ")
    );
}

#[test]
fn all_fixture_files() {
    let dir = fixtures_dir();
    assert!(
        dir.exists(),
        "fixtures directory does not exist: {}",
        dir.display()
    );

    let mut ran = 0;
    for entry in fs::read_dir(&dir).expect("read fixtures dir") {
        let path = entry.expect("dir entry").path();
        if !path
            .extension()
            .is_some_and(|e| e == "yaml" || e == "yml")
        {
            continue;
        }
        println!("Loading fixture file: {}", path.display());
        run_fixture_file(&path);
        ran += 1;
    }

    assert!(ran > 0, "no fixture files found in {}", dir.display());
}
