// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{
    path::Path,
    process::{Command, Output},
};

use tempfile::TempDir;
use test_case::test_case;

fn fsplit(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fsplit"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run fsplit")
}

fn path_str(path: &Path) -> &str { path.to_str().unwrap() }

struct Fixture {
    dir:    TempDir,
    source: std::path::PathBuf,
    out:    std::path::PathBuf,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("source.bin");
    std::fs::write(&source, (0u8..10).collect::<Vec<_>>()).unwrap();
    let out = dir.path().join("out");
    std::fs::create_dir(&out).unwrap();
    Fixture { dir, source, out }
}

#[test]
fn test_split_succeeds() {
    let f = fixture();
    let output = fsplit(&[
        "split",
        path_str(&f.source),
        path_str(&f.out),
        "--chunk-size",
        "2",
        "--max-buffer-size",
        "10",
    ]);

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("split successfully"));
    assert_eq!(std::fs::read_dir(&f.out).unwrap().count(), 5);
}

#[test_case("-1", 3 ; "negative chunk size")]
#[test_case("0", 3 ; "zero chunk size")]
fn test_invalid_chunk_size(chunk: &str, code: i32) {
    let f = fixture();
    let output = fsplit(&[
        "split",
        path_str(&f.source),
        path_str(&f.out),
        "--chunk-size",
        chunk,
    ]);

    assert_eq!(output.status.code(), Some(code));
    assert!(
        String::from_utf8_lossy(&output.stderr).contains(&format!("Invalid chunk size: {chunk}"))
    );
    assert_eq!(std::fs::read_dir(&f.out).unwrap().count(), 0);
}

#[test]
fn test_source_checked_before_destination() {
    let f = fixture();
    let missing = f.dir.path().join("missing.bin");
    let output = fsplit(&[
        "split",
        path_str(&missing),
        path_str(&f.dir.path().join("nowhere")),
        "--chunk-size",
        "-1",
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid source file"));
}

#[test]
fn test_destination_must_be_directory() {
    let f = fixture();
    let output = fsplit(&[
        "split",
        path_str(&f.source),
        path_str(&f.source),
        "--chunk-size",
        "4",
    ]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid destination dir"));
}

#[test]
fn test_zero_buffer_size_is_rejected() {
    let f = fixture();
    let output = fsplit(&[
        "split",
        path_str(&f.source),
        path_str(&f.out),
        "--chunk-size",
        "4",
        "--max-buffer-size",
        "0",
    ]);

    assert_eq!(output.status.code(), Some(78));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid splitter configuration"));
    assert_eq!(std::fs::read_dir(&f.out).unwrap().count(), 0);
}

#[test]
fn test_unparsable_arguments_use_usage_code() {
    let f = fixture();
    let output = fsplit(&[
        "split",
        path_str(&f.source),
        path_str(&f.out),
        "--chunk-size",
        "ten",
    ]);

    assert_eq!(output.status.code(), Some(64));
    assert_eq!(std::fs::read_dir(&f.out).unwrap().count(), 0);
}

#[test]
fn test_oversized_buffer_is_rejected() {
    let f = fixture();
    let output = fsplit(&[
        "split",
        path_str(&f.source),
        path_str(&f.out),
        "--chunk-size",
        "1TiB",
        "--max-buffer-size",
        "1TiB",
    ]);

    assert_eq!(output.status.code(), Some(78));
    assert_eq!(std::fs::read_dir(&f.out).unwrap().count(), 0);
}
