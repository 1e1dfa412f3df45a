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

//! Chunk file names: `{timestamp}_split_{index}`.
//!
//! The timestamp is captured once per split so that every chunk of one
//! operation shares a prefix, and it is fixed width so that names sort in
//! capture order.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

/// `YYYYMMDD'T'HHMMSS` followed by nine sub-second digits.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%9f";

/// Infix between the timestamp and the chunk index.
pub const SPLIT_INFIX: &str = "_split_";

/// Index of the first chunk of every split.
pub const FIRST_CHUNK_INDEX: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkNamer {
    stamp: String,
}

impl ChunkNamer {
    /// Capture the current local time.
    #[must_use]
    pub fn now() -> Self { Self::at(Local::now().naive_local()) }

    #[must_use]
    pub fn at(time: NaiveDateTime) -> Self {
        Self {
            stamp: time.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    #[must_use]
    pub fn stamp(&self) -> &str { &self.stamp }

    /// File name of the chunk with the given index.
    #[must_use]
    pub fn file_name(&self, index: u64) -> String { format!("{}{SPLIT_INFIX}{index}", self.stamp) }

    /// Full path of the chunk with the given index under `dir`.
    pub fn chunk_path<P: AsRef<Path>>(&self, dir: P, index: u64) -> PathBuf {
        dir.as_ref().join(self.file_name(index))
    }
}

/// Parses a chunk file name back into its timestamp and index.
///
/// Returns `None` for names that were not produced by [`ChunkNamer`].
#[must_use]
pub fn parse_chunk_name(name: &str) -> Option<(&str, u64)> {
    let (stamp, index) = name.rsplit_once(SPLIT_INFIX)?;
    if NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).is_err() {
        return None;
    }
    Some((stamp, index.parse().ok()?))
}

/// Lists the chunk files in `dir` produced by the split with the given
/// timestamp, ordered by chunk index.
pub fn list_chunks<P: AsRef<Path>>(dir: P, stamp: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut chunks = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let index = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(parse_chunk_name)
            .filter(|(s, _)| *s == stamp)
            .map(|(_, index)| index);
        if let Some(index) = index {
            chunks.push((index, path));
        }
    }
    chunks.sort_unstable_by_key(|(index, _)| *index);
    Ok(chunks.into_iter().map(|(_, path)| path).collect())
}
