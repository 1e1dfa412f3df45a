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

//! Precondition checks run before a split starts.
//!
//! None of these fail: a path that is missing or cannot be inspected is
//! simply not valid.

use std::{fs, path::Path};

/// Predicates over the static parameters of a split request.
pub trait Validate: Send + Sync {
    /// The source must be an existing regular file.
    fn valid_source(&self, path: &Path) -> bool;

    /// The destination must be an existing directory.
    fn valid_destination(&self, path: &Path) -> bool;

    /// The chunk size must be strictly positive.
    fn valid_chunk_size(&self, size: i64) -> bool { valid_chunk_size(size) }
}

/// [`Validate`] backed by filesystem metadata. Symlinks are followed, so a
/// dangling link is neither a valid source nor a valid destination.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsValidator;

impl Validate for FsValidator {
    fn valid_source(&self, path: &Path) -> bool { valid_source(path) }

    fn valid_destination(&self, path: &Path) -> bool { valid_destination(path) }
}

#[must_use]
pub fn valid_source(path: &Path) -> bool { fs::metadata(path).is_ok_and(|m| m.is_file()) }

#[must_use]
pub fn valid_destination(path: &Path) -> bool { fs::metadata(path).is_ok_and(|m| m.is_dir()) }

#[must_use]
pub const fn valid_chunk_size(size: i64) -> bool { size > 0 }
