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

use std::path::PathBuf;

use bon::Builder;
use tokio_util::sync::CancellationToken;

/// One split operation as submitted by a caller.
///
/// The chunk size is signed here so that a negative input reaches validation
/// instead of being rejected by a type conversion upstream.
#[derive(Debug, Clone, Builder)]
pub struct SplitRequest {
    /// File to split
    #[builder(into)]
    pub source:       PathBuf,
    /// Existing directory that receives the chunk files
    #[builder(into)]
    pub destination:  PathBuf,
    /// Target chunk size in bytes
    pub chunk_size:   i64,
    /// Polled once per read; cancelling it stops the split cleanly
    #[builder(default)]
    pub cancellation: CancellationToken,
}

impl SplitRequest {
    /// Request that the split stop before its next read.
    pub fn cancel(&self) { self.cancellation.cancel(); }

    #[must_use]
    pub fn is_cancelled(&self) -> bool { self.cancellation.is_cancelled() }
}
