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
    fs::{File, OpenOptions},
    io::{self, ErrorKind, Read, Write},
    num::NonZeroU64,
    path::Path,
};

use bon::Builder;
use smart_default::SmartDefault;
use snafu::{ResultExt, ensure};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    error::{BufferSizeTooLargeSnafu, InvalidBufferSizeSnafu, IoOp, IoSnafu, Result},
    naming::{ChunkNamer, FIRST_CHUNK_INDEX},
};

/// Transfer buffer ceiling used when none is configured.
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 4096;

/// Largest accepted transfer buffer. The buffer is allocated up front for
/// every split, so the ceiling bounds per-split memory.
pub const MAX_BUFFER_CEILING: usize = 64 * 1024 * 1024;

/// Construction-time settings of a [`Splitter`].
#[derive(Debug, Clone, SmartDefault, Builder)]
pub struct SplitterConfig {
    /// Upper bound of the transfer buffer; must be in
    /// `1..=MAX_BUFFER_CEILING`
    #[default(DEFAULT_MAX_BUFFER_SIZE)]
    #[builder(default = DEFAULT_MAX_BUFFER_SIZE)]
    pub max_buffer_size: usize,
    /// Call `sync_data` after every chunk append
    #[builder(default)]
    pub sync_writes:     bool,
}

/// How a split that raised no error ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SplitStatus {
    /// The source was read to its end.
    Completed,
    /// The cancellation token was observed before the source was exhausted.
    /// Chunks written so far stay on disk.
    Cancelled,
}

/// Copies a source into numbered chunk files, one bounded read at a time.
///
/// A `Splitter` holds configuration only. Every call to [`Splitter::split`]
/// allocates its own buffer and counters, so one instance can serve
/// concurrent splits into different directories.
#[derive(Debug, Clone)]
pub struct Splitter {
    config: SplitterConfig,
}

/// Mutable state of one split, dropped when the split returns.
struct SplitState {
    buffer:         Vec<u8>,
    bytes_in_chunk: u64,
    chunk_index:    u64,
    total_bytes:    u64,
}

impl SplitState {
    fn new(buffer_len: usize) -> Self {
        Self {
            buffer:         vec![0; buffer_len],
            bytes_in_chunk: 0,
            chunk_index:    FIRST_CHUNK_INDEX,
            total_bytes:    0,
        }
    }

    /// Records `n` bytes appended to the current chunk. The chunk closes only
    /// when its byte count lands exactly on a multiple of `chunk_size`, so a
    /// chunk may end up larger than `chunk_size`.
    fn advance(&mut self, n: u64, chunk_size: NonZeroU64) -> Option<u64> {
        self.bytes_in_chunk += n;
        self.total_bytes += n;
        if self.bytes_in_chunk % chunk_size == 0 {
            let closed = self.bytes_in_chunk;
            self.chunk_index += 1;
            self.bytes_in_chunk = 0;
            Some(closed)
        } else {
            None
        }
    }

    const fn chunks_written(&self) -> u64 {
        if self.bytes_in_chunk > 0 {
            self.chunk_index
        } else {
            self.chunk_index - FIRST_CHUNK_INDEX
        }
    }
}

impl Splitter {
    pub fn new(config: SplitterConfig) -> Result<Self> {
        ensure!(
            config.max_buffer_size > 0,
            InvalidBufferSizeSnafu {
                size: config.max_buffer_size,
            }
        );
        ensure!(
            config.max_buffer_size <= MAX_BUFFER_CEILING,
            BufferSizeTooLargeSnafu {
                size: config.max_buffer_size,
                max:  MAX_BUFFER_CEILING,
            }
        );
        Ok(Self { config })
    }

    pub fn with_max_buffer_size(max_buffer_size: usize) -> Result<Self> {
        Self::new(SplitterConfig::builder().max_buffer_size(max_buffer_size).build())
    }

    /// Length of the transfer buffer used for `chunk_size`:
    /// `min(chunk_size, max_buffer_size)`.
    #[must_use]
    pub fn buffer_len(&self, chunk_size: NonZeroU64) -> usize {
        usize::try_from(chunk_size.get())
            .map_or(self.config.max_buffer_size, |size| {
                size.min(self.config.max_buffer_size)
            })
    }

    /// Splits the file at `source` into chunk files under `destination`.
    ///
    /// The cancellation token is checked before every read. Any I/O failure
    /// aborts the split and leaves already written chunks in place.
    pub fn split(
        &self,
        source: &Path,
        destination: &Path,
        chunk_size: NonZeroU64,
        cancel: &CancellationToken,
    ) -> Result<SplitStatus> {
        let file = File::open(source).context(IoSnafu {
            op:   IoOp::Open,
            path: source,
        })?;
        self.split_reader(file, source, destination, chunk_size, cancel)
    }

    /// Like [`Splitter::split`] but reads from an already opened stream.
    /// Read failures are reported against `label`.
    pub fn split_reader<R: Read>(
        &self,
        mut reader: R,
        label: &Path,
        destination: &Path,
        chunk_size: NonZeroU64,
        cancel: &CancellationToken,
    ) -> Result<SplitStatus> {
        let namer = ChunkNamer::now();
        let mut state = SplitState::new(self.buffer_len(chunk_size));
        debug!(
            source = %label.display(),
            destination = %destination.display(),
            chunk_size = chunk_size.get(),
            buffer_len = state.buffer.len(),
            stamp = namer.stamp(),
            "starting split"
        );

        let status = loop {
            if cancel.is_cancelled() {
                break SplitStatus::Cancelled;
            }
            let n = fill(&mut reader, &mut state.buffer).context(IoSnafu {
                op:   IoOp::Read,
                path: label,
            })?;
            if n == 0 {
                break SplitStatus::Completed;
            }

            let path = namer.chunk_path(destination, state.chunk_index);
            append(&path, &state.buffer[..n], self.config.sync_writes)?;

            let index = state.chunk_index;
            if let Some(bytes) = state.advance(n as u64, chunk_size) {
                debug!(chunk = index, bytes, "chunk complete");
            }
        };

        info!(
            source = %label.display(),
            %status,
            chunks = state.chunks_written(),
            bytes = state.total_bytes,
            "split finished"
        );
        Ok(status)
    }
}

/// Reads until `buf` is full or the stream ends, so that every read but the
/// last yields exactly `buf.len()` bytes.
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Appends `bytes` to the chunk at `path`, creating it on first use. The file
/// is closed again before returning.
fn append(path: &Path, bytes: &[u8], sync: bool) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context(IoSnafu { op: IoOp::Open, path })?;
    file.write_all(bytes)
        .context(IoSnafu { op: IoOp::Write, path })?;
    if sync {
        file.sync_data().context(IoSnafu { op: IoOp::Sync, path })?;
    }
    Ok(())
}
