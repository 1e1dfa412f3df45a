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

use snafu::Snafu;

/// The step of a split that an I/O failure happened in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum IoOp {
    Open,
    Read,
    Write,
    Sync,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SplitError {
    /// The splitter was configured with a transfer buffer it cannot use.
    #[snafu(display("max buffer size must be positive, got {size}"))]
    InvalidBufferSize {
        size: usize,
        #[snafu(implicit)]
        loc:  snafu::Location,
    },

    /// The transfer buffer would be larger than the splitter allows.
    #[snafu(display("max buffer size {size} exceeds the limit of {max} bytes"))]
    BufferSizeTooLarge {
        size: usize,
        max:  usize,
        #[snafu(implicit)]
        loc:  snafu::Location,
    },

    /// Any failure touching the source or a chunk file.
    #[snafu(display("failed to {op} {}", path.display()))]
    Io {
        op:     IoOp,
        path:   PathBuf,
        #[snafu(source)]
        source: std::io::Error,
        #[snafu(implicit)]
        loc:    snafu::Location,
    },
}

impl SplitError {
    /// The operating system error behind an I/O failure, if any.
    #[must_use]
    pub fn io_cause(&self) -> Option<&std::io::Error> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::InvalidBufferSize { .. } | Self::BufferSizeTooLarge { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SplitError>;
