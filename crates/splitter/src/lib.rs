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

//! Splits one source file into a sequence of chunk files.
//!
//! [`validation`] holds the side-effect-free precondition checks and
//! [`Splitter`] performs the streaming copy. Callers are expected to validate
//! a [`SplitRequest`] before handing its parts to the splitter.

mod engine;
mod error;
pub mod naming;
mod request;
pub mod validation;

pub use engine::{DEFAULT_MAX_BUFFER_SIZE, MAX_BUFFER_CEILING, SplitStatus, Splitter, SplitterConfig};
pub use error::{IoOp, Result, SplitError};
pub use naming::ChunkNamer;
pub use request::SplitRequest;
pub use tokio_util::sync::CancellationToken;
pub use validation::{FsValidator, Validate};
