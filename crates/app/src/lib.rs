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

//! Orchestration around the splitter: validates a request, runs the split and
//! reduces everything to one [`SplitOutcome`].

mod outcome;

use std::{num::NonZeroU64, sync::Arc};

use bon::Builder;
use fsplit_base::readable_size::ReadableSize;
use fsplit_common_telemetry::logging::{LoggingOptions, WorkerGuard, init_global_logging};
pub use fsplit_splitter::{CancellationToken, FsValidator, SplitRequest, Validate};
use fsplit_splitter::{SplitError, SplitStatus, Splitter, SplitterConfig};
pub use outcome::{CONFIG_EXIT_CODE, INTERNAL_EXIT_CODE, SplitOutcome, USAGE_EXIT_CODE};
use smart_default::SmartDefault;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Configuration for the application
#[derive(Debug, Clone, SmartDefault, Builder)]
pub struct AppConfig {
    /// Upper bound of the transfer buffer
    #[default(ReadableSize::kb(4))]
    #[builder(default = ReadableSize::kb(4))]
    pub max_buffer_size: ReadableSize,
    /// Sync every chunk append to disk
    #[builder(default)]
    pub sync_writes:     bool,
    /// Logging configuration
    #[builder(default)]
    pub logging:         LoggingOptions,
}

impl AppConfig {
    /// Build the application with the filesystem validator.
    ///
    /// Fails if the transfer buffer size is zero or above the splitter's
    /// ceiling.
    pub fn open(self) -> Result<App, SplitError> { self.open_with(FsValidator) }

    pub fn open_with<V: Validate>(self, validator: V) -> Result<App<V>, SplitError> {
        let max_buffer_size =
            usize::try_from(self.max_buffer_size.as_bytes()).unwrap_or(usize::MAX);
        let splitter = Splitter::new(
            SplitterConfig::builder()
                .max_buffer_size(max_buffer_size)
                .sync_writes(self.sync_writes)
                .build(),
        )?;
        Ok(App {
            config: self,
            splitter,
            validator,
        })
    }
}

/// A configured splitter plus the checks that guard it.
pub struct App<V = FsValidator> {
    config:    AppConfig,
    splitter:  Splitter,
    validator: V,
}

impl<V: Validate> App<V> {
    /// Install the global subscriber described by the logging options. Keep
    /// the returned guards alive for as long as logs should be written.
    #[must_use]
    pub fn init_logging(&self) -> Vec<WorkerGuard> {
        init_global_logging("fsplit", &self.config.logging)
    }

    /// Runs one split to completion on the calling thread.
    pub fn split(&self, request: &SplitRequest) -> SplitOutcome {
        let SplitRequest {
            source,
            destination,
            chunk_size,
            cancellation,
        } = request;

        if !self.validator.valid_source(source) {
            error!("[abort] source file not valid: {}", source.display());
            return SplitOutcome::InvalidSource;
        }
        if !self.validator.valid_destination(destination) {
            error!(
                "[abort] destination directory not valid: {}",
                destination.display()
            );
            return SplitOutcome::InvalidDestination;
        }
        let chunk_size = if self.validator.valid_chunk_size(*chunk_size) {
            u64::try_from(*chunk_size).ok().and_then(NonZeroU64::new)
        } else {
            None
        };
        let Some(chunk_size) = chunk_size else {
            error!("[abort] chunk size (bytes) not valid: {}", request.chunk_size);
            return SplitOutcome::InvalidChunkSize;
        };

        match self
            .splitter
            .split(source, destination, chunk_size, cancellation)
        {
            Ok(SplitStatus::Completed) => {
                info!(source = %source.display(), "split completed");
                SplitOutcome::Success
            }
            Ok(SplitStatus::Cancelled) => {
                warn!(source = %source.display(), "[stopped] split cancelled");
                SplitOutcome::Stopped
            }
            Err(e) => {
                error!(error = %e, cause = ?e.io_cause(), "[error] file split error");
                SplitOutcome::IoError
            }
        }
    }
}

impl<V: Validate + 'static> App<V> {
    /// Runs the split on tokio's blocking pool. Cancel the request's token to
    /// stop it early.
    pub fn spawn_split(self: Arc<Self>, request: SplitRequest) -> JoinHandle<SplitOutcome> {
        tokio::task::spawn_blocking(move || self.split(&request))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        path::{Path, PathBuf},
        sync::atomic::{AtomicUsize, Ordering},
    };

    use tempfile::TempDir;
    use test_case::test_case;

    use super::*;

    /// Answers every check with a fixed verdict and counts how often it was
    /// asked.
    struct StubValidator {
        source:      bool,
        destination: bool,
        chunk_size:  bool,
        calls:       AtomicUsize,
    }

    impl StubValidator {
        fn new(source: bool, destination: bool, chunk_size: bool) -> Self {
            Self {
                source,
                destination,
                chunk_size,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Validate for StubValidator {
        fn valid_source(&self, _: &Path) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.source
        }

        fn valid_destination(&self, _: &Path) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.destination
        }

        fn valid_chunk_size(&self, _: i64) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.chunk_size
        }
    }

    fn request(source: PathBuf, destination: PathBuf, chunk_size: i64) -> SplitRequest {
        SplitRequest::builder()
            .source(source)
            .destination(destination)
            .chunk_size(chunk_size)
            .build()
    }

    fn stub_app(source: bool, destination: bool, chunk_size: bool) -> App<StubValidator> {
        AppConfig::default()
            .open_with(StubValidator::new(source, destination, chunk_size))
            .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.max_buffer_size, ReadableSize::kb(4));
        assert!(!config.sync_writes);
        assert_eq!(
            AppConfig::builder().build().max_buffer_size,
            config.max_buffer_size
        );
    }

    #[test]
    fn test_zero_buffer_size_fails_open() {
        let result = AppConfig::builder()
            .max_buffer_size(ReadableSize::b(0))
            .build()
            .open();
        assert!(matches!(result, Err(SplitError::InvalidBufferSize { .. })));
    }

    #[test_case(ReadableSize::mb(65))]
    #[test_case(ReadableSize(u64::MAX))]
    fn test_oversized_buffer_fails_open(max_buffer_size: ReadableSize) {
        let result = AppConfig::builder()
            .max_buffer_size(max_buffer_size)
            .build()
            .open();
        assert!(matches!(
            result,
            Err(SplitError::BufferSizeTooLarge { .. })
        ));
    }

    #[test]
    fn test_invalid_source_short_circuits() {
        let app = stub_app(false, false, false);
        let outcome = app.split(&request("/a".into(), "/b".into(), 1));
        assert_eq!(outcome, SplitOutcome::InvalidSource);
        assert_eq!(app.validator.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalid_destination_checked_second() {
        let app = stub_app(true, false, false);
        let outcome = app.split(&request("/a".into(), "/b".into(), 1));
        assert_eq!(outcome, SplitOutcome::InvalidDestination);
        assert_eq!(app.validator.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_invalid_chunk_size_checked_last() {
        let app = stub_app(true, true, false);
        let outcome = app.split(&request("/a".into(), "/b".into(), -100));
        assert_eq!(outcome, SplitOutcome::InvalidChunkSize);
        assert_eq!(app.validator.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_non_positive_chunk_size_rejected_even_if_validator_accepts() {
        let app = stub_app(true, true, true);
        let outcome = app.split(&request("/a".into(), "/b".into(), 0));
        assert_eq!(outcome, SplitOutcome::InvalidChunkSize);
    }

    #[test]
    fn test_engine_failure_maps_to_io_error() {
        // Source passes validation but is gone by the time it is opened.
        let dir = TempDir::new().unwrap();
        let app = stub_app(true, true, true);
        let outcome = app.split(&request(
            dir.path().join("vanished.bin"),
            dir.path().to_path_buf(),
            10,
        ));
        assert_eq!(outcome, SplitOutcome::IoError);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_success_with_filesystem_validator() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.bin");
        std::fs::write(&source, (0u8..10).collect::<Vec<_>>()).unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();

        let app = AppConfig::builder()
            .max_buffer_size(ReadableSize::b(10))
            .build()
            .open()
            .unwrap();
        let outcome = app.split(&request(source, out.clone(), 2));

        assert_eq!(outcome, SplitOutcome::Success);
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 5);
    }

    #[test]
    fn test_cancelled_request_reports_stopped() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.bin");
        std::fs::write(&source, b"0123456789").unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();

        let app = AppConfig::default().open().unwrap();
        let request = request(source, out.clone(), 2);
        request.cancel();

        assert_eq!(app.split(&request), SplitOutcome::Stopped);
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_spawn_split_runs_in_background() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.bin");
        std::fs::write(&source, vec![7u8; 1000]).unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();

        let app = Arc::new(AppConfig::default().open().unwrap());
        let outcome = Arc::clone(&app)
            .spawn_split(request(source, out.clone(), 100))
            .await
            .unwrap();

        assert_eq!(outcome, SplitOutcome::Success);
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 10);
    }
}
