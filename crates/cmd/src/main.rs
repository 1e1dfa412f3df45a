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
    io, num::TryFromIntError, path::PathBuf, process::ExitCode, str::FromStr, sync::Arc,
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use fsplit_app::{
    AppConfig, CONFIG_EXIT_CODE, CancellationToken, INTERNAL_EXIT_CODE, SplitOutcome, SplitRequest,
    USAGE_EXIT_CODE,
};
use fsplit_base::readable_size::{ParseSizeError, ReadableSize};
use fsplit_common_telemetry::{
    logging::{LogFormat, LoggingOptions},
    panic_hook,
};
use snafu::{ResultExt, Snafu};
use tracing::{error, info, warn};

mod build_info;

#[derive(Debug, Parser)]
#[clap(
name = "fsplit",
about = "Split a file into fixed-size chunk files",
author = build_info::AUTHOR,
version = build_info::VERSION,
long_version = build_info::LONG_VERSION)]
struct Cli {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Split(SplitArgs),
}

#[derive(Debug, Snafu)]
enum ChunkSizeError {
    #[snafu(display("{source}"))]
    Size { source: ParseSizeError },

    #[snafu(display("chunk size is too large"))]
    TooLarge { source: TryFromIntError },
}

/// Chunk size as typed by the user. Plain integers, negative ones included,
/// are kept as-is so that validation can reject them with the usual outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChunkSizeArg(i64);

impl FromStr for ChunkSizeArg {
    type Err = ChunkSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(bytes) = s.trim().parse::<i64>() {
            return Ok(Self(bytes));
        }
        let size: ReadableSize = s.parse().context(SizeSnafu)?;
        i64::try_from(size.as_bytes())
            .map(Self)
            .context(TooLargeSnafu)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

#[derive(Debug, Clone, Args)]
struct LogArgs {
    /// Log filter, e.g. `warn` or `info,fsplit_splitter=debug`
    #[arg(long)]
    log_level:  Option<String>,
    /// Also write hourly rotated log files into this directory
    #[arg(long)]
    log_dir:    Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = LogFormatArg::Text)]
    log_format: LogFormatArg,
}

impl LogArgs {
    fn into_options(self) -> LoggingOptions {
        LoggingOptions::builder()
            .dir(
                self.log_dir
                    .map(|dir| dir.display().to_string())
                    .unwrap_or_default(),
            )
            .maybe_level(self.log_level)
            .log_format(self.log_format.into())
            .build()
    }
}

#[derive(Debug, Clone, Args)]
#[command(flatten_help = true)]
#[command(long_about = r"

Split SOURCE into chunk files named `<timestamp>_split_<n>` inside
DESTINATION. Sizes accept plain bytes or units such as 4KiB, 10MB, 1.5GiB.
Ctrl-C stops the split before its next read; chunks already written are kept.
Examples:

fsplit split ./video.mp4 ./parts --chunk-size 100MiB

")]
struct SplitArgs {
    /// File to split
    source:          PathBuf,
    /// Existing directory that receives the chunk files
    destination:     PathBuf,
    /// Size of each chunk
    #[arg(short, long, allow_hyphen_values = true)]
    chunk_size:      ChunkSizeArg,
    /// Upper bound of the read buffer
    #[arg(long, default_value = "4KiB")]
    max_buffer_size: ReadableSize,
    /// Sync every write to disk
    #[arg(long)]
    sync:            bool,
    #[command(flatten)]
    log:             LogArgs,
}

impl SplitArgs {
    async fn run(self) -> ExitCode {
        let app = match AppConfig::builder()
            .max_buffer_size(self.max_buffer_size)
            .sync_writes(self.sync)
            .logging(self.log.into_options())
            .build()
            .open()
        {
            Ok(app) => Arc::new(app),
            Err(err) => {
                eprintln!("Invalid splitter configuration: {err}");
                return ExitCode::from(CONFIG_EXIT_CODE);
            }
        };
        let _guards = app.init_logging();

        let request = SplitRequest::builder()
            .source(self.source)
            .destination(self.destination)
            .chunk_size(self.chunk_size.0)
            .build();

        let cancel = request.cancellation.clone();
        tokio::spawn(async move {
            if watch_interrupts(tokio::signal::ctrl_c, cancel).await {
                std::process::exit(i32::from(SplitOutcome::Stopped.exit_code()));
            }
        });

        let outcome = match Arc::clone(&app).spawn_split(request.clone()).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, "Split task failed");
                eprintln!("Split task failed: {err}");
                return ExitCode::from(INTERNAL_EXIT_CODE);
            }
        };

        let message = outcome.message(&request);
        if outcome.is_error() {
            eprintln!("{message}");
        } else {
            println!("{message}");
        }
        ExitCode::from(outcome.exit_code())
    }
}

/// Cancels the split on the first interrupt. Returns `true` once a second
/// interrupt arrives, at which point the caller should exit without waiting
/// for a read or write that may never finish.
async fn watch_interrupts<F, Fut>(mut interrupted: F, cancel: CancellationToken) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    if let Err(err) = interrupted().await {
        warn!(error = %err, "Unable to listen for Ctrl+C");
        return false;
    }
    info!("Received Ctrl+C signal, stopping split");
    cancel.cancel();

    if interrupted().await.is_err() {
        return false;
    }
    warn!("Received second Ctrl+C signal, exiting immediately");
    true
}

/// Help and version requests are not failures; everything else clap rejects
/// gets a code no split outcome uses.
fn parse_error_code(err: &clap::Error) -> u8 {
    if err.use_stderr() { USAGE_EXIT_CODE } else { 0 }
}

#[tokio::main]
async fn main() -> ExitCode {
    human_panic::setup_panic!();
    panic_hook::set_panic_hook();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(parse_error_code(&err));
        }
    };
    match cli.commands {
        Commands::Split(args) => args.run().await,
    }
}
