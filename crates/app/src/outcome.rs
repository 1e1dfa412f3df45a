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

use fsplit_splitter::SplitRequest;
use serde::Serialize;
use strum::EnumProperty;

/// Process exit code for command line usage errors.
pub const USAGE_EXIT_CODE: u8 = 64;
/// Process exit code for failures outside of any split outcome.
pub const INTERNAL_EXIT_CODE: u8 = 70;
/// Process exit code for a rejected splitter configuration.
pub const CONFIG_EXIT_CODE: u8 = 78;

/// The single result reported for one split invocation.
///
/// Precondition codes win over I/O codes and are checked in the order
/// source, destination, chunk size.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Serialize,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::EnumProperty,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SplitOutcome {
    #[strum(props(exit_code = "0"))]
    Success,
    #[strum(props(exit_code = "1"))]
    InvalidSource,
    #[strum(props(exit_code = "2"))]
    InvalidDestination,
    #[strum(props(exit_code = "3"))]
    InvalidChunkSize,
    #[strum(props(exit_code = "4"))]
    IoError,
    /// Cancelled before the source was exhausted. Not an error.
    #[strum(props(exit_code = "130"))]
    Stopped,
}

impl SplitOutcome {
    pub fn exit_code(self) -> u8 {
        self.get_str("exit_code")
            .and_then(|value| value.parse::<u8>().ok())
            .unwrap_or(INTERNAL_EXIT_CODE)
    }

    #[must_use]
    pub const fn is_error(self) -> bool { !matches!(self, Self::Success | Self::Stopped) }

    /// Text shown to the user. Precondition failures echo the rejected input;
    /// I/O failures stay generic since the cause is already logged.
    #[must_use]
    pub fn message(self, request: &SplitRequest) -> String {
        match self {
            Self::Success => "The source file was split successfully.".to_string(),
            Self::InvalidSource => format!("Invalid source file: {}", request.source.display()),
            Self::InvalidDestination => format!(
                "Invalid destination dir: {}",
                request.destination.display()
            ),
            Self::InvalidChunkSize => format!("Invalid chunk size: {}", request.chunk_size),
            Self::IoError => "I/O error".to_string(),
            Self::Stopped => "Split stopped; chunks written so far were kept.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;
    use test_case::test_case;

    use super::*;

    #[test_case(SplitOutcome::Success, 0)]
    #[test_case(SplitOutcome::InvalidSource, 1)]
    #[test_case(SplitOutcome::InvalidDestination, 2)]
    #[test_case(SplitOutcome::InvalidChunkSize, 3)]
    #[test_case(SplitOutcome::IoError, 4)]
    #[test_case(SplitOutcome::Stopped, 130)]
    fn test_exit_codes(outcome: SplitOutcome, code: u8) {
        assert_eq!(outcome.exit_code(), code);
    }

    #[test]
    fn test_outcome_codes_are_distinct_from_process_codes() {
        let mut codes: Vec<u8> = SplitOutcome::iter().map(SplitOutcome::exit_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), SplitOutcome::iter().count());
        for reserved in [USAGE_EXIT_CODE, INTERNAL_EXIT_CODE, CONFIG_EXIT_CODE] {
            assert!(!codes.contains(&reserved), "{reserved} is taken by an outcome");
        }
    }

    #[test]
    fn test_only_failures_are_errors() {
        let errors: Vec<_> = SplitOutcome::iter().filter(|o| o.is_error()).collect();
        assert_eq!(
            errors,
            vec![
                SplitOutcome::InvalidSource,
                SplitOutcome::InvalidDestination,
                SplitOutcome::InvalidChunkSize,
                SplitOutcome::IoError,
            ]
        );
    }

    #[test]
    fn test_string_forms() {
        assert_eq!(SplitOutcome::IoError.to_string(), "io_error");
        assert_eq!(
            SplitOutcome::from_str("invalid_chunk_size").unwrap(),
            SplitOutcome::InvalidChunkSize
        );
        assert_eq!(
            serde_json::to_string(&SplitOutcome::Stopped).unwrap(),
            "\"stopped\""
        );
    }

    #[test]
    fn test_messages_echo_rejected_input() {
        let request = SplitRequest::builder()
            .source("/in/data.bin")
            .destination("/out")
            .chunk_size(-5)
            .build();
        assert_eq!(
            SplitOutcome::InvalidSource.message(&request),
            "Invalid source file: /in/data.bin"
        );
        assert_eq!(
            SplitOutcome::InvalidDestination.message(&request),
            "Invalid destination dir: /out"
        );
        assert_eq!(
            SplitOutcome::InvalidChunkSize.message(&request),
            "Invalid chunk size: -5"
        );
        assert_eq!(SplitOutcome::IoError.message(&request), "I/O error");
    }
}
