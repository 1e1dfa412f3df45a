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

use shadow_rs::{formatcp, shadow};

shadow!(build);

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");

/// Set `FSPLIT_RELEASE` at compile time to drop the development suffix.
const fn is_official_release() -> bool { option_env!("FSPLIT_RELEASE").is_some() }

const DIRTY_SUFFIX: &str = if build::GIT_CLEAN { "" } else { "-dirty" };

/// `PKG_VERSION` for releases, `PKG_VERSION-dev[+commit[-dirty]]` otherwise.
#[allow(clippy::const_is_empty)]
pub const VERSION: &str = if is_official_release() {
    build::PKG_VERSION
} else if build::SHORT_COMMIT.is_empty() {
    formatcp!("{}-dev", build::PKG_VERSION)
} else {
    formatcp!("{}-dev+{}{}", build::PKG_VERSION, build::SHORT_COMMIT, DIRTY_SUFFIX)
};

/// Shown by `--version` together with the toolchain and build time.
pub const LONG_VERSION: &str = formatcp!(
    "{}\nbuild time: {}\nrustc: {}",
    VERSION,
    build::BUILD_TIME,
    build::RUST_VERSION
);
