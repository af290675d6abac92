// Copyright (c) 2026 the translog authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Failure taxonomy and side-channel reporting for the router.
//!
//! The router never returns errors to logging call sites. File-system
//! failures are classified as a `SplitError` and handed to the
//! configured `ErrorReporter`, then the failing operation is abandoned
//! for that call only.

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

/// File-system failures reported through the router's side channel.
#[derive(Debug, Error)]
pub enum SplitError {
    /// Creating the log directory or opening the transaction file failed.
    #[error("Failed to open {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    /// Writing a formatted record to an open stream failed.
    #[error("Failed to write to {filename}: {source}")]
    Write { filename: String, source: io::Error },

    /// Flushing an open stream failed.
    #[error("Failed to flush {filename}: {source}")]
    Flush { filename: String, source: io::Error },

    /// Final flush while closing a stream failed.
    #[error("Failed to close {filename}: {source}")]
    Close { filename: String, source: io::Error },
}

/// Side channel receiving router failures.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &SplitError);
}

/// Default reporter: one line per failure on stderr.
///
/// Writes directly to stderr, never through a logging framework the
/// router may itself be installed in.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrReporter;

impl ErrorReporter for StderrReporter {
    fn report(&self, error: &SplitError) {
        eprintln!("translog: {}", error);
    }
}

/// Reporter that collects failure messages in memory.
///
/// Useful in tests and for embedders that surface failures elsewhere.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    messages: Mutex<Vec<String>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All failure messages reported so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    /// True when nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.messages.lock().unwrap().is_empty()
    }
}

impl ErrorReporter for MemoryReporter {
    fn report(&self, error: &SplitError) {
        self.messages.lock().unwrap().push(error.to_string());
    }
}
