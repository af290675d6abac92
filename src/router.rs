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

//! Keyed file router for per-transaction log files.
//!
//! Routes accepted records into files named by a contextual key. Streams
//! are opened lazily in append mode, cached per filename, and closed
//! when the close signal appears in context. File-system failures go to
//! the configured reporter; logging call sites never see an error.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::context::ContextLookup;
use crate::level::Level;
use crate::record::{LineFormatter, LogRecord, RecordFormatter};
use crate::reporter::{ErrorReporter, SplitError, StderrReporter};

/// Directory used when no directory key is configured or present:
/// the `TRANSLOG_DIR` environment variable, else `log`.
static DEFAULT_FALLBACK_DIR: Lazy<PathBuf> = Lazy::new(|| {
    std::env::var("TRANSLOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("log"))
});

/// Configuration for a `SplitAppender`.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Context key holding the per-transaction filename.
    pub file_key: String,

    /// Context key holding the log directory, if any. Records fall back
    /// to `fallback_dir` when unset or absent from context.
    pub dir_key: Option<String>,

    /// Context key holding the close signal, if any. When unset,
    /// streams stay open until `close` or `close_all`.
    pub close_key: Option<String>,

    /// Minimum severity accepted when no close signal is present.
    pub threshold: Level,

    /// Directory used when `dir_key` yields nothing.
    pub fallback_dir: PathBuf,
}

impl SplitConfig {
    /// Route on `file_key` with defaults for everything else.
    pub fn new(file_key: &str) -> Self {
        Self {
            file_key: file_key.to_string(),
            dir_key: None,
            close_key: None,
            threshold: Level::Trace,
            fallback_dir: DEFAULT_FALLBACK_DIR.clone(),
        }
    }
}

/// Routes log records into per-transaction files.
///
/// One mutex serializes all stream-map access, so any thread may call
/// `publish`, `flush`, and `close` concurrently. At most one stream is
/// open per filename; a map entry implies an open, append-positioned
/// file.
pub struct SplitAppender {
    config: SplitConfig,
    formatter: Box<dyn RecordFormatter>,
    reporter: Arc<dyn ErrorReporter>,
    streams: Mutex<HashMap<String, BufWriter<File>>>,
}

impl SplitAppender {
    /// Create an appender with the default formatter and stderr reporter.
    pub fn new(config: SplitConfig) -> Self {
        Self::with_parts(config, Box::new(LineFormatter), Arc::new(StderrReporter))
    }

    /// Create an appender with an explicit formatter and reporter.
    pub fn with_parts(
        config: SplitConfig,
        formatter: Box<dyn RecordFormatter>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            config,
            formatter,
            reporter,
            streams: Mutex::new(HashMap::new()),
        }
    }

    /// Whether `record` would be routed given the current context.
    ///
    /// Records without a filename in context are always rejected. A true
    /// close signal is always accepted regardless of severity, so the
    /// terminal record of a transaction is never filtered out.
    pub fn should_accept(&self, record: &LogRecord, ctx: &dyn ContextLookup) -> bool {
        if ctx.get(&self.config.file_key).is_none() {
            return false;
        }
        if self.close_requested(ctx) {
            return true;
        }
        record.level >= self.config.threshold
    }

    /// Route one record: resolve or open its stream, append the
    /// formatted line, flush, then close the stream if the close signal
    /// is set. Failures are reported and the record is dropped.
    pub fn publish(&self, record: &LogRecord, ctx: &dyn ContextLookup) {
        let mut streams = self.streams.lock().unwrap();
        if !self.should_accept(record, ctx) {
            return;
        }
        let Some(filename) = self.log_filename(ctx) else {
            return;
        };

        let stream = match streams.entry(filename.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let dir = self.log_dir(ctx);
                match open_stream(&dir, &filename) {
                    Ok(stream) => entry.insert(stream),
                    Err(error) => {
                        self.reporter.report(&error);
                        return;
                    }
                }
            }
        };

        let line = self.formatter.format(record);
        let written = stream
            .write_all(line.as_bytes())
            .and_then(|_| stream.flush());
        if let Err(source) = written {
            self.reporter.report(&SplitError::Write {
                filename: filename.clone(),
                source,
            });
        }

        if self.close_requested(ctx) {
            self.close_locked(&mut streams, ctx);
        }
    }

    /// Flush the open stream for the current context filename, if any.
    pub fn flush(&self, ctx: &dyn ContextLookup) {
        let mut streams = self.streams.lock().unwrap();
        let Some(filename) = self.log_filename(ctx) else {
            return;
        };
        if let Some(stream) = streams.get_mut(&filename) {
            if let Err(source) = stream.flush() {
                self.reporter.report(&SplitError::Flush { filename, source });
            }
        }
    }

    /// Close and evict the stream for the current context filename.
    ///
    /// Only the current filename's entry is touched; other transactions
    /// keep their streams. Without a filename in context this is a no-op.
    pub fn close(&self, ctx: &dyn ContextLookup) {
        let mut streams = self.streams.lock().unwrap();
        self.close_locked(&mut streams, ctx);
    }

    /// Close every remaining stream, best effort. Called at process
    /// shutdown and from `Drop`.
    pub fn close_all(&self) {
        let mut streams = self.streams.lock().unwrap();
        for (filename, mut stream) in streams.drain() {
            if let Err(source) = stream.flush() {
                self.reporter.report(&SplitError::Close { filename, source });
            }
        }
    }

    /// Number of currently open streams.
    pub fn open_streams(&self) -> usize {
        self.streams.lock().unwrap().len()
    }

    /// Eviction shared by `close` and the close-signal path in `publish`.
    /// The entry is removed before the final flush, so a failing flush
    /// cannot leave a dead stream in the map.
    fn close_locked(
        &self,
        streams: &mut HashMap<String, BufWriter<File>>,
        ctx: &dyn ContextLookup,
    ) {
        let Some(filename) = self.log_filename(ctx) else {
            return;
        };
        if let Some(mut stream) = streams.remove(&filename) {
            if let Err(source) = stream.flush() {
                self.reporter.report(&SplitError::Close { filename, source });
            }
        }
    }

    fn close_requested(&self, ctx: &dyn ContextLookup) -> bool {
        match &self.config.close_key {
            Some(key) => ctx.get(key).is_some_and(|v| v.eq_ignore_ascii_case("true")),
            None => false,
        }
    }

    /// Filename from context, given a `.log` suffix unless already present.
    fn log_filename(&self, ctx: &dyn ContextLookup) -> Option<String> {
        let name = ctx.get(&self.config.file_key)?;
        if name.ends_with(".log") {
            Some(name)
        } else {
            Some(format!("{}.log", name))
        }
    }

    fn log_dir(&self, ctx: &dyn ContextLookup) -> PathBuf {
        self.config
            .dir_key
            .as_ref()
            .and_then(|key| ctx.get(key))
            .map(PathBuf::from)
            .unwrap_or_else(|| self.config.fallback_dir.clone())
    }
}

impl Drop for SplitAppender {
    fn drop(&mut self) {
        self.close_all();
    }
}

/// Open `dir/filename` for appending, creating the directory if needed.
fn open_stream(dir: &Path, filename: &str) -> Result<BufWriter<File>, SplitError> {
    fs::create_dir_all(dir).map_err(|source| SplitError::Open {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(filename);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| SplitError::Open { path, source })?;

    Ok(BufWriter::with_capacity(8192, file))
}
