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

//! Buffered writer decorator that mirrors traffic into the log.
//!
//! `MirrorWriter` buffers writes to a byte sink and, when enabled,
//! mirrors every chunk that reaches the sink as a log line, up to a
//! total byte budget. Used to capture protocol traffic (DICOM messages,
//! HL7 payloads) alongside the stream that carries it.

use encoding_rs::Encoding;
use std::io::{self, Write};
use tracing::{debug, info, warn};

use crate::transform::{PayloadTransform, TextTransform};

/// Marker appended to a mirrored chunk that was cut to fit the budget.
pub const TRUNCATION_MARKER: &str = "...(truncated)";

/// Configuration for a `MirrorWriter`.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Mirror flushed chunks into the log.
    pub log_enabled: bool,

    /// Emit debug lines for buffer activity.
    pub trace_enabled: bool,

    /// Charset for the default text transform.
    pub charset: &'static Encoding,

    /// Total bytes the mirror may log before going quiet.
    pub max_log_len: i64,

    /// Buffer capacity in bytes.
    pub capacity: usize,

    /// Prefix prepended to every mirrored line.
    pub header: String,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            log_enabled: false,
            trace_enabled: false,
            charset: encoding_rs::WINDOWS_1252,
            max_log_len: i64::MAX,
            capacity: 8192,
            header: String::new(),
        }
    }
}

/// Buffered writer that mirrors flushed chunks into the log.
///
/// Dropping the writer performs no flush: the wrapper does not own the
/// sink, and the protocol layers it wraps flush at message boundaries
/// and close the sink themselves. Unflushed buffered bytes are lost
/// unless `flush` is called first.
pub struct MirrorWriter<W: Write> {
    inner: W,
    buf: Vec<u8>,
    capacity: usize,
    log_enabled: bool,
    trace_enabled: bool,
    header: String,
    remaining: i64,
    transform: Box<dyn PayloadTransform>,
}

impl<W: Write> MirrorWriter<W> {
    /// Wrap `inner` with the text transform in the configured charset.
    pub fn new(inner: W, config: MirrorConfig) -> Self {
        let transform = Box::new(TextTransform::new(config.charset));
        Self::with_transform(inner, config, transform)
    }

    /// Wrap `inner` with a custom payload transform.
    pub fn with_transform(
        inner: W,
        config: MirrorConfig,
        transform: Box<dyn PayloadTransform>,
    ) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(config.capacity),
            capacity: config.capacity,
            log_enabled: config.log_enabled,
            trace_enabled: config.trace_enabled,
            header: config.header,
            remaining: config.max_log_len,
            transform,
        }
    }

    /// Switch chunk mirroring on or off.
    ///
    /// The buffer is flushed first, so bytes written before the call
    /// are never mirrored under the new setting. On a flush error the
    /// setting is left unchanged.
    pub fn set_log_enabled(&mut self, enabled: bool) -> io::Result<()> {
        self.flush_buffer()?;
        if self.trace_enabled {
            debug!("mirror logging {}", if enabled { "on" } else { "off" });
        }
        self.log_enabled = enabled;
        Ok(())
    }

    /// Switch buffer-activity debug lines on or off.
    pub fn set_trace_enabled(&mut self, enabled: bool) {
        self.trace_enabled = enabled;
    }

    /// Reset the remaining mirror byte budget.
    pub fn set_max_log_len(&mut self, max_log_len: i64) {
        self.remaining = max_log_len;
    }

    /// Remaining mirror byte budget. Negative once a mirrored chunk has
    /// overshot it.
    pub fn remaining_log_len(&self) -> i64 {
        self.remaining
    }

    /// Number of bytes currently buffered, not yet at the sink.
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    /// Unwrap the underlying sink without flushing.
    ///
    /// Buffered bytes that never reached the sink are discarded; call
    /// `flush` first to keep them.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Write the buffered bytes to the sink and mirror them. On a sink
    /// error the bytes stay buffered for the next attempt.
    fn flush_buffer(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        self.inner.write_all(&self.buf)?;
        if self.trace_enabled {
            debug!("flushed {} buffered bytes", self.buf.len());
        }
        let pending = std::mem::take(&mut self.buf);
        self.mirror(&pending);
        self.buf = pending;
        self.buf.clear();
        Ok(())
    }

    /// Log one chunk that reached the sink, within the byte budget.
    ///
    /// A chunk longer than the remaining budget is rendered up to the
    /// budget with the truncation marker and still charged its full
    /// length, driving the budget negative. An exhausted budget charges
    /// nothing further, so the counter freezes at its first overshoot
    /// value and every later chunk is skipped.
    fn mirror(&mut self, data: &[u8]) {
        if !self.log_enabled || data.is_empty() {
            return;
        }
        if self.remaining > 0 {
            let rendered = if (data.len() as i64) > self.remaining {
                let visible = self.remaining as usize;
                self.transform
                    .render(&self.header, &data[..visible], Some(TRUNCATION_MARKER))
            } else {
                self.transform.render(&self.header, data, None)
            };
            match rendered {
                Ok(line) => info!("{}", line),
                Err(error) => warn!("Failed to render mirrored chunk: {}", error),
            }
            // Render failures charge too; only the skip path is free.
            self.remaining -= data.len() as i64;
        } else if self.trace_enabled {
            debug!("mirror budget exhausted, skipping {} bytes", data.len());
        }
    }
}

impl<W: Write> Write for MirrorWriter<W> {
    /// Chunks at least as large as the buffer bypass it: pending bytes
    /// are flushed first, then the chunk goes to the sink and the
    /// mirror directly, preserving byte order.
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if data.len() >= self.capacity {
            self.flush_buffer()?;
            self.inner.write_all(data)?;
            if self.trace_enabled {
                debug!("wrote {} bytes past the buffer", data.len());
            }
            self.mirror(data);
            return Ok(data.len());
        }
        if data.len() > self.capacity - self.buf.len() {
            self.flush_buffer()?;
        }
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_buffer()?;
        if self.trace_enabled {
            debug!("flushing sink");
        }
        self.inner.flush()
    }
}
