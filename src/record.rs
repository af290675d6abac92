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

//! Log records and line formatting.
//!
//! A `LogRecord` carries the message text produced by the host logging
//! framework; a `RecordFormatter` turns it into the exact line written
//! to a transaction file, trailing newline included.

use chrono::{DateTime, Local};

use crate::level::Level;

/// A single log record handed to the router.
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Severity of the record.
    pub level: Level,
    /// Name of the logger/category that emitted the record.
    pub target: String,
    /// Pre-formatted message text from the host framework.
    pub message: String,
    /// Capture time of the record.
    pub timestamp: DateTime<Local>,
}

impl LogRecord {
    /// Create a record stamped with the current local time.
    pub fn new(level: Level, target: &str, message: &str) -> Self {
        Self {
            level,
            target: target.to_string(),
            message: message.to_string(),
            timestamp: Local::now(),
        }
    }
}

/// Renders a record into the line written to its transaction file.
///
/// The returned string is written verbatim, so implementations must
/// include the trailing newline themselves.
pub trait RecordFormatter: Send + Sync {
    fn format(&self, record: &LogRecord) -> String;
}

/// Default formatter: timestamp, padded level, target, message.
#[derive(Debug, Default)]
pub struct LineFormatter;

impl RecordFormatter for LineFormatter {
    fn format(&self, record: &LogRecord) -> String {
        format!(
            "{} {:<5} [{}] {}\n",
            record.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level.as_str(),
            record.target,
            record.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_line_formatter_shape() {
        let record = LogRecord {
            level: Level::Info,
            target: "img.store".to_string(),
            message: "instance stored".to_string(),
            timestamp: Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        };

        let line = LineFormatter.format(&record);
        assert_eq!(line, "2026-01-02 03:04:05.000 INFO  [img.store] instance stored\n");
    }

    #[test]
    fn test_line_formatter_pads_level() {
        let mut record = LogRecord::new(Level::Warn, "t", "m");
        let warn_line = LineFormatter.format(&record);
        record.level = Level::Debug;
        let debug_line = LineFormatter.format(&record);

        // Both level columns occupy five characters.
        assert!(warn_line.contains(" WARN  [t] "));
        assert!(debug_line.contains(" DEBUG [t] "));
    }

    #[test]
    fn test_new_records_end_with_newline() {
        let record = LogRecord::new(Level::Error, "a.b", "boom");
        assert!(LineFormatter.format(&record).ends_with("boom\n"));
    }
}
