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

//! Transaction-scoped logging utilities.
//!
//! Two pieces, built for a healthcare-imaging server that handles many
//! interleaved transactions per process: [`SplitAppender`] routes log
//! records into per-transaction files named by a contextual key, and
//! [`MirrorWriter`] wraps a byte sink to mirror its traffic into the
//! log under a total byte budget.
//!
//! ```
//! use std::collections::HashMap;
//! use translog::{Level, LogRecord, SplitAppender, SplitConfig};
//!
//! let mut config = SplitConfig::new("txid");
//! config.close_key = Some("txclose".to_string());
//! config.fallback_dir = std::env::temp_dir().join("translog-doc");
//! let appender = SplitAppender::new(config);
//!
//! let mut ctx = HashMap::new();
//! ctx.insert("txid".to_string(), "tx-42".to_string());
//! appender.publish(&LogRecord::new(Level::Info, "img.store", "instance stored"), &ctx);
//!
//! ctx.insert("txclose".to_string(), "true".to_string());
//! appender.publish(&LogRecord::new(Level::Info, "img.store", "association released"), &ctx);
//! assert_eq!(appender.open_streams(), 0);
//! ```

pub mod config;
pub mod context;
pub mod level;
pub mod mirror;
pub mod record;
pub mod reporter;
pub mod router;
pub mod transform;

pub use config::{MirrorSettings, RouterSettings, Settings};
pub use context::{ContextLookup, ThreadContext};
pub use level::Level;
pub use mirror::{MirrorConfig, MirrorWriter, TRUNCATION_MARKER};
pub use record::{LineFormatter, LogRecord, RecordFormatter};
pub use reporter::{ErrorReporter, MemoryReporter, SplitError, StderrReporter};
pub use router::{SplitAppender, SplitConfig};
pub use transform::{PayloadTransform, TextTransform};
