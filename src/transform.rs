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

//! Payload-to-text transforms for mirrored stream chunks.
//!
//! The mirror hands each chunk it logs to a `PayloadTransform`, which
//! renders it as one log line. The shipped transform decodes text
//! payloads with a configurable charset; binary-oriented transforms
//! plug in through the same trait.

use anyhow::Result;
use encoding_rs::Encoding;

/// Renders a mirrored chunk as a single log line.
///
/// `postfix` carries the truncation marker when the chunk was cut to
/// fit the remaining log budget. Render failures are caught by the
/// mirror and logged as warnings; they never affect the sink write.
pub trait PayloadTransform: Send {
    fn render(&self, header: &str, payload: &[u8], postfix: Option<&str>) -> Result<String>;
}

/// Decodes the payload as text in a fixed charset.
#[derive(Debug, Clone, Copy)]
pub struct TextTransform {
    charset: &'static Encoding,
}

impl TextTransform {
    pub fn new(charset: &'static Encoding) -> Self {
        Self { charset }
    }
}

impl Default for TextTransform {
    /// ISO-8859-1, the charset of DICOM default-repertoire text payloads.
    fn default() -> Self {
        Self::new(encoding_rs::WINDOWS_1252)
    }
}

impl PayloadTransform for TextTransform {
    fn render(&self, header: &str, payload: &[u8], postfix: Option<&str>) -> Result<String> {
        let (text, _, _) = self.charset.decode(payload);
        let mut line = String::with_capacity(header.len() + text.len());
        line.push_str(header);
        line.push_str(&text);
        if let Some(postfix) = postfix {
            line.push_str(postfix);
        }
        Ok(line)
    }
}
