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

//! Settings file support.
//!
//! Hosts usually assemble `SplitConfig` and `MirrorConfig` in code;
//! this module loads the same values from a TOML file so deployments
//! can change routing keys and mirror limits without a rebuild.

use anyhow::{Context, Result, anyhow, bail};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::level::Level;
use crate::mirror::MirrorConfig;
use crate::router::SplitConfig;

/// Configuration file structure
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Settings {
    /// Keyed file router section
    pub router: Option<RouterSettings>,

    /// Stream mirror section
    pub mirror: Option<MirrorSettings>,
}

/// `[router]` section of the settings file
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RouterSettings {
    /// Context key holding the per-transaction filename (required)
    pub file_key: Option<String>,

    /// Context key holding the log directory
    pub dir_key: Option<String>,

    /// Context key holding the close signal
    pub close_key: Option<String>,

    /// Minimum severity to accept (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Directory used when no directory is in context
    pub fallback_dir: Option<String>,
}

/// `[mirror]` section of the settings file
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MirrorSettings {
    /// Mirror flushed chunks into the log
    pub log_enabled: Option<bool>,

    /// Emit debug lines for buffer activity
    pub trace_enabled: Option<bool>,

    /// Charset label for the text transform (e.g. "ISO-8859-1", "UTF-8")
    pub charset: Option<String>,

    /// Total bytes the mirror may log
    pub max_log_len: Option<i64>,

    /// Buffer capacity in bytes
    pub capacity: Option<usize>,

    /// Prefix for mirrored lines
    pub header: Option<String>,
}

impl Settings {
    /// Load settings from a file, or return default if file doesn't exist
    pub fn load(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;

        Ok(settings)
    }
}

impl RouterSettings {
    /// Build a router config, applying defaults for unset fields
    pub fn into_config(self) -> Result<SplitConfig> {
        let file_key = match self.file_key {
            Some(key) if !key.is_empty() => key,
            _ => bail!("router.file_key is required"),
        };

        let mut config = SplitConfig::new(&file_key);
        config.dir_key = self.dir_key;
        config.close_key = self.close_key;
        if let Some(level) = self.level {
            config.threshold = level
                .parse::<Level>()
                .map_err(|message| anyhow!("router.level: {}", message))?;
        }
        if let Some(dir) = self.fallback_dir {
            config.fallback_dir = PathBuf::from(dir);
        }
        Ok(config)
    }
}

impl MirrorSettings {
    /// Build a mirror config, applying defaults for unset fields
    pub fn into_config(self) -> Result<MirrorConfig> {
        let mut config = MirrorConfig::default();
        if let Some(enabled) = self.log_enabled {
            config.log_enabled = enabled;
        }
        if let Some(enabled) = self.trace_enabled {
            config.trace_enabled = enabled;
        }
        if let Some(label) = self.charset {
            config.charset = Encoding::for_label(label.as_bytes())
                .ok_or_else(|| anyhow!("Unknown mirror.charset: {}", label))?;
        }
        if let Some(max_log_len) = self.max_log_len {
            config.max_log_len = max_log_len;
        }
        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                bail!("mirror.capacity must be positive");
            }
            config.capacity = capacity;
        }
        if let Some(header) = self.header {
            config.header = header;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load(&dir.path().join("absent.toml")).unwrap();
        assert!(settings.router.is_none());
        assert!(settings.mirror.is_none());
    }

    #[test]
    fn test_load_full_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("translog.toml");
        fs::write(
            &path,
            r#"
[router]
file_key = "txid"
close_key = "txclose"
level = "warn"
fallback_dir = "/var/log/app"

[mirror]
log_enabled = true
charset = "ISO-8859-1"
max_log_len = 4096
capacity = 1024
header = "DIMSE> "
"#,
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();

        let router = settings.router.unwrap().into_config().unwrap();
        assert_eq!(router.file_key, "txid");
        assert_eq!(router.close_key.as_deref(), Some("txclose"));
        assert_eq!(router.dir_key, None);
        assert_eq!(router.threshold, Level::Warn);
        assert_eq!(router.fallback_dir, PathBuf::from("/var/log/app"));

        let mirror = settings.mirror.unwrap().into_config().unwrap();
        assert!(mirror.log_enabled);
        assert!(!mirror.trace_enabled);
        assert_eq!(mirror.charset, encoding_rs::WINDOWS_1252);
        assert_eq!(mirror.max_log_len, 4096);
        assert_eq!(mirror.capacity, 1024);
        assert_eq!(mirror.header, "DIMSE> ");
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("translog.toml");
        fs::write(&path, "[router\nfile_key=").unwrap();

        let error = Settings::load(&path).unwrap_err();
        assert!(error.to_string().contains("Failed to parse settings file"));
    }

    #[test]
    fn test_router_requires_file_key() {
        assert!(RouterSettings::default().into_config().is_err());

        let settings = RouterSettings {
            file_key: Some(String::new()),
            ..RouterSettings::default()
        };
        assert!(settings.into_config().is_err());
    }

    #[test]
    fn test_invalid_level_rejected() {
        let settings = RouterSettings {
            file_key: Some("txid".to_string()),
            level: Some("verbose".to_string()),
            ..RouterSettings::default()
        };
        let error = settings.into_config().unwrap_err();
        assert!(error.to_string().contains("router.level"));
    }

    #[test]
    fn test_unknown_charset_rejected() {
        let settings = MirrorSettings {
            charset: Some("klingon".to_string()),
            ..MirrorSettings::default()
        };
        assert!(settings.into_config().is_err());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let settings = MirrorSettings {
            capacity: Some(0),
            ..MirrorSettings::default()
        };
        assert!(settings.into_config().is_err());
    }

    #[test]
    fn test_mirror_defaults() {
        let config = MirrorSettings::default().into_config().unwrap();
        assert!(!config.log_enabled);
        assert!(!config.trace_enabled);
        assert_eq!(config.max_log_len, i64::MAX);
        assert_eq!(config.capacity, 8192);
        assert_eq!(config.header, "");
    }
}
