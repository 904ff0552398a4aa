// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Store-wide defaults.
//!
//! ```yaml
//! directory_mode: 775
//! file_mode: 664
//! link_mode: 777
//! bootstrap_mode: 755
//! link_limit: 10
//! admission_timeout: 30s
//! ```
//!
//! Every field is optional.

use crate::error::{Error, Result};
use crate::mode::Mode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Mode of new directories when the caller gives none.
    pub directory_mode: Mode,
    pub file_mode: Mode,
    pub link_mode: Mode,
    /// Mode of the root directory, created when the store opens.
    pub bootstrap_mode: Mode,
    /// Maximum links followed while resolving one path.
    pub link_limit: u32,
    /// How long writers wait for admission; absent means forever.
    #[serde(with = "duration_text", skip_serializing_if = "Option::is_none")]
    pub admission_timeout: Option<Duration>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            directory_mode: Mode::from_number(775),
            file_mode: Mode::from_number(664),
            link_mode: Mode::from_number(777),
            bootstrap_mode: Mode::from_number(755),
            link_limit: 10,
            admission_timeout: None,
        }
    }
}

impl StoreConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml_ng::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let text = std::fs::read_to_string(file)
            .map_err(|e| Error::Config(format!("{}: {e}", file.display())))?;
        Self::from_yaml(&text)
    }
}

/// Durations written the way people write them: `500ms`, `30s`, `2 minutes`.
mod duration_text {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_str(&format!("{}ms", d.as_millis())),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let text: Option<String> = Option::deserialize(d)?;
        text.map(|t| parse_duration::parse(&t).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.directory_mode.to_string(), "775");
        assert_eq!(config.file_mode.to_string(), "664");
        assert_eq!(config.link_limit, 10);
        assert_eq!(StoreConfig::from_yaml("{}").unwrap(), config);
    }

    #[test]
    fn test_partial_yaml() {
        let config = StoreConfig::from_yaml("file_mode: 600\nadmission_timeout: 250ms\n").unwrap();
        assert_eq!(config.file_mode, Mode::from_number(600));
        assert_eq!(config.directory_mode, Mode::from_number(775));
        assert_eq!(config.admission_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(matches!(StoreConfig::from_yaml("colour: blue\n"), Err(Error::Config(_))));
        assert!(matches!(
            StoreConfig::from_yaml("admission_timeout: soon\n"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "link_limit: 3").unwrap();
        let config = StoreConfig::from_file(file.path()).unwrap();
        assert_eq!(config.link_limit, 3);

        assert!(matches!(
            StoreConfig::from_file("/definitely/not/here.yaml"),
            Err(Error::Config(_))
        ));
    }
}
