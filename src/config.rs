//! Source configuration.
//!
//! The list of sheets to sync is static: a YAML file maintained alongside
//! the deployment, not something end users edit at runtime.
//!
//! ```yaml
//! current_source: Model Y Q3 2025
//! sources:
//!   - label: Model Y Q3 2025
//!     remote_id: 1AbCdEf
//!     tab_id: "0"
//!     variant: model_y
//! ```

use std::{collections::HashSet, fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{columns::SchemaVariant, error::ConfigError};

pub const DEFAULT_URL_TEMPLATE: &str =
    "https://docs.google.com/spreadsheets/d/{remote_id}/export?format=csv&gid={tab_id}";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// One sheet tab to sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub label: String,
    pub remote_id: String,
    pub tab_id: String,
    pub variant: SchemaVariant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_url_template")]
    pub url_template: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Label of the source synced in "current" mode. Defaults to the last
    /// configured source.
    #[serde(default)]
    pub current_source: Option<String>,
    pub sources: Vec<SourceConfig>,
}

fn default_url_template() -> String {
    DEFAULT_URL_TEMPLATE.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Which configured sources a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Current,
    All,
}

impl SyncConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let config: SyncConfig = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing config YAML {path:?}"))?;
        config
            .validate()
            .with_context(|| format!("Validating config {path:?}"))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        if !self.url_template.contains("{remote_id}") || !self.url_template.contains("{tab_id}") {
            return Err(ConfigError::InvalidTemplate(self.url_template.clone()));
        }
        let mut seen = HashSet::new();
        for source in &self.sources {
            if !seen.insert(source.label.as_str()) {
                return Err(ConfigError::DuplicateLabel(source.label.clone()));
            }
        }
        if let Some(current) = &self.current_source
            && !seen.contains(current.as_str())
        {
            return Err(ConfigError::UnknownCurrentSource(current.clone()));
        }
        Ok(())
    }

    pub fn current(&self) -> Option<&SourceConfig> {
        match &self.current_source {
            Some(label) => self.sources.iter().find(|s| &s.label == label),
            None => self.sources.last(),
        }
    }

    /// Sources to process for `mode`, in configured order.
    pub fn select(&self, mode: SyncMode) -> Vec<SourceConfig> {
        match mode {
            SyncMode::All => self.sources.clone(),
            SyncMode::Current => self.current().cloned().into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
current_source: Model 3 Highland
sources:
  - label: Model Y Q1 2024
    remote_id: sheet-y
    tab_id: "0"
    variant: model_y_legacy
  - label: Model Y Q2 2024
    remote_id: sheet-y
    tab_id: "1712"
    variant: model_y
  - label: Model 3 Highland
    remote_id: sheet-3
    tab_id: "0"
    variant: model_3
"#;

    fn sample() -> SyncConfig {
        serde_yaml::from_str(SAMPLE).expect("sample config")
    }

    #[test]
    fn parses_sources_with_defaults() {
        let config = sample();
        assert_eq!(config.url_template, DEFAULT_URL_TEMPLATE);
        assert_eq!(config.request_timeout_secs, None);
        assert_eq!(config.sources.len(), 3);
        assert_eq!(config.sources[0].variant, SchemaVariant::ModelYLegacy);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn selects_current_or_all_sources() {
        let mut config = sample();
        let current = config.select(SyncMode::Current);
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].label, "Model 3 Highland");
        assert_eq!(config.select(SyncMode::All).len(), 3);

        config.current_source = None;
        assert_eq!(
            config.current().map(|s| s.label.as_str()),
            Some("Model 3 Highland")
        );
    }

    #[test]
    fn rejects_duplicate_labels_and_unknown_current() {
        let mut config = sample();
        config.sources[1].label = config.sources[0].label.clone();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateLabel(_))
        ));

        let mut config = sample();
        config.current_source = Some("Cybertruck".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownCurrentSource(_))
        ));
    }

    #[test]
    fn rejects_template_without_placeholders() {
        let mut config = sample();
        config.url_template = "https://example.com/export.csv".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTemplate(_))
        ));
    }
}
