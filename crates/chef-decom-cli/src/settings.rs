//! Settings for delete-chef-node
//!
//! Optional settings file, passed with `--config` or `CHEF_DECOM_CONFIG`.
//!
//! Example settings:
//! ```toml
//! region = "us-west-2"
//! client_config_path = "/etc/chef/client.rb"
//! topic_marker = "chef_server_api"
//! role_arn = "arn:aws:iam::111111111111:role/chef-decom"
//! session_name = "delete-chef-node"
//! ```
//!
//! Flags and their environment variables win over the file.

use anyhow::{Context, Result};
use chef_decom_core::{
    DecomError, DEFAULT_CLIENT_CONFIG_PATH, DEFAULT_REGION, DEFAULT_SESSION_NAME,
    DEFAULT_TOPIC_MARKER,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// AWS region holding the SNS topic
    pub region: String,

    /// Chef client configuration holding `node_name`
    pub client_config_path: PathBuf,

    /// Substring used to pick the topic from the account's topic list
    pub topic_marker: String,

    /// STS session name when assuming a role
    pub session_name: String,

    /// IAM role to assume before talking to SNS
    pub role_arn: Option<String>,

    /// Explicit topic, skips the topic search
    pub topic_arn: Option<String>,

    /// Explicit node name, skips reading the client configuration
    pub node_name: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            client_config_path: PathBuf::from(DEFAULT_CLIENT_CONFIG_PATH),
            topic_marker: DEFAULT_TOPIC_MARKER.to_string(),
            session_name: DEFAULT_SESSION_NAME.to_string(),
            role_arn: None,
            topic_arn: None,
            node_name: None,
        }
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub region: Option<String>,
    pub client_config_path: Option<PathBuf>,
    pub topic_marker: Option<String>,
    pub session_name: Option<String>,
    pub role_arn: Option<String>,
    pub topic_arn: Option<String>,
    pub node_name: Option<String>,
}

impl Settings {
    /// Load settings from `path`, or the defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {:?}", path))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {:?}", path))?;

        Ok(settings.normalized())
    }

    /// Apply command line values on top of the loaded settings
    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(region) = non_empty(overrides.region) {
            self.region = region;
        }
        if let Some(path) = overrides.client_config_path {
            if !path.as_os_str().is_empty() {
                self.client_config_path = path;
            }
        }
        if let Some(marker) = non_empty(overrides.topic_marker) {
            self.topic_marker = marker;
        }
        if let Some(name) = non_empty(overrides.session_name) {
            self.session_name = name;
        }
        if let Some(role) = non_empty(overrides.role_arn) {
            self.role_arn = Some(role);
        }
        if let Some(topic) = non_empty(overrides.topic_arn) {
            self.topic_arn = Some(topic);
        }
        if let Some(node) = non_empty(overrides.node_name) {
            self.node_name = Some(node);
        }
        self
    }

    /// Validate settings
    pub fn validate(&self) -> chef_decom_core::Result<()> {
        if self.region.trim().is_empty() {
            return Err(DecomError::InvalidSettings("region cannot be empty".into()));
        }

        // An empty marker would match the first topic in the account
        if self.topic_marker.is_empty() {
            return Err(DecomError::InvalidSettings(
                "topic_marker cannot be empty".into(),
            ));
        }

        if self.session_name.is_empty() {
            return Err(DecomError::InvalidSettings(
                "session_name cannot be empty".into(),
            ));
        }

        Ok(())
    }

    // Empty strings in the file mean "not set", same as on the command line.
    fn normalized(mut self) -> Self {
        self.role_arn = non_empty(self.role_arn);
        self.topic_arn = non_empty(self.topic_arn);
        self.node_name = non_empty(self.node_name);
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.region, "us-west-2");
        assert_eq!(settings.client_config_path, PathBuf::from("/etc/chef/client.rb"));
        assert_eq!(settings.topic_marker, "chef_server_api");
        assert!(settings.role_arn.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_without_file() {
        assert_eq!(Settings::load(None).unwrap(), Settings::default());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "region = \"eu-central-1\"").unwrap();
        writeln!(file, "role_arn = \"arn:aws:iam::111:role/decom\"").unwrap();
        writeln!(file, "topic_arn = \"\"").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.region, "eu-central-1");
        assert_eq!(settings.role_arn.as_deref(), Some("arn:aws:iam::111:role/decom"));
        assert!(settings.topic_arn.is_none());
        assert_eq!(settings.topic_marker, "chef_server_api");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = Settings::load(Some(path.as_path())).unwrap_err();
        assert!(err.to_string().contains("Failed to read settings file"));
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "region = [").unwrap();
        assert!(Settings::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_overrides_win() {
        let settings = Settings::default().apply(Overrides {
            region: Some("us-east-1".into()),
            topic_arn: Some("arn:aws:sns:us-east-1:111:decom".into()),
            node_name: Some("web-01".into()),
            ..Default::default()
        });

        assert_eq!(settings.region, "us-east-1");
        assert_eq!(settings.topic_arn.as_deref(), Some("arn:aws:sns:us-east-1:111:decom"));
        assert_eq!(settings.node_name.as_deref(), Some("web-01"));
        assert!(settings.role_arn.is_none());
    }

    #[test]
    fn test_empty_overrides_ignored() {
        let settings = Settings::default().apply(Overrides {
            region: Some(String::new()),
            role_arn: Some(String::new()),
            node_name: Some(String::new()),
            client_config_path: Some(PathBuf::new()),
            ..Default::default()
        });
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_validate_rejects_empty_marker() {
        let mut settings = Settings::default();
        settings.topic_marker = String::new();
        let err = settings.validate().unwrap_err();
        assert_eq!(err.code(), "InvalidSettings");
    }
}
