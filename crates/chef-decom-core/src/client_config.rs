//! Chef client configuration reader
//!
//! `client.rb` is Ruby, but the lines written at provisioning time are flat
//! `key value` pairs:
//!
//! ```text
//! node_name 'web-01.example.com'
//! chef_environment 'prod'
//! ```
//!
//! Only that shape is understood. Anything else on a line after the value is
//! ignored.

use crate::error::{DecomError, Result};
use crate::NODE_NAME_KEY;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Parsed key/value view of a Chef client configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    values: HashMap<String, String>,
}

impl ClientConfig {
    /// Parse raw file contents.
    ///
    /// Every `'` in a value is removed, wherever it appears. Keys are kept
    /// as written. A later line wins over an earlier one with the same key.
    pub fn parse(content: &[u8]) -> Self {
        let text = String::from_utf8_lossy(content);
        let mut values = HashMap::new();

        for line in text.split('\n') {
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace();
            let (Some(key), Some(value)) = (fields.next(), fields.next()) else {
                continue;
            };

            values.insert(key.to_string(), value.replace('\'', ""));
        }

        Self { values }
    }

    /// Read and parse the file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path).map_err(|source| DecomError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::parse(&content);
        debug!("Read {} entries from {:?}", config.len(), path);
        Ok(config)
    }

    /// Look up a field
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Node name registered with the Chef server, or `""` when the file
    /// does not set one.
    pub fn node_name(&self) -> &str {
        self.get(NODE_NAME_KEY).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Pick the node to decommission.
///
/// A non-empty `explicit` name is used as-is and `path` is never read.
/// Otherwise the name comes from the client configuration at `path`, and a
/// file without `node_name` is an error rather than an empty message.
pub fn resolve_node_name(explicit: Option<&str>, path: &Path) -> Result<String> {
    if let Some(name) = explicit.filter(|name| !name.is_empty()) {
        debug!("Using node name override {}", name);
        return Ok(name.to_string());
    }

    match ClientConfig::load(path)?.node_name() {
        "" => Err(DecomError::MissingNodeName {
            path: path.to_path_buf(),
        }),
        name => Ok(name.to_string()),
    }
}
