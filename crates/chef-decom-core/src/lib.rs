//! Chef Decom Core Library
//!
//! Node identity and notification topic resolution for decommissioning
//! Chef-managed nodes.

pub mod client_config;
pub mod error;
pub mod topic;

pub use client_config::{resolve_node_name, ClientConfig};
pub use error::{DecomError, Result};
pub use topic::{find_topic, resolve_topic};

/// Chef Decom version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Region the SNS topics live in unless configured otherwise
pub const DEFAULT_REGION: &str = "us-west-2";

/// Chef client configuration written at provisioning time
pub const DEFAULT_CLIENT_CONFIG_PATH: &str = "/etc/chef/client.rb";

/// Key in the client configuration that holds the node identity
pub const NODE_NAME_KEY: &str = "node_name";

/// Substring identifying the Chef server API topic
pub const DEFAULT_TOPIC_MARKER: &str = "chef_server_api";

/// STS session name used when assuming a role
pub const DEFAULT_SESSION_NAME: &str = "delete-chef-node";

/// Version line printed by `-v`
pub fn version_string() -> String {
    format!("Version v{}", VERSION)
}
