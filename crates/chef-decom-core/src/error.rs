//! Error types for Chef Decom

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DecomError>;

#[derive(Error, Debug)]
pub enum DecomError {
    // Node identity
    #[error("Failed to read {}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("node_name not set in {}; pass -n to name the node explicitly", .path.display())]
    MissingNodeName { path: PathBuf },

    // Topic resolution
    #[error("Could not find SNS topic: {0}")]
    TopicNotFound(String),

    // Service calls
    #[error("Failed to list SNS topics: {0}")]
    ListTopics(String),

    #[error("Failed to publish message: {0}")]
    Publish(String),

    #[error("SNS accepted the message but returned no MessageId")]
    MissingMessageId,

    // Settings
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

impl DecomError {
    pub fn code(&self) -> &'static str {
        match self {
            DecomError::ConfigRead { .. } => "ConfigRead",
            DecomError::MissingNodeName { .. } => "MissingNodeName",
            DecomError::TopicNotFound(_) => "TopicNotFound",
            DecomError::ListTopics(_) => "ListTopics",
            DecomError::Publish(_) => "Publish",
            DecomError::MissingMessageId => "MissingMessageId",
            DecomError::InvalidSettings(_) => "InvalidSettings",
        }
    }

    /// True for failures raised by the notification service rather than
    /// local input.
    pub fn is_service_error(&self) -> bool {
        matches!(
            self,
            DecomError::ListTopics(_) | DecomError::Publish(_) | DecomError::MissingMessageId
        )
    }
}
