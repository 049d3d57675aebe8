//! Decommission notice publishing

use crate::notifier::NotificationService;
use chef_decom_core::Result;
use serde::Serialize;
use tracing::info;

/// A node and the topic its removal is announced on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decommission {
    pub node_name: String,
    pub topic_arn: String,
}

/// Confirmation that SNS accepted the notice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishReceipt {
    pub node_name: String,
    pub topic_arn: String,
    pub message_id: String,
}

impl PublishReceipt {
    pub fn summary(&self) -> String {
        format!("Message Published Successfully, MessageId: {}", self.message_id)
    }
}

/// Sends exactly one message per decommission. No retries.
pub struct Publisher<'a> {
    service: &'a dyn NotificationService,
}

impl<'a> Publisher<'a> {
    pub fn new(service: &'a dyn NotificationService) -> Self {
        Self { service }
    }

    /// Publish the node name as the message body
    pub async fn publish(&self, decommission: Decommission) -> Result<PublishReceipt> {
        info!(
            "Publishing decommission of {} to {}",
            decommission.node_name, decommission.topic_arn
        );

        let message_id = self
            .service
            .publish(&decommission.topic_arn, &decommission.node_name)
            .await?;

        info!("SNS accepted message {}", message_id);

        Ok(PublishReceipt {
            node_name: decommission.node_name,
            topic_arn: decommission.topic_arn,
            message_id,
        })
    }
}
