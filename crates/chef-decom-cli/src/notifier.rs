//! Notification service seam

use async_trait::async_trait;
use aws_sdk_sns::error::DisplayErrorContext;
use aws_sdk_sns::Client;
use chef_decom_core::{DecomError, Result};
use tracing::debug;

/// The two SNS operations the decommission pipeline needs
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Every topic ARN visible to the caller, in service order
    async fn list_topics(&self) -> Result<Vec<String>>;

    /// Publish `message` to `topic_arn`, returning the message id
    async fn publish(&self, topic_arn: &str, message: &str) -> Result<String>;
}

/// SNS-backed notification service
pub struct SnsNotifier {
    client: Client,
}

impl SnsNotifier {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationService for SnsNotifier {
    async fn list_topics(&self) -> Result<Vec<String>> {
        let mut arns = Vec::new();
        let mut next_token: Option<String> = None;
        let mut pages = 0;

        loop {
            let resp = self
                .client
                .list_topics()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| DecomError::ListTopics(DisplayErrorContext(&e).to_string()))?;
            pages += 1;

            arns.extend(
                resp.topics()
                    .iter()
                    .filter_map(|topic| topic.topic_arn())
                    .map(str::to_string),
            );

            match resp.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!("Listed {} topics over {} page(s)", arns.len(), pages);
        Ok(arns)
    }

    async fn publish(&self, topic_arn: &str, message: &str) -> Result<String> {
        let resp = self
            .client
            .publish()
            .topic_arn(topic_arn)
            .message(message)
            .send()
            .await
            .map_err(|e| DecomError::Publish(DisplayErrorContext(&e).to_string()))?;

        resp.message_id()
            .map(str::to_string)
            .ok_or(DecomError::MissingMessageId)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_sns::operation::list_topics::{ListTopicsError, ListTopicsOutput};
    use aws_sdk_sns::operation::publish::{PublishError, PublishOutput};
    use aws_sdk_sns::types::error::{AuthorizationErrorException, InternalErrorException};
    use aws_sdk_sns::types::Topic;
    use aws_smithy_mocks::{mock, mock_client, RuleMode};

    fn page(arns: &[&str], next_token: Option<&str>) -> ListTopicsOutput {
        let mut builder = ListTopicsOutput::builder();
        for arn in arns {
            builder = builder.topics(Topic::builder().topic_arn(*arn).build());
        }
        builder.set_next_token(next_token.map(str::to_string)).build()
    }

    #[tokio::test]
    async fn test_list_topics_follows_next_token() {
        let first = mock!(Client::list_topics)
            .match_requests(|req| req.next_token().is_none())
            .then_output(|| page(&["arn:aws:sns:us-west-2:111:other"], Some("page-2")));
        let second = mock!(Client::list_topics)
            .match_requests(|req| req.next_token() == Some("page-2"))
            .then_output(|| page(&["arn:aws:sns:us-west-2:111:chef_server_api"], None));
        let client = mock_client!(aws_sdk_sns, RuleMode::Sequential, [&first, &second]);

        let arns = SnsNotifier::new(client).list_topics().await.unwrap();

        assert_eq!(
            arns,
            vec![
                "arn:aws:sns:us-west-2:111:other".to_string(),
                "arn:aws:sns:us-west-2:111:chef_server_api".to_string(),
            ]
        );
        assert_eq!(first.num_calls(), 1);
        assert_eq!(second.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_list_topics_stops_on_empty_token() {
        let only = mock!(Client::list_topics)
            .then_output(|| page(&["arn:aws:sns:us-west-2:111:chef_server_api"], Some("")));
        let client = mock_client!(aws_sdk_sns, [&only]);

        let arns = SnsNotifier::new(client).list_topics().await.unwrap();

        assert_eq!(arns, vec!["arn:aws:sns:us-west-2:111:chef_server_api".to_string()]);
        assert_eq!(only.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_list_topics_service_error() {
        let denied = mock!(Client::list_topics).then_error(|| {
            ListTopicsError::AuthorizationErrorException(
                AuthorizationErrorException::builder()
                    .message("not authorized")
                    .build(),
            )
        });
        let client = mock_client!(aws_sdk_sns, [&denied]);

        let err = SnsNotifier::new(client).list_topics().await.unwrap_err();

        assert!(matches!(err, DecomError::ListTopics(_)));
    }

    #[tokio::test]
    async fn test_publish_returns_message_id() {
        let accepted = mock!(Client::publish)
            .match_requests(|req| {
                req.topic_arn() == Some("arn:aws:sns:us-west-2:111:chef_server_api")
                    && req.message() == Some("web-01.example.com")
            })
            .then_output(|| PublishOutput::builder().message_id("abc-123").build());
        let client = mock_client!(aws_sdk_sns, [&accepted]);

        let id = SnsNotifier::new(client)
            .publish("arn:aws:sns:us-west-2:111:chef_server_api", "web-01.example.com")
            .await
            .unwrap();

        assert_eq!(id, "abc-123");
        assert_eq!(accepted.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_publish_without_message_id() {
        let accepted = mock!(Client::publish).then_output(|| PublishOutput::builder().build());
        let client = mock_client!(aws_sdk_sns, [&accepted]);

        let err = SnsNotifier::new(client)
            .publish("arn:aws:sns:us-west-2:111:chef_server_api", "web-01")
            .await
            .unwrap_err();

        assert!(matches!(err, DecomError::MissingMessageId));
    }

    #[tokio::test]
    async fn test_publish_service_error() {
        let failing = mock!(Client::publish).then_error(|| {
            PublishError::InternalErrorException(
                InternalErrorException::builder().message("try again").build(),
            )
        });
        let client = mock_client!(aws_sdk_sns, [&failing]);

        let err = SnsNotifier::new(client)
            .publish("arn:aws:sns:us-west-2:111:chef_server_api", "web-01")
            .await
            .unwrap_err();

        assert!(matches!(err, DecomError::Publish(_)));
    }
}
