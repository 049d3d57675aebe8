//! SNS topic resolution

use crate::error::{DecomError, Result};
use tracing::debug;

/// Return the first ARN, in list order, that contains `marker`
pub fn find_topic<S: AsRef<str>>(arns: &[S], marker: &str) -> Result<String> {
    arns.iter()
        .map(AsRef::as_ref)
        .find(|arn| arn.contains(marker))
        .map(str::to_string)
        .ok_or_else(|| DecomError::TopicNotFound(marker.to_string()))
}

/// Pick the topic to publish to.
///
/// A non-empty `explicit` ARN is used verbatim and the list is never
/// searched. It is not checked against the list or the marker.
pub fn resolve_topic<S: AsRef<str>>(
    explicit: Option<&str>,
    arns: &[S],
    marker: &str,
) -> Result<String> {
    match explicit.filter(|arn| !arn.is_empty()) {
        Some(arn) => {
            debug!("Using topic override {}", arn);
            Ok(arn.to_string())
        }
        None => find_topic(arns, marker),
    }
}
