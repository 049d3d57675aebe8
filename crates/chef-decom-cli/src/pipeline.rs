//! Decommission pipeline
//!
//! list topics -> resolve topic -> resolve node -> publish. Every step runs
//! once, in order, and the first failure ends the run.

use crate::notifier::NotificationService;
use crate::publisher::{Decommission, PublishReceipt, Publisher};
use crate::settings::Settings;
use chef_decom_core::{resolve_node_name, resolve_topic, Result};
use tracing::info;

/// What a run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Published(PublishReceipt),
    DryRun(Decommission),
}

/// Resolve the node and topic, then publish unless `dry_run` is set
pub async fn run(
    service: &dyn NotificationService,
    settings: &Settings,
    dry_run: bool,
) -> Result<Outcome> {
    // Listed even when a topic override is given
    let topics = service.list_topics().await?;
    info!("Found {} SNS topics", topics.len());

    let topic_arn = resolve_topic(
        settings.topic_arn.as_deref(),
        &topics,
        &settings.topic_marker,
    )?;
    let node_name = resolve_node_name(
        settings.node_name.as_deref(),
        &settings.client_config_path,
    )?;

    let decommission = Decommission {
        node_name,
        topic_arn,
    };

    if dry_run {
        info!("Dry run, not publishing");
        return Ok(Outcome::DryRun(decommission));
    }

    let receipt = Publisher::new(service).publish(decommission).await?;
    Ok(Outcome::Published(receipt))
}
