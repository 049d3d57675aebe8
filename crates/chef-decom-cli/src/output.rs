//! Result rendering

use crate::pipeline::Outcome;
use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

/// Output format for the result line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Serialize)]
struct JsonResult<'a> {
    node_name: &'a str,
    topic_arn: &'a str,
    message_id: Option<&'a str>,
    dry_run: bool,
}

/// Render the outcome of a run for stdout
pub fn render(outcome: &Outcome, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(match outcome {
            Outcome::Published(receipt) => receipt.summary(),
            Outcome::DryRun(decom) => {
                format!("(dryrun) publish: {} -> {}", decom.node_name, decom.topic_arn)
            }
        }),
        OutputFormat::Json => {
            let result = match outcome {
                Outcome::Published(receipt) => JsonResult {
                    node_name: &receipt.node_name,
                    topic_arn: &receipt.topic_arn,
                    message_id: Some(&receipt.message_id),
                    dry_run: false,
                },
                Outcome::DryRun(decom) => JsonResult {
                    node_name: &decom.node_name,
                    topic_arn: &decom.topic_arn,
                    message_id: None,
                    dry_run: true,
                },
            };
            Ok(serde_json::to_string_pretty(&result)?)
        }
    }
}
