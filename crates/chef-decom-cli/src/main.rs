//! delete-chef-node
//!
//! Announces a Chef node's removal on the `chef_server_api` SNS topic so the
//! subscriber behind it deletes the node from the Chef server.

mod notifier;
mod output;
mod pipeline;
mod publisher;
mod session;
mod settings;

use chef_decom_core::DecomError;
use clap::Parser;
use futures::FutureExt;
use notifier::SnsNotifier;
use output::OutputFormat;
use session::Session;
use settings::{Overrides, Settings};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "delete-chef-node")]
#[command(author = "Chef Decom Team")]
#[command(about = "Publish this node's name to SNS for removal from the Chef server", long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Role to assume using STS credentials
    #[arg(short = 'r', long = "role", env = "CHEF_DECOM_ROLE_ARN")]
    role: Option<String>,

    /// SNS topic ARN, skips the topic search
    #[arg(short = 't', long = "topic", env = "CHEF_DECOM_TOPIC_ARN")]
    topic: Option<String>,

    /// Node name, skips reading the Chef client configuration
    #[arg(short = 'n', long = "node", env = "CHEF_DECOM_NODE_NAME")]
    node: Option<String>,

    /// Print version
    #[arg(short = 'v', long = "version")]
    print_version: bool,

    /// Settings file path
    #[arg(short, long, env = "CHEF_DECOM_CONFIG")]
    config: Option<PathBuf>,

    /// AWS region holding the topic
    #[arg(long, env = "CHEF_DECOM_REGION")]
    region: Option<String>,

    /// Chef client configuration to read node_name from
    #[arg(long = "client-config", env = "CHEF_DECOM_CLIENT_CONFIG")]
    client_config: Option<PathBuf>,

    /// Substring identifying the topic to publish to
    #[arg(long, env = "CHEF_DECOM_TOPIC_MARKER")]
    topic_marker: Option<String>,

    /// STS session name used with --role
    #[arg(long)]
    session_name: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CHEF_DECOM_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Resolve node and topic without publishing
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            region: self.region.clone(),
            client_config_path: self.client_config.clone(),
            topic_marker: self.topic_marker.clone(),
            session_name: self.session_name.clone(),
            role_arn: self.role.clone(),
            topic_arn: self.topic.clone(),
            node_name: self.node.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if cli.print_version {
        println!("{}", chef_decom_core::version_string());
        return ExitCode::SUCCESS;
    }

    // Logs go to stderr; stdout carries only the result
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    install_panic_hook();

    let result = AssertUnwindSafe(run(cli)).catch_unwind().await;
    Report::from_run(result).emit()
}

/// Replace the default panic banner; the top-level handler prints the
/// one-line `Exception:` report instead.
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        debug!(location = ?info.location(), "panic: {}", panic_message(info.payload()));
    }));
}

/// Final state of a run: what to print and where
#[derive(Debug, PartialEq, Eq)]
enum Report {
    Success,
    /// Error text, printed on stdout
    Failure(String),
    /// Panic text, printed on stderr
    Crash(String),
}

impl Report {
    fn from_run(result: std::thread::Result<anyhow::Result<()>>) -> Self {
        match result {
            Ok(Ok(())) => Report::Success,
            Ok(Err(err)) => {
                if let Some(decom) = err.downcast_ref::<DecomError>() {
                    debug!(
                        code = decom.code(),
                        service = decom.is_service_error(),
                        "decommission failed"
                    );
                }
                Report::Failure(format!("{:#}", err))
            }
            Err(panic) => Report::Crash(format!("Exception: {}", panic_message(panic.as_ref()))),
        }
    }

    fn exit_code(&self) -> u8 {
        match self {
            Report::Success => 0,
            Report::Failure(_) | Report::Crash(_) => 1,
        }
    }

    fn emit(self) -> ExitCode {
        match &self {
            Report::Success => {}
            Report::Failure(text) => println!("{}", text),
            Report::Crash(text) => eprintln!("{}", text),
        }
        ExitCode::from(self.exit_code())
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::load(cli.config.as_deref())?.apply(cli.overrides());
    settings.validate()?;
    debug!("Settings: {:?}", settings);

    let session = Session::builder()
        .region(&settings.region)
        .role_arn(settings.role_arn.clone())
        .session_name(&settings.session_name)
        .build()
        .await;
    debug!("Session ready in {} (role: {:?})", session.region(), session.role_arn());
    let notifier = SnsNotifier::new(session.sns_client());

    let outcome = pipeline::run(&notifier, &settings, cli.dry_run).await?;
    println!("{}", output::render(&outcome, cli.output)?);

    Ok(())
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        *msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic"
    }
}
