//! AWS session setup for delete-chef-node

use aws_config::sts::AssumeRoleProvider;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_sdk_sns::Client;
use chef_decom_core::{DEFAULT_REGION, DEFAULT_SESSION_NAME};
use tracing::{debug, info};

/// Loaded AWS configuration, optionally scoped to an assumed role
#[derive(Debug, Clone)]
pub struct Session {
    region: String,
    role_arn: Option<String>,
    sdk_config: SdkConfig,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Role the credentials are assumed from, if any
    pub fn role_arn(&self) -> Option<&str> {
        self.role_arn.as_deref()
    }

    pub fn sdk_config(&self) -> &SdkConfig {
        &self.sdk_config
    }

    /// Create an SNS client for this session
    pub fn sns_client(&self) -> Client {
        Client::new(self.sdk_config())
    }
}

/// Builder for [`Session`]
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    region: String,
    role_arn: Option<String>,
    session_name: String,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            role_arn: None,
            session_name: DEFAULT_SESSION_NAME.to_string(),
        }
    }
}

impl SessionBuilder {
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Role to assume. `None` or an empty ARN keeps the default credentials.
    pub fn role_arn(mut self, role_arn: Option<String>) -> Self {
        self.role_arn = role_arn.filter(|r| !r.is_empty());
        self
    }

    pub fn session_name(mut self, session_name: impl Into<String>) -> Self {
        self.session_name = session_name.into();
        self
    }

    /// Load the default credential chain for the region.
    ///
    /// Credentials are resolved lazily by the SDK, so nothing here talks to
    /// AWS. A bad role only surfaces on the first SNS call.
    pub async fn build(self) -> Session {
        let region = Region::new(self.region.clone());
        let base = aws_config::defaults(BehaviorVersion::latest())
            .region(region.clone())
            .load()
            .await;

        let sdk_config = match &self.role_arn {
            Some(role_arn) => {
                info!("Assuming role {} as session {}", role_arn, self.session_name);
                let provider = AssumeRoleProvider::builder(role_arn)
                    .session_name(&self.session_name)
                    .region(region)
                    .configure(&base)
                    .build()
                    .await;

                base.into_builder()
                    .credentials_provider(SharedCredentialsProvider::new(provider))
                    .build()
            }
            None => {
                debug!("Using default credential chain");
                base
            }
        };

        Session {
            region: self.region,
            role_arn: self.role_arn,
            sdk_config,
        }
    }
}
