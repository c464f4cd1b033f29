use std::time::Duration;

use aws_config::meta::region::{ProvideRegion, RegionProviderChain};
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, ConfigLoader};
use aws_runtime::env_config::file::{EnvConfigFileKind, EnvConfigFiles};
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Builder;
use aws_smithy_runtime_api::client::stalled_stream_protection::StalledStreamProtectionConfig;
use aws_smithy_types::timeout::TimeoutConfig;
use aws_types::SdkConfig;
use aws_types::region::Region;
use tracing::debug;

use crate::config::ClientConfig;
use crate::types::S3Credentials;

impl ClientConfig {
    pub async fn create_client(&self) -> Client {
        let sdk_config = self.load_sdk_config().await;

        let mut config_builder =
            Builder::from(&sdk_config).force_path_style(self.force_path_style);

        if let Some(endpoint_url) = self.resolve_endpoint_url(sdk_config.region()) {
            debug!(endpoint_url = endpoint_url, "storage endpoint resolved.");
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        if let Some(timeout_config) = self.build_timeout_config() {
            config_builder = config_builder.timeout_config(timeout_config);
        }

        Client::from_conf(config_builder.build())
    }

    async fn load_sdk_config(&self) -> SdkConfig {
        let config_loader = if self.disable_stalled_stream_protection {
            aws_config::defaults(BehaviorVersion::latest())
                .stalled_stream_protection(StalledStreamProtectionConfig::disabled())
        } else {
            aws_config::defaults(BehaviorVersion::latest())
                .stalled_stream_protection(StalledStreamProtectionConfig::enabled().build())
        };

        self.load_config_credential(config_loader)
            .region(self.build_region_provider())
            .retry_config(self.build_retry_config())
            .load()
            .await
    }

    /// An explicit endpoint always wins. Without one, plain HTTP is selected
    /// unless TLS is enabled, in which case the SDK default endpoint is kept.
    fn resolve_endpoint_url(&self, region: Option<&Region>) -> Option<String> {
        if let Some(endpoint_url) = &self.endpoint_url {
            return Some(endpoint_url.to_string());
        }

        if self.ssl_enabled {
            return None;
        }

        region.map(|region| format!("http://s3.{region}.amazonaws.com"))
    }

    fn load_config_credential(&self, mut config_loader: ConfigLoader) -> ConfigLoader {
        match &self.credential {
            S3Credentials::Credentials { access_keys } => {
                let credentials = aws_sdk_s3::config::Credentials::new(
                    access_keys.access_key.to_string(),
                    access_keys.secret_access_key.to_string(),
                    access_keys.session_token.clone(),
                    None,
                    "",
                );
                config_loader = config_loader.credentials_provider(credentials);
            }
            S3Credentials::Profile(profile_name) => {
                let mut builder = aws_config::profile::ProfileFileCredentialsProvider::builder();

                if let Some(aws_shared_credentials_file) = self
                    .client_config_location
                    .aws_shared_credentials_file
                    .as_ref()
                {
                    let profile_files = EnvConfigFiles::builder()
                        .with_file(EnvConfigFileKind::Credentials, aws_shared_credentials_file)
                        .build();
                    builder = builder.profile_files(profile_files)
                }

                config_loader =
                    config_loader.credentials_provider(builder.profile_name(profile_name).build());
            }
            S3Credentials::FromEnvironment => {}
        }
        config_loader
    }

    fn build_region_provider(&self) -> Box<dyn ProvideRegion> {
        let mut builder = aws_config::profile::ProfileFileRegionProvider::builder();

        if let S3Credentials::Profile(profile_name) = &self.credential {
            if let Some(aws_config_file) = self.client_config_location.aws_config_file.as_ref() {
                let profile_files = EnvConfigFiles::builder()
                    .with_file(EnvConfigFileKind::Config, aws_config_file)
                    .build();
                builder = builder.profile_files(profile_files);
            }
            builder = builder.profile_name(profile_name)
        }

        let provider_region = if matches!(&self.credential, S3Credentials::FromEnvironment) {
            RegionProviderChain::first_try(self.region.clone().map(Region::new))
                .or_default_provider()
        } else {
            RegionProviderChain::first_try(self.region.clone().map(Region::new))
                .or_else(builder.build())
        };

        Box::new(provider_region)
    }

    fn build_retry_config(&self) -> RetryConfig {
        RetryConfig::standard()
            .with_max_attempts(self.retry_config.aws_max_attempts)
            .with_initial_backoff(Duration::from_millis(
                self.retry_config.initial_backoff_milliseconds,
            ))
    }

    fn build_timeout_config(&self) -> Option<TimeoutConfig> {
        let timeouts = &self.cli_timeout_config;
        let operation_timeout = timeouts
            .operation_timeout_milliseconds
            .map(Duration::from_millis);
        let operation_attempt_timeout = timeouts
            .operation_attempt_timeout_milliseconds
            .map(Duration::from_millis);
        let connect_timeout = timeouts
            .connect_timeout_milliseconds
            .map(Duration::from_millis);
        let read_timeout = timeouts.read_timeout_milliseconds.map(Duration::from_millis);

        // Setting every timeout to None would drop the SDK defaults.
        if operation_timeout.is_none()
            && operation_attempt_timeout.is_none()
            && connect_timeout.is_none()
            && read_timeout.is_none()
        {
            return None;
        }

        let mut builder = TimeoutConfig::builder();
        if let Some(operation_timeout) = operation_timeout {
            builder = builder.operation_timeout(operation_timeout);
        }
        if let Some(operation_attempt_timeout) = operation_attempt_timeout {
            builder = builder.operation_attempt_timeout(operation_attempt_timeout);
        }
        if let Some(connect_timeout) = connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(read_timeout) = read_timeout {
            builder = builder.read_timeout(read_timeout);
        }

        Some(builder.build())
    }
}
