use std::ffi::OsString;
use std::str::FromStr;
use std::sync::Arc;

use aws_sdk_s3::types::{ObjectCannedAcl, StorageClass};
use clap::Parser;
use clap::builder::{ArgPredicate, NonEmptyStringValueParser};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use fancy_regex::Regex;
#[cfg(feature = "version")]
use shadow_rs::shadow;
use std::path::PathBuf;
use tokio::sync::Semaphore;

use crate::Config;
use crate::config::args::value_parser::{canned_acl, list_file, regex, storage_class, url};
use crate::config::{
    AdmissionBoundary, CLITimeoutConfig, ClientConfig, ListSource, RetryConfig, TracingConfig,
};
use crate::types::{AccessKeys, ClientConfigLocation, S3Credentials};

mod tests;
mod value_parser;

const DEFAULT_MAX_SOCKETS: u16 = 100;
const DEFAULT_MAX_REQUESTS: u32 = 500;
const DEFAULT_MAX_LIST_BUFFER_SIZE: u32 = 10000;
const DEFAULT_MAX_KEYS: i32 = 1000;
const DEFAULT_ACL: &str = "private";
const DEFAULT_SSL_ENABLED: bool = false;
const DEFAULT_NO_ERROR_OUTPUT: bool = false;
const DEFAULT_STRICT_MAX_REQUESTS: bool = false;
const DEFAULT_AWS_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_INITIAL_BACKOFF_MILLISECONDS: u64 = 100;
const DEFAULT_FORCE_PATH_STYLE: bool = false;
const DEFAULT_DISABLE_STALLED_STREAM_PROTECTION: bool = false;
const DEFAULT_JSON_TRACING: bool = false;
const DEFAULT_AWS_SDK_TRACING: bool = false;
const DEFAULT_SPAN_EVENTS_TRACING: bool = false;
const DEFAULT_DISABLE_COLOR_TRACING: bool = false;

const SAME_BUCKET_WITHOUT_STORAGE_CLASS: &str =
    "copying a bucket onto itself requires --storage-class\n";
const SSL_ENABLED_WITH_HTTP_ENDPOINT: &str =
    "with --ssl-enabled, --endpoint-url must be https://\n";

#[cfg(feature = "version")]
shadow!(build);

#[derive(Parser, Clone, Debug)]
#[cfg_attr(feature = "version", command(version=format!("{} ({} {}), {}", build::PKG_VERSION, build::SHORT_COMMIT, build::BUILD_TARGET, build::RUST_VERSION)))]
pub struct CLIArgs {
    /// source bucket name
    #[arg(long, env, value_parser = NonEmptyStringValueParser::new(), default_value_if("auto_complete_shell", ArgPredicate::IsPresent, "ignored"), required = false, help_heading = "General")]
    source: String,

    /// target bucket name
    #[arg(long, env, value_parser = NonEmptyStringValueParser::new(), default_value_if("auto_complete_shell", ArgPredicate::IsPresent, "ignored"), required = false, help_heading = "General")]
    target: String,

    /// read the keys to copy from a newline-separated list instead of listing the source bucket.
    /// use "-" to read from standard input
    #[arg(long, env, value_name = "FILE", value_parser = list_file::check_list_file, help_heading = "General")]
    list_file: Option<String>,

    /// resume the listing strictly after this key
    #[arg(long, env, conflicts_with_all = ["list_file"], value_parser = NonEmptyStringValueParser::new(), help_heading = "General")]
    marker: Option<String>,

    /// copy only the keys that match this regular expression
    #[arg(long, env, value_parser = regex::parse_regex, help_heading = "Filtering")]
    key_match: Option<String>,

    /// location of the file that the AWS CLI uses to store configuration profiles
    #[arg(long, env, value_name = "FILE", help_heading = "AWS Configuration")]
    aws_config_file: Option<PathBuf>,

    /// location of the file that the AWS CLI uses to store access keys
    #[arg(long, env, value_name = "FILE", help_heading = "AWS Configuration")]
    aws_shared_credentials_file: Option<PathBuf>,

    /// AWS CLI profile
    #[arg(long, env, conflicts_with_all = ["access_key", "secret_access_key", "session_token"], help_heading = "AWS Configuration")]
    profile: Option<String>,

    /// access key
    #[arg(long, env, conflicts_with_all = ["profile"], requires = "secret_access_key", help_heading = "AWS Configuration")]
    access_key: Option<String>,

    /// secret access key
    #[arg(long, env, conflicts_with_all = ["profile"], requires = "access_key", help_heading = "AWS Configuration")]
    secret_access_key: Option<String>,

    /// session token
    #[arg(long, env, conflicts_with_all = ["profile"], requires = "access_key", help_heading = "AWS Configuration")]
    session_token: Option<String>,

    /// region of both buckets
    #[arg(long, env, value_parser = NonEmptyStringValueParser::new(), help_heading = "AWS Configuration")]
    region: Option<String>,

    /// endpoint url. overrides --ssl-enabled scheme selection
    #[arg(long, env, value_parser = url::check_scheme, help_heading = "AWS Configuration")]
    endpoint_url: Option<String>,

    /// force path-style addressing
    #[arg(long, env, default_value_t = DEFAULT_FORCE_PATH_STYLE, help_heading = "AWS Configuration")]
    force_path_style: bool,

    /// use https for the storage endpoint
    #[arg(long, env, default_value_t = DEFAULT_SSL_ENABLED, help_heading = "AWS Configuration")]
    ssl_enabled: bool,

    /// ACL for the copied objects
    /// valid choices: private | public-read | public-read-write | authenticated-read | aws-exec-read | bucket-owner-read | bucket-owner-full-control
    #[arg(long, env, default_value = DEFAULT_ACL, value_parser = canned_acl::parse_canned_acl, help_heading = "Copy Options")]
    acl: String,

    /// type of storage to use for the copied objects. the source storage class is kept when omitted.
    /// valid choices: STANDARD | REDUCED_REDUNDANCY | STANDARD_IA | ONEZONE_IA | INTELLIGENT_TIERING | GLACIER | DEEP_ARCHIVE | GLACIER_IR
    #[arg(long, env, value_parser = storage_class::parse_storage_class, help_heading = "Copy Options")]
    storage_class: Option<String>,

    /// do not report each failed copy
    #[arg(long, env, default_value_t = DEFAULT_NO_ERROR_OUTPUT, help_heading = "Copy Options")]
    no_error_output: bool,

    /// maximum number of concurrent connections to the storage
    #[arg(long, env, default_value_t = DEFAULT_MAX_SOCKETS, value_parser = clap::value_parser!(u16).range(1..), help_heading = "Performance")]
    max_sockets: u16,

    /// maximum number of copy requests in flight
    #[arg(long, env, default_value_t = DEFAULT_MAX_REQUESTS, value_parser = clap::value_parser!(u32).range(1..), help_heading = "Performance")]
    max_requests: u32,

    /// never exceed --max-requests copies in flight (the default allows one more)
    #[arg(long, env, default_value_t = DEFAULT_STRICT_MAX_REQUESTS, help_heading = "Performance")]
    strict_max_requests: bool,

    /// number of listed keys held in memory before the listing pauses
    #[arg(long, env, default_value_t = DEFAULT_MAX_LIST_BUFFER_SIZE, value_parser = clap::value_parser!(u32).range(1..), help_heading = "Performance")]
    max_list_buffer_size: u32,

    /// maximum number of keys returned in a single list object request (or read from the list per chunk)
    #[arg(long, env, default_value_t = DEFAULT_MAX_KEYS, value_parser = clap::value_parser!(i32).range(1..=1000), help_heading = "Performance")]
    max_keys: i32,

    /// trace verbosity(-v: show info, -vv: show debug, -vvv show trace)
    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,

    /// show trace as json format
    #[arg(long, env, default_value_t = DEFAULT_JSON_TRACING, help_heading = "Tracing/Logging")]
    json_tracing: bool,

    /// enable aws sdk tracing
    #[arg(long, env, default_value_t = DEFAULT_AWS_SDK_TRACING, help_heading = "Tracing/Logging")]
    aws_sdk_tracing: bool,

    /// show span event tracing
    #[arg(long, env, default_value_t = DEFAULT_SPAN_EVENTS_TRACING, help_heading = "Tracing/Logging")]
    span_events_tracing: bool,

    /// disable ANSI terminal colors
    #[arg(long, env, default_value_t = DEFAULT_DISABLE_COLOR_TRACING, help_heading = "Tracing/Logging")]
    disable_color_tracing: bool,

    /// maximum retry attempts of the AWS SDK retry handler
    #[arg(long, env, default_value_t = DEFAULT_AWS_MAX_ATTEMPTS, value_name = "max_attempts", help_heading = "Retry Options")]
    aws_max_attempts: u32,

    /// a multiplier value used when calculating backoff times as part of an exponential backoff with jitter strategy.
    #[arg(long, env, default_value_t = DEFAULT_INITIAL_BACKOFF_MILLISECONDS, value_name = "initial_backoff", help_heading = "Retry Options")]
    initial_backoff_milliseconds: u64,

    /// operation timeout (milliseconds). For details, see the AWS SDK for Rust TimeoutConfig documentation.
    /// The default has no timeout.
    #[arg(
        long,
        env,
        value_name = "operation_timeout",
        help_heading = "Timeout Options"
    )]
    operation_timeout_milliseconds: Option<u64>,

    /// operation attempt timeout (milliseconds). For details, see the AWS SDK for Rust TimeoutConfig documentation.
    /// The default has no timeout.
    #[arg(
        long,
        env,
        value_name = "operation_attempt_timeout",
        help_heading = "Timeout Options"
    )]
    operation_attempt_timeout_milliseconds: Option<u64>,

    /// connect timeout (milliseconds).
    /// The default has AWS SDK default timeout (Currently 3100 milliseconds).
    #[arg(
        long,
        env,
        value_name = "connect_timeout",
        help_heading = "Timeout Options"
    )]
    connect_timeout_milliseconds: Option<u64>,

    /// read timeout (milliseconds).
    /// The default has no timeout.
    #[arg(
        long,
        env,
        value_name = "read_timeout",
        help_heading = "Timeout Options"
    )]
    read_timeout_milliseconds: Option<u64>,

    /// give up a single copy after this many milliseconds and count it as failed.
    /// The default has no timeout.
    #[arg(long, env, value_name = "transfer_timeout", value_parser = clap::value_parser!(u64).range(1..), help_heading = "Timeout Options")]
    transfer_timeout_milliseconds: Option<u64>,

    /// disable stalled stream protection
    #[arg(long, env, default_value_t = DEFAULT_DISABLE_STALLED_STREAM_PROTECTION, help_heading = "Advanced")]
    disable_stalled_stream_protection: bool,

    /// generate a auto completions script. Valid values: bash, fish, zsh, powershell, elvish.
    #[arg(long, env, value_name = "SHELL", value_parser = clap_complete::shells::Shell::from_str, help_heading = "Advanced")]
    auto_complete_shell: Option<clap_complete::shells::Shell>,
}

pub fn parse_from_args<I, T>(args: I) -> Result<CLIArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    CLIArgs::try_parse_from(args)
}

pub fn build_config_from_args<I, T>(args: I) -> Result<Config, String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let config_args = CLIArgs::try_parse_from(args).map_err(|e| e.to_string())?;
    crate::Config::try_from(config_args)
}

impl CLIArgs {
    fn validate_config(&self) -> Result<(), String> {
        self.check_same_bucket_conflict()?;
        self.check_ssl_endpoint_conflict()?;

        Ok(())
    }

    fn check_same_bucket_conflict(&self) -> Result<(), String> {
        if self.auto_complete_shell.is_some() {
            return Ok(());
        }

        if self.source == self.target && self.storage_class.is_none() {
            return Err(SAME_BUCKET_WITHOUT_STORAGE_CLASS.to_string());
        }

        Ok(())
    }

    fn check_ssl_endpoint_conflict(&self) -> Result<(), String> {
        if !self.ssl_enabled {
            return Ok(());
        }

        if let Some(endpoint_url) = self.endpoint_url.as_ref() {
            if endpoint_url.starts_with("http://") {
                return Err(SSL_ENABLED_WITH_HTTP_ENDPOINT.to_string());
            }
        }

        Ok(())
    }

    fn build_credential(&self) -> S3Credentials {
        if let Some(profile) = self.profile.clone() {
            return S3Credentials::Profile(profile);
        }

        match (self.access_key.clone(), self.secret_access_key.clone()) {
            (Some(access_key), Some(secret_access_key)) => S3Credentials::Credentials {
                access_keys: AccessKeys {
                    access_key,
                    secret_access_key,
                    session_token: self.session_token.clone(),
                },
            },
            _ => S3Credentials::FromEnvironment,
        }
    }

    fn build_client_config(&self) -> ClientConfig {
        ClientConfig {
            client_config_location: ClientConfigLocation {
                aws_config_file: self.aws_config_file.clone(),
                aws_shared_credentials_file: self.aws_shared_credentials_file.clone(),
            },
            credential: self.build_credential(),
            region: self.region.clone(),
            endpoint_url: self.endpoint_url.clone(),
            force_path_style: self.force_path_style,
            ssl_enabled: self.ssl_enabled,
            retry_config: RetryConfig {
                aws_max_attempts: self.aws_max_attempts,
                initial_backoff_milliseconds: self.initial_backoff_milliseconds,
            },
            cli_timeout_config: CLITimeoutConfig {
                operation_timeout_milliseconds: self.operation_timeout_milliseconds,
                operation_attempt_timeout_milliseconds: self.operation_attempt_timeout_milliseconds,
                connect_timeout_milliseconds: self.connect_timeout_milliseconds,
                read_timeout_milliseconds: self.read_timeout_milliseconds,
            },
            disable_stalled_stream_protection: self.disable_stalled_stream_protection,
            connection_semaphore: Arc::new(Semaphore::new(self.max_sockets as usize)),
        }
    }
}

impl TryFrom<CLIArgs> for Config {
    type Error = String;

    fn try_from(value: CLIArgs) -> Result<Self, Self::Error> {
        value.validate_config()?;

        let client_config = value.build_client_config();

        let tracing_config = value.verbosity.log_level().map(|log_level| TracingConfig {
            tracing_level: log_level,
            json_tracing: value.json_tracing,
            aws_sdk_tracing: value.aws_sdk_tracing,
            span_events_tracing: value.span_events_tracing,
            disable_color_tracing: value.disable_color_tracing,
        });

        let canned_acl = ObjectCannedAcl::from_str(&value.acl).map_err(|e| e.to_string())?;

        let storage_class = value
            .storage_class
            .as_deref()
            .map(StorageClass::from_str)
            .transpose()
            .map_err(|e| e.to_string())?;

        let key_match = value
            .key_match
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| e.to_string())?;

        let list_source = value.list_file.as_deref().map(ListSource::from_arg);

        let admission_boundary = if value.strict_max_requests {
            AdmissionBoundary::Exclusive
        } else {
            AdmissionBoundary::Inclusive
        };

        Ok(Config {
            source_bucket: value.source,
            target_bucket: value.target,
            client_config,
            tracing_config,
            list_source,
            canned_acl,
            storage_class,
            max_requests: value.max_requests as usize,
            admission_boundary,
            max_list_buffer_size: value.max_list_buffer_size as usize,
            max_keys: value.max_keys,
            key_match,
            marker: value.marker,
            no_error_output: value.no_error_output,
            transfer_timeout_milliseconds: value.transfer_timeout_milliseconds,
            auto_complete_shell: value.auto_complete_shell,
        })
    }
}
