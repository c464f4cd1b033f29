use std::path::PathBuf;
use std::sync::Arc;

use aws_sdk_s3::types::{ObjectCannedAcl, StorageClass};
use fancy_regex::Regex;
use tokio::sync::Semaphore;

use crate::types::{ClientConfigLocation, EnumerationCursor, S3Credentials};

pub mod args;

#[derive(Debug, Clone)]
pub struct Config {
    pub source_bucket: String,
    pub target_bucket: String,
    pub client_config: ClientConfig,
    pub tracing_config: Option<TracingConfig>,
    pub list_source: Option<ListSource>,
    pub canned_acl: ObjectCannedAcl,
    pub storage_class: Option<StorageClass>,
    pub max_requests: usize,
    pub admission_boundary: AdmissionBoundary,
    pub max_list_buffer_size: usize,
    pub max_keys: i32,
    pub key_match: Option<Regex>,
    pub marker: Option<String>,
    pub no_error_output: bool,
    pub transfer_timeout_milliseconds: Option<u64>,
    pub auto_complete_shell: Option<clap_complete::shells::Shell>,
}

impl Config {
    /// Cursor the enumeration starts from. A marker only applies to a remote listing.
    pub fn initial_cursor(&self) -> EnumerationCursor {
        if self.list_source.is_some() {
            return EnumerationCursor::Start;
        }

        EnumerationCursor::from_marker(self.marker.clone())
    }
}

/// Where the keys come from when a list is supplied instead of a remote listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSource {
    Stdin,
    File(PathBuf),
}

impl ListSource {
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            ListSource::Stdin
        } else {
            ListSource::File(PathBuf::from(arg))
        }
    }
}

/// How `max_requests` bounds the number of in-flight transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdmissionBoundary {
    /// Admit while `in_flight <= max_requests`, allowing up to `max_requests + 1` transfers.
    #[default]
    Inclusive,
    /// Admit while `in_flight < max_requests`.
    Exclusive,
}

impl AdmissionBoundary {
    pub fn admits(&self, in_flight: usize, max_requests: usize) -> bool {
        match self {
            AdmissionBoundary::Inclusive => in_flight <= max_requests,
            AdmissionBoundary::Exclusive => in_flight < max_requests,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub client_config_location: ClientConfigLocation,
    pub credential: S3Credentials,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    pub ssl_enabled: bool,
    pub retry_config: RetryConfig,
    pub cli_timeout_config: CLITimeoutConfig,
    pub disable_stalled_stream_protection: bool,
    pub connection_semaphore: Arc<Semaphore>,
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub aws_max_attempts: u32,
    pub initial_backoff_milliseconds: u64,
}

#[derive(Debug, Clone)]
pub struct CLITimeoutConfig {
    pub operation_timeout_milliseconds: Option<u64>,
    pub operation_attempt_timeout_milliseconds: Option<u64>,
    pub connect_timeout_milliseconds: Option<u64>,
    pub read_timeout_milliseconds: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
pub struct TracingConfig {
    pub tracing_level: log::Level,
    pub json_tracing: bool,
    pub aws_sdk_tracing: bool,
    pub span_events_tracing: bool,
    pub disable_color_tracing: bool,
}
