use std::fmt;
use std::fmt::{Debug, Formatter};
use std::path::PathBuf;
use std::time::Duration;

use aws_sdk_s3::types::Object;
use zeroize_derive::{Zeroize, ZeroizeOnDrop};

pub mod error;
pub mod token;

/// Storage class assumed for keys read from a list, where no listing metadata is available.
pub const LIST_READER_STORAGE_CLASS: &str = "STANDARD";

const BITS_PER_BYTE: f64 = 8.0;
const BYTES_PER_MEGABIT: f64 = 1024.0 * 1024.0;

/// One object to be copied from the source bucket to the target bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferTask {
    pub key: String,
    pub size_bytes: u64,
    pub storage_class_hint: Option<String>,
}

impl TransferTask {
    pub fn new(key: &str, size_bytes: u64, storage_class_hint: Option<&str>) -> Self {
        Self {
            key: key.to_string(),
            size_bytes,
            storage_class_hint: storage_class_hint.map(|class| class.to_string()),
        }
    }

    /// Builds a task from a `ListObjectsV2` entry. Entries without a key are ignored.
    pub fn from_listed_object(object: &Object) -> Option<Self> {
        let key = object.key()?;
        let size_bytes = object
            .size()
            .and_then(|size| u64::try_from(size).ok())
            .unwrap_or_default();

        Some(Self::new(
            key,
            size_bytes,
            object.storage_class().map(|class| class.as_str()),
        ))
    }

    /// Builds a task from one line of an external key list.
    /// Size is unknown in that mode and is recorded as zero.
    pub fn from_list_line(line: &str) -> Self {
        Self::new(line, 0, Some(LIST_READER_STORAGE_CLASS))
    }
}

/// Position of the source enumeration.
///
/// `After(key)` means the next listing request asks for keys strictly after `key`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EnumerationCursor {
    #[default]
    Start,
    After(String),
    Exhausted,
}

impl EnumerationCursor {
    pub fn from_marker(marker: Option<String>) -> Self {
        match marker {
            Some(marker) if !marker.is_empty() => EnumerationCursor::After(marker),
            _ => EnumerationCursor::Start,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, EnumerationCursor::Exhausted)
    }

    pub fn start_after(&self) -> Option<&str> {
        match self {
            EnumerationCursor::After(key) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Display for EnumerationCursor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EnumerationCursor::Start => write!(f, "(start)"),
            EnumerationCursor::After(key) => write!(f, "{key}"),
            EnumerationCursor::Exhausted => write!(f, "(exhausted)"),
        }
    }
}

/// A single page of objects as returned by the storage listing call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectPage {
    pub objects: Vec<TransferTask>,
    pub is_truncated: bool,
}

/// Candidates produced by one enumeration fetch, before key filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumeratedBatch {
    pub candidates: Vec<TransferTask>,
    pub next_cursor: EnumerationCursor,
}

/// Point-in-time view of the run, published once per second and at shutdown.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub elapsed: Duration,
    pub queue_depth: usize,
    pub in_flight: usize,
    pub succeeded: u64,
    pub failed: u64,
    pub bytes_transferred: u64,
    pub cursor: EnumerationCursor,
    pub is_final: bool,
}

impl ProgressSnapshot {
    pub fn completed(&self) -> u64 {
        self.succeeded + self.failed
    }

    pub fn bytes_per_sec(&self) -> f64 {
        per_sec(self.bytes_transferred as f64, self.elapsed)
    }

    pub fn megabits_per_sec(&self) -> f64 {
        per_sec(
            self.bytes_transferred as f64 * BITS_PER_BYTE / BYTES_PER_MEGABIT,
            self.elapsed,
        )
    }

    /// Successfully copied objects per second.
    pub fn objects_per_sec(&self) -> f64 {
        per_sec(self.succeeded as f64, self.elapsed)
    }
}

fn per_sec(value: f64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }

    value / secs
}

#[derive(Debug, Clone)]
pub struct ClientConfigLocation {
    pub aws_config_file: Option<PathBuf>,
    pub aws_shared_credentials_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub enum S3Credentials {
    Profile(String),
    Credentials { access_keys: AccessKeys },
    FromEnvironment,
}

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AccessKeys {
    pub access_key: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Debug for AccessKeys {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut keys = f.debug_struct("AccessKeys");
        let session_token = self
            .session_token
            .as_ref()
            .map_or("None", |_| "** redacted **");
        keys.field("access_key", &self.access_key)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &session_token);
        keys.finish()
    }
}
