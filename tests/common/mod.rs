#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
#[cfg(feature = "e2e_test")]
use aws_sdk_s3::client::Client;
use aws_sdk_s3::operation::copy_object::CopyObjectOutput;
use aws_sdk_s3::types::StorageClass;
use once_cell::sync::Lazy;
use tokio::sync::Semaphore;
use uuid::Uuid;

use s3bulkcopy::Config;
use s3bulkcopy::config::args::parse_from_args;
use s3bulkcopy::storage::StorageTrait;
use s3bulkcopy::types::{ObjectPage, TransferTask};

#[cfg(feature = "e2e_test")]
use aws_config::meta::region::{ProvideRegion, RegionProviderChain};
#[cfg(feature = "e2e_test")]
use aws_config::{BehaviorVersion, ConfigLoader};
#[cfg(feature = "e2e_test")]
use aws_sdk_s3::config::Builder;
#[cfg(feature = "e2e_test")]
use aws_sdk_s3::primitives::ByteStream;
#[cfg(feature = "e2e_test")]
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration, Object};
#[cfg(feature = "e2e_test")]
use aws_types::SdkConfig;

pub const REGION: &str = "ap-northeast-1";

pub static BUCKET1: Lazy<String> = Lazy::new(|| format!("bucket1-{}", Uuid::new_v4()));
pub static BUCKET2: Lazy<String> = Lazy::new(|| format!("bucket2-{}", Uuid::new_v4()));

pub static SEMAPHORE: Lazy<Arc<Semaphore>> = Lazy::new(|| Arc::new(Semaphore::new(1)));

pub const SLEEP_SECS_AFTER_DELETE_BUCKET: u64 = 10;

const PROFILE_NAME: &str = "s3bulkcopy-e2e-test";

/// What an [`InMemoryStorage`] has been asked to do.
#[derive(Debug, Default)]
pub struct StorageLog {
    pub list_requests: Vec<Option<String>>,
    pub copied: Vec<(String, Option<StorageClass>)>,
    pub failed: Vec<String>,
    pub in_flight: usize,
    pub max_in_flight: usize,
}

/// A source bucket held in memory. Keys are listed in lexicographic order, like S3.
#[derive(Clone)]
pub struct InMemoryStorage {
    objects: Arc<Vec<TransferTask>>,
    fail_listing_at: Option<usize>,
    fail_keys: Arc<HashSet<String>>,
    copy_delay: Duration,
    log: Arc<Mutex<StorageLog>>,
}

impl InMemoryStorage {
    pub fn new(objects: &[(&str, u64)]) -> Self {
        let mut objects: Vec<_> = objects
            .iter()
            .map(|(key, size)| TransferTask::new(key, *size, Some("STANDARD")))
            .collect();
        objects.sort_by(|a, b| a.key.cmp(&b.key));

        Self {
            objects: Arc::new(objects),
            fail_listing_at: None,
            fail_keys: Arc::new(HashSet::new()),
            copy_delay: Duration::ZERO,
            log: Arc::new(Mutex::new(StorageLog::default())),
        }
    }

    pub fn with_numbered_objects(count: usize, size: u64) -> Self {
        let keys: Vec<_> = (0..count).map(|i| format!("data{i:05}")).collect();
        let objects: Vec<_> = keys.iter().map(|key| (key.as_str(), size)).collect();

        Self::new(&objects)
    }

    /// The listing call with this zero-based index fails.
    pub fn fail_listing_at(mut self, index: usize) -> Self {
        self.fail_listing_at = Some(index);
        self
    }

    pub fn fail_keys(mut self, keys: &[&str]) -> Self {
        self.fail_keys = Arc::new(keys.iter().map(|key| key.to_string()).collect());
        self
    }

    pub fn copy_delay(mut self, copy_delay: Duration) -> Self {
        self.copy_delay = copy_delay;
        self
    }

    pub fn log(&self) -> Arc<Mutex<StorageLog>> {
        self.log.clone()
    }
}

#[async_trait]
impl StorageTrait for InMemoryStorage {
    async fn list_objects(&self, start_after: Option<&str>, max_keys: i32) -> Result<ObjectPage> {
        let index = {
            let mut log = self.log.lock().unwrap();
            log.list_requests.push(start_after.map(|key| key.to_string()));
            log.list_requests.len() - 1
        };

        if self.fail_listing_at == Some(index) {
            return Err(anyhow!("list objects failed."));
        }

        let remaining: Vec<_> = self
            .objects
            .iter()
            .filter(|object| start_after.is_none_or(|start_after| start_after < object.key.as_str()))
            .collect();

        let objects: Vec<_> = remaining
            .iter()
            .take(max_keys as usize)
            .map(|object| (*object).clone())
            .collect();

        Ok(ObjectPage {
            is_truncated: objects.len() < remaining.len(),
            objects,
        })
    }

    async fn copy_object(
        &self,
        task: &TransferTask,
        storage_class: Option<StorageClass>,
    ) -> Result<CopyObjectOutput> {
        {
            let mut log = self.log.lock().unwrap();
            log.in_flight += 1;
            log.max_in_flight = log.max_in_flight.max(log.in_flight);
        }

        tokio::time::sleep(self.copy_delay).await;

        let mut log = self.log.lock().unwrap();
        log.in_flight -= 1;

        if self.fail_keys.contains(&task.key) {
            log.failed.push(task.key.clone());
            return Err(anyhow!("access denied."));
        }

        log.copied.push((task.key.clone(), storage_class));
        Ok(CopyObjectOutput::builder().build())
    }
}

pub fn build_config(extra_args: &[&str]) -> Config {
    let mut args = vec![
        "s3bulkcopy",
        "--source",
        "source-bucket",
        "--target",
        "target-bucket",
    ];
    args.extend_from_slice(extra_args);

    Config::try_from(parse_from_args(args).unwrap()).unwrap()
}

pub fn init_dummy_tracing_subscriber() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("dummy=trace")
        .try_init();
}

#[cfg(feature = "e2e_test")]
pub struct TestHelper {
    client: Client,
}

#[cfg(feature = "e2e_test")]
impl TestHelper {
    pub async fn new() -> Self {
        Self {
            client: Self::create_client().await,
        }
    }

    pub async fn create_client() -> Client {
        Client::from_conf(Builder::from(&Self::load_sdk_config().await).build())
    }

    async fn load_sdk_config() -> SdkConfig {
        let config_loader =
            Self::load_config_credential(aws_config::defaults(BehaviorVersion::latest()))
                .region(Self::build_provider_region());

        config_loader.load().await
    }

    fn load_config_credential(config_loader: ConfigLoader) -> ConfigLoader {
        let builder = aws_config::profile::ProfileFileCredentialsProvider::builder();

        config_loader.credentials_provider(builder.profile_name(PROFILE_NAME).build())
    }

    fn build_provider_region() -> Box<dyn ProvideRegion> {
        let builder =
            aws_config::profile::ProfileFileRegionProvider::builder().profile_name(PROFILE_NAME);

        Box::new(RegionProviderChain::first_try(builder.build()))
    }

    pub fn profile_name() -> &'static str {
        PROFILE_NAME
    }

    pub async fn create_bucket(&self, bucket: &str, region: &str) {
        let constraint = BucketLocationConstraint::from(region);
        let cfg = CreateBucketConfiguration::builder()
            .location_constraint(constraint)
            .build();

        self.client
            .create_bucket()
            .create_bucket_configuration(cfg)
            .bucket(bucket)
            .send()
            .await
            .unwrap();
    }

    pub async fn is_bucket_exist(&self, bucket: &str) -> bool {
        let head_bucket_result = self.client.head_bucket().bucket(bucket).send().await;

        if head_bucket_result.is_ok() {
            return true;
        }

        !head_bucket_result
            .err()
            .unwrap()
            .into_service_error()
            .is_not_found()
    }

    pub async fn delete_bucket_with_cascade(&self, bucket: &str) {
        if !self.is_bucket_exist(bucket).await {
            return;
        }

        self.delete_all_objects(bucket).await;

        let _ = self.client.delete_bucket().bucket(bucket).send().await;

        tokio::time::sleep(Duration::from_secs(SLEEP_SECS_AFTER_DELETE_BUCKET)).await;
    }

    pub async fn list_objects(&self, bucket: &str) -> Vec<Object> {
        let list_objects_output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .send()
            .await
            .unwrap();

        list_objects_output.contents().to_vec()
    }

    pub async fn put_sized_object(&self, bucket: &str, key: &str, size: usize) {
        let buffer = vec![0_u8; size];

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(buffer))
            .send()
            .await
            .unwrap();
    }

    pub async fn delete_all_objects(&self, bucket: &str) {
        for object in self.list_objects(bucket).await {
            self.client
                .delete_object()
                .bucket(bucket)
                .key(object.key().unwrap())
                .send()
                .await
                .unwrap();
        }
    }
}
