use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use daybook_shared::{
    decode_surface_file, encode_surface_file, DayKey, SurfaceFileDecodeError, SurfaceRecord,
};
use thiserror::Error;

const SURFACE_FILE_EXTENSION: &str = "dbs";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored surface for {day} is unreadable: {source}")]
    Decode {
        day: DayKey,
        #[source]
        source: SurfaceFileDecodeError,
    },
    #[error("s3 request failed: {0}")]
    S3(String),
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn load_surface(&self, day: DayKey) -> Result<Option<SurfaceRecord>, StorageError>;
    async fn save_surface(&self, day: DayKey, record: &SurfaceRecord) -> Result<(), StorageError>;
    async fn delete_surface(&self, day: DayKey) -> Result<bool, StorageError>;
    /// Every stored day, ascending.
    async fn list_days(&self) -> Result<Vec<DayKey>, StorageError>;
}

fn file_name(day: DayKey) -> String {
    format!("{day}.{SURFACE_FILE_EXTENSION}")
}

fn day_from_file_name(name: &str) -> Option<DayKey> {
    name.strip_suffix(SURFACE_FILE_EXTENSION)?
        .strip_suffix('.')?
        .parse()
        .ok()
}

fn decode(day: DayKey, payload: &[u8]) -> Result<SurfaceRecord, StorageError> {
    decode_surface_file(payload).map_err(|source| StorageError::Decode { day, source })
}

pub struct FileStorage {
    data_dir: PathBuf,
}

impl FileStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn path_for(&self, day: DayKey) -> PathBuf {
        self.data_dir.join(file_name(day))
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn load_surface(&self, day: DayKey) -> Result<Option<SurfaceRecord>, StorageError> {
        match tokio::fs::read(self.path_for(day)).await {
            Ok(payload) => decode(day, &payload).map(Some),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn save_surface(&self, day: DayKey, record: &SurfaceRecord) -> Result<(), StorageError> {
        let path = self.path_for(day);
        let staging = path.with_extension(format!("{SURFACE_FILE_EXTENSION}.tmp"));
        tokio::fs::write(&staging, encode_surface_file(record)).await?;
        tokio::fs::rename(&staging, &path).await?;
        Ok(())
    }

    async fn delete_surface(&self, day: DayKey) -> Result<bool, StorageError> {
        match tokio::fs::remove_file(self.path_for(day)).await {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
            Err(error) => Err(error.into()),
        }
    }

    async fn list_days(&self) -> Result<Vec<DayKey>, StorageError> {
        let mut entries = tokio::fs::read_dir(&self.data_dir).await?;
        let mut days = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if let Some(day) = entry.file_name().to_str().and_then(day_from_file_name) {
                days.push(day);
            }
        }
        days.sort();
        Ok(days)
    }
}

#[derive(Clone, Debug)]
pub struct S3StorageConfig {
    pub bucket: String,
    pub prefix: Option<String>,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl S3StorageConfig {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: None,
            region: None,
            endpoint_url: None,
            force_path_style: false,
            access_key_id: None,
            secret_access_key: None,
        }
    }
}

/// Object keys for day records under an optional bucket prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
struct S3KeyLayout {
    prefix: String,
}

impl S3KeyLayout {
    fn new(prefix: Option<&str>) -> Self {
        Self {
            prefix: prefix.unwrap_or_default().trim_matches('/').to_string(),
        }
    }

    fn key_for(&self, day: DayKey) -> String {
        if self.prefix.is_empty() {
            file_name(day)
        } else {
            format!("{}/{}", self.prefix, file_name(day))
        }
    }

    fn list_prefix(&self) -> Option<String> {
        (!self.prefix.is_empty()).then(|| format!("{}/", self.prefix))
    }

    /// Only keys directly under the prefix name a day.
    fn day_for(&self, key: &str) -> Option<DayKey> {
        let name = match self.list_prefix() {
            Some(prefix) => key.strip_prefix(prefix.as_str())?,
            None => key,
        };
        if name.contains('/') {
            return None;
        }
        day_from_file_name(name)
    }
}

pub struct S3Storage {
    bucket: String,
    keys: S3KeyLayout,
    client: Client,
}

impl S3Storage {
    pub async fn new(config: S3StorageConfig) -> Self {
        let keys = S3KeyLayout::new(config.prefix.as_deref());
        let client = s3_client(&config).await;
        Self {
            bucket: config.bucket,
            keys,
            client,
        }
    }
}

async fn s3_client(config: &S3StorageConfig) -> Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let (Some(access_key_id), Some(secret_access_key)) =
        (&config.access_key_id, &config.secret_access_key)
    {
        loader = loader.credentials_provider(Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "daybook-static",
        ));
    }
    if let Some(region) = &config.region {
        loader = loader.region(aws_config::Region::new(region.clone()));
    }
    let shared = loader.load().await;
    let mut builder = aws_sdk_s3::config::Builder::from(&shared);
    if let Some(endpoint_url) = &config.endpoint_url {
        builder = builder.endpoint_url(endpoint_url);
    }
    Client::from_conf(builder.force_path_style(config.force_path_style).build())
}

#[async_trait]
impl Storage for S3Storage {
    async fn load_surface(&self, day: DayKey) -> Result<Option<SurfaceRecord>, StorageError> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(self.keys.key_for(day))
            .send()
            .await;
        let output = match response {
            Ok(output) => output,
            Err(error) => {
                if error
                    .as_service_error()
                    .is_some_and(|service_error| service_error.is_no_such_key())
                {
                    return Ok(None);
                }
                return Err(StorageError::S3(format!("get {day}: {error:?}")));
            }
        };
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|error| StorageError::S3(format!("read {day}: {error:?}")))?
            .into_bytes();
        decode(day, &bytes).map(Some)
    }

    async fn save_surface(&self, day: DayKey, record: &SurfaceRecord) -> Result<(), StorageError> {
        let body = ByteStream::from(encode_surface_file(record));
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(self.keys.key_for(day))
            .body(body)
            .send()
            .await
            .map_err(|error| StorageError::S3(format!("put {day}: {error:?}")))?;
        Ok(())
    }

    async fn delete_surface(&self, day: DayKey) -> Result<bool, StorageError> {
        let key = self.keys.key_for(day);
        let head = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await;
        if let Err(error) = head {
            if error
                .as_service_error()
                .is_some_and(|service_error| service_error.is_not_found())
            {
                return Ok(false);
            }
            return Err(StorageError::S3(format!("head {day}: {error:?}")));
        }
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|error| StorageError::S3(format!("delete {day}: {error:?}")))?;
        Ok(true)
    }

    async fn list_days(&self) -> Result<Vec<DayKey>, StorageError> {
        let prefix = self.keys.list_prefix();
        let mut days = Vec::new();
        let mut continuation = None;
        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .set_prefix(prefix.clone())
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|error| StorageError::S3(format!("list: {error:?}")))?;
            days.extend(
                output
                    .contents()
                    .iter()
                    .filter_map(|object| object.key())
                    .filter_map(|key| self.keys.day_for(key)),
            );
            match output.next_continuation_token() {
                Some(token) if output.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }
        days.sort();
        Ok(days)
    }
}
