use crate::error::{PlatformError, PlatformResult};
use async_trait::async_trait;
use boostline_jobs::S3Uri;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Remote object storage, addressed by `s3://bucket/key`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, uri: &S3Uri, body: Vec<u8>) -> PlatformResult<()>;

    async fn get_object(&self, uri: &S3Uri) -> PlatformResult<Vec<u8>>;

    /// Every object whose key starts with `prefix`'s key, in key order.
    async fn list_objects(&self, prefix: &S3Uri) -> PlatformResult<Vec<S3Uri>>;
}

/// Object store backed by a local directory: `s3://bucket/key` lives at
/// `<root>/bucket/key`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, uri: &S3Uri) -> PlatformResult<PathBuf> {
        if uri.key().is_empty() || uri.key().ends_with('/') {
            return Err(PlatformError::Validation(format!("{uri} names a prefix, not an object")));
        }
        if uri.key().split('/').any(|segment| segment == "..") {
            return Err(PlatformError::Validation(format!("{uri} escapes the store root")));
        }
        Ok(self.root.join(uri.bucket()).join(uri.key()))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put_object(&self, uri: &S3Uri, body: Vec<u8>) -> PlatformResult<()> {
        let path = self.path_for(uri)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        debug!(uri = %uri, path = %path.display(), bytes = body.len(), "Storing object locally");
        tokio::fs::write(&path, body).await?;
        Ok(())
    }

    async fn get_object(&self, uri: &S3Uri) -> PlatformResult<Vec<u8>> {
        let path = self.path_for(uri)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PlatformError::NotFound(uri.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_objects(&self, prefix: &S3Uri) -> PlatformResult<Vec<S3Uri>> {
        let bucket_dir = self.root.join(prefix.bucket());
        if !bucket_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in WalkDir::new(&bucket_dir).follow_links(false) {
            let entry = entry.map_err(|e| PlatformError::Io(std::io::Error::other(e)))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(&bucket_dir) else {
                continue;
            };
            let key = rel.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/");
            if key.starts_with(prefix.key()) {
                keys.push(key);
            }
        }
        keys.sort();

        keys.into_iter().map(|k| S3Uri::new(prefix.bucket(), k).map_err(PlatformError::from)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_get_list() {
        let temp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(temp.path().to_path_buf());

        let train = S3Uri::parse("s3://bucket/p/train.csv").unwrap();
        let out = S3Uri::parse("s3://bucket/p/batch-transform/test.csv.out").unwrap();
        store.put_object(&train, b"24,1\n".to_vec()).await.unwrap();
        store.put_object(&out, b"22\n".to_vec()).await.unwrap();

        assert_eq!(store.get_object(&train).await.unwrap(), b"24,1\n");

        let listed = store.list_objects(&S3Uri::parse("s3://bucket/p/batch-transform/").unwrap()).await.unwrap();
        assert_eq!(listed, vec![out]);

        let all = store.list_objects(&S3Uri::parse("s3://bucket/p/").unwrap()).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_object_and_bucket() {
        let temp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(temp.path().to_path_buf());

        let err = store.get_object(&S3Uri::parse("s3://bucket/nope").unwrap()).await.unwrap_err();
        assert!(matches!(err, PlatformError::NotFound(_)));
        assert!(store.list_objects(&S3Uri::parse("s3://empty/").unwrap()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_prefix_and_parent_keys() {
        let temp = TempDir::new().unwrap();
        let store = LocalObjectStore::new(temp.path().to_path_buf());
        assert!(store.put_object(&S3Uri::parse("s3://b/dir/").unwrap(), vec![]).await.is_err());
        assert!(store.put_object(&S3Uri::parse("s3://b/../x").unwrap(), vec![]).await.is_err());
        // A dot bucket cannot be named at all.
        assert!(S3Uri::parse("s3://../x").is_err());
    }
}
