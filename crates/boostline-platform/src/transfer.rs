use crate::error::{PlatformError, PlatformResult};
use crate::store::ObjectStore;
use boostline_jobs::S3Uri;
use std::path::{Path, PathBuf};
use tracing::info;

/// Uploads each file to `<prefix>/<file-name>` and returns the object locations
/// in input order.
pub async fn upload_files(
    store: &dyn ObjectStore,
    files: &[PathBuf],
    prefix: &S3Uri,
) -> PlatformResult<Vec<S3Uri>> {
    let mut uploaded = Vec::with_capacity(files.len());
    for path in files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PlatformError::Validation(format!("not a file path: {}", path.display())))?;
        let uri = prefix.join(name);
        let body = tokio::fs::read(path).await?;
        let bytes = body.len();
        store.put_object(&uri, body).await?;
        info!(path = %path.display(), uri = %uri, bytes, "Uploaded");
        uploaded.push(uri);
    }
    Ok(uploaded)
}

/// Copies every object under `prefix` into `dir`, named by the last key segment.
pub async fn download_prefix(
    store: &dyn ObjectStore,
    prefix: &S3Uri,
    dir: &Path,
) -> PlatformResult<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir).await?;

    let objects = store.list_objects(prefix).await?;
    if objects.is_empty() {
        return Err(PlatformError::NotFound(format!("no objects under {prefix}")));
    }

    let mut written = Vec::with_capacity(objects.len());
    for uri in objects {
        let Some(name) = uri.file_name() else {
            continue;
        };
        let path = dir.join(name);
        let body = store.get_object(&uri).await?;
        tokio::fs::write(&path, body).await?;
        info!(uri = %uri, path = %path.display(), "Downloaded");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalObjectStore;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_upload_then_download_round_trip() {
        let remote = TempDir::new().unwrap();
        let local = TempDir::new().unwrap();
        let store = LocalObjectStore::new(remote.path().to_path_buf());

        let train = local.path().join("train.csv");
        let test = local.path().join("test.csv");
        std::fs::write(&train, "24,1,2\n").unwrap();
        std::fs::write(&test, "1,2\n").unwrap();

        let prefix = S3Uri::parse("s3://bucket/boston-xgboost-LL").unwrap();
        let uris = upload_files(&store, &[train, test], &prefix).await.unwrap();
        assert_eq!(uris[0].to_string(), "s3://bucket/boston-xgboost-LL/train.csv");
        assert_eq!(uris[1].to_string(), "s3://bucket/boston-xgboost-LL/test.csv");

        let out = TempDir::new().unwrap();
        let files = download_prefix(&store, &prefix.as_prefix(), out.path()).await.unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(std::fs::read_to_string(out.path().join("train.csv")).unwrap(), "24,1,2\n");
    }

    #[tokio::test]
    async fn test_download_empty_prefix_is_not_found() {
        let remote = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let store = LocalObjectStore::new(remote.path().to_path_buf());
        let err = download_prefix(&store, &S3Uri::parse("s3://bucket/none/").unwrap(), out.path())
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::NotFound(_)));
    }
}
