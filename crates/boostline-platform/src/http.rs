//! HTTP clients for the job API and object storage.
//!
//! The job API speaks JSON 1.1: every operation is a `POST /` whose target is
//! named in the `X-Amz-Target` header. Object storage is path-style
//! (`/{bucket}/{key}`) with a JSON listing endpoint.

use crate::error::{PlatformError, PlatformResult};
use crate::service::JobService;
use crate::store::ObjectStore;
use async_trait::async_trait;
use boostline_jobs::{
    JobName, ModelDescriptor, S3Uri, TrainingJobDescription, TrainingJobDescriptor,
    TransformJobDescription, TransformJobDescriptor,
};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

const TARGET_PREFIX: &str = "SageMaker";
const JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Job API client.
#[derive(Debug, Clone)]
pub struct HttpJobService {
    /// Base URL of the API, e.g. `https://api.sagemaker.us-east-1.amazonaws.com`.
    endpoint: String,
    /// Bearer token sent with every request, if any.
    api_token: Option<String>,
    client: Client,
}

impl HttpJobService {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, api_token: Option<String>) -> Self {
        Self { endpoint: endpoint.into().trim_end_matches('/').to_string(), api_token, client: Client::new() }
    }

    /// Default regional endpoint.
    #[must_use]
    pub fn for_region(region: &str, api_token: Option<String>) -> Self {
        Self::new(format!("https://api.sagemaker.{region}.amazonaws.com"), api_token)
    }

    async fn call<B, R>(&self, operation: &str, body: &B) -> PlatformResult<R>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        debug!(operation = %operation, endpoint = %self.endpoint, "Calling job API");

        let mut request = self
            .client
            .post(format!("{}/", self.endpoint))
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{operation}"))
            .header(reqwest::header::CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(serde_json::to_vec(body).map_err(|e| PlatformError::Serialization(e.to_string()))?);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, operation = %operation, "Failed to send request to job API");
            PlatformError::Request(format!("Network error: {}", e))
        })?;

        let response = check_status(response, operation).await?;
        response.json::<R>().await.map_err(|e| {
            error!(error = %e, operation = %operation, "Failed to parse job API response");
            PlatformError::Serialization(format!("Failed to parse {operation} response: {e}"))
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "__type", default)]
    kind: Option<String>,
    #[serde(alias = "Message", default)]
    message: Option<String>,
}

/// Maps a non-success response onto the error taxonomy.
async fn check_status(response: Response, operation: &str) -> PlatformResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
    error!(status = %status, operation = %operation, error = %text, "Platform returned error status");

    let parsed: Option<ApiErrorBody> = serde_json::from_str(&text).ok();
    // `__type` may be namespaced, e.g. `com.amazon.coral#ValidationException`.
    let code = parsed
        .as_ref()
        .and_then(|b| b.kind.as_deref())
        .map(|k| k.rsplit('#').next().unwrap_or(k).to_string());
    let message = parsed.and_then(|b| b.message).unwrap_or(text);

    let is_quota = status == StatusCode::TOO_MANY_REQUESTS
        || matches!(code.as_deref(), Some("ResourceLimitExceeded" | "ThrottlingException"));
    if is_quota {
        return Err(PlatformError::QuotaExceeded(message));
    }
    if status == StatusCode::NOT_FOUND || code.as_deref() == Some("ResourceNotFound") {
        return Err(PlatformError::NotFound(message));
    }
    Err(PlatformError::Api { status: status.as_u16(), code, message })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeTrainingJobRequest<'a> {
    training_job_name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeTransformJobRequest<'a> {
    transform_job_name: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateTrainingJobResponse {
    training_job_arn: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateTransformJobResponse {
    transform_job_arn: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateModelResponse {
    model_arn: String,
}

#[async_trait]
impl JobService for HttpJobService {
    async fn create_training_job(&self, descriptor: &TrainingJobDescriptor) -> PlatformResult<String> {
        let response: CreateTrainingJobResponse = self.call("CreateTrainingJob", descriptor).await?;
        Ok(response.training_job_arn)
    }

    async fn describe_training_job(&self, name: &JobName) -> PlatformResult<TrainingJobDescription> {
        self.call("DescribeTrainingJob", &DescribeTrainingJobRequest { training_job_name: name.as_str() })
            .await
    }

    async fn create_model(&self, descriptor: &ModelDescriptor) -> PlatformResult<String> {
        let response: CreateModelResponse = self.call("CreateModel", descriptor).await?;
        Ok(response.model_arn)
    }

    async fn create_transform_job(&self, descriptor: &TransformJobDescriptor) -> PlatformResult<String> {
        let response: CreateTransformJobResponse = self.call("CreateTransformJob", descriptor).await?;
        Ok(response.transform_job_arn)
    }

    async fn describe_transform_job(&self, name: &JobName) -> PlatformResult<TransformJobDescription> {
        self.call(
            "DescribeTransformJob",
            &DescribeTransformJobRequest { transform_job_name: name.as_str() },
        )
        .await
    }
}

/// Path-style object storage client.
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    endpoint: String,
    api_token: Option<String>,
    client: Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListObjectsResponse {
    #[serde(default)]
    contents: Vec<ListedObject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListedObject {
    key: String,
}

impl HttpObjectStore {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, api_token: Option<String>) -> Self {
        Self { endpoint: endpoint.into().trim_end_matches('/').to_string(), api_token, client: Client::new() }
    }

    #[must_use]
    pub fn for_region(region: &str, api_token: Option<String>) -> Self {
        Self::new(format!("https://s3.{region}.amazonaws.com"), api_token)
    }

    fn object_url(&self, uri: &S3Uri) -> String {
        format!("{}/{}/{}", self.endpoint, uri.bucket(), uri.key())
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn network_error(e: &reqwest::Error) -> PlatformError {
    PlatformError::Request(format!("Network error: {}", e))
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put_object(&self, uri: &S3Uri, body: Vec<u8>) -> PlatformResult<()> {
        debug!(uri = %uri, bytes = body.len(), "Uploading object");
        let response = self
            .authorize(self.client.put(self.object_url(uri)))
            .body(body)
            .send()
            .await
            .map_err(|e| network_error(&e))?;
        check_status(response, "PutObject").await?;
        Ok(())
    }

    async fn get_object(&self, uri: &S3Uri) -> PlatformResult<Vec<u8>> {
        debug!(uri = %uri, "Downloading object");
        let response = self
            .authorize(self.client.get(self.object_url(uri)))
            .send()
            .await
            .map_err(|e| network_error(&e))?;
        let response = check_status(response, "GetObject").await?;
        let bytes = response.bytes().await.map_err(|e| network_error(&e))?;
        Ok(bytes.to_vec())
    }

    async fn list_objects(&self, prefix: &S3Uri) -> PlatformResult<Vec<S3Uri>> {
        let url = format!("{}/{}", self.endpoint, prefix.bucket());
        let response = self
            .authorize(self.client.get(url))
            .query(&[("list-type", "2"), ("prefix", prefix.key())])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| network_error(&e))?;
        let response = check_status(response, "ListObjectsV2").await?;
        let listing: ListObjectsResponse = response
            .json()
            .await
            .map_err(|e| PlatformError::Serialization(format!("Failed to parse object listing: {e}")))?;

        listing
            .contents
            .into_iter()
            .map(|o| S3Uri::new(prefix.bucket(), o.key).map_err(PlatformError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boostline_jobs::{JobStatus, TrainingInputs, TrainingSettings};
    use mockito::Matcher;

    fn descriptor() -> TrainingJobDescriptor {
        TrainingSettings::default()
            .descriptor(TrainingInputs {
                job_name: JobName::new("boston-xgboost-2019-03-07-14-05-09").unwrap(),
                role_arn: "arn:role".to_string(),
                image: "img:1".to_string(),
                train: S3Uri::parse("s3://b/p/train.csv").unwrap(),
                validation: S3Uri::parse("s3://b/p/validation.csv").unwrap(),
                output: S3Uri::parse("s3://b/p/output").unwrap(),
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_training_job_sends_target_and_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("x-amz-target", "SageMaker.CreateTrainingJob")
            .match_header("authorization", "Bearer test-token")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "TrainingJobName": "boston-xgboost-2019-03-07-14-05-09",
                "ResourceConfig": {"InstanceCount": 1}
            })))
            .with_status(200)
            .with_header("content-type", JSON_CONTENT_TYPE)
            .with_body(r#"{"TrainingJobArn": "arn:aws:sagemaker:us-east-1:1:training-job/boston"}"#)
            .create_async()
            .await;

        let service = HttpJobService::new(server.url(), Some("test-token".to_string()));
        let arn = service.create_training_job(&descriptor()).await.unwrap();

        assert_eq!(arn, "arn:aws:sagemaker:us-east-1:1:training-job/boston");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_describe_training_job() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .match_header("x-amz-target", "SageMaker.DescribeTrainingJob")
            .match_body(Matcher::Json(serde_json::json!({"TrainingJobName": "job-1"})))
            .with_status(200)
            .with_body(r#"{"TrainingJobName": "job-1", "TrainingJobStatus": "InProgress", "SecondaryStatus": "Training"}"#)
            .create_async()
            .await;

        let service = HttpJobService::new(server.url(), None);
        let desc = service.describe_training_job(&JobName::new("job-1").unwrap()).await.unwrap();
        assert_eq!(desc.training_job_status, JobStatus::InProgress);
        assert_eq!(desc.secondary_status.as_deref(), Some("Training"));
    }

    #[tokio::test]
    async fn test_error_mapping() {
        let mut server = mockito::Server::new_async().await;
        let _validation = server
            .mock("POST", "/")
            .match_header("x-amz-target", "SageMaker.CreateModel")
            .with_status(400)
            .with_body(r#"{"__type": "com.amazon.coral#ValidationException", "Message": "Could not find model data"}"#)
            .create_async()
            .await;
        let _quota = server
            .mock("POST", "/")
            .match_header("x-amz-target", "SageMaker.CreateTransformJob")
            .with_status(400)
            .with_body(r#"{"__type": "ResourceLimitExceeded", "message": "instance limit"}"#)
            .create_async()
            .await;

        let service = HttpJobService::new(server.url(), None);
        let model = ModelDescriptor::for_training_job(
            &JobName::new("job-1").unwrap(),
            "arn:role",
            "img:1",
            S3Uri::parse("s3://b/model.tar.gz").unwrap(),
        )
        .unwrap();
        match service.create_model(&model).await.unwrap_err() {
            PlatformError::Api { status, code, message } => {
                assert_eq!(status, 400);
                assert_eq!(code.as_deref(), Some("ValidationException"));
                assert_eq!(message, "Could not find model data");
            }
            other => panic!("unexpected error: {other}"),
        }

        let transform = boostline_jobs::TransformSettings::default()
            .descriptor(boostline_jobs::TransformInputs {
                job_name: JobName::new("t-1").unwrap(),
                model_name: JobName::new("job-1-model").unwrap(),
                input: S3Uri::parse("s3://b/p/test.csv").unwrap(),
                output: S3Uri::parse("s3://b/p/batch-transform").unwrap(),
            })
            .unwrap();
        assert!(matches!(
            service.create_transform_job(&transform).await.unwrap_err(),
            PlatformError::QuotaExceeded(_)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_request_error() {
        let service = HttpJobService::new("http://127.0.0.1:1", None);
        let err = service.describe_transform_job(&JobName::new("t-1").unwrap()).await.unwrap_err();
        assert!(matches!(err, PlatformError::Request(_)));
    }

    #[tokio::test]
    async fn test_object_store_put_get_list() {
        let mut server = mockito::Server::new_async().await;
        let put = server
            .mock("PUT", "/bucket/p/train.csv")
            .match_body("24,1,2\n")
            .with_status(200)
            .create_async()
            .await;
        let _get = server
            .mock("GET", "/bucket/p/batch-transform/test.csv.out")
            .with_status(200)
            .with_body("22.1\n")
            .create_async()
            .await;
        let _list = server
            .mock("GET", "/bucket")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("list-type".into(), "2".into()),
                Matcher::UrlEncoded("prefix".into(), "p/batch-transform/".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"Contents": [{"Key": "p/batch-transform/test.csv.out", "Size": 5}]}"#)
            .create_async()
            .await;

        let store = HttpObjectStore::new(server.url(), None);
        store.put_object(&S3Uri::parse("s3://bucket/p/train.csv").unwrap(), b"24,1,2\n".to_vec()).await.unwrap();
        put.assert_async().await;

        let body = store.get_object(&S3Uri::parse("s3://bucket/p/batch-transform/test.csv.out").unwrap()).await.unwrap();
        assert_eq!(body, b"22.1\n");

        let listed = store.list_objects(&S3Uri::parse("s3://bucket/p/batch-transform/").unwrap()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].file_name(), Some("test.csv.out"));
    }

    #[tokio::test]
    async fn test_object_store_missing_object() {
        let mut server = mockito::Server::new_async().await;
        let _get = server.mock("GET", "/bucket/nope").with_status(404).create_async().await;

        let store = HttpObjectStore::new(server.url(), None);
        let err = store.get_object(&S3Uri::parse("s3://bucket/nope").unwrap()).await.unwrap_err();
        assert!(matches!(err, PlatformError::NotFound(_)));
    }
}
