//! Seq HTTP API client
//!
//! Authentication uses the `X-Seq-ApiKey` header, sent only when a
//! credential is configured.

use crate::error::{ClientError, Result};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Url};
use secrecy::{ExposeSecret, SecretString};
use seqflow_config::ProviderSettings;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const API_KEY_HEADER: &str = "X-Seq-ApiKey";

const HEALTH_PATH: &str = "/health";

/// Seq API client
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct SeqClient {
    base_url: Url,
    api_key: Option<SecretString>,
    http: reqwest::Client,
}

impl SeqClient {
    /// Build a client from resolved settings without touching the network
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .danger_accept_invalid_certs(settings.insecure_skip_verify)
            .build()?;

        Ok(Self {
            base_url: base_url(&settings.server_url),
            api_key: settings.api_key.clone(),
            http,
        })
    }

    /// Build a client and probe `/health`
    ///
    /// The probe is best-effort: a failure is logged and the client is
    /// returned anyway.
    pub async fn connect(settings: &ProviderSettings) -> Result<Self> {
        let client = Self::new(settings)?;

        match client.ping().await {
            Ok(()) => tracing::debug!("Seq server reachable at {}", client.base_url),
            Err(e) => tracing::warn!(
                error = %e,
                "Seq provider configured, but /health check failed"
            ),
        }

        Ok(client)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an API path against the base URL
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidPath {
                path: path.to_string(),
                message: e.to_string(),
            })
    }

    /// Issue a request and decode the JSON response
    ///
    /// Returns `Ok(None)` when the server answers 2xx with a blank body.
    pub async fn request<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let data = self.send(method, path, body).await?;

        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        let decoded = serde_json::from_slice(&data).map_err(ClientError::Decode)?;
        Ok(Some(decoded))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        self.request::<(), T>(Method::GET, path, None).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// DELETE ignores whatever body the server sends back
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send::<()>(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// Connectivity check against `/health`
    pub async fn ping(&self) -> Result<()> {
        self.get::<serde_json::Value>(HEALTH_PATH).await?;
        Ok(())
    }

    /// Read the server health document
    pub async fn health(&self) -> Result<HealthStatus> {
        Ok(self.get::<HealthStatus>(HEALTH_PATH).await?.unwrap_or_default())
    }

    async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Vec<u8>>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        tracing::debug!("{} {}", method, url);

        let mut request = self.http.request(method, url);

        if let Some(body) = body {
            let payload = serde_json::to_vec(body).map_err(ClientError::Encode)?;
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(payload);
        }

        if let Some(api_key) = &self.api_key {
            let mut value = HeaderValue::from_str(api_key.expose_secret())
                .map_err(|_| ClientError::InvalidApiKey)?;
            value.set_sensitive(true);
            request = request.header(API_KEY_HEADER, value);
        }

        let response = request.send().await?;
        let status = response.status();
        let data = response.bytes().await?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&data);
            let message = match text.trim() {
                "" => status.to_string(),
                trimmed => trimmed.to_string(),
            };
            return Err(ClientError::Http {
                status: status.as_u16(),
                message,
            });
        }

        Ok(data.to_vec())
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default, alias = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Any other fields the server reports
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// Ensure the base path ends with `/` so endpoint paths are appended below it
fn base_url(server_url: &Url) -> Url {
    let mut url = server_url.clone();
    url.set_query(None);
    url.set_fragment(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings_for(server: &MockServer) -> ProviderSettings {
        ProviderSettings::new(Url::parse(&server.uri()).unwrap())
    }

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let url = base_url(&Url::parse("https://seq.example.com/seq?x=1").unwrap());
        assert_eq!(url.as_str(), "https://seq.example.com/seq/");

        let settings = ProviderSettings::new(url);
        let client = SeqClient::new(&settings).unwrap();
        assert_eq!(
            client.endpoint("/api/apikeys").unwrap().as_str(),
            "https://seq.example.com/seq/api/apikeys"
        );
    }

    #[tokio::test]
    async fn test_adds_api_key_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .and(header(API_KEY_HEADER, "abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = SeqClient::new(&settings_for(&server).with_api_key("abc")).unwrap();
        client.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_omits_api_key_header_when_unset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(&server)
            .await;

        let client = SeqClient::new(&settings_for(&server)).unwrap();
        client.ping().await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get(API_KEY_HEADER).is_none());
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/apikeys"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"Title": "x"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"Id": "k1"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = SeqClient::new(&settings_for(&server)).unwrap();
        let created: Option<serde_json::Value> = client
            .post("/api/apikeys", &json!({"Title": "x"}))
            .await
            .unwrap();
        assert_eq!(created, Some(json!({"Id": "k1"})));
    }

    #[tokio::test]
    async fn test_blank_success_body_is_no_data() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/apikeys/k1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/apikeys/k1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("  \n"))
            .mount(&server)
            .await;

        let client = SeqClient::new(&settings_for(&server)).unwrap();
        let updated: Option<serde_json::Value> =
            client.put("/api/apikeys/k1", &json!({})).await.unwrap();
        assert!(updated.is_none());

        let read: Option<serde_json::Value> = client.get("/api/apikeys/k1").await.unwrap();
        assert!(read.is_none());
    }

    #[tokio::test]
    async fn test_error_status_carries_trimmed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/apikeys/k1"))
            .respond_with(ResponseTemplate::new(403).set_body_string("  forbidden \n"))
            .mount(&server)
            .await;

        let client = SeqClient::new(&settings_for(&server)).unwrap();
        let err = client
            .get::<serde_json::Value>("/api/apikeys/k1")
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(403));
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "seq api returned 403: forbidden");
    }

    #[tokio::test]
    async fn test_error_status_falls_back_to_status_text() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/apikeys/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = SeqClient::new(&settings_for(&server)).unwrap();
        let err = client.delete("/api/apikeys/gone").await.unwrap_err();

        assert!(err.is_not_found());
        match err {
            ClientError::Http { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "404 Not Found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/apikeys/k1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let client = SeqClient::new(&settings_for(&server)).unwrap();
        let err = client
            .get::<serde_json::Value>("/api/apikeys/k1")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn test_delete_ignores_response_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/apikeys/k1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("deleted"))
            .expect(1)
            .mount(&server)
            .await;

        let client = SeqClient::new(&settings_for(&server)).unwrap();
        client.delete("/api/apikeys/k1").await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_tolerates_failed_probe() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503).set_body_string("starting"))
            .expect(1)
            .mount(&server)
            .await;

        let client = SeqClient::connect(&settings_for(&server)).await;
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_health_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"status": "The Seq node is in service.", "version": "2024.3"}),
            ))
            .mount(&server)
            .await;

        let client = SeqClient::new(&settings_for(&server)).unwrap();
        let health = client.health().await.unwrap();
        assert_eq!(health.status.as_deref(), Some("The Seq node is in service."));
        assert_eq!(health.details.get("version"), Some(&json!("2024.3")));
    }
}
