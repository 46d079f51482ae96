//! HTTP client for the lanwatch daemon API.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use lanwatch_core::{Device, DeviceId, ProbeReport};
use lanwatch_protocol::{routes, CreateDeviceRequest, ErrorBody, HealthBody, OkBody};

use crate::error::{ClientError, Result};

/// Daemon URL used when none is configured.
pub const DEFAULT_URL: &str = "http://127.0.0.1:5000";

/// Upper bound on any single request.
///
/// A status request runs a full probe round, so this is generous.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for one daemon.
#[derive(Debug, Clone)]
pub struct DaemonClient {
    base: Url,
    http: reqwest::Client,
}

impl DaemonClient {
    /// Creates a client for the daemon at `url`.
    pub fn new(url: &str) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(url.trim()).map_err(|e| ClientError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", base.scheme()),
            });
        }

        // The daemon lives on the local network.
        let http = reqwest::Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `GET /healthz`, failing if the daemon's API major version differs.
    pub async fn health(&self) -> Result<HealthBody> {
        let health: HealthBody = self.send(self.request(Method::GET, routes::HEALTH)?).await?;
        health.api_version.ensure_compatible()?;
        Ok(health)
    }

    pub async fn list(&self) -> Result<Vec<Device>> {
        self.send(self.request(Method::GET, routes::DEVICES)?).await
    }

    pub async fn add(&self, name: &str, ip: &str) -> Result<Device> {
        let body = CreateDeviceRequest::new(name, ip);
        self.send(self.request(Method::POST, routes::DEVICES)?.json(&body))
            .await
    }

    pub async fn remove(&self, id: &DeviceId) -> Result<()> {
        let _: OkBody = self
            .send(self.request(Method::DELETE, &routes::device(id.as_str()))?)
            .await?;
        Ok(())
    }

    /// Runs a probe round on the daemon.
    pub async fn status(&self) -> Result<ProbeReport> {
        self.send(self.request(Method::GET, routes::STATUS)?).await
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.base.join(path).map_err(|e| ClientError::InvalidUrl {
            url: format!("{}{path}", self.base),
            reason: e.to_string(),
        })?;
        Ok(self.http.request(method, url))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(|source| ClientError::Connection {
            url: self.base.to_string(),
            source,
        })?;
        debug!(status = %response.status(), url = %response.url(), "Daemon response");
        decode(response).await
    }
}

/// Parses a success body as `T`, or turns an error body into `Rejected`.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

    if status.is_success() {
        return serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()));
    }

    let message = serde_json::from_slice::<ErrorBody>(&bytes)
        .map(|body| body.error)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });

    Err(ClientError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_http_urls() {
        let client = DaemonClient::new("http://127.0.0.1:5000").unwrap();
        assert_eq!(client.base_url().port(), Some(5000));
        assert!(DaemonClient::new(" https://lan.example/ ").is_ok());
    }

    #[test]
    fn test_new_rejects_bad_urls() {
        assert!(matches!(
            DaemonClient::new("not a url"),
            Err(ClientError::InvalidUrl { .. })
        ));
        assert!(matches!(
            DaemonClient::new("ftp://127.0.0.1"),
            Err(ClientError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_request_paths_are_absolute() {
        let client = DaemonClient::new("http://127.0.0.1:5000/ignored/").unwrap();
        let request = client
            .request(Method::DELETE, &routes::device("abc"))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.url().as_str(), "http://127.0.0.1:5000/api/devices/abc");
    }

    #[tokio::test]
    async fn test_unreachable_daemon_is_connection_error() {
        // Port 9 (discard) is closed on test machines.
        let client =
            DaemonClient::with_timeout("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client.list().await.unwrap_err();
        assert!(matches!(err, ClientError::Connection { .. }));
    }
}
