//! reqwest-backed [`Transport`].

use reqwest::{Client, Method, Response, StatusCode};
use tracing::{trace, warn};

use crate::config::DavConfig;
use crate::error::{DavError, DavResult};
use crate::transport::{BoxFuture, DavResponse, Depth, Transport};
use crate::tree::XmlTree;

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";
const ICS_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

/// HTTP client for CalDAV operations.
pub struct HttpTransport {
    client: Client,
    config: DavConfig,
}

impl HttpTransport {
    /// Creates a transport for the configured server.
    pub fn new(config: DavConfig) -> DavResult<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(!config.verify_tls)
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| DavError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &DavConfig {
        &self.config
    }

    /// Sends one request; `content_type` applies only when `body` is non-empty.
    async fn send(
        &self,
        method: &str,
        path: &str,
        body: &[u8],
        content_type: &str,
        depth: Option<Depth>,
    ) -> DavResult<Response> {
        let http_method = Method::from_bytes(method.as_bytes())
            .map_err(|_| DavError::internal(format!("Invalid HTTP method: {}", method)))?;
        let url = self.config.url.join(path)?;

        let mut request = self.client.request(http_method, url.clone());

        if let Some(d) = depth {
            request = request.header("Depth", d.as_str());
        }

        if !body.is_empty() {
            request = request
                .header("Content-Type", content_type)
                .body(body.to_vec());
        }

        trace!(method = %method, url = %url, "Sending request");

        request
            .send()
            .await
            .map_err(|e| DavError::network(format!("Request failed: {}", e)).with_source(e))
    }

    /// Sends a PROPFIND or REPORT and parses the multistatus body.
    async fn multistatus(
        &self,
        method: &str,
        path: &str,
        body: &[u8],
        depth: Depth,
    ) -> DavResult<DavResponse> {
        let response = self
            .send(method, path, body, XML_CONTENT_TYPE, Some(depth))
            .await?;
        let status = response.status();
        trace!(status = %status, "Received response");

        match status {
            StatusCode::OK | StatusCode::MULTI_STATUS => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| DavError::network(format!("Failed to read response: {}", e)))?;
                Ok(DavResponse {
                    status: status.as_u16(),
                    tree: XmlTree::parse(&bytes)?,
                })
            }
            StatusCode::UNAUTHORIZED => Err(DavError::authentication(
                "Authentication failed: invalid credentials",
            )),
            StatusCode::FORBIDDEN => Err(DavError::authorization(format!(
                "Access denied to {}",
                path
            ))),
            StatusCode::NOT_FOUND => Err(DavError::not_found(format!("{} not found", path))),
            StatusCode::TOO_MANY_REQUESTS => {
                Err(DavError::rate_limited("Too many requests to server"))
            }
            s if s.is_server_error() => {
                let body = response.text().await.unwrap_or_default();
                Err(DavError::server(format!("Server error ({}): {}", s, body)))
            }
            s => {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %s, body = %body, "Unexpected response status");
                Err(DavError::invalid_response(format!(
                    "Unexpected status {}: {}",
                    s, body
                )))
            }
        }
    }

    /// Sends a MKCOL or PUT and reports the raw status.
    async fn status_only(
        &self,
        method: &str,
        path: &str,
        body: &[u8],
        content_type: &str,
    ) -> DavResult<u16> {
        let response = self.send(method, path, body, content_type, None).await?;
        let status = response.status();
        trace!(status = %status, "Received response");
        Ok(status.as_u16())
    }
}

impl Transport for HttpTransport {
    fn propfind<'a>(
        &'a self,
        path: &'a str,
        body: &'a [u8],
        depth: Depth,
    ) -> BoxFuture<'a, DavResult<DavResponse>> {
        Box::pin(self.multistatus("PROPFIND", path, body, depth))
    }

    fn report<'a>(
        &'a self,
        path: &'a str,
        body: &'a [u8],
        depth: Depth,
    ) -> BoxFuture<'a, DavResult<DavResponse>> {
        Box::pin(self.multistatus("REPORT", path, body, depth))
    }

    fn mkcol<'a>(&'a self, path: &'a str, body: &'a [u8]) -> BoxFuture<'a, DavResult<u16>> {
        Box::pin(self.status_only("MKCOL", path, body, XML_CONTENT_TYPE))
    }

    fn put<'a>(&'a self, path: &'a str, body: &'a [u8]) -> BoxFuture<'a, DavResult<u16>> {
        Box::pin(self.status_only("PUT", path, body, ICS_CONTENT_TYPE))
    }
}
