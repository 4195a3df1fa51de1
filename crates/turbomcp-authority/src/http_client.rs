//! HTTP Client for Instance Discovery
//!
//! The discovery manager only needs one operation from the transport: a GET
//! that yields a status and a body. [`DiscoveryHttpClient`] is that seam, and
//! [`ReqwestDiscoveryClient`] is the production implementation.
//!
//! ## Security Configuration
//!
//! The reqwest client is configured to:
//! - NOT follow redirects
//! - Use rustls for TLS (no OpenSSL dependency)
//! - Cap response bodies at [`DiscoveryClientConfig::max_response_size`]

use std::fmt;

use async_trait::async_trait;
use http::StatusCode;
use thiserror::Error;
use url::Url;

use crate::config::DiscoveryClientConfig;

/// Status and body of a discovery response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryHttpResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Raw response body
    pub body: Vec<u8>,
}

/// Transport failures
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// Request could not be sent or no response was received
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// Response body exceeded the configured limit
    #[error("Response size limit of {limit} bytes exceeded")]
    ResponseTooLarge {
        /// Configured limit
        limit: usize,
    },

    /// Response body could not be read
    #[error("Failed to read response body: {0}")]
    BodyRead(String),
}

impl From<reqwest::Error> for HttpClientError {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e.to_string())
    }
}

/// GET transport used by network discovery
#[async_trait]
pub trait DiscoveryHttpClient: Send + Sync + fmt::Debug {
    /// Issue a GET request with the given extra headers
    ///
    /// Non-success statuses are returned as responses, not errors.
    ///
    /// # Errors
    ///
    /// Returns [`HttpClientError`] when no complete response was received.
    async fn get(
        &self,
        url: &Url,
        headers: &[(&'static str, String)],
    ) -> Result<DiscoveryHttpResponse, HttpClientError>;
}

/// reqwest-backed discovery transport
#[derive(Clone)]
pub struct ReqwestDiscoveryClient {
    inner: reqwest::Client,
    max_response_size: usize,
}

impl ReqwestDiscoveryClient {
    /// Create a client with security-hardened defaults
    ///
    /// # Errors
    ///
    /// Returns the reqwest error if the TLS backend cannot be initialized.
    pub fn new(config: &DiscoveryClientConfig) -> Result<Self, reqwest::Error> {
        let inner = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            inner,
            max_response_size: config.max_response_size,
        })
    }

    /// Create from an existing reqwest client
    ///
    /// # Warning
    /// Ensure the client is configured with `redirect::Policy::none()`.
    pub fn from_client(client: reqwest::Client, max_response_size: usize) -> Self {
        Self {
            inner: client,
            max_response_size,
        }
    }
}

#[async_trait]
impl DiscoveryHttpClient for ReqwestDiscoveryClient {
    async fn get(
        &self,
        url: &Url,
        headers: &[(&'static str, String)],
    ) -> Result<DiscoveryHttpResponse, HttpClientError> {
        let mut request = self
            .inner
            .get(url.clone())
            .header(http::header::ACCEPT, "application/json");
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        let response = request.send().await?;
        let status = StatusCode::from_u16(response.status().as_u16())
            .map_err(|e| HttpClientError::Request(e.to_string()))?;

        if let Some(content_length) = response.content_length()
            && content_length > self.max_response_size as u64
        {
            return Err(HttpClientError::ResponseTooLarge {
                limit: self.max_response_size,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| HttpClientError::BodyRead(e.to_string()))?;

        if body.len() > self.max_response_size {
            return Err(HttpClientError::ResponseTooLarge {
                limit: self.max_response_size,
            });
        }

        Ok(DiscoveryHttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

impl fmt::Debug for ReqwestDiscoveryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestDiscoveryClient")
            .field("inner", &"<reqwest::Client>")
            .field("max_response_size", &self.max_response_size)
            .finish()
    }
}
