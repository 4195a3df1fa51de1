//! Common test utilities for integration tests
//!
//! A wiremock server standing in for the instance discovery endpoint, plus
//! metadata fixtures.

#![allow(dead_code)]

use serde_json::{Value, json};
use std::time::Duration;
use turbomcp_authority::AuthorityConfig;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

pub const DISCOVERY_PATH: &str = "/common/discovery/instance";

/// Instance discovery mock server
pub struct MockDiscoveryServer {
    pub server: MockServer,
    pub discovery_endpoint: String,
}

impl MockDiscoveryServer {
    /// Start a new mock discovery endpoint
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let discovery_endpoint = format!("{}{}", server.uri(), DISCOVERY_PATH);

        Self {
            server,
            discovery_endpoint,
        }
    }

    /// Authority config whose discovery requests go to this server
    pub fn config(&self, authority: &str) -> AuthorityConfig {
        AuthorityConfig {
            instance_discovery_endpoint: Some(self.discovery_endpoint.clone()),
            ..AuthorityConfig::new(authority)
        }
    }

    /// Successful discovery, expected exactly `expected_calls` times
    pub async fn mock_discovery_success(&self, body: Value, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path(DISCOVERY_PATH))
            .and(query_param("api-version", "1.1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    /// `invalid_instance` rejection
    pub async fn mock_invalid_instance(&self) {
        Mock::given(method("GET"))
            .and(path(DISCOVERY_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_instance",
                "error_description": "AADSTS50049: Unknown or invalid instance.",
                "error_codes": [50049],
                "correlation_id": "4f1a2a8c-0000-0000-0000-000000000000",
            })))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Any other failure status
    pub async fn mock_error_status(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path(DISCOVERY_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string("unavailable"))
            .mount(&self.server)
            .await;
    }

    /// Success status with a body that is not a discovery document
    pub async fn mock_malformed_body(&self) {
        Mock::given(method("GET"))
            .and(path(DISCOVERY_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&self.server)
            .await;
    }

    /// Successful discovery that only answers after `delay`
    pub async fn mock_slow_discovery(&self, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(DISCOVERY_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(contoso_metadata())
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Must not be called at all
    pub async fn expect_no_discovery(&self) {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }
}

/// Discovery document for a private cloud with three aliases
pub fn contoso_metadata() -> Value {
    json!({
        "tenant_discovery_endpoint": "https://login.contoso.net/contoso.com/v2.0/.well-known/openid-configuration",
        "api-version": "1.1",
        "metadata": [
            {
                "preferred_network": "login.contoso.net",
                "preferred_cache": "cache.contoso.net",
                "aliases": ["login.contoso.net", "cache.contoso.net", "sts.contoso.net"]
            },
            {
                "preferred_network": "login.fabrikam.net",
                "preferred_cache": "login.fabrikam.net",
                "aliases": ["login.fabrikam.net"]
            }
        ]
    })
}

/// Discovery document for the public cloud
pub fn public_cloud_metadata() -> Value {
    json!({
        "tenant_discovery_endpoint": "https://login.microsoftonline.com/common/v2.0/.well-known/openid-configuration",
        "api-version": "1.1",
        "metadata": [
            {
                "preferred_network": "login.microsoftonline.com",
                "preferred_cache": "login.windows.net",
                "aliases": [
                    "login.microsoftonline.com",
                    "login.windows.net",
                    "login.microsoft.com",
                    "sts.windows.net"
                ]
            }
        ]
    })
}
