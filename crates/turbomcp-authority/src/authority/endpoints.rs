//! OAuth 2.0 endpoint construction per authority type

use serde::{Deserialize, Serialize};

use super::info::AuthorityInfo;
use super::types::AuthorityType;
use crate::error::{AuthorityError, Result};

/// Endpoint paths relative to the canonical authority
struct EndpointSuffixes {
    authorize: &'static str,
    token: &'static str,
    device_code: &'static str,
    end_session: &'static str,
}

const V2_SUFFIXES: EndpointSuffixes = EndpointSuffixes {
    authorize: "oauth2/v2.0/authorize",
    token: "oauth2/v2.0/token",
    device_code: "oauth2/v2.0/devicecode",
    end_session: "oauth2/v2.0/logout",
};

const ADFS_SUFFIXES: EndpointSuffixes = EndpointSuffixes {
    authorize: "oauth2/authorize",
    token: "oauth2/token",
    device_code: "oauth2/devicecode",
    end_session: "oauth2/logout",
};

/// Token, authorize and device-code endpoints of an authority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityEndpoints {
    /// Authorization endpoint
    pub authorization_endpoint: String,
    /// Token endpoint
    pub token_endpoint: String,
    /// Device authorization endpoint
    pub device_code_endpoint: String,
    /// End-session (logout) endpoint
    pub end_session_endpoint: String,
    /// Audience for client assertions
    pub self_signed_jwt_audience: String,
}

impl AuthorityEndpoints {
    /// Build the endpoints of `authority`, served from `preferred_network` when given
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::UnsupportedEndpoints`] for generic authorities,
    /// whose endpoints are published in their OpenID configuration document.
    pub fn for_authority(authority: &AuthorityInfo, preferred_network: Option<&str>) -> Result<Self> {
        let suffixes = match authority.authority_type() {
            AuthorityType::Aad | AuthorityType::B2C | AuthorityType::Dsts => &V2_SUFFIXES,
            AuthorityType::Adfs => &ADFS_SUFFIXES,
            AuthorityType::Generic => {
                return Err(AuthorityError::UnsupportedEndpoints(AuthorityType::Generic));
            }
        };

        let base = match preferred_network {
            Some(host) if !host.eq_ignore_ascii_case(authority.host()) => {
                authority.with_host(host).canonical_authority().to_string()
            }
            _ => authority.canonical_authority().to_string(),
        };

        let token_endpoint = format!("{base}{}", suffixes.token);
        Ok(Self {
            authorization_endpoint: format!("{base}{}", suffixes.authorize),
            device_code_endpoint: format!("{base}{}", suffixes.device_code),
            end_session_endpoint: format!("{base}{}", suffixes.end_session),
            self_signed_jwt_audience: token_endpoint.clone(),
            token_endpoint,
        })
    }
}
