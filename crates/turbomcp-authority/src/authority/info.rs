//! # Authority Info
//!
//! Parsing, classification and canonicalization of authority URIs.
//!
//! An [`AuthorityInfo`] is created once per configured authority and never
//! changes afterwards. Derived authorities (another tenant, another host alias)
//! are new values.
//!
//! ## Classification
//!
//! The first path segment decides the kind of authority, first match wins:
//!
//! 1. `tfp/<tenant>/<policy>` or a `*.b2clogin.*` host → [`AuthorityType::B2C`]
//! 2. `adfs` → [`AuthorityType::Adfs`]
//! 3. `dstsv2/<tenant>` → [`AuthorityType::Dsts`]
//! 4. a single tenant segment (GUID, domain, meta-tenant) → [`AuthorityType::Aad`]
//! 5. anything else → [`AuthorityType::Generic`] when the caller opted into
//!    generic OIDC authorities, otherwise AAD keyed by the first segment

use std::fmt;

use url::Url;
use uuid::Uuid;

use super::types::{
    ADFS_PREFIX, AadAuthorityAudience, AuthorityType, AzureCloudInstance, B2C_HOST_SUFFIXES,
    B2C_PREFIX, DSTS_PREFIX, is_meta_tenant,
};
use crate::discovery::KnownMetadataProvider;
use crate::error::{AuthorityError, Result};

/// Authority used when the application does not configure one
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com/common/";

/// Normalize an authority URI: lower-case, no query or fragment, single trailing `/`
///
/// Canonicalization is idempotent.
///
/// # Errors
///
/// Returns [`AuthorityError::InvalidUri`] if the input is empty, relative or not
/// well formed.
pub fn canonicalize_authority_uri(uri: &str) -> Result<String> {
    let trimmed = uri.trim();
    if trimmed.is_empty() {
        return Err(AuthorityError::InvalidUri("authority is empty".to_string()));
    }

    let mut url =
        Url::parse(trimmed).map_err(|e| AuthorityError::InvalidUri(format!("{trimmed}: {e}")))?;

    if url.cannot_be_a_base() || url.host_str().is_none_or(str::is_empty) {
        return Err(AuthorityError::InvalidUri(format!(
            "{trimmed}: authority must be an absolute URI with a host"
        )));
    }

    url.set_query(None);
    url.set_fragment(None);

    let mut canonical = url.as_str().to_lowercase();
    if !canonical.ends_with('/') {
        canonical.push('/');
    }
    Ok(canonical)
}

/// Immutable description of a configured authority
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthorityInfo {
    authority_type: AuthorityType,
    canonical_authority: String,
    host: String,
    validate_authority: bool,
    user_realm_uri_prefix: String,
    /// Path segments retained in the canonical authority
    segments: Vec<String>,
}

impl AuthorityInfo {
    /// Parse an authority URI, detecting AAD, B2C, ADFS and dSTS authorities
    ///
    /// `validate_authority` is forced to `false` for B2C authorities.
    ///
    /// # Errors
    ///
    /// Returns a construction error if the URI is malformed, insecure or its path
    /// does not fit the detected authority type.
    pub fn from_authority_uri(authority: &str, validate_authority: bool) -> Result<Self> {
        Self::parse(authority, validate_authority, false)
    }

    /// Parse an authority URI for a generic OpenID Connect issuer
    ///
    /// URIs that still carry a B2C, ADFS, dSTS or single-tenant signature are
    /// classified as such; everything else becomes [`AuthorityType::Generic`].
    ///
    /// # Errors
    ///
    /// Returns a construction error if the URI is malformed or insecure.
    pub fn from_generic_authority(authority: &str, validate_authority: bool) -> Result<Self> {
        Self::parse(authority, validate_authority, true)
    }

    /// Build an AAD authority from a cloud instance and an audience
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::AzureAdMyOrgRequiresTenant`] when a single-tenant
    /// audience is requested without a tenant.
    pub fn from_aad_authority(
        cloud: AzureCloudInstance,
        audience: AadAuthorityAudience,
        tenant: Option<&str>,
        validate_authority: bool,
    ) -> Result<Self> {
        let tenant = audience.tenant_segment(tenant)?;
        let tenant = match Uuid::parse_str(&tenant) {
            Ok(id) => id.hyphenated().to_string(),
            Err(_) => tenant,
        };
        Self::from_authority_uri(
            &format!("{}/{}", cloud.cloud_url(), tenant),
            validate_authority,
        )
    }

    fn parse(authority: &str, validate_authority: bool, allow_generic: bool) -> Result<Self> {
        let canonical = canonicalize_authority_uri(authority)?;
        let url = Url::parse(&canonical)
            .map_err(|e| AuthorityError::InvalidUri(format!("{canonical}: {e}")))?;

        if url.scheme() != "https" {
            return Err(AuthorityError::InsecureAuthority(canonical));
        }

        let host = host_with_port(&url)?;
        let segments: Vec<String> = url
            .path_segments()
            .map(|segments| {
                segments
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let authority_type = classify(&host, &segments, allow_generic, &canonical)?;
        let kept = segments
            .into_iter()
            .take(authority_type.canonical_segment_count())
            .collect();

        Ok(Self::assemble(
            authority_type,
            host,
            kept,
            validate_authority && authority_type != AuthorityType::B2C,
        ))
    }

    fn assemble(
        authority_type: AuthorityType,
        host: String,
        segments: Vec<String>,
        validate_authority: bool,
    ) -> Self {
        let canonical_authority = if segments.is_empty() {
            format!("https://{host}/")
        } else {
            format!("https://{host}/{}/", segments.join("/"))
        };

        Self {
            authority_type,
            canonical_authority,
            user_realm_uri_prefix: format!("https://{host}/common/userrealm/"),
            host,
            validate_authority,
            segments,
        }
    }

    /// Kind of authority
    #[must_use]
    pub fn authority_type(&self) -> AuthorityType {
        self.authority_type
    }

    /// Canonical authority: `https://{host}/{segments}/`
    #[must_use]
    pub fn canonical_authority(&self) -> &str {
        &self.canonical_authority
    }

    /// URI authority component (`host[:port]`)
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Whether network validation and discovery may be performed
    #[must_use]
    pub fn validate_authority(&self) -> bool {
        self.validate_authority
    }

    /// `https://{host}/common/userrealm/`
    #[must_use]
    pub fn user_realm_uri_prefix(&self) -> &str {
        &self.user_realm_uri_prefix
    }

    /// Whether the host is one of the well-known public or sovereign clouds
    #[must_use]
    pub fn is_known_to_developer(&self) -> bool {
        KnownMetadataProvider::is_known_environment(&self.host)
    }

    /// Whether this is the public-cloud `common` authority
    #[must_use]
    pub fn is_default_authority(&self) -> bool {
        self.canonical_authority == DEFAULT_AUTHORITY
    }

    /// Path segments kept in the canonical authority
    #[must_use]
    pub fn path_segments(&self) -> &[String] {
        &self.segments
    }

    /// Tenant segment, for authority types that carry one
    #[must_use]
    pub fn tenant(&self) -> Option<&str> {
        self.tenant_index()
            .and_then(|index| self.segments.get(index))
            .map(String::as_str)
    }

    /// Whether the tenant segment is a meta-tenant (`common`, `organizations`, `consumers`)
    #[must_use]
    pub fn is_tenantless(&self) -> bool {
        self.tenant().is_some_and(is_meta_tenant)
    }

    fn tenant_index(&self) -> Option<usize> {
        match self.authority_type {
            AuthorityType::Aad => Some(0),
            AuthorityType::Dsts | AuthorityType::B2C => Some(1),
            AuthorityType::Adfs | AuthorityType::Generic => None,
        }
    }

    /// Canonical authority with the tenant segment replaced
    ///
    /// A specific tenant already pinned by the caller is only replaced when
    /// `force` is set; meta-tenants are always replaced. B2C, ADFS and generic
    /// authorities are returned unchanged, as is a `new_tenant` that is blank
    /// or not a single tenant identifier.
    #[must_use]
    pub fn tenanted_authority(&self, new_tenant: &str, force: bool) -> String {
        self.with_tenant(new_tenant, force)
            .map_or_else(|| self.canonical_authority.clone(), |info| {
                info.canonical_authority
            })
    }

    /// Same as [`Self::tenanted_authority`] but yields a full `AuthorityInfo`
    ///
    /// Returns `None` when the tenant is left unchanged.
    #[must_use]
    pub fn with_tenant(&self, new_tenant: &str, force: bool) -> Option<Self> {
        let new_tenant = new_tenant.trim().to_lowercase();
        if new_tenant.is_empty() || !is_tenant_identifier(&new_tenant) {
            return None;
        }

        // B2C tenants are bound to their policy and cannot be swapped.
        let index = match self.authority_type {
            AuthorityType::Aad | AuthorityType::Dsts => self.tenant_index()?,
            AuthorityType::B2C | AuthorityType::Adfs | AuthorityType::Generic => return None,
        };

        let current = self.segments.get(index)?;
        if !force && !is_meta_tenant(current) {
            return None;
        }

        let mut segments = self.segments.clone();
        segments[index] = new_tenant;
        Some(Self::assemble(
            self.authority_type,
            self.host.clone(),
            segments,
            self.validate_authority,
        ))
    }

    /// The same authority served from another host alias
    #[must_use]
    pub fn with_host(&self, host: &str) -> Self {
        Self::assemble(
            self.authority_type,
            host.to_lowercase(),
            self.segments.clone(),
            self.validate_authority,
        )
    }
}

impl fmt::Display for AuthorityInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_authority)
    }
}

fn host_with_port(url: &Url) -> Result<String> {
    let host = url
        .host_str()
        .ok_or_else(|| AuthorityError::InvalidUri(format!("{url}: missing host")))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

fn is_b2c_host(host: &str) -> bool {
    let host = host.split(':').next().unwrap_or(host);
    B2C_HOST_SUFFIXES.iter().any(|suffix| host.ends_with(suffix))
}

/// GUID, verified domain, or meta-tenant
fn is_tenant_identifier(segment: &str) -> bool {
    if is_meta_tenant(segment) || Uuid::parse_str(segment).is_ok() {
        return true;
    }

    !segment.starts_with(['.', '-'])
        && !segment.ends_with(['.', '-'])
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

fn classify(
    host: &str,
    segments: &[String],
    allow_generic: bool,
    canonical: &str,
) -> Result<AuthorityType> {
    let Some(first) = segments.first() else {
        if allow_generic {
            return Ok(AuthorityType::Generic);
        }
        return Err(AuthorityError::InvalidAuthorityPath(canonical.to_string()));
    };

    if first == B2C_PREFIX || is_b2c_host(host) {
        if segments.len() < 3 {
            return Err(AuthorityError::B2cAuthorityUriInvalidPath(
                canonical.to_string(),
            ));
        }
        return Ok(AuthorityType::B2C);
    }

    if first == ADFS_PREFIX {
        return Ok(AuthorityType::Adfs);
    }

    if first == DSTS_PREFIX {
        if segments.len() < 2 {
            return Err(AuthorityError::DstsAuthorityUriInvalidPath(
                canonical.to_string(),
            ));
        }
        return Ok(AuthorityType::Dsts);
    }

    if segments.len() == 1 && is_tenant_identifier(first) {
        return Ok(AuthorityType::Aad);
    }

    if allow_generic {
        Ok(AuthorityType::Generic)
    } else {
        Ok(AuthorityType::Aad)
    }
}
