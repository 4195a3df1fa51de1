//! Caller-supplied instance metadata

use std::collections::HashMap;
use std::sync::Arc;

use super::provider::MetadataProvider;
use super::types::{InstanceDiscoveryMetadataEntry, InstanceDiscoveryResponse};
use crate::error::{AuthorityError, Result};

/// Instance metadata supplied by the application instead of network discovery
///
/// The document has the same shape as a discovery response. A configured
/// document is treated as complete: looking up a host it does not cover is an
/// error, not a fall-through.
#[derive(Debug, Clone)]
pub struct UserMetadataProvider {
    entries: HashMap<String, Arc<InstanceDiscoveryMetadataEntry>>,
}

impl UserMetadataProvider {
    /// Parse and index a metadata document
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::InvalidUserInstanceMetadata`] if the document is
    /// blank, not valid JSON, or has no metadata entries.
    pub fn from_json(document: &str) -> Result<Self> {
        if document.trim().is_empty() {
            return Err(AuthorityError::InvalidUserInstanceMetadata(
                "instance metadata document is empty".to_string(),
            ));
        }

        let response: InstanceDiscoveryResponse = serde_json::from_str(document)
            .map_err(|e| AuthorityError::InvalidUserInstanceMetadata(e.to_string()))?;

        Self::from_response(response)
    }

    /// Index an already parsed document
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::InvalidUserInstanceMetadata`] if the document has
    /// no metadata entries.
    pub fn from_response(response: InstanceDiscoveryResponse) -> Result<Self> {
        if response.metadata.is_empty() {
            return Err(AuthorityError::InvalidUserInstanceMetadata(
                "instance metadata document has no metadata entries".to_string(),
            ));
        }

        let mut entries = HashMap::new();
        for entry in response.metadata {
            let entry = Arc::new(entry);
            for alias in entry.aliases() {
                entries.insert(alias.clone(), Arc::clone(&entry));
            }
        }

        Ok(Self { entries })
    }

    /// Hosts covered by the document
    #[must_use]
    pub fn hosts(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

impl MetadataProvider for UserMetadataProvider {
    fn name(&self) -> &'static str {
        "user"
    }

    fn try_get_entry(
        &self,
        host: &str,
        _known_environment_aliases: &[String],
    ) -> Result<Option<Arc<InstanceDiscoveryMetadataEntry>>> {
        self.entries
            .get(&host.to_lowercase())
            .cloned()
            .map(Some)
            .ok_or_else(|| {
                AuthorityError::InvalidUserInstanceMetadata(format!(
                    "no metadata for host {host} in the supplied instance metadata"
                ))
            })
    }
}
