//! Static alias table for well-known public and sovereign clouds

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::debug;

use super::provider::MetadataProvider;
use super::types::InstanceDiscoveryMetadataEntry;
use crate::error::Result;

/// `(preferred_network, preferred_cache, aliases)` per cloud
const KNOWN_CLOUDS: &[(&str, &str, &[&str])] = &[
    (
        "login.microsoftonline.com",
        "login.windows.net",
        &[
            "login.microsoftonline.com",
            "login.windows.net",
            "login.microsoft.com",
            "sts.windows.net",
        ],
    ),
    (
        "login.partner.microsoftonline.cn",
        "login.partner.microsoftonline.cn",
        &["login.partner.microsoftonline.cn", "login.chinacloudapi.cn"],
    ),
    (
        "login.microsoftonline.de",
        "login.microsoftonline.de",
        &["login.microsoftonline.de"],
    ),
    (
        "login.microsoftonline.us",
        "login.microsoftonline.us",
        &["login.microsoftonline.us", "login.usgovcloudapi.net"],
    ),
    (
        "login-us.microsoftonline.com",
        "login-us.microsoftonline.com",
        &["login-us.microsoftonline.com"],
    ),
    (
        "login.windows-ppe.net",
        "login.windows-ppe.net",
        &[
            "login.windows-ppe.net",
            "sts.windows-ppe.net",
            "login.microsoft-ppe.com",
        ],
    ),
];

static KNOWN_ENTRIES: Lazy<HashMap<String, Arc<InstanceDiscoveryMetadataEntry>>> =
    Lazy::new(|| {
        let mut entries = HashMap::new();
        for (preferred_network, preferred_cache, aliases) in KNOWN_CLOUDS {
            let entry = Arc::new(InstanceDiscoveryMetadataEntry::new(
                *preferred_network,
                *preferred_cache,
                aliases.iter().copied(),
            ));
            for alias in entry.aliases() {
                entries.insert(alias.clone(), Arc::clone(&entry));
            }
        }
        entries
    });

/// Hard-coded metadata for well-known clouds
///
/// Always available and never fails. An entry is returned only when the host
/// is in the table and every alias the caller already knows about belongs to
/// the same cloud; otherwise the caller's view spans hosts this table cannot
/// vouch for.
#[derive(Debug, Clone, Copy, Default)]
pub struct KnownMetadataProvider;

impl KnownMetadataProvider {
    /// Create the provider
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Whether `host` belongs to a well-known cloud
    #[must_use]
    pub fn is_known_environment(host: &str) -> bool {
        KNOWN_ENTRIES.contains_key(&host.to_lowercase())
    }

    /// Hosts of all well-known clouds
    pub fn known_environments() -> impl Iterator<Item = &'static str> {
        KNOWN_CLOUDS
            .iter()
            .flat_map(|(_, _, aliases)| aliases.iter().copied())
    }
}

impl MetadataProvider for KnownMetadataProvider {
    fn name(&self) -> &'static str {
        "known"
    }

    fn try_get_entry(
        &self,
        host: &str,
        known_environment_aliases: &[String],
    ) -> Result<Option<Arc<InstanceDiscoveryMetadataEntry>>> {
        let Some(entry) = KNOWN_ENTRIES.get(&host.to_lowercase()) else {
            return Ok(None);
        };

        if let Some(foreign) = known_environment_aliases
            .iter()
            .find(|alias| !entry.contains_alias(alias))
        {
            debug!(
                "Known metadata for {} not used: alias {} is outside its cloud",
                host, foreign
            );
            return Ok(None);
        }

        Ok(Some(Arc::clone(entry)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_cloud_lookup() {
        let provider = KnownMetadataProvider::new();
        let entry = provider
            .try_get_entry("login.windows.net", &[])
            .unwrap()
            .unwrap();
        assert_eq!(entry.preferred_network(), "login.microsoftonline.com");
        assert_eq!(entry.preferred_cache(), "login.windows.net");
        assert_eq!(entry.aliases().len(), 4);
    }

    #[test]
    fn test_unknown_host() {
        let provider = KnownMetadataProvider::new();
        assert!(provider.try_get_entry("fs.contoso.com", &[]).unwrap().is_none());
        assert!(!KnownMetadataProvider::is_known_environment("fs.contoso.com"));
        assert!(KnownMetadataProvider::is_known_environment("LOGIN.CHINACLOUDAPI.CN"));
    }

    #[test]
    fn test_aliases_outside_cloud_disable_lookup() {
        let provider = KnownMetadataProvider::new();
        let same_cloud = vec!["sts.windows.net".to_string()];
        assert!(provider
            .try_get_entry("login.microsoftonline.com", &same_cloud)
            .unwrap()
            .is_some());

        let mixed = vec![
            "sts.windows.net".to_string(),
            "login.microsoftonline.us".to_string(),
        ];
        assert!(provider
            .try_get_entry("login.microsoftonline.com", &mixed)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_entries_are_shared() {
        let provider = KnownMetadataProvider::new();
        let a = provider
            .try_get_entry("login.microsoftonline.us", &[])
            .unwrap()
            .unwrap();
        let b = provider
            .try_get_entry("login.usgovcloudapi.net", &[])
            .unwrap()
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(KnownMetadataProvider::known_environments().any(|h| h == "sts.windows-ppe.net"));
    }
}
