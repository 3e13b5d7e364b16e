//! Compile-time registry of address search services.
//!
//! Providers live as TOML files under `services/` and are baked into the
//! binary with `include_str!`.

use serde::Deserialize;

/// An address search service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"pdok_locatieserver"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether this service is tried at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Execution order, lower values run first.
    pub priority: u32,
    /// How to talk to the provider.
    pub provider: ProviderConfig,
}

/// Provider wire settings, selected by the TOML `type` key.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// PDOK Locatieserver free-text search.
    Locatieserver {
        /// Search endpoint.
        base_url: String,
        /// Number of results requested; only the first is used.
        #[serde(default = "default_rows")]
        rows: u32,
    },
}

const fn default_true() -> bool {
    true
}

const fn default_rows() -> u32 {
    1
}

impl GeocodingService {
    /// Endpoint the provider is queried at.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::Locatieserver { base_url, .. } => base_url,
        }
    }
}

const SERVICE_TOMLS: &[(&str, &str)] = &[(
    "locatieserver",
    include_str!("../services/locatieserver.toml"),
)];

#[cfg(test)]
const EXPECTED_SERVICE_COUNT: usize = 1;

/// Every registered service, including disabled ones.
///
/// # Panics
///
/// Panics on a malformed embedded TOML file; the tests below load every
/// file so this never reaches a release build.
#[must_use]
pub fn all_services() -> Vec<GeocodingService> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Invalid address search service '{name}': {e}"))
        })
        .collect()
}

/// Enabled services in the order they are tried.
#[must_use]
pub fn enabled_services() -> Vec<GeocodingService> {
    let mut enabled = all_services();
    enabled.retain(|service| service.enabled);
    enabled.sort_by_key(|service| service.priority);
    enabled
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_embedded_service_parses() {
        assert_eq!(all_services().len(), EXPECTED_SERVICE_COUNT);
    }

    #[test]
    fn ids_do_not_collide() {
        let services = all_services();
        let ids: HashSet<&str> = services.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), services.len());
    }

    #[test]
    fn services_are_named_and_use_https() {
        for service in all_services() {
            assert!(!service.id.is_empty());
            assert!(!service.name.is_empty(), "{} is unnamed", service.id);
            assert!(
                service.base_url().starts_with("https://"),
                "{} is not served over https",
                service.id
            );
        }
    }

    #[test]
    fn locatieserver_requests_single_best_match() {
        let services = enabled_services();
        let ProviderConfig::Locatieserver { rows, .. } = &services[0].provider;
        assert_eq!(*rows, 1);
    }
}
