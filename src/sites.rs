// Site (tenant) model and tenancy mode.
// Sites partition the platform; each may override the catalog API URL.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether program indexes are cached once globally or once per site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TenancyMode {
    #[default]
    Single,
    Multi,
}

impl TenancyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenancyMode::Single => "single",
            TenancyMode::Multi => "multi",
        }
    }
}

impl fmt::Display for TenancyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-site configuration values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfiguration {
    /// Catalog API base URL for this site, overriding the global default.
    #[serde(default)]
    pub catalog_api_url: Option<String>,
}

/// A tenant of the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub name: String,
    #[serde(default)]
    pub configuration: Option<SiteConfiguration>,
}

impl Site {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            configuration: None,
        }
    }

    pub fn with_catalog_url(mut self, url: impl Into<String>) -> Self {
        self.configuration = Some(SiteConfiguration {
            catalog_api_url: Some(url.into()),
        });
        self
    }

    /// Catalog URL for this site, falling back to `default` when the site has
    /// no configuration or the configuration has no override.
    pub fn catalog_url<'a>(&'a self, default: &'a str) -> &'a str {
        self.configuration
            .as_ref()
            .and_then(|c| c.catalog_api_url.as_deref())
            .filter(|url| !url.is_empty())
            .unwrap_or(default)
    }
}
