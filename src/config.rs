// Application configuration.
// Layered defaults, TOML file, and PROGRAM_CACHE_ environment variables via figment.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};

use crate::accounts::{AccountDirectory, ServiceAccount};
use crate::cache::default_cache_dir;
use crate::catalog::{CatalogClientFactory, TokenIssuer};
use crate::error::{ProgramCacheError, Result};
use crate::sites::{Site, TenancyMode};

/// Environment variable prefix; nested keys are separated by `__`.
pub const ENV_PREFIX: &str = "PROGRAM_CACHE_";

/// Config file read from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "program-cache.toml";

/// Longest accepted token lifetime (one year).
pub const MAX_TOKEN_EXPIRATION_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub tenancy: TenancyMode,
    pub catalog: CatalogConfig,
    pub token: TokenConfig,
    pub cache: CacheConfig,
    pub service_accounts: Vec<ServiceAccount>,
    pub sites: Vec<Site>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            tenancy: TenancyMode::default(),
            catalog: CatalogConfig::default(),
            token: TokenConfig::default(),
            cache: CacheConfig::default(),
            service_accounts: Vec::new(),
            sites: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Catalog API base URL used when a site has no override.
    pub internal_api_url: String,
    /// Service account the refresh authenticates as.
    pub service_username: String,
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            internal_api_url: String::new(),
            service_username: "catalog_service_user".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expiration_secs: i64,
    pub algorithm: Algorithm,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expiration_secs", &self.expiration_secs)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: "http://localhost:18000/oauth2".to_string(),
            audience: "catalog".to_string(),
            expiration_secs: 60 * 60,
            algorithm: Algorithm::HS256,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache directory; the platform cache dir when unset.
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Assemble the provider chain: defaults, TOML file, then environment.
    ///
    /// With no explicit path, `program-cache.toml` in the working directory is
    /// used if it exists.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        match path {
            Some(path) => figment = figment.merge(Toml::file_exact(path)),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    figment = figment.merge(Toml::file(default_path));
                }
            }
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load configuration. Call [`Config::validate`] before talking to the catalog.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_figment(Self::figment(path))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        Ok(figment.extract()?)
    }

    /// Check the settings a refresh needs.
    pub fn validate(&self) -> Result<()> {
        if self.catalog.internal_api_url.trim().is_empty() {
            return Err(ProgramCacheError::Config(
                "catalog.internal_api_url must be set".to_string(),
            ));
        }
        if self.token.secret.is_empty() {
            return Err(ProgramCacheError::Config(
                "token.secret must be set".to_string(),
            ));
        }
        if self.token.expiration_secs <= 0 {
            return Err(ProgramCacheError::Config(
                "token.expiration_secs must be positive".to_string(),
            ));
        }
        if self.token.expiration_secs > MAX_TOKEN_EXPIRATION_SECS {
            return Err(ProgramCacheError::Config(format!(
                "token.expiration_secs must be at most {}",
                MAX_TOKEN_EXPIRATION_SECS
            )));
        }

        let mut names = HashSet::new();
        for site in &self.sites {
            if !names.insert(site.name.as_str()) {
                return Err(ProgramCacheError::Config(format!(
                    "duplicate site name '{}'",
                    site.name
                )));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.catalog.timeout_secs)
    }

    /// Resolved cache directory.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        self.cache
            .dir
            .clone()
            .or_else(default_cache_dir)
            .ok_or_else(|| ProgramCacheError::Config("no cache directory available".to_string()))
    }

    pub fn token_issuer(&self) -> TokenIssuer {
        TokenIssuer::new(
            self.token.secret.clone(),
            self.token.issuer.clone(),
            self.token.audience.clone(),
            self.token.expiration_secs,
            self.token.algorithm,
        )
    }

    pub fn client_factory(&self) -> CatalogClientFactory {
        CatalogClientFactory::new(
            AccountDirectory::new(self.service_accounts.clone()),
            self.token_issuer(),
            self.catalog.internal_api_url.clone(),
            self.timeout(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        log_level = "debug"
        tenancy = "multi"

        [catalog]
        internal_api_url = "https://catalog.example/api/v1/"
        service_username = "catalog_worker"

        [token]
        secret = "s3cret"

        [[service_accounts]]
        username = "catalog_worker"
        email = "worker@example.com"

        [[sites]]
        name = "north"
        configuration = { catalog_api_url = "https://north.example/api/v1/" }

        [[sites]]
        name = "south"
    "#;

    fn sample() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(SAMPLE))
    }

    #[test]
    fn test_load_from_toml() {
        let config = Config::from_figment(sample()).unwrap();
        config.validate().unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.tenancy, TenancyMode::Multi);
        assert_eq!(config.catalog.service_username, "catalog_worker");
        assert_eq!(config.catalog.timeout_secs, 30);
        assert_eq!(config.token.expiration_secs, 3600);
        assert_eq!(config.sites.len(), 2);
        assert_eq!(
            config.sites[0].catalog_url(&config.catalog.internal_api_url),
            "https://north.example/api/v1/"
        );
        assert!(config.sites[1].configuration.is_none());
    }

    #[test]
    fn test_overrides_win() {
        let figment = sample().merge(Serialized::default("catalog.timeout_secs", 5));
        let config = Config::from_figment(figment).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_missing_catalog_url_rejected() {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Serialized::default("token.secret", "x"));
        let config = Config::from_figment(figment).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ProgramCacheError::Config(msg) if msg.contains("internal_api_url")));
    }

    #[test]
    fn test_token_expiration_bounds() {
        let mut config = Config::from_figment(sample()).unwrap();

        config.token.expiration_secs = MAX_TOKEN_EXPIRATION_SECS;
        config.validate().unwrap();

        config.token.expiration_secs = i64::MAX;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ProgramCacheError::Config(msg) if msg.contains("expiration_secs")));

        config.token.expiration_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_sites_rejected() {
        let mut config = Config::from_figment(sample()).unwrap();
        config.sites = vec![Site::new("north"), Site::new("north")];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_cache_dir() {
        let figment = sample().merge(Serialized::default("cache.dir", "/var/cache/programs"));
        let config = Config::from_figment(figment).unwrap();
        assert_eq!(
            config.cache_dir().unwrap(),
            PathBuf::from("/var/cache/programs")
        );
    }

    #[test]
    fn test_token_config_debug_redacts_secret() {
        let config = Config::from_figment(sample()).unwrap();
        let debug = format!("{:?}", config.token);
        assert!(!debug.contains("s3cret"));
    }
}
