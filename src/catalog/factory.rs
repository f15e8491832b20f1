// Token-scoped catalog client construction.
// Resolves the service account, issues a token, and picks the site's base URL.

use std::time::Duration;

use tracing::debug;

use crate::accounts::AccountDirectory;
use crate::error::Result;
use crate::sites::Site;

use super::ClientFactory;
use super::client::CatalogClient;
use super::token::{CATALOG_SCOPES, TokenIssuer};

/// Builds [`CatalogClient`]s for a service account, optionally scoped to a site.
#[derive(Debug, Clone)]
pub struct CatalogClientFactory {
    accounts: AccountDirectory,
    issuer: TokenIssuer,
    default_url: String,
    timeout: Duration,
}

impl CatalogClientFactory {
    pub fn new(
        accounts: AccountDirectory,
        issuer: TokenIssuer,
        default_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            accounts,
            issuer,
            default_url: default_url.into(),
            timeout,
        }
    }

    /// Base URL a client for `site` would use.
    pub fn resolve_url<'a>(&'a self, site: Option<&'a Site>) -> &'a str {
        match site {
            Some(site) => site.catalog_url(&self.default_url),
            None => &self.default_url,
        }
    }
}

impl ClientFactory for CatalogClientFactory {
    type Client = CatalogClient;

    fn build_client(&self, username: &str, site: Option<&Site>) -> Result<CatalogClient> {
        let account = self.accounts.get(username)?;
        let jwt = self.issuer.build_token(account, &CATALOG_SCOPES)?;
        let url = self.resolve_url(site);

        debug!(
            username,
            site = site.map(|s| s.name.as_str()),
            url,
            "built catalog client"
        );

        CatalogClient::new(url, &jwt, self.timeout)
    }
}
