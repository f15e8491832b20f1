// Access token issuance for catalog API calls.
// Builds short-lived signed JWTs for a service account and a set of scopes.

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

use crate::accounts::ServiceAccount;
use crate::error::{ProgramCacheError, Result};

/// Claim groups a token may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Email,
    Profile,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Email => "email",
            Scope::Profile => "profile",
        }
    }
}

/// Scopes requested for catalog clients.
pub const CATALOG_SCOPES: [Scope; 2] = [Scope::Email, Scope::Profile];

/// JWT claims sent to the catalog service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub scopes: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub administrator: Option<bool>,
}

/// Signs access tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    issuer: String,
    audience: String,
    expires_in: i64,
    algorithm: Algorithm,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expires_in", &self.expires_in)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(
        secret: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        expires_in: i64,
        algorithm: Algorithm,
    ) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            expires_in,
            algorithm,
        }
    }

    /// Build a signed token for `account` valid from now.
    pub fn build_token(&self, account: &ServiceAccount, scopes: &[Scope]) -> Result<String> {
        self.build_token_at(account, scopes, Utc::now().timestamp())
    }

    /// Build a signed token for `account` issued at `now` (Unix seconds).
    pub fn build_token_at(
        &self,
        account: &ServiceAccount,
        scopes: &[Scope],
        now: i64,
    ) -> Result<String> {
        let claims = self.claims(account, scopes, now)?;
        let key = EncodingKey::from_secret(self.secret.as_bytes());
        let token = encode(&Header::new(self.algorithm), &claims, &key)?;
        Ok(token)
    }

    fn claims(&self, account: &ServiceAccount, scopes: &[Scope], now: i64) -> Result<Claims> {
        let exp = now.checked_add(self.expires_in).ok_or_else(|| {
            ProgramCacheError::Other(format!(
                "token lifetime of {}s overflows the expiry timestamp",
                self.expires_in
            ))
        })?;

        let mut claims = Claims {
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            sub: account.username.clone(),
            iat: now,
            exp,
            scopes: scopes.iter().map(|s| s.as_str().to_string()).collect(),
            email: None,
            email_verified: None,
            name: None,
            given_name: None,
            family_name: None,
            preferred_username: None,
            administrator: None,
        };

        for scope in scopes {
            match scope {
                Scope::Email => {
                    claims.email = Some(account.email.clone());
                    claims.email_verified = Some(true);
                }
                Scope::Profile => {
                    claims.name = Some(account.full_name());
                    claims.given_name = Some(account.first_name.clone());
                    claims.family_name = Some(account.last_name.clone());
                    claims.preferred_username = Some(account.username.clone());
                    claims.administrator = Some(account.is_staff);
                }
            }
        }

        Ok(claims)
    }
}
