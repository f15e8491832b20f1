// Service account directory.
// Resolves the configured catalog service username to an account record.

use serde::{Deserialize, Serialize};

use crate::error::{ProgramCacheError, Result};

/// A platform account allowed to call the catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccount {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_staff: bool,
}

impl ServiceAccount {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Known service accounts, looked up by username.
#[derive(Debug, Clone, Default)]
pub struct AccountDirectory {
    accounts: Vec<ServiceAccount>,
}

impl AccountDirectory {
    pub fn new(accounts: Vec<ServiceAccount>) -> Self {
        Self { accounts }
    }

    pub fn get(&self, username: &str) -> Result<&ServiceAccount> {
        self.accounts
            .iter()
            .find(|a| a.username == username)
            .ok_or_else(|| ProgramCacheError::UnknownServiceAccount(username.to_string()))
    }
}
