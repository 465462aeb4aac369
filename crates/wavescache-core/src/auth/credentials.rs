use anyhow::{Context, Result};
use keyring::Entry;

use crate::models::BoundAccount;

const SERVICE_NAME: &str = "wavescache";

/// Maps a user id to their bound external account.
pub trait CredentialStore: Send + Sync {
    fn get(&self, user_id: &str) -> Result<Option<BoundAccount>>;
}

/// Stores each `BoundAccount` as a JSON secret in the OS keychain,
/// keyed by user id.
pub struct KeyringCredentialStore {
    service: String,
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new(SERVICE_NAME)
    }
}

impl KeyringCredentialStore {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self, user_id: &str) -> Result<Entry> {
        Entry::new(&self.service, user_id).context("Failed to create keyring entry")
    }

    /// Bind (or rebind) an account for a user, keeping the original
    /// creation time on rebind.
    pub fn store(&self, user_id: &str, external_account_id: &str, credential: &str) -> Result<BoundAccount> {
        let account = match self.get(user_id)? {
            Some(mut existing) => {
                existing.rebind(external_account_id, credential);
                existing
            }
            None => BoundAccount::new(user_id, external_account_id, credential),
        };

        let secret = serde_json::to_string(&account)?;
        self.entry(user_id)?
            .set_password(&secret)
            .context("Failed to store credential in keychain")?;
        Ok(account)
    }

    /// Delete stored credentials for a user. Missing entries are fine.
    pub fn delete(&self, user_id: &str) -> Result<()> {
        match self.entry(user_id)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete credential from keychain"),
        }
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn get(&self, user_id: &str) -> Result<Option<BoundAccount>> {
        let secret = match self.entry(user_id)?.get_password() {
            Ok(secret) => secret,
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(e) => return Err(e).context("Failed to retrieve credential from keychain"),
        };

        let account = serde_json::from_str(&secret)
            .context("Stored credential is not a valid account binding")?;
        Ok(Some(account))
    }
}
