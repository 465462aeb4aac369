//! Remote account service client module.
//!
//! This module provides the `RemoteAccountClient` seam the refresh layer
//! depends on, and `ApiClient`, its HTTP implementation. Every call returns
//! a uniform `{code, data, message}` envelope; code 0 is success.
//!
//! The service authenticates with an opaque token sent in the `token` header.

pub mod client;
pub mod error;
pub(crate) mod schema;

use async_trait::async_trait;

use crate::models::{EntityDetail, EntitySummary};

pub use client::ApiClient;
pub use error::{RemoteError, SUCCESS_CODE, TRANSPORT_FAILURE_CODE};

/// Operations the refresh layer needs from the remote account service.
#[async_trait]
pub trait RemoteAccountClient: Send + Sync {
    /// Login/verification ping. Only its side effects matter.
    async fn verify(&self, credential: &str) -> Result<(), RemoteError>;

    /// Look up the external account id the credential belongs to.
    async fn resolve_account(&self, credential: &str) -> Result<String, RemoteError>;

    async fn list_entities(
        &self,
        account_id: &str,
        credential: &str,
    ) -> Result<Vec<EntitySummary>, RemoteError>;

    /// Ask the service to rebuild its view of the account.
    async fn server_refresh(&self, account_id: &str, credential: &str) -> Result<(), RemoteError>;

    async fn fetch_entity_detail(
        &self,
        account_id: &str,
        entity_id: i64,
        credential: &str,
    ) -> Result<EntityDetail, RemoteError>;
}
