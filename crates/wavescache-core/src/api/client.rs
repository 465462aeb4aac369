//! HTTP client for the remote account service.
//!
//! `ApiClient` implements `RemoteAccountClient` over reqwest. Every endpoint
//! is a JSON POST authenticated by the `token` header.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::{json, Value};
use tracing::debug;

use super::error::RemoteError;
use super::schema::{BaseInfoData, Envelope, RoleDetailWire, RoleListData};
use super::RemoteAccountClient;
use crate::config::Config;
use crate::models::{EntityDetail, EntitySummary};

// ============================================================================
// Constants
// ============================================================================

/// Game identifier the service expects in every request body.
const GAME_ID: i64 = 2;

/// Account ids at or above this value live on the overseas server.
const OVERSEAS_ACCOUNT_THRESHOLD: i64 = 200_000_000;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

const LOGIN_LOG_PATH: &str = "/user/login/log";
const BASE_INFO_PATH: &str = "/aki/roleBox/akiBox/baseData";
const ROLE_LIST_PATH: &str = "/gamer/role/list";
const REFRESH_DATA_PATH: &str = "/aki/roleBox/akiBox/refreshData";
const ROLE_DETAIL_PATH: &str = "/aki/roleBox/akiBox/getRoleDetail";

/// API client for the remote account service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    server_id: String,
    overseas_server_id: String,
}

impl ApiClient {
    /// Create a new API client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            server_id: config.server_id.clone(),
            overseas_server_id: config.overseas_server_id.clone(),
        })
    }

    /// Pick the server id for an account. Non-numeric ids use the default.
    fn server_id_for(&self, account_id: &str) -> &str {
        match account_id.parse::<i64>() {
            Ok(id) if id >= OVERSEAS_ACCOUNT_THRESHOLD => &self.overseas_server_id,
            _ => &self.server_id,
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(RemoteError::from_status(status, &body))
        }
    }

    async fn post(
        &self,
        path: &str,
        credential: &str,
        body: Option<Value>,
        extra_headers: &[(&str, &str)],
    ) -> Result<Envelope, RemoteError> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self
            .client
            .post(&url)
            .header("token", credential)
            .header(header::USER_AGENT, USER_AGENT);
        for (name, value) in extra_headers {
            request = request.header(*name, *value);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let response = Self::check_response(response).await?;
        let text = response.text().await?;

        debug!(path = path, "Remote response received");
        serde_json::from_str(&text)
            .map_err(|e| RemoteError::InvalidResponse(format!("{}: {}", path, e)))
    }
}

#[async_trait]
impl RemoteAccountClient for ApiClient {
    async fn verify(&self, credential: &str) -> Result<(), RemoteError> {
        self.post(LOGIN_LOG_PATH, credential, None, &[("version", "1.0")])
            .await?
            .into_unit()
    }

    async fn resolve_account(&self, credential: &str) -> Result<String, RemoteError> {
        let body = json!({
            "gameId": GAME_ID,
            "serverId": self.server_id_for("0"),
            "roleId": "0",
        });
        let data: BaseInfoData = self
            .post(BASE_INFO_PATH, credential, Some(body), &[])
            .await?
            .into_data()?;

        data.account_id()
            .ok_or_else(|| RemoteError::InvalidResponse("no account id in base info".to_string()))
    }

    async fn list_entities(
        &self,
        _account_id: &str,
        credential: &str,
    ) -> Result<Vec<EntitySummary>, RemoteError> {
        let body = json!({ "gameId": GAME_ID });
        let data: RoleListData = self
            .post(ROLE_LIST_PATH, credential, Some(body), &[("devcode", "")])
            .await?
            .into_data_or_default()?;

        Ok(data.role_list.into_iter().map(EntitySummary::from).collect())
    }

    async fn server_refresh(&self, account_id: &str, credential: &str) -> Result<(), RemoteError> {
        let body = json!({
            "gameId": GAME_ID,
            "serverId": self.server_id_for(account_id),
            "roleId": account_id,
        });
        self.post(REFRESH_DATA_PATH, credential, Some(body), &[])
            .await?
            .into_unit()
    }

    async fn fetch_entity_detail(
        &self,
        account_id: &str,
        entity_id: i64,
        credential: &str,
    ) -> Result<EntityDetail, RemoteError> {
        let body = json!({
            "gameId": GAME_ID,
            "serverId": self.server_id_for(account_id),
            "roleId": account_id,
            "channelId": "19",
            "countryCode": "1",
            "id": entity_id.to_string(),
        });
        let wire: RoleDetailWire = self
            .post(ROLE_DETAIL_PATH, credential, Some(body), &[])
            .await?
            .into_data()?;

        let detail = wire
            .into_detail()
            .map_err(|e| RemoteError::InvalidResponse(format!("entity {}: {}", entity_id, e)))?;

        if detail.entity_id != entity_id {
            return Err(RemoteError::InvalidResponse(format!(
                "requested entity {} but received {}",
                entity_id, detail.entity_id
            )));
        }
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::TRANSPORT_FAILURE_CODE;
    use crate::api::schema::tests::role_detail_json;
    use wiremock::matchers::{body_partial_json, header as header_eq, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        let config = Config {
            api_url: server.uri(),
            ..Config::default()
        };
        ApiClient::new(&config).unwrap()
    }

    fn ok(data: Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "data": data,
            "message": "success"
        }))
    }

    #[test]
    fn test_server_id_for() {
        let client = ApiClient::new(&Config::default()).unwrap();
        let config = Config::default();

        assert_eq!(client.server_id_for("100000001"), config.server_id);
        assert_eq!(client.server_id_for("200000000"), config.overseas_server_id);
        assert_eq!(client.server_id_for("not-a-number"), config.server_id);
    }

    #[tokio::test]
    async fn test_resolve_account() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(BASE_INFO_PATH))
            .and(header_eq("token", "ck-token"))
            .respond_with(ok(json!({"roleBoxBaseData": [{"roleId": 100000001}]})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let account_id = client.resolve_account("ck-token").await.unwrap();
        assert_eq!(account_id, "100000001");
    }

    #[tokio::test]
    async fn test_resolve_account_without_id_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(BASE_INFO_PATH))
            .respond_with(ok(json!({"roleBoxBaseData": []})))
            .mount(&server)
            .await;

        let err = client_for(&server).resolve_account("ck-token").await.unwrap_err();
        assert!(matches!(err, RemoteError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_list_entities() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ROLE_LIST_PATH))
            .respond_with(ok(json!({"roleList": [
                {"roleId": 1403, "roleName": "忌炎", "level": 80, "starLevel": 5},
                {"roleId": 1202, "roleName": "白芷", "level": 60, "starLevel": 4}
            ]})))
            .mount(&server)
            .await;

        let entities = client_for(&server)
            .list_entities("100000001", "ck-token")
            .await
            .unwrap();

        assert_eq!(entities.len(), 2);
        assert_eq!(entities[1].entity_id, 1202);
        assert_eq!(entities[1].rarity_tier, 4);
    }

    #[tokio::test]
    async fn test_list_entities_null_data_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ROLE_LIST_PATH))
            .respond_with(ok(Value::Null))
            .mount(&server)
            .await;

        let entities = client_for(&server)
            .list_entities("100000001", "ck-token")
            .await
            .unwrap();
        assert!(entities.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_entity_detail_uses_overseas_server() {
        let server = MockServer::start().await;
        let config = Config::default();
        Mock::given(method("POST"))
            .and(path(ROLE_DETAIL_PATH))
            .and(body_partial_json(json!({
                "serverId": config.overseas_server_id,
                "roleId": "200000001",
                "id": "1403"
            })))
            .respond_with(ok(role_detail_json(1403)))
            .mount(&server)
            .await;

        let detail = client_for(&server)
            .fetch_entity_detail("200000001", 1403, "ck-token")
            .await
            .unwrap();
        assert_eq!(detail.entity_id, 1403);
        assert_eq!(detail.unlocked_count(), 2);
    }

    #[tokio::test]
    async fn test_fetch_entity_detail_rejects_mismatched_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ROLE_DETAIL_PATH))
            .respond_with(ok(role_detail_json(1202)))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_entity_detail("100000001", 1403, "ck-token")
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_application_error_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(REFRESH_DATA_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 220,
                "data": null,
                "message": "登录已过期"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .server_refresh("100000001", "ck-token")
            .await
            .unwrap_err();
        assert_eq!(err.code(), 220);
    }

    #[tokio::test]
    async fn test_http_failure_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(LOGIN_LOG_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server).verify("ck-token").await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(err.code(), TRANSPORT_FAILURE_CODE);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transient() {
        let config = Config {
            api_url: "http://127.0.0.1:1".to_string(),
            ..Config::default()
        };
        let client = ApiClient::new(&config).unwrap();

        let err = client.verify("ck-token").await.unwrap_err();
        assert!(err.is_transient());
    }
}
