//! Remote Ledger Engine Adapter
//!
//! JSON over HTTP: each engine operation is `POST {base_url}/{operation}`
//! with the batch (or filter) as the body. Batch creates answer with the
//! failed items only, `[{"index": 0, "result": "exceeds_debits"}]`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::engine::{CreateAccountError, CreateTransferError, EngineError, LedgerEngine};
use super::types::{Account, AccountFilter, Transfer};
use crate::codec::format_u128;

/// Lookup body: `{"ids": ["1", "ff"]}`
#[derive(Serialize)]
struct IdsRequest {
    ids: Vec<String>,
}

impl IdsRequest {
    fn new(ids: &[u128]) -> Self {
        Self {
            ids: ids.iter().map(|id| format_u128(*id)).collect(),
        }
    }
}

/// Remote engine over HTTP
pub struct RemoteLedger {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteLedger {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EngineError> {
        info!("Initializing remote ledger engine at {}", base_url);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, operation: &str) -> String {
        format!("{}/{}", self.base_url, operation)
    }

    async fn call<T, R>(&self, operation: &'static str, body: &T) -> Result<R, EngineError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!(operation, "Ledger request");

        let response = self
            .client
            .post(self.url(operation))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    EngineError::Unavailable(format!("{}: {}", operation, e))
                } else {
                    EngineError::Transport(format!("{}: {}", operation, e))
                }
            })?;

        let status = response.status();
        if status.is_server_error() {
            return Err(EngineError::Unavailable(format!(
                "{}: HTTP {}",
                operation, status
            )));
        }
        if !status.is_success() {
            return Err(EngineError::Protocol(format!("{}: HTTP {}", operation, status)));
        }

        response
            .json()
            .await
            .map_err(|e| EngineError::Protocol(format!("{}: invalid response: {}", operation, e)))
    }
}

#[async_trait]
impl LedgerEngine for RemoteLedger {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn create_accounts(
        &self,
        accounts: &[Account],
    ) -> Result<Vec<CreateAccountError>, EngineError> {
        self.call("create_accounts", accounts).await
    }

    async fn create_transfers(
        &self,
        transfers: &[Transfer],
    ) -> Result<Vec<CreateTransferError>, EngineError> {
        self.call("create_transfers", transfers).await
    }

    async fn lookup_accounts(&self, ids: &[u128]) -> Result<Vec<Account>, EngineError> {
        self.call("lookup_accounts", &IdsRequest::new(ids)).await
    }

    async fn lookup_transfers(&self, ids: &[u128]) -> Result<Vec<Transfer>, EngineError> {
        self.call("lookup_transfers", &IdsRequest::new(ids)).await
    }

    async fn get_account_transfers(
        &self,
        filter: &AccountFilter,
    ) -> Result<Vec<Transfer>, EngineError> {
        self.call("get_account_transfers", filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_operation() {
        let ledger = RemoteLedger::new("http://ledger:3001/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            ledger.url("create_transfers"),
            "http://ledger:3001/create_transfers"
        );
    }

    #[test]
    fn test_lookup_body_is_hex() {
        let ids = [1u128, 255];
        let body = serde_json::to_string(&IdsRequest::new(&ids)).unwrap();
        assert_eq!(body, r#"{"ids":["1","ff"]}"#);
    }

    #[tokio::test]
    async fn test_unreachable_engine_is_unavailable() {
        let ledger = RemoteLedger::new("http://127.0.0.1:1", Duration::from_millis(200)).unwrap();
        let err = ledger.lookup_accounts(&[1]).await.unwrap_err();
        assert!(matches!(err, EngineError::Unavailable(_)), "{err:?}");
    }
}
