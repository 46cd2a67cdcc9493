//! JSON-RPC client for a DA node.
//!
//! Speaks the `da.*` method set: `MaxBlobSize`, `Submit`, `GetIDs` and `Get`.

mod types;

use std::{fmt, time::Duration};

use async_trait::async_trait;
use based_primitives::{BlobId, Namespace};
use chrono::{DateTime, Utc};
use jsonrpsee::{
    core::{client::ClientT, ClientError},
    http_client::{HeaderMap, HeaderValue, HttpClient, HttpClientBuilder},
    rpc_params,
};
use tracing::*;

use self::types::{Base64Bytes, GetIdsResponse};
use crate::{DaError, DaGateway, GetIdsResult};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error codes reported by the DA server.
pub mod codes {
    pub const BLOB_NOT_FOUND: i32 = 32001;
    pub const BLOB_SIZE_OVER_LIMIT: i32 = 32002;
    pub const TX_TOO_LARGE: i32 = 32006;
    pub const FUTURE_HEIGHT: i32 = 32008;
}

const METHOD_MAX_BLOB_SIZE: &str = "da.MaxBlobSize";
const METHOD_SUBMIT: &str = "da.Submit";
const METHOD_GET_IDS: &str = "da.GetIDs";
const METHOD_GET: &str = "da.Get";

/// [`DaGateway`] over HTTP JSON-RPC.
pub struct JsonRpcDaClient {
    client: HttpClient,
    url: String,
}

impl fmt::Debug for JsonRpcDaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonRpcDaClient")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl JsonRpcDaClient {
    /// Builds a client for `url`, sending `auth_token` as a bearer token if
    /// set.
    pub fn new(
        url: impl Into<String>,
        auth_token: Option<&str>,
        request_timeout: Duration,
    ) -> Result<Self, DaError> {
        let url = url.into();

        let mut headers = HeaderMap::new();
        if let Some(token) = auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| DaError::Transport(format!("invalid auth token: {e}")))?;
            headers.insert("Authorization", value);
        }

        let client = HttpClientBuilder::default()
            .request_timeout(request_timeout)
            .set_headers(headers)
            .build(&url)
            .map_err(|e| DaError::Transport(e.to_string()))?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DaGateway for JsonRpcDaClient {
    async fn max_blob_size(&self) -> Result<u64, DaError> {
        self.client
            .request(METHOD_MAX_BLOB_SIZE, rpc_params![])
            .await
            .map_err(|e| map_client_error(e, None))
    }

    async fn submit(
        &self,
        blobs: Vec<Vec<u8>>,
        gas_price: f64,
        namespace: &Namespace,
    ) -> Result<Vec<BlobId>, DaError> {
        let blobs: Vec<Base64Bytes> = blobs.into_iter().map(Base64Bytes::from).collect();
        let ns = Base64Bytes::from(namespace.as_bytes());

        let ids: Option<Vec<Base64Bytes>> = self
            .client
            .request(METHOD_SUBMIT, rpc_params![blobs, gas_price, ns])
            .await
            .map_err(|e| map_client_error(e, None))?;

        Ok(ids
            .unwrap_or_default()
            .into_iter()
            .map(|id| BlobId::new(id.0))
            .collect())
    }

    async fn get_ids(&self, height: u64, namespace: &Namespace) -> Result<GetIdsResult, DaError> {
        let ns = Base64Bytes::from(namespace.as_bytes());

        let resp: Option<GetIdsResponse> = self
            .client
            .request(METHOD_GET_IDS, rpc_params![height, ns])
            .await
            .map_err(|e| map_client_error(e, Some(height)))?;

        // A null result means nothing was published at the height.
        let Some(resp) = resp else {
            trace!(%height, "DA returned no ids");
            return Ok(GetIdsResult::new(Vec::new(), DateTime::<Utc>::default()));
        };

        let ids = resp
            .ids
            .unwrap_or_default()
            .into_iter()
            .map(|id| BlobId::new(id.0))
            .collect();
        Ok(GetIdsResult::new(ids, resp.timestamp))
    }

    async fn get(&self, ids: &[BlobId], namespace: &Namespace) -> Result<Vec<Vec<u8>>, DaError> {
        let ids: Vec<Base64Bytes> = ids.iter().map(|id| id.as_bytes().into()).collect();
        let ns = Base64Bytes::from(namespace.as_bytes());

        let blobs: Option<Vec<Base64Bytes>> = self
            .client
            .request(METHOD_GET, rpc_params![ids, ns])
            .await
            .map_err(|e| map_client_error(e, None))?;

        Ok(blobs
            .unwrap_or_default()
            .into_iter()
            .map(|b| b.0)
            .collect())
    }
}

/// Maps a server error code onto a [`DaError`].
///
/// Servers disagree on the sign of custom codes, so both are accepted.
fn map_call_error(code: i32, message: String, height: Option<u64>) -> DaError {
    match (code.abs(), height) {
        (codes::FUTURE_HEIGHT, Some(height)) => DaError::FutureHeight { height },
        (codes::BLOB_NOT_FOUND, _) => DaError::BlobNotFound,
        (codes::BLOB_SIZE_OVER_LIMIT | codes::TX_TOO_LARGE, _) => DaError::BlobTooLarge,
        _ => DaError::Rpc { code, message },
    }
}

fn map_client_error(err: ClientError, height: Option<u64>) -> DaError {
    match err {
        ClientError::Call(obj) => map_call_error(obj.code(), obj.message().to_owned(), height),
        ClientError::ParseError(e) => DaError::Malformed(e.to_string()),
        other => DaError::Transport(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_future_height() {
        let err = map_call_error(
            codes::FUTURE_HEIGHT,
            "given height is from the future".into(),
            Some(7),
        );
        assert!(matches!(err, DaError::FutureHeight { height: 7 }));

        let err = map_call_error(-codes::FUTURE_HEIGHT, String::new(), Some(8));
        assert!(matches!(err, DaError::FutureHeight { height: 8 }));
    }

    #[test]
    fn test_map_known_codes() {
        assert!(matches!(
            map_call_error(codes::BLOB_NOT_FOUND, String::new(), None),
            DaError::BlobNotFound
        ));
        assert!(matches!(
            map_call_error(-codes::BLOB_SIZE_OVER_LIMIT, String::new(), None),
            DaError::BlobTooLarge
        ));
        assert!(matches!(
            map_call_error(codes::TX_TOO_LARGE, String::new(), None),
            DaError::BlobTooLarge
        ));
    }

    #[test]
    fn test_map_unknown_code() {
        let err = map_call_error(-32603, "internal".into(), Some(1));
        match err {
            DaError::Rpc { code, message } => {
                assert_eq!(code, -32603);
                assert_eq!(message, "internal");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_client_builds_with_token() {
        let client = JsonRpcDaClient::new(
            "http://127.0.0.1:7980",
            Some("secret"),
            DEFAULT_REQUEST_TIMEOUT,
        )
        .unwrap();
        assert_eq!(client.url(), "http://127.0.0.1:7980");
    }
}
