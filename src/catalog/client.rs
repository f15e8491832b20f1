// Catalog API HTTP client.
// Handles token authentication and request/response processing.

use std::time::Duration;

use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};

use crate::error::{ProgramCacheError, Result};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Catalog API client bound to one base URL and one access token.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    /// Create a new catalog client for `base_url`, authenticating with `jwt`.
    pub fn new(base_url: &str, jwt: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("JWT {}", jwt))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("program-cache/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(ProgramCacheError::Api)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL every request is resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make a GET request to the catalog API.
    pub async fn get(&self, endpoint: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self.client.get(&url).send().await?;

        check_response(response).await
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_params<T: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        params: &T,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self.client.get(&url).query(params).send().await?;

        check_response(response).await
    }
}

/// Check response status and convert errors.
async fn check_response(response: Response) -> Result<Response> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ProgramCacheError::Unauthorized),
        StatusCode::NOT_FOUND => Err(ProgramCacheError::NotFound(response.url().to_string())),
        status => {
            let url = response.url().to_string();
            Err(ProgramCacheError::UnexpectedStatus {
                status: status.as_u16(),
                url,
                body: response.text().await.unwrap_or_default(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_sends_jwt_authorization() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/ping")
                .header("authorization", "JWT abc.def.ghi");
            then.status(200).body("pong");
        });

        let client =
            CatalogClient::new(&server.url("/api/v1/"), "abc.def.ghi", DEFAULT_TIMEOUT).unwrap();
        let response = client.get("/ping").await.unwrap();

        assert_eq!(response.text().await.unwrap(), "pong");
        mock.assert();
    }

    #[tokio::test]
    async fn test_error_status_mapping() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/denied");
            then.status(401);
        });
        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });
        server.mock(|when, then| {
            when.method(GET).path("/broken");
            then.status(500).body("boom");
        });

        let client = CatalogClient::new(&server.base_url(), "t", DEFAULT_TIMEOUT).unwrap();

        assert!(matches!(
            client.get("/denied").await,
            Err(ProgramCacheError::Unauthorized)
        ));
        assert!(matches!(
            client.get("/missing").await,
            Err(ProgramCacheError::NotFound(_))
        ));
        match client.get("/broken").await {
            Err(ProgramCacheError::UnexpectedStatus { status, body, .. }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected UnexpectedStatus, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = CatalogClient::new("https://catalog.example/api/v1/", "t", DEFAULT_TIMEOUT)
            .unwrap();
        assert_eq!(client.base_url(), "https://catalog.example/api/v1");
    }
}
