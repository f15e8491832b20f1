// Catalog API endpoint functions.
// Methods for the program list and program detail endpoints.

use crate::error::Result;

use super::CatalogApi;
use super::client::CatalogClient;
use super::types::{IN_SCOPE_STATUSES, ProgramDocument};

impl CatalogClient {
    /// Get the UUIDs of every active or retired program.
    pub async fn get_program_uuids(&self) -> Result<Vec<String>> {
        let status = IN_SCOPE_STATUSES.join(",");
        let params = [
            ("exclude_utm", "1"),
            ("status", status.as_str()),
            ("uuids_only", "1"),
        ];
        let response = self.get_with_params("/programs/", &params).await?;
        let uuids: Vec<String> = response.json().await?;
        Ok(uuids)
    }

    /// Get the full detail document for one program.
    pub async fn get_program(&self, uuid: &str) -> Result<ProgramDocument> {
        let params = [("exclude_utm", "1")];
        let response = self
            .get_with_params(&format!("/programs/{}/", uuid), &params)
            .await?;
        let program: ProgramDocument = response.json().await?;
        Ok(program)
    }
}

impl CatalogApi for CatalogClient {
    async fn program_uuids(&mut self) -> Result<Vec<String>> {
        self.get_program_uuids().await
    }

    async fn program(&mut self, uuid: &str) -> Result<ProgramDocument> {
        self.get_program(uuid).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::client::DEFAULT_TIMEOUT;
    use crate::error::ProgramCacheError;
    use httpmock::prelude::*;
    use serde_json::json;

    const A: &str = "6a1c5e1e-1b0c-4f3a-9a55-0c1d2e3f4a5b";
    const B: &str = "7b2d6f2f-2c1d-4a4b-8b66-1d2e3f4a5b6c";

    #[tokio::test]
    async fn test_get_program_uuids_query() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/programs/")
                .query_param("exclude_utm", "1")
                .query_param("status", "active,retired")
                .query_param("uuids_only", "1");
            then.status(200).json_body(json!([A, B]));
        });

        let client = CatalogClient::new(&server.url("/api/v1"), "t", DEFAULT_TIMEOUT).unwrap();
        let uuids = client.get_program_uuids().await.unwrap();

        assert_eq!(uuids, vec![A.to_string(), B.to_string()]);
        mock.assert();
    }

    #[tokio::test]
    async fn test_program_uuids_kept_verbatim() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/programs/");
            then.status(200)
                .json_body(json!(["6A1C5E1E-1B0C-4F3A-9A55-0C1D2E3F4A5B", "legacy-7"]));
        });

        let client = CatalogClient::new(&server.base_url(), "t", DEFAULT_TIMEOUT).unwrap();
        let uuids = client.get_program_uuids().await.unwrap();

        assert_eq!(
            uuids,
            vec![
                "6A1C5E1E-1B0C-4F3A-9A55-0C1D2E3F4A5B".to_string(),
                "legacy-7".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_get_program_detail_unmodified() {
        let document = json!({
            "uuid": A.to_uppercase(),
            "title": null,
            "status": "retired",
            "subtitle": null,
            "courses": []
        });
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path(format!("/programs/{}/", A))
                .query_param("exclude_utm", "1");
            then.status(200).json_body(document.clone());
        });

        let client = CatalogClient::new(&server.base_url(), "t", DEFAULT_TIMEOUT).unwrap();
        let program = client.get_program(A).await.unwrap();

        assert_eq!(program, document);
        mock.assert();
    }

    #[tokio::test]
    async fn test_get_program_malformed_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(format!("/programs/{}/", B));
            then.status(200).body("<html>maintenance</html>");
        });

        let client = CatalogClient::new(&server.base_url(), "t", DEFAULT_TIMEOUT).unwrap();
        let result = client.get_program(B).await;

        assert!(matches!(result, Err(ProgramCacheError::Api(_))));
    }
}
