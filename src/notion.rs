//! Optional Notion workspace client.
//!
//! The integration is best-effort: without an API key, or when the client
//! cannot be built, the application runs with an absent handle and every
//! Notion-backed feature stays disabled.
use crate::configuration::NotionSettings;
use anyhow::Context;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;

const NOTION_VERSION: &str = "2022-06-28";

/// Workspace database identifiers, each optional.
#[derive(Clone, Debug)]
pub struct NotionDatabases {
    pub proyectos: Option<String>,
    pub partidas: Option<String>,
    pub planes: Option<String>,
    pub materiales_db1: Option<String>,
    pub materiales_db2: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NotionClient {
    http_client: Client,
    base_url: Url,
    databases: NotionDatabases,
}

impl NotionClient {
    pub fn new(settings: &NotionSettings) -> Result<Self, anyhow::Error> {
        let api_key = settings
            .api_key
            .as_deref()
            .context("NOTION_API_KEY is not set")?;
        let base_url =
            Url::parse(&settings.api_base).context("Invalid Notion API base URL")?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .context("NOTION_API_KEY is not a valid header value")?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert("Notion-Version", HeaderValue::from_static(NOTION_VERSION));

        let http_client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .default_headers(headers)
            .build()
            .context("Failed to build the Notion HTTP client")?;

        Ok(Self {
            http_client,
            base_url,
            databases: NotionDatabases {
                proyectos: settings.database_id_proyectos.clone(),
                partidas: settings.database_id_partidas.clone(),
                planes: settings.database_id_planes.clone(),
                materiales_db1: settings.database_id_materiales_db1.clone(),
                materiales_db2: settings.database_id_materiales_db2.clone(),
            },
        })
    }

    pub fn databases(&self) -> &NotionDatabases {
        &self.databases
    }

    pub async fn query_database(&self, database_id: &str) -> Result<Value, anyhow::Error> {
        let url = self
            .base_url
            .join(&format!("v1/databases/{database_id}/query"))
            .context("Invalid Notion database path")?;

        let response = self
            .http_client
            .post(url)
            .json(&serde_json::json!({}))
            .send()
            .await
            .context("Failed to reach the Notion API")?
            .error_for_status()
            .context("Notion API returned an error status")?;

        response
            .json()
            .await
            .context("Failed to deserialize the Notion API response")
    }

    pub async fn retrieve_page(&self, page_id: &str) -> Result<Value, anyhow::Error> {
        let url = self
            .base_url
            .join(&format!("v1/pages/{page_id}"))
            .context("Invalid Notion page path")?;

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .context("Failed to reach the Notion API")?
            .error_for_status()
            .context("Notion API returned an error status")?;

        response
            .json()
            .await
            .context("Failed to deserialize the Notion API response")
    }
}

/// The handle attached to the application; explicitly absent when the
/// integration is disabled or failed to initialize.
pub struct NotionHandle(Option<NotionClient>);

impl NotionHandle {
    pub fn client(&self) -> Option<&NotionClient> {
        self.0.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.0.is_some()
    }
}

impl From<Option<NotionClient>> for NotionHandle {
    fn from(client: Option<NotionClient>) -> Self {
        Self(client)
    }
}

/// Tolerant construction path used by the bootstrap: a missing key or a
/// failed construction leaves the handle absent and never aborts startup.
pub fn build_notion_client(settings: &NotionSettings) -> Option<NotionClient> {
    if settings.api_key.is_none() {
        tracing::warn!(
            "NOTION_API_KEY is not set; the Notion integration is disabled"
        );
        return None;
    }

    match NotionClient::new(settings) {
        Ok(client) => {
            tracing::debug!("Notion client initialized");
            Some(client)
        }
        Err(e) => {
            tracing::error!(
                error.cause_chain = ?e,
                "failed to initialize the Notion client; continuing without it"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NotionClient, build_notion_client};
    use crate::configuration::NotionSettings;
    use claims::{assert_none, assert_ok, assert_some};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(api_key: Option<&str>, api_base: &str) -> NotionSettings {
        NotionSettings {
            api_key: api_key.map(str::to_string),
            api_base: api_base.to_string(),
            timeout_ms: 200,
            database_id_proyectos: Some("db-proyectos".to_string()),
            database_id_partidas: None,
            database_id_planes: None,
            database_id_materiales_db1: None,
            database_id_materiales_db2: None,
        }
    }

    #[test]
    fn missing_api_key_disables_the_integration() {
        assert_none!(build_notion_client(&settings(
            None,
            "https://api.notion.com"
        )));
    }

    #[test]
    fn invalid_base_url_is_survived() {
        assert_none!(build_notion_client(&settings(
            Some("secret_key"),
            "not a url"
        )));
    }

    #[test]
    fn api_key_with_control_characters_is_survived() {
        assert_none!(build_notion_client(&settings(
            Some("secret\nkey"),
            "https://api.notion.com"
        )));
    }

    #[test]
    fn valid_settings_produce_a_client() {
        let client = assert_some!(build_notion_client(&settings(
            Some("secret_key"),
            "https://api.notion.com"
        )));
        assert_eq!(client.databases().proyectos.as_deref(), Some("db-proyectos"));
    }

    #[actix_web::test]
    async fn query_database_sends_the_expected_request() {
        let mock_server = MockServer::start().await;
        let client = NotionClient::new(&settings(Some("secret_key"), &mock_server.uri()))
            .expect("Failed to build client");

        Mock::given(method("POST"))
            .and(path("/v1/databases/db-proyectos/query"))
            .and(header("Authorization", "Bearer secret_key"))
            .and(header("Notion-Version", super::NOTION_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": []
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let body = assert_ok!(client.query_database("db-proyectos").await);
        assert!(body.get("results").is_some());
    }

    #[actix_web::test]
    async fn query_database_surfaces_error_statuses() {
        let mock_server = MockServer::start().await;
        let client = NotionClient::new(&settings(Some("secret_key"), &mock_server.uri()))
            .expect("Failed to build client");

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        assert!(client.query_database("db-proyectos").await.is_err());
    }
}
