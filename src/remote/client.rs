//! Jira Cloud REST client.
//!
//! A thin reqwest wrapper: base URL + credentials + `GET` returning JSON.
//! Pagination lives in [`crate::sync::fetch`]; this client knows nothing
//! about pages.

use crate::config::RemoteConfig;
use crate::error::{Error, Result};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::trace;

use super::RemoteApi;

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Jira Cloud client.
pub struct JiraClient {
    client: reqwest::Client,
    base_url: String,
    email: Option<String>,
    api_token: String,
}

impl JiraClient {
    /// Create a client for the given remote settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("jsync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            email: config.email,
            api_token: config.api_token,
        })
    }

    /// The site root requests are issued against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl RemoteApi for JiraClient {
    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.base_url, path);
        trace!(%url, ?query, "GET");

        let request = self.client.get(&url).query(query);
        let request = match &self.email {
            Some(email) => request.basic_auth(email, Some(&self.api_token)),
            None => request.bearer_auth(&self.api_token),
        };

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Fetch {
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer, email: Option<&str>) -> JiraClient {
        JiraClient::new(RemoteConfig {
            base_url: server.base_url(),
            email: email.map(String::from),
            api_token: "secret".to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_json_sends_query_and_basic_auth() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/api/3/project/search")
                    .query_param("startAt", "0")
                    .query_param("maxResults", "50")
                    .header_exists("authorization")
                    .header("accept", "application/json");
                then.status(200)
                    .json_body(json!({"values": [{"id": "1"}], "isLast": true}));
            })
            .await;

        let client = client_for(&server, Some("me@example.com"));
        let body = client
            .get_json(
                "/rest/api/3/project/search",
                &[("startAt", "0".to_string()), ("maxResults", "50".to_string())],
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(body["isLast"], true);
    }

    #[tokio::test]
    async fn test_bearer_auth_without_email() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/api/3/search")
                    .header("authorization", "Bearer secret");
                then.status(200).json_body(json!({"issues": []}));
            })
            .await;

        let client = client_for(&server, None);
        client.get_json("/rest/api/3/search", &[]).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_ok_status_becomes_fetch_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/rest/api/3/issue/10/worklog");
                then.status(403).body("You do not have permission");
            })
            .await;

        let client = client_for(&server, Some("me@example.com"));
        let err = client
            .get_json("/rest/api/3/issue/10/worklog", &[])
            .await
            .unwrap_err();

        match err {
            Error::Fetch { path, status, body } => {
                assert_eq!(path, "/rest/api/3/issue/10/worklog");
                assert_eq!(status, 403);
                assert_eq!(body, "You do not have permission");
            }
            other => panic!("expected fetch error, got {other:?}"),
        }
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = JiraClient::new(RemoteConfig {
            base_url: "https://acme.atlassian.net/".to_string(),
            email: None,
            api_token: "t".to_string(),
        })
        .unwrap();
        assert_eq!(client.base_url(), "https://acme.atlassian.net");
    }
}
