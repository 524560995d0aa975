use anyhow::{Result, anyhow};
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Thin client over the PostgREST surface of the document store.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.anon_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, auth_token, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers(auth_token)?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Store error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("Store error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// `GET` rows matching a PostgREST query string (without the leading `?`).
    pub async fn select(&self, table: &str, query: &str, auth_token: Option<&str>) -> Result<Vec<Value>> {
        let path = if query.is_empty() {
            format!("/rest/v1/{}", table)
        } else {
            format!("/rest/v1/{}?{}", table, query)
        };
        self.request(Method::GET, &path, auth_token, None).await
    }

    /// `PATCH` matching rows and return their new representation.
    pub async fn update_returning(
        &self,
        table: &str,
        query: &str,
        body: Value,
        auth_token: Option<&str>,
    ) -> Result<Vec<Value>> {
        let path = format!("/rest/v1/{}?{}", table, query);
        self.request_with_headers(
            Method::PATCH,
            &path,
            auth_token,
            Some(body),
            Some(Self::return_representation()),
        ).await
    }

    /// `DELETE` matching rows and return what was removed.
    pub async fn delete_returning(&self, table: &str, query: &str, auth_token: Option<&str>) -> Result<Vec<Value>> {
        let path = format!("/rest/v1/{}?{}", table, query);
        self.request_with_headers(
            Method::DELETE,
            &path,
            auth_token,
            None,
            Some(Self::return_representation()),
        ).await
    }

    fn return_representation() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{MockServer, Mock, ResponseTemplate};
    use wiremock::matchers::{method, path, header, query_param};

    fn config_for(uri: &str) -> AppConfig {
        AppConfig {
            supabase_url: uri.to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            supabase_jwt_secret: "secret".to_string(),
            server_port: 3000,
            cloudinary_base_url: String::new(),
            cloudinary_cloud_name: String::new(),
            cloudinary_upload_preset: String::new(),
        }
    }

    #[tokio::test]
    async fn select_sends_api_key_and_bearer() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/doctors"))
            .and(query_param("id", "eq.d1"))
            .and(header("apikey", "test-anon-key"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "d1"}])))
            .mount(&mock_server)
            .await;

        let client = SupabaseClient::new(&config_for(&mock_server.uri()));
        let rows = client.select("doctors", "id=eq.d1", Some("tok")).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], "d1");
    }

    #[tokio::test]
    async fn update_asks_for_representation() {
        let mock_server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/users"))
            .and(header("Prefer", "return=representation"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "u1", "name": "New"}])))
            .mount(&mock_server)
            .await;

        let client = SupabaseClient::new(&config_for(&mock_server.uri()));
        let rows = client
            .update_returning("users", "id=eq.u1", json!({"name": "New"}), None)
            .await
            .unwrap();
        assert_eq!(rows[0]["name"], "New");
    }

    #[tokio::test]
    async fn server_error_becomes_err() {
        let mock_server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let client = SupabaseClient::new(&config_for(&mock_server.uri()));
        let err = client.delete_returning("users", "id=eq.u1", None).await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }
}
