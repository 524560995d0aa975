use std::sync::{Arc, RwLock};

use reqwest::{Client, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use shared_models::response::ApiEnvelope;

use crate::error::ClientError;

/// Authenticated client for the booking API. Clones share the session, so
/// logging out through one clone affects every holder.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(token)),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_token().is_some()
    }

    pub fn login(&self, token: String) {
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token);
        }
    }

    pub fn logout(&self) {
        if let Ok(mut slot) = self.token.write() {
            *slot = None;
        }
        debug!("Session cleared");
    }

    fn current_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|slot| slot.clone())
    }

    /// `GET` a full URL and unwrap the envelope's `data`.
    pub async fn get_data<T>(&self, url: &str) -> Result<T, ClientError>
    where T: DeserializeOwned + Default {
        let response = self.send(Method::GET, url, None::<&()>).await?;
        let envelope = Self::read_envelope::<T>(response).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// `PUT` a JSON body to an API path; returns the envelope message and data.
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<(String, T), ClientError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        let response = self.send(Method::PUT, &url, Some(body)).await?;
        let envelope = Self::read_envelope::<T>(response).await?;
        let data = envelope
            .data
            .ok_or_else(|| ClientError::Decode("response carried no data".to_string()))?;
        Ok((envelope.message, data))
    }

    async fn send<B: Serialize>(&self, method: Method, url: &str, body: Option<&B>) -> Result<Response, ClientError> {
        let token = self.current_token().ok_or(ClientError::Unauthenticated)?;
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<ApiEnvelope<T>, ClientError> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiEnvelope<serde_json::Value>>(&bytes)
                .map(|envelope| envelope.message)
                .ok()
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
            return Err(ClientError::Http { status: status.as_u16(), message });
        }

        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }
}
