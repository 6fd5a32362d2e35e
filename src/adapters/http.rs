use crate::domain::model::{ApiClient, ClientId};
use crate::domain::ports::{RemoteFetch, UpstreamResponse};
use crate::utils::error::ClientError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

/// Issues GET requests with HTTP Basic auth built from a stored [`ApiClient`].
#[derive(Debug, Clone)]
pub struct BasicAuthClient {
    record: ApiClient,
    http: Client,
}

impl BasicAuthClient {
    pub fn new(record: ApiClient, http: Client) -> Self {
        Self { record, http }
    }

    pub fn record(&self) -> &ApiClient {
        &self.record
    }
}

/// Flattens an error and its sources into one readable line.
fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[async_trait]
impl RemoteFetch for BasicAuthClient {
    fn client_id(&self) -> Option<ClientId> {
        Some(self.record.id)
    }

    fn path(&self) -> &str {
        &self.record.path
    }

    async fn get(&self, params: &[(&str, &str)]) -> Result<UpstreamResponse, ClientError> {
        let url = self.record.endpoint()?;
        tracing::debug!("📡 {}: GET {} {:?}", self.record.name, url, params);

        let response = self
            .http
            .get(url)
            .query(params)
            .basic_auth(
                &self.record.credential_id,
                Some(&self.record.credential_secret),
            )
            .send()
            .await
            .map_err(|e| ClientError::Connection(describe(&e)))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Connection(describe(&e)))?
            .to_vec();

        tracing::debug!(
            "📡 {}: API response status {} ({} bytes)",
            self.record.name,
            status,
            body.len()
        );

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}
