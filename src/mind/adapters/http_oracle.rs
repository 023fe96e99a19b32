use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use serde_json::{Value, json};

use crate::mind::{
    error::{MindError, advisory_failure, internal_error},
    ports::AdvisoryOracle,
};

/// Advisory oracle backed by an OpenAI-compatible `chat/completions` endpoint.
#[derive(Clone)]
pub struct HttpAdvisoryOracle {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpAdvisoryOracle {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, MindError> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| internal_error(format!("failed to build http client: {err}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
        })
    }

    /// Reads the API key from `api_key_env`; an unset variable means no authorization header.
    pub fn from_env(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key_env: Option<&str>,
    ) -> Result<Self, MindError> {
        let api_key = api_key_env.and_then(|name| std::env::var(name).ok());
        Self::new(endpoint, model, api_key)
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl AdvisoryOracle for HttpAdvisoryOracle {
    async fn advise(&self, prompt: &str) -> Result<String, MindError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": prompt},
            ],
            "stream": false,
        });

        let mut request = self
            .client
            .post(self.url())
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| advisory_failure(format!("advisory request failed: {err}")))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(advisory_failure(format!(
                "advisory backend returned {status}: {detail}"
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|err| advisory_failure(format!("advisory reply is not json: {err}")))?;
        extract_content(&payload)
    }
}

fn extract_content(payload: &Value) -> Result<String, MindError> {
    payload
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| advisory_failure("advisory reply carries no message content"))
}
