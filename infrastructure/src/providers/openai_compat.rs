//! OpenAI-compatible chat completions backend.
//!
//! Works with any endpoint that accepts `POST {base_url}/chat/completions`
//! with the standard `messages` body.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use warroom_application::{BackendError, CompletionRequest, LlmBackend};

pub struct OpenAiCompatBackend {
    client: reqwest::Client,
    name: String,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatBackend {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("warroom/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn body(&self, request: &CompletionRequest) -> serde_json::Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": request.user_prompt },
            ],
            "temperature": request.options.temperature,
            "max_tokens": request.options.max_tokens,
        })
    }
}

fn classify(err: reqwest::Error, request: &CompletionRequest) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout(request.options.timeout)
    } else if err.is_decode() {
        BackendError::ServerError(format!("Malformed response: {}", err))
    } else if err.is_builder() {
        BackendError::ClientError(err.to_string())
    } else {
        BackendError::ServerError(err.to_string())
    }
}

#[async_trait]
impl LlmBackend for OpenAiCompatBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        debug!("POST {} (model: {})", self.endpoint(), self.model);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .timeout(request.options.timeout)
            .json(&self.body(request))
            .send()
            .await
            .map_err(|e| classify(e, request))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::from_status(status.as_u16(), &body));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| classify(e, request))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| BackendError::ServerError("Response contained no choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let backend = OpenAiCompatBackend::new("main", "http://localhost:8080/v1/", "m", "k").unwrap();
        assert_eq!(backend.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_body_carries_prompts_and_options() {
        let backend = OpenAiCompatBackend::new("main", "http://localhost", "gpt-test", "k").unwrap();
        let body = backend.body(&CompletionRequest::new("sys", "user"));
        assert_eq!(body["model"], "gpt-test");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "user");
        assert_eq!(body["max_tokens"], 2000);
    }

    #[test]
    fn test_response_parsing() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":"hi"}}]}"#).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("hi"));

        let empty: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.choices.is_empty());
    }
}
