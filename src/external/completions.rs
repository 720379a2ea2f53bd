use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    config::CompletionsConfig,
    error::{upstream_error, Error},
    external::CompletionService,
};

pub struct CompletionClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    customer_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageResponse,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Option<String>,
}

impl CompletionClient {
    pub fn new(config: &CompletionsConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/chat/completions", config.api_base.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            customer_id: config.customer_id.clone(),
        })
    }
}

#[async_trait]
impl CompletionService for CompletionClient {
    #[tracing::instrument(skip_all, fields(url = %self.url))]
    async fn complete(&self, system: &str, prompt: &str) -> Result<Option<String>, Error> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let mut request = self
            .client
            .post(&self.url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body);

        if let Some(customer_id) = &self.customer_id {
            request = request.header("CustomerId", customer_id);
        }

        let res = request.send().await?;

        let status = res.status();

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "completion service returned an error status");
            return Err(upstream_error());
        }

        let text = res.text().await?;

        // an undecodable envelope is treated like an unusable answer
        let content = serde_json::from_str::<ChatResponse>(&text)
            .ok()
            .and_then(|data| data.choices.into_iter().next())
            .and_then(|choice| choice.message.content);

        if content.is_none() {
            tracing::warn!("completion response carried no answer text");
        }

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(api_base: String) -> CompletionsConfig {
        CompletionsConfig {
            api_base,
            api_key: "test-key".into(),
            model: "test-model".into(),
            customer_id: Some("ops@ridesync.test".into()),
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(header("customerid", "ops@ridesync.test"))
            .and(body_partial_json(json!({ "model": "test-model" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "hello" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CompletionClient::new(&config(server.uri())).unwrap();
        let answer = client.complete("system", "prompt").await.unwrap();

        assert_eq!(answer.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn sends_system_then_user_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "messages": [
                    { "role": "system", "content": "be brief" },
                    { "role": "user", "content": "route please" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "ok" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CompletionClient::new(&config(server.uri())).unwrap();
        let answer = client.complete("be brief", "route please").await.unwrap();

        assert_eq!(answer.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn error_status_is_upstream_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = CompletionClient::new(&config(server.uri())).unwrap();
        let err = client.complete("system", "prompt").await.unwrap_err();

        assert!(err.is_upstream_error());
        assert_eq!(err.code, 4);
    }

    #[tokio::test]
    async fn unreadable_envelope_is_not_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
            .mount(&server)
            .await;

        let client = CompletionClient::new(&config(server.uri())).unwrap();
        let answer = client.complete("system", "prompt").await.unwrap();

        assert_eq!(answer, None);
    }

    #[tokio::test]
    async fn unreachable_service_is_upstream_failure() {
        // nothing listens on port 9 locally
        let client = CompletionClient::new(&config("http://127.0.0.1:9".into())).unwrap();
        let err = client.complete("system", "prompt").await.unwrap_err();

        assert!(err.is_upstream_error());
        assert_eq!(err.code, 3);
    }
}
