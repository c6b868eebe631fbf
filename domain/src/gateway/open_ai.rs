//! OpenAI API client implementing the completion provider boundary.
//!
//! Dispatches chat-family requests against `/chat/completions` and
//! reasoning-family requests against `/responses`, returning both as a
//! single plain-text completion. All failures are mapped to the provider
//! error vocabulary so the scoring layer never sees transport details.

use async_trait::async_trait;
use log::*;
use scoring_ai::{ChatMessage, CompletionRequest, Error as ProviderError, Provider};
use serde::{Deserialize, Serialize};

const PROVIDER_ID: &str = "openai";

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ResponsesBody<'a> {
    model: &'a str,
    input: &'a str,
    reasoning: ReasoningOptions<'a>,
    text: TextOptions<'a>,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ReasoningOptions<'a> {
    effort: &'a str,
}

#[derive(Debug, Serialize)]
struct TextOptions<'a> {
    verbosity: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output: Vec<ResponseOutputItem>,
}

/// Output items mix reasoning traces and message content; only message
/// items carry text parts.
#[derive(Debug, Deserialize)]
struct ResponseOutputItem {
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default)]
    content: Vec<ResponseContentPart>,
}

#[derive(Debug, Deserialize)]
struct ResponseContentPart {
    #[serde(rename = "type")]
    part_type: String,
    #[serde(default)]
    text: String,
}

/// OpenAI API client
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAiClient {
    /// Create a new OpenAI client with the given API key and base URL
    pub fn new(api_key: &str, base_url: &str, timeout_secs: u64) -> Result<Self, ProviderError> {
        let mut headers = reqwest::header::HeaderMap::new();

        let mut header_value =
            reqwest::header::HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                warn!("Failed to create auth header: {:?}", e);
                ProviderError::Configuration("Invalid API key format".to_string())
            })?;
        header_value.set_sensitive(true);
        headers.insert("authorization", header_value);

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| {
                warn!("Failed to build OpenAI HTTP client: {:?}", e);
                ProviderError::Configuration(e.to_string())
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let error_text = response.text().await.unwrap_or_default();
        error!("OpenAI API {}: {}", status, error_text);

        Err(match status.as_u16() {
            401 | 403 => ProviderError::Authentication(error_text),
            429 => ProviderError::RateLimited {
                retry_after_seconds: retry_after.unwrap_or(60),
            },
            _ => ProviderError::Provider(format!("{status}: {error_text}")),
        })
    }

    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: Option<f32>,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        let body = ChatCompletionBody {
            model,
            messages,
            temperature,
            max_tokens,
        };
        debug!("OpenAI chat completion against {}", model);

        let response = self.post_json("/chat/completions", &body).await?;
        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse chat completion response: {:?}", e);
            ProviderError::Deserialization(e.to_string())
        })?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    async fn reasoning_completion(
        &self,
        model: &str,
        input: &str,
        effort: &str,
        verbosity: &str,
        max_output_tokens: u32,
    ) -> Result<String, ProviderError> {
        let body = ResponsesBody {
            model,
            input,
            reasoning: ReasoningOptions { effort },
            text: TextOptions { verbosity },
            max_output_tokens,
        };
        debug!("OpenAI reasoning completion against {}", model);

        let response = self.post_json("/responses", &body).await?;
        let parsed: ResponsesResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse responses API response: {:?}", e);
            ProviderError::Deserialization(e.to_string())
        })?;

        let text = parsed
            .output
            .iter()
            .filter(|item| item.item_type == "message")
            .flat_map(|item| item.content.iter())
            .filter(|part| part.part_type == "output_text")
            .map(|part| part.text.as_str())
            .collect::<Vec<_>>()
            .join("");

        Ok(text)
    }
}

#[async_trait]
impl Provider for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        match request {
            CompletionRequest::Chat {
                model,
                messages,
                temperature,
                max_tokens,
            } => {
                self.chat_completion(&model, &messages, temperature, max_tokens)
                    .await
            }
            CompletionRequest::Reasoning {
                model,
                input,
                effort,
                verbosity,
                max_output_tokens,
            } => {
                self.reasoning_completion(&model, &input, &effort, &verbosity, max_output_tokens)
                    .await
            }
        }
    }

    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    /// Validate the API key with a lightweight model listing request
    async fn verify_credentials(&self) -> Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(transport_error)?;

        // 200 means valid key, 401 means invalid
        Ok(response.status().is_success())
    }
}

fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoring_ai::CompletionRequest;

    fn client(base_url: &str) -> OpenAiClient {
        OpenAiClient::new("test-key", base_url, 30).unwrap()
    }

    fn chat_request() -> CompletionRequest {
        CompletionRequest::for_model("gpt-4o-mini", "be terse", "score this", 0.3, 500)
    }

    #[tokio::test]
    async fn chat_completion_returns_the_message_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_body(r#"{"choices": [{"message": {"content": "{\"qualified\": true}"}}]}"#)
            .create_async()
            .await;

        let text = client(&server.url())
            .complete(chat_request())
            .await
            .unwrap();
        assert_eq!(text, r#"{"qualified": true}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn reasoning_models_hit_the_responses_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/responses")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"model": "gpt-5-mini", "reasoning": {"effort": "minimal"}}"#.to_string(),
            ))
            .with_status(200)
            .with_body(
                r#"{"output": [
                    {"type": "reasoning", "content": []},
                    {"type": "message", "content": [{"type": "output_text", "text": "verdict"}]}
                ]}"#,
            )
            .create_async()
            .await;

        let request = CompletionRequest::for_model("gpt-5-mini", "sys", "prompt", 0.3, 500);
        let text = client(&server.url()).complete(request).await.unwrap();
        assert_eq!(text, "verdict");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unauthorized_maps_to_an_authentication_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error": "invalid key"}"#)
            .create_async()
            .await;

        let err = client(&server.url())
            .complete(chat_request())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Authentication(_)));
    }

    #[tokio::test]
    async fn rate_limits_carry_the_retry_after_header() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_header("retry-after", "17")
            .create_async()
            .await;

        let err = client(&server.url())
            .complete(chat_request())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::RateLimited {
                retry_after_seconds: 17
            }
        ));
    }

    #[tokio::test]
    async fn server_errors_map_to_provider_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let err = client(&server.url())
            .complete(chat_request())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Provider(_)));
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_deserialization_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = client(&server.url())
            .complete(chat_request())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Deserialization(_)));
    }

    #[tokio::test]
    async fn verify_credentials_checks_the_models_endpoint() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/models")
            .with_status(200)
            .with_body(r#"{"data": []}"#)
            .create_async()
            .await;

        assert!(client(&server.url()).verify_credentials().await.unwrap());
    }

    #[tokio::test]
    async fn verify_credentials_is_false_for_a_bad_key() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/models")
            .with_status(401)
            .create_async()
            .await;

        assert!(!client(&server.url()).verify_credentials().await.unwrap());
    }
}
