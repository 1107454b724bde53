//! Client for the Groq OpenAI-compatible chat completion endpoint.

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::SamplingParams;
use crate::error::{BotError, Result};
use crate::types::ConversationTurn;

/// Anything that can turn an ordered list of turns into one generated reply.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, turns: Vec<ConversationTurn>) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ConversationTurn],
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Pull the provider's `error.message` out of a failure body, or keep the raw body.
fn api_error_message(body: String) -> String {
    match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body,
    }
}

pub struct GroqClient {
    api_key: String,
    api_url: String,
    client: reqwest::Client,
    model: String,
    sampling: SamplingParams,
}

impl GroqClient {
    pub fn new(api_key: String, api_url: String, model: String, sampling: SamplingParams) -> Self {
        Self {
            api_key,
            api_url,
            client: reqwest::Client::new(),
            model,
            sampling,
        }
    }

    fn build_request<'a>(&'a self, turns: &'a [ConversationTurn]) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: turns,
            max_tokens: self.sampling.max_tokens,
            temperature: self.sampling.temperature,
            top_p: self.sampling.top_p,
            frequency_penalty: self.sampling.frequency_penalty,
            presence_penalty: self.sampling.presence_penalty,
        }
    }
}

#[async_trait]
impl CompletionBackend for GroqClient {
    async fn complete(&self, turns: Vec<ConversationTurn>) -> Result<String> {
        debug!("Sending request to Groq API with {} messages", turns.len());

        let request = self.build_request(&turns);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .map_or_else(|e| format!("Failed to read error response: {e}"), api_error_message);
            return Err(BotError::CompletionApi { status, message });
        }

        let api_response: ChatResponse = response.json().await?;

        let reply = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| BotError::CompletionResponse("No choices in response".to_string()))?
            .message
            .content
            .unwrap_or_default();

        debug!("Received {} characters from Groq API", reply.len());
        Ok(reply)
    }
}
