use std::env;
use std::num::NonZeroUsize;

use log::{debug, error, info};

use crate::error::{BotError, Result};
use crate::persona::DEFAULT_PERSONA;

const DEFAULT_MAX_HISTORY: NonZeroUsize = NonZeroUsize::new(10).unwrap();
const DEFAULT_MODEL: &str = "llama3-70b-8192";
const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Fixed sampling parameters sent with every completion request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_tokens: 1500,
            temperature: 0.8,
            top_p: 0.9,
            frequency_penalty: 0.2,
            presence_penalty: 0.1,
        }
    }
}

impl SamplingParams {
    /// Short, plain sampling for the startup connection check.
    pub fn connection_check() -> Self {
        Self {
            max_tokens: 50,
            temperature: 0.7,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub groq_api_key: String,
    pub groq_model: String,
    pub groq_api_url: String,
    pub system_prompt: String,
    /// Maximum user/assistant pairs kept per user.
    pub max_history_pairs: NonZeroUsize,
    pub sampling: SamplingParams,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first.
    ///
    /// # Errors
    ///
    /// Returns an error if a credential is missing or `MAX_HISTORY` is not a
    /// positive integer.
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment");
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key).filter(|v| !v.trim().is_empty()).ok_or_else(|| {
                error!("Failed to load {key} from environment");
                BotError::MissingEnv(key.to_string())
            })
        };

        let groq_api_key = required("GROQ_API_KEY")?;
        let discord_token = required("DISCORD_BOT_TOKEN")?;

        let max_history_pairs = match lookup("MAX_HISTORY") {
            Some(raw) => raw
                .trim()
                .parse::<NonZeroUsize>()
                .map_err(|e| BotError::Config(format!("MAX_HISTORY '{raw}' is invalid: {e}")))?,
            None => DEFAULT_MAX_HISTORY,
        };

        let groq_model = lookup("GROQ_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let groq_api_url = lookup("GROQ_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let system_prompt =
            lookup("SYSTEM_PROMPT").unwrap_or_else(|| DEFAULT_PERSONA.to_string());

        info!("Configuration loaded successfully");
        debug!("Discord token length: {} characters", discord_token.len());
        debug!("Groq API key length: {} characters", groq_api_key.len());
        debug!("Groq model: {groq_model}");
        debug!("Max history pairs: {max_history_pairs}");
        debug!("System prompt length: {} characters", system_prompt.len());

        Ok(Self {
            discord_token,
            groq_api_key,
            groq_model,
            groq_api_url,
            system_prompt,
            max_history_pairs,
            sampling: SamplingParams::default(),
        })
    }
}
