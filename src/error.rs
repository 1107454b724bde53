use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Serenity error: {0}")]
    Serenity(Box<poise::serenity_prelude::Error>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing environment variable: {0}")]
    MissingEnv(String),

    #[error("Completion API error ({status}): {message}")]
    CompletionApi {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Completion response error: {0}")]
    CompletionResponse(String),

    #[error("Completion task error: {0}")]
    CompletionTask(String),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl From<poise::serenity_prelude::Error> for BotError {
    fn from(err: poise::serenity_prelude::Error) -> Self {
        BotError::Serenity(Box::new(err))
    }
}

impl BotError {
    /// Returns a user-friendly error message suitable for displaying in Discord
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            BotError::Serenity(_) => {
                "❌ Discord is choking on my brilliance right now. Try again later.".to_string()
            }
            BotError::Config(_) | BotError::MissingEnv(_) => {
                "❌ Someone misconfigured me. Go bother the bot administrator.".to_string()
            }
            BotError::CompletionApi { status, .. } => match *status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    "❌ My AI provider refuses to recognise my credentials. Pathetic. Tell the bot administrator.".to_string()
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    "❌ I've been rate limited. Even genius needs a breather. Try again in a moment.".to_string()
                }
                status if status.is_server_error() => {
                    "❌ The AI service is falling apart on its end. Try again later.".to_string()
                }
                status if status.is_client_error() => {
                    "❌ The AI service rejected my request. Rephrase and try again.".to_string()
                }
                _ => "❌ I can't reach my AI service right now. Try again later.".to_string(),
            },
            BotError::CompletionResponse(_) => {
                "❌ The AI service sent back garbage. Try again.".to_string()
            }
            BotError::CompletionTask(_) => {
                "❌ My train of thought got cut off. Try again.".to_string()
            }
            BotError::Reqwest(_) => {
                "❌ Network trouble between me and my AI brain. Try again in a moment.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_has_dedicated_message() {
        let err = BotError::CompletionApi {
            status: StatusCode::TOO_MANY_REQUESTS,
            message: "slow down".to_string(),
        };
        assert!(err.user_message().contains("rate limited"));
    }

    #[test]
    fn user_message_never_leaks_details() {
        let err = BotError::CompletionApi {
            status: StatusCode::BAD_GATEWAY,
            message: "upstream secret detail".to_string(),
        };
        assert!(!err.user_message().contains("secret"));
        assert!(err.to_string().contains("secret"));
    }
}
