//! Runs completion requests off the event task and folds failures into notices.

use std::sync::Arc;

use log::{debug, error, warn};
use tokio_util::sync::CancellationToken;

use crate::error::BotError;
use crate::groq::CompletionBackend;

use super::prompt::PromptRequest;

/// Outcome of one completion call. Failures already carry the text to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionResult {
    Text(String),
    Failed { notice: String },
}

#[derive(Clone)]
pub struct CompletionInvoker {
    backend: Arc<dyn CompletionBackend>,
    shutdown: CancellationToken,
}

impl CompletionInvoker {
    pub fn new(backend: Arc<dyn CompletionBackend>, shutdown: CancellationToken) -> Self {
        Self { backend, shutdown }
    }

    /// Send the prompt on a separate task and wait for it.
    ///
    /// The caller only suspends; other events keep being handled meanwhile.
    /// Cancelling the shutdown token aborts the in-flight request.
    pub async fn invoke(&self, prompt: PromptRequest) -> CompletionResult {
        let backend = Arc::clone(&self.backend);
        let turns = prompt.into_turns();
        debug!("Dispatching completion with {} turns", turns.len());

        let mut task = tokio::spawn(async move { backend.complete(turns).await });

        let joined = tokio::select! {
            joined = &mut task => joined,
            () = self.shutdown.cancelled() => {
                task.abort();
                warn!("Completion request cancelled by shutdown");
                return CompletionResult::Failed {
                    notice: BotError::CompletionTask("cancelled by shutdown".to_string())
                        .user_message(),
                };
            }
        };

        let err = match joined {
            Ok(Ok(text)) => return CompletionResult::Text(text),
            Ok(Err(e)) => e,
            Err(join_err) => BotError::CompletionTask(join_err.to_string()),
        };

        error!("Error generating response from completion API: {err:?}");
        CompletionResult::Failed {
            notice: err.user_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::StatusCode;

    use super::*;
    use crate::error::Result;
    use crate::types::ConversationTurn;

    struct Echo;

    #[async_trait]
    impl CompletionBackend for Echo {
        async fn complete(&self, turns: Vec<ConversationTurn>) -> Result<String> {
            Ok(format!("{} turns", turns.len()))
        }
    }

    struct Unauthorized;

    #[async_trait]
    impl CompletionBackend for Unauthorized {
        async fn complete(&self, _turns: Vec<ConversationTurn>) -> Result<String> {
            Err(BotError::CompletionApi {
                status: StatusCode::UNAUTHORIZED,
                message: "invalid api key".to_string(),
            })
        }
    }

    struct Hangs;

    #[async_trait]
    impl CompletionBackend for Hangs {
        async fn complete(&self, _turns: Vec<ConversationTurn>) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(String::new())
        }
    }

    struct Panics;

    #[async_trait]
    impl CompletionBackend for Panics {
        async fn complete(&self, _turns: Vec<ConversationTurn>) -> Result<String> {
            panic!("backend exploded")
        }
    }

    fn prompt() -> PromptRequest {
        PromptRequest::new("persona", vec![ConversationTurn::user("hi")])
    }

    #[tokio::test]
    async fn returns_generated_text() {
        let invoker = CompletionInvoker::new(Arc::new(Echo), CancellationToken::new());
        assert_eq!(
            invoker.invoke(prompt()).await,
            CompletionResult::Text("2 turns".to_string())
        );
    }

    #[tokio::test]
    async fn api_errors_become_notices() {
        let invoker = CompletionInvoker::new(Arc::new(Unauthorized), CancellationToken::new());
        let CompletionResult::Failed { notice } = invoker.invoke(prompt()).await else {
            panic!("expected failure");
        };
        assert!(notice.contains("credentials"));
        assert!(!notice.contains("invalid api key"));
    }

    #[tokio::test]
    async fn panicking_backend_is_contained() {
        let invoker = CompletionInvoker::new(Arc::new(Panics), CancellationToken::new());
        assert!(matches!(
            invoker.invoke(prompt()).await,
            CompletionResult::Failed { .. }
        ));
    }

    #[tokio::test]
    async fn shutdown_cancels_in_flight_request() {
        let shutdown = CancellationToken::new();
        let invoker = CompletionInvoker::new(Arc::new(Hangs), shutdown.clone());

        let pending = tokio::spawn(async move { invoker.invoke(prompt()).await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        shutdown.cancel();

        let result = tokio::time::timeout(Duration::from_secs(1), pending)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(result, CompletionResult::Failed { .. }));
    }
}
