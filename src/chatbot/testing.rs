//! In-memory doubles for the Discord and completion seams.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{BotError, Result};
use crate::groq::CompletionBackend;
use crate::types::ConversationTurn;

use super::response::Outbound;

#[derive(Default)]
pub struct RecordingOutbound {
    sent: Mutex<Vec<String>>,
    reactions: Mutex<Vec<char>>,
    fail_sends: bool,
}

impl RecordingOutbound {
    /// An outbound whose `send` always errors.
    pub fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn reactions(&self) -> Vec<char> {
        self.reactions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Outbound for RecordingOutbound {
    async fn send(&self, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        if self.fail_sends {
            return Err(BotError::Config("send disabled".to_string()));
        }
        Ok(())
    }

    async fn react(&self, emoji: char) -> Result<()> {
        self.reactions.lock().unwrap().push(emoji);
        Ok(())
    }
}

/// Replies from a queue and remembers every prompt it was given.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<Vec<ConversationTurn>>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn with_replies(replies: impl IntoIterator<Item = Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<Vec<ConversationTurn>> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, turns: Vec<ConversationTurn>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(turns);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("scripted reply".to_string()))
    }
}
