//! Routes each inbound message through clean → history → completion → reply.

use std::sync::Arc;

use log::{debug, error, info, warn};
use poise::serenity_prelude::{Message as SerenityMessage, UserId};

use crate::error::Result;
use crate::types::MessageRole;

use super::history::HistoryStore;
use super::invoker::{CompletionInvoker, CompletionResult};
use super::normalize::normalize;
use super::prompt::assemble;
use super::response::{Outbound, dispatch};

const RESET_KEYWORD: &str = "RESET";
const ACK_EMOJI: char = '💬';

pub const ATTACHMENT_REFUSAL: &str = "🚫 My brain runs on words, not pictures. I don't process attachments. \
     Go find another AI for your visual nonsense, or ask me something worth roasting.";

pub const EMPTY_PROMPT_NOTICE: &str =
    "🙄 You pinged me with nothing. Come back when you have an actual thought.";

pub const CATASTROPHIC_NOTICE: &str = "❌ Something catastrophic happened while I was preparing my savage response. \
     Even I have limits, apparently.";

/// Platform-neutral snapshot of an inbound Discord message.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub author_id: UserId,
    pub author_name: String,
    pub content: String,
    pub has_attachments: bool,
    /// `@everyone` or `@here`.
    pub mentions_everyone: bool,
    pub from_self: bool,
    /// The bot is mentioned, or the message arrived in a DM.
    pub addressed: bool,
}

impl InboundMessage {
    pub fn from_serenity(message: &SerenityMessage, bot_user_id: UserId) -> Self {
        Self {
            author_id: message.author.id,
            author_name: message.author.name.clone(),
            content: message.content.clone(),
            has_attachments: !message.attachments.is_empty(),
            mentions_everyone: message.mention_everyone,
            from_self: message.author.id == bot_user_id,
            addressed: message.guild_id.is_none() || message.mentions_user_id(bot_user_id),
        }
    }
}

/// What happened to one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Ignored,
    NotAddressed,
    RefusedAttachment,
    Reset,
    EmptyPrompt,
    Replied { messages: usize },
    Failed,
}

pub struct MessageRouter {
    history: Arc<HistoryStore>,
    invoker: CompletionInvoker,
    persona: String,
    max_chunk_len: usize,
}

/// Case-insensitive `RESET` anywhere in the cleaned text.
pub fn is_reset_request(cleaned: &str) -> bool {
    cleaned.to_uppercase().contains(RESET_KEYWORD)
}

pub fn reset_confirmation(user_name: &str) -> String {
    format!(
        "🤖 History has been wiped clean for user: {user_name}. \
         Prepare for a fresh wave of my unfiltered, savage intellect."
    )
}

impl MessageRouter {
    pub fn new(
        history: Arc<HistoryStore>,
        invoker: CompletionInvoker,
        persona: String,
        max_chunk_len: usize,
    ) -> Self {
        Self {
            history,
            invoker,
            persona,
            max_chunk_len,
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Forget everything stored for a user. Returns whether anything was stored.
    pub async fn reset_user(&self, user_id: UserId) -> bool {
        let guard = self.history.lock_user(user_id).await;
        let removed = self.history.reset(user_id);
        drop(guard);
        self.history.release_lock(user_id);
        info!("Reset history for user {user_id} (had history: {removed})");
        removed
    }

    /// Handle one inbound message. Never returns an error: failures in the
    /// addressed path are logged and answered with a generic notice.
    pub async fn handle(&self, message: &InboundMessage, outbound: &dyn Outbound) -> RouteOutcome {
        if message.from_self || message.mentions_everyone {
            return RouteOutcome::Ignored;
        }
        if !message.addressed {
            return RouteOutcome::NotAddressed;
        }

        match self.route(message, outbound).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    "Error processing message from {} ({}): {e:?}",
                    message.author_name, message.author_id
                );
                if let Err(send_err) = outbound.send(CATASTROPHIC_NOTICE).await {
                    error!("Failed to deliver failure notice: {send_err}");
                }
                RouteOutcome::Failed
            }
        }
    }

    async fn route(&self, message: &InboundMessage, outbound: &dyn Outbound) -> Result<RouteOutcome> {
        if message.has_attachments {
            outbound.send(ATTACHMENT_REFUSAL).await?;
            return Ok(RouteOutcome::RefusedAttachment);
        }

        let Some(text) = normalize(&message.content) else {
            debug!("Message from {} is empty after cleaning", message.author_id);
            outbound.send(EMPTY_PROMPT_NOTICE).await?;
            return Ok(RouteOutcome::EmptyPrompt);
        };

        info!("New message from {} ({}): {text}", message.author_name, message.author_id);

        if is_reset_request(&text) {
            self.reset_user(message.author_id).await;
            outbound.send(&reset_confirmation(&message.author_name)).await?;
            return Ok(RouteOutcome::Reset);
        }

        if let Err(e) = outbound.react(ACK_EMOJI).await {
            warn!("Failed to add acknowledgement reaction: {e}");
        }

        let _guard = self.history.lock_user(message.author_id).await;

        self.history.append(message.author_id, MessageRole::User, text);
        let prompt = assemble(&self.history, message.author_id, &self.persona);
        debug!("Prompt for {} has {} turns", message.author_id, prompt.turns().len());

        let reply = match self.invoker.invoke(prompt).await {
            CompletionResult::Text(text) if !text.is_empty() => {
                self.history
                    .append(message.author_id, MessageRole::Assistant, text.clone());
                text
            }
            CompletionResult::Text(_) => {
                warn!("Completion for {} came back empty", message.author_id);
                self.history.discard_pending(message.author_id);
                String::new()
            }
            CompletionResult::Failed { notice } => {
                self.history.discard_pending(message.author_id);
                notice
            }
        };

        let messages = dispatch(outbound, &reply, self.max_chunk_len).await?;
        Ok(RouteOutcome::Replied { messages })
    }
}
