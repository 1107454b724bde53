//! Conversation pipeline: cleaning, memory, prompting, completion and replies.

mod handler;
mod history;
mod invoker;
mod normalize;
mod prompt;
mod response;
#[cfg(test)]
mod testing;

pub use handler::{InboundMessage, MessageRouter, RouteOutcome, reset_confirmation};
pub use history::HistoryStore;
pub use invoker::{CompletionInvoker, CompletionResult};
pub use normalize::{clean, normalize};
pub use prompt::{PromptRequest, assemble};
pub use response::{DEFAULT_CHUNK_LEN, DiscordReply, Outbound, chunk_text, dispatch};
