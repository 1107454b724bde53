//! Response sending utilities for Discord.

use async_trait::async_trait;
use log::{debug, info};
use poise::serenity_prelude::{Context, Message as SerenityMessage, ReactionType};

use crate::error::Result;

/// Discord rejects messages over 2000 characters; stay well below that.
pub const DEFAULT_CHUNK_LEN: usize = 1700;

pub const SPEECHLESS_NOTICE: &str = "❌ I've been rendered speechless. How embarrassing.";

/// Where replies for one inbound message go.
#[async_trait]
pub trait Outbound: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
    async fn react(&self, emoji: char) -> Result<()>;
}

/// Replies into the channel a Discord message came from.
pub struct DiscordReply<'a> {
    ctx: &'a Context,
    message: &'a SerenityMessage,
}

impl<'a> DiscordReply<'a> {
    pub fn new(ctx: &'a Context, message: &'a SerenityMessage) -> Self {
        Self { ctx, message }
    }
}

#[async_trait]
impl Outbound for DiscordReply<'_> {
    async fn send(&self, text: &str) -> Result<()> {
        self.message.channel_id.say(&self.ctx.http, text).await?;
        Ok(())
    }

    async fn react(&self, emoji: char) -> Result<()> {
        self.message
            .react(&self.ctx.http, ReactionType::Unicode(emoji.to_string()))
            .await?;
        Ok(())
    }
}

/// Split text into consecutive slices of at most `max_chars` characters.
///
/// Plain fixed-size slicing: words may be cut, but never a UTF-8 character.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == max_chars {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

/// Send `text` in order as one or more messages.
///
/// Empty text sends the speechless notice instead; blank chunks are skipped.
/// Returns how many messages went out.
pub async fn dispatch(outbound: &dyn Outbound, text: &str, max_chars: usize) -> Result<usize> {
    if text.is_empty() {
        outbound.send(SPEECHLESS_NOTICE).await?;
        return Ok(1);
    }

    let chunks = chunk_text(text, max_chars);
    debug!("Split response into {} chunks", chunks.len());

    let mut sent = 0;
    for chunk in chunks {
        if chunk.trim().is_empty() {
            continue;
        }
        outbound.send(chunk).await?;
        sent += 1;
    }

    info!("Dispatched response in {sent} messages");
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chatbot::testing::RecordingOutbound;

    #[test]
    fn chunks_are_fixed_size() {
        let text = "x".repeat(3500);
        let lengths: Vec<usize> = chunk_text(&text, 1700).iter().map(|c| c.len()).collect();
        assert_eq!(lengths, vec![1700, 1700, 100]);
    }

    #[test]
    fn chunking_counts_characters_not_bytes() {
        let text = "é".repeat(5);
        let chunks = chunk_text(&text, 2);
        assert_eq!(chunks, vec!["éé", "éé", "é"]);
    }

    #[test]
    fn exact_multiple_has_no_trailing_chunk() {
        assert_eq!(chunk_text("abcd", 2), vec!["ab", "cd"]);
        assert!(chunk_text("", 2).is_empty());
    }

    #[tokio::test]
    async fn empty_text_sends_single_notice() {
        for max in [1, 1700, 5000] {
            let outbound = RecordingOutbound::default();
            let sent = dispatch(&outbound, "", max).await.unwrap();
            assert_eq!(sent, 1);
            assert_eq!(outbound.sent(), vec![SPEECHLESS_NOTICE.to_string()]);
        }
    }

    #[tokio::test]
    async fn long_text_is_sent_in_order() {
        let outbound = RecordingOutbound::default();
        let text = format!("{}{}{}", "a".repeat(1700), "b".repeat(1700), "c".repeat(100));

        let sent = dispatch(&outbound, &text, 1700).await.unwrap();

        let messages = outbound.sent();
        assert_eq!(sent, 3);
        assert_eq!(messages[0], "a".repeat(1700));
        assert_eq!(messages[1], "b".repeat(1700));
        assert_eq!(messages[2], "c".repeat(100));
    }

    #[tokio::test]
    async fn blank_chunks_are_skipped() {
        let outbound = RecordingOutbound::default();
        let text = format!("abc{}", " ".repeat(6));

        let sent = dispatch(&outbound, &text, 3).await.unwrap();

        assert_eq!(sent, 1);
        assert_eq!(outbound.sent(), vec!["abc".to_string()]);
    }
}
