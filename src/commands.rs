//! Slash commands.

use crate::{
    bot::Data,
    chatbot::reset_confirmation,
    error::{BotError, Result},
};

/// Context type for bot commands.
type Context<'a> = poise::Context<'a, Data, BotError>;

/// Wipe your conversation history with the bot.
#[poise::command(slash_command)]
pub async fn reset(ctx: Context<'_>) -> Result<()> {
    let author = ctx.author();
    ctx.data().router().reset_user(author.id).await;
    ctx.say(reset_confirmation(&author.name)).await?;
    Ok(())
}

/// Get all slash commands the bot registers.
#[must_use]
pub fn bot_commands() -> Vec<poise::Command<Data, BotError>> {
    vec![reset()]
}
