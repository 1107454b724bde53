//! Strips Discord markup from inbound text before it reaches the model.

use std::sync::LazyLock;

use regex::Regex;

/// Mentions, channel links, custom emoji, timestamps and fenced code blocks.
static DISCORD_MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<@[!&]?\d+>|<#\d+>|<a?:\w+:\d+>|<t:-?\d+(?::\w+)?>|```.*?```")
        .expect("markup pattern is valid")
});

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+|www\.\S+").expect("url pattern is valid"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

fn clean_once(input: &str) -> String {
    let stripped = DISCORD_MARKUP.replace_all(input, "");
    let stripped = URL.replace_all(&stripped, "");
    WHITESPACE_RUN
        .replace_all(&stripped, " ")
        .trim()
        .to_string()
}

/// Clean a raw Discord message into plain prompt text.
///
/// Removing one token can splice its neighbours into a new one (`<<@1>@2>`),
/// so passes repeat until nothing changes. Each pass never grows the text,
/// which bounds the loop.
pub fn clean(raw: &str) -> String {
    let mut current = clean_once(raw);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Like [`clean`], but `None` when nothing is left to send.
pub fn normalize(raw: &str) -> Option<String> {
    let cleaned = clean(raw);
    (!cleaned.is_empty()).then_some(cleaned)
}
