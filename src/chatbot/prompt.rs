//! Prompt assembly: persona first, then the user's retained history.

use poise::serenity_prelude::UserId;

use crate::types::ConversationTurn;

use super::history::HistoryStore;

/// Ordered turns for one completion request, always led by a single system turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    turns: Vec<ConversationTurn>,
}

impl PromptRequest {
    pub fn new(persona: &str, history: Vec<ConversationTurn>) -> Self {
        let mut turns = Vec::with_capacity(history.len() + 1);
        turns.push(ConversationTurn::system(persona));
        turns.extend(history);
        Self { turns }
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn into_turns(self) -> Vec<ConversationTurn> {
        self.turns
    }
}

/// Build the prompt for a user without touching the store.
pub fn assemble(store: &HistoryStore, user_id: UserId, persona: &str) -> PromptRequest {
    PromptRequest::new(persona, store.read(user_id))
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::types::MessageRole;

    #[test]
    fn system_turn_leads_and_history_follows() {
        let store = HistoryStore::new(NonZeroUsize::new(10).unwrap());
        let user = UserId::new(7);
        store.append(user, MessageRole::User, "q");
        store.append(user, MessageRole::Assistant, "a");
        store.append(user, MessageRole::User, "q2");

        let prompt = assemble(&store, user, "persona");

        assert_eq!(prompt.turns()[0], ConversationTurn::system("persona"));
        assert_eq!(prompt.turns()[1..], store.read(user)[..]);
    }

    #[test]
    fn unknown_user_gets_only_the_persona() {
        let store = HistoryStore::new(NonZeroUsize::new(10).unwrap());
        let prompt = assemble(&store, UserId::new(1), "persona");
        assert_eq!(prompt.into_turns(), vec![ConversationTurn::system("persona")]);
    }

    #[test]
    fn assembling_does_not_mutate_history() {
        let store = HistoryStore::new(NonZeroUsize::new(10).unwrap());
        let user = UserId::new(3);
        store.append(user, MessageRole::User, "q");

        let _ = assemble(&store, user, "persona");
        let _ = assemble(&store, user, "persona");

        assert_eq!(store.read(user), vec![ConversationTurn::user("q")]);
    }
}
