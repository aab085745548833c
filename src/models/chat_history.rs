use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::intent::{ChatEntities, Intent};

/// Cap on stored messages per session; the oldest are dropped beyond this.
pub const MAX_MESSAGES: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub message: String,
    pub response: String,
    pub intent: Intent,
    #[serde(default)]
    pub entities: ChatEntities,
    pub timestamp: DateTime<Utc>,
}

/// Per-(user, session) conversation transcript. All conversational state is
/// reconstructed from this on every turn; there is no in-memory affinity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistory {
    pub id: Uuid,
    pub user_id: Uuid,
    pub session_id: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatHistory {
    pub fn new(user_id: Uuid, session_id: &str) -> Self {
        ChatHistory {
            id: Uuid::new_v4(),
            user_id,
            session_id: session_id.to_string(),
            messages: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn add_message(
        &mut self,
        message: &str,
        response: &str,
        intent: Intent,
        entities: ChatEntities,
    ) {
        self.messages.push(ChatMessage {
            message: message.to_string(),
            response: response.to_string(),
            intent,
            entities,
            timestamp: Utc::now(),
        });

        if self.messages.len() > MAX_MESSAGES {
            let excess = self.messages.len() - MAX_MESSAGES;
            self.messages.drain(..excess);
        }
        self.updated_at = Utc::now();
    }

    /// Flattened transcript of the most recent `turns` exchanges, newest
    /// first, used as classification context.
    pub fn recent_context(&self, turns: usize) -> String {
        self.messages
            .iter()
            .rev()
            .take(turns)
            .map(|m| format!("User: {}\nAssistant: {}", m.message, m.response))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_capped_dropping_oldest() {
        let mut history = ChatHistory::new(Uuid::new_v4(), "session_1");
        for i in 0..60 {
            history.add_message(
                &format!("msg {i}"),
                "ok",
                Intent::GeneralInquiry,
                ChatEntities::default(),
            );
        }

        assert_eq!(history.messages.len(), MAX_MESSAGES);
        assert_eq!(history.messages.first().unwrap().message, "msg 10");
        assert_eq!(history.messages.last().unwrap().message, "msg 59");
    }

    #[test]
    fn recent_context_takes_newest_turns() {
        let mut history = ChatHistory::new(Uuid::new_v4(), "session_1");
        for i in 0..8 {
            history.add_message(
                &format!("question {i}"),
                &format!("answer {i}"),
                Intent::BrowseProducts,
                ChatEntities::default(),
            );
        }

        let context = history.recent_context(5);
        assert!(context.starts_with("User: question 7\nAssistant: answer 7"));
        assert!(context.contains("question 3"));
        assert!(!context.contains("question 2"));
    }

    #[test]
    fn empty_history_yields_empty_context() {
        let history = ChatHistory::new(Uuid::new_v4(), "session_1");
        assert_eq!(history.recent_context(5), "");
    }
}
