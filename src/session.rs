// src/session.rs

//! Per-conversation session state. A session exclusively owns its flow
//! tracker and history; the manager hands out one `Mutex` per conversation
//! so turns for the same conversation are serialized while different
//! conversations proceed concurrently.

use crate::agents::Emotion;
use crate::flow::FlowTracker;
use crate::llm::ChatMessage;
use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Cap on retained chat history per session.
const HISTORY_CAP: usize = 50;

pub struct ConversationSession {
    pub conversation_id: String,
    pub user_id: String,
    pub user_name: String,
    pub flow: FlowTracker,
    pub last_emotion: Option<Emotion>,
    history: VecDeque<ChatMessage>,
}

impl ConversationSession {
    pub fn new(conversation_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        Self {
            conversation_id: conversation_id.into(),
            user_name: user_id.clone(),
            user_id,
            flow: FlowTracker::new(),
            last_emotion: None,
            history: VecDeque::with_capacity(HISTORY_CAP),
        }
    }

    pub fn push_history(&mut self, message: ChatMessage) {
        if self.history.len() == HISTORY_CAP {
            self.history.pop_front();
        }
        self.history.push_back(message);
    }

    /// Last `n` messages, oldest first.
    pub fn recent_history(&self, n: usize) -> Vec<ChatMessage> {
        self.history
            .iter()
            .rev()
            .take(n)
            .rev()
            .cloned()
            .collect()
    }

    /// Resets cross-turn state with the session.
    pub fn reset(&mut self) {
        self.flow.reset();
        self.history.clear();
        self.last_emotion = None;
    }
}

#[derive(Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<Mutex<ConversationSession>>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(
        &self,
        conversation_id: &str,
        user_id: &str,
    ) -> Arc<Mutex<ConversationSession>> {
        if let Some(session) = self.sessions.read().expect("session lock").get(conversation_id) {
            return session.clone();
        }
        let mut sessions = self.sessions.write().expect("session lock");
        sessions
            .entry(conversation_id.to_string())
            .or_insert_with(|| {
                debug!("starting session for conversation {}", conversation_id);
                Arc::new(Mutex::new(ConversationSession::new(conversation_id, user_id)))
            })
            .clone()
    }

    pub fn end(&self, conversation_id: &str) {
        self.sessions
            .write()
            .expect("session lock")
            .remove(conversation_id);
    }

    pub fn active_count(&self) -> usize {
        self.sessions.read().expect("session lock").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_bounded() {
        let mut session = ConversationSession::new("c1", "u1");
        for i in 0..(HISTORY_CAP + 10) {
            session.push_history(ChatMessage::user(format!("msg {i}")));
        }
        assert_eq!(session.recent_history(usize::MAX).len(), HISTORY_CAP);
        let recent = session.recent_history(2);
        assert_eq!(recent.last().unwrap().content, format!("msg {}", HISTORY_CAP + 9));
    }

    #[test]
    fn same_conversation_shares_a_session() {
        let manager = SessionManager::new();
        let a = manager.get_or_create("c1", "u1");
        let b = manager.get_or_create("c1", "u1");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(manager.active_count(), 1);

        manager.end("c1");
        assert_eq!(manager.active_count(), 0);
    }
}
