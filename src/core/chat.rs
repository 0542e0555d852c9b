//! Client-side chat controller.
//!
//! Holds the visible conversation and drives one turn at a time against a
//! [`ChatRelay`], applying streamed fragments to a placeholder reply as they
//! arrive.

use crate::core::assistant::{HistoryEntry, Role};
use crate::core::traits::ChatRelay;
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use log::warn;
use serde::Serialize;
use uuid::Uuid;

pub const WELCOME_TEXT: &str = "Olá! Sou a assistente virtual do Havilah Lash Studio. Posso ajudar você a escolher o estilo de cílios ideal, explicar os cuidados pós-aplicação ou tirar dúvidas sobre o agendamento. Como posso ajudar?";

pub const APOLOGY_TEXT: &str =
    "Desculpe, tive um problema ao processar sua mensagem. Por favor, tente novamente.";

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("relay answered with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("relay request failed: {0}")]
    Transport(String),
    #[error("relay stream was interrupted: {0}")]
    Interrupted(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,
    #[error("a reply is still being received")]
    Busy,
    #[error("reply stream closed without any text")]
    EmptyReply,
    #[error(transparent)]
    Relay(#[from] RelayError),
}

/// Where a message came from. Only genuine exchanges are replayed upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageOrigin {
    Welcome,
    Exchange,
    Apology,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationMessage {
    pub id: Uuid,
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip)]
    pub origin: MessageOrigin,
}

impl ConversationMessage {
    fn new(role: Role, text: impl Into<String>, origin: MessageOrigin) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
            origin,
        }
    }

    pub fn is_exchange(&self) -> bool {
        self.origin == MessageOrigin::Exchange
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    Idle,
    AwaitingResponse,
}

/// What has to be sent to the relay for one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnRequest {
    pub history: Vec<HistoryEntry>,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    messages: Vec<ConversationMessage>,
    phase: ChatPhase,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    /// A fresh session, opened with the welcome message.
    pub fn new() -> Self {
        Self {
            messages: vec![ConversationMessage::new(
                Role::Model,
                WELCOME_TEXT,
                MessageOrigin::Welcome,
            )],
            phase: ChatPhase::Idle,
        }
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    /// Whether the submit control should be enabled for `input`.
    pub fn can_submit(&self, input: &str) -> bool {
        self.phase == ChatPhase::Idle && !input.trim().is_empty()
    }

    /// The history replayed to the relay: every genuine exchange, in order.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.messages
            .iter()
            .filter(|m| m.is_exchange() && !m.text.is_empty())
            .map(|m| HistoryEntry {
                role: m.role,
                text: m.text.clone(),
            })
            .collect()
    }

    /// Starts a turn: captures the history, appends the user message and
    /// enters `AwaitingResponse`.
    pub fn begin_turn(&mut self, input: &str) -> Result<TurnRequest, ChatError> {
        if self.phase == ChatPhase::AwaitingResponse {
            return Err(ChatError::Busy);
        }
        let message = input.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let history = self.history();
        self.messages.push(ConversationMessage::new(
            Role::User,
            message,
            MessageOrigin::Exchange,
        ));
        self.phase = ChatPhase::AwaitingResponse;

        Ok(TurnRequest {
            history,
            message: message.to_owned(),
        })
    }

    /// Appends the empty assistant message fragments are written into.
    pub fn open_reply(&mut self) -> Uuid {
        let reply = ConversationMessage::new(Role::Model, String::new(), MessageOrigin::Exchange);
        let id = reply.id;
        self.messages.push(reply);
        id
    }

    pub fn append_fragment(&mut self, reply_id: Uuid, fragment: &str) -> Option<&ConversationMessage> {
        let reply = self.messages.iter_mut().find(|m| m.id == reply_id)?;
        reply.text.push_str(fragment);
        Some(reply)
    }

    pub fn complete_turn(&mut self) {
        self.phase = ChatPhase::Idle;
    }

    /// Ends a failed turn. An empty placeholder is dropped, a partial reply is
    /// kept; either way an apology is appended.
    pub fn fail_turn(&mut self, reply_id: Option<Uuid>) {
        if let Some(reply_id) = reply_id {
            self.messages
                .retain(|m| m.id != reply_id || !m.text.is_empty());
        }
        self.messages.push(ConversationMessage::new(
            Role::Model,
            APOLOGY_TEXT,
            MessageOrigin::Apology,
        ));
        self.phase = ChatPhase::Idle;
    }

    /// Runs one full turn against `relay`. `on_update` sees the reply after
    /// every applied fragment.
    pub async fn send<R, F>(&mut self, relay: &R, input: &str, mut on_update: F) -> Result<(), ChatError>
    where
        R: ChatRelay + ?Sized,
        F: FnMut(&ConversationMessage),
    {
        let turn = self.begin_turn(input)?;

        let mut fragments = match relay.open_stream(turn.history, turn.message).await {
            Ok(fragments) => fragments,
            Err(e) => {
                warn!("chat relay rejected the turn: {e}");
                self.fail_turn(None);
                return Err(e.into());
            }
        };

        let reply_id = self.open_reply();
        while let Some(fragment) = fragments.next().await {
            match fragment {
                Ok(fragment) => {
                    if let Some(reply) = self.append_fragment(reply_id, &fragment) {
                        on_update(reply);
                    }
                }
                Err(e) => {
                    warn!("chat stream ended early: {e}");
                    self.fail_turn(Some(reply_id));
                    return Err(e.into());
                }
            }
        }

        if self.messages.iter().any(|m| m.id == reply_id && m.text.is_empty()) {
            warn!("chat stream closed without a reply");
            self.fail_turn(Some(reply_id));
            return Err(ChatError::EmptyReply);
        }

        self.complete_turn();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_idle_with_welcome() {
        let session = ChatSession::new();

        assert_eq!(session.phase(), ChatPhase::Idle);
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].origin, MessageOrigin::Welcome);
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_begin_turn_captures_history_before_user_message() {
        let mut session = ChatSession::new();

        let turn = session.begin_turn("  Oi  ").unwrap();

        assert!(turn.history.is_empty());
        assert_eq!(turn.message, "Oi");
        assert_eq!(session.phase(), ChatPhase::AwaitingResponse);
        assert_eq!(session.history(), vec![HistoryEntry::user("Oi")]);
    }

    #[test]
    fn test_begin_turn_rejects_blank_and_pending() {
        let mut session = ChatSession::new();

        assert!(matches!(session.begin_turn("   "), Err(ChatError::EmptyMessage)));
        assert_eq!(session.messages().len(), 1);

        session.begin_turn("Oi").unwrap();
        assert!(!session.can_submit("Outra"));
        assert!(matches!(session.begin_turn("Outra"), Err(ChatError::Busy)));
        assert_eq!(session.messages().len(), 2);
    }

    #[test]
    fn test_fragments_concatenate_in_order() {
        let mut session = ChatSession::new();
        session.begin_turn("Oi").unwrap();
        let reply = session.open_reply();

        for fragment in ["Olá", ", ", "bem-vinda!"] {
            session.append_fragment(reply, fragment);
        }
        session.complete_turn();

        assert_eq!(session.messages().last().unwrap().text, "Olá, bem-vinda!");
        assert_eq!(session.phase(), ChatPhase::Idle);
    }

    #[test]
    fn test_failed_turn_replaces_empty_placeholder() {
        let mut session = ChatSession::new();
        session.begin_turn("Oi").unwrap();
        let reply = session.open_reply();

        session.fail_turn(Some(reply));

        let last = session.messages().last().unwrap();
        assert_eq!(last.text, APOLOGY_TEXT);
        assert_eq!(last.origin, MessageOrigin::Apology);
        assert!(session.messages().iter().all(|m| !m.text.is_empty()));
        assert_eq!(session.history(), vec![HistoryEntry::user("Oi")]);
        assert_eq!(session.phase(), ChatPhase::Idle);
    }

    #[test]
    fn test_failed_turn_keeps_partial_reply() {
        let mut session = ChatSession::new();
        session.begin_turn("Oi").unwrap();
        let reply = session.open_reply();
        session.append_fragment(reply, "Olá");

        session.fail_turn(Some(reply));

        assert_eq!(
            session.history(),
            vec![HistoryEntry::user("Oi"), HistoryEntry::model("Olá")]
        );
        assert_eq!(session.messages().last().unwrap().text, APOLOGY_TEXT);
    }

    #[test]
    fn test_history_excludes_welcome_and_keeps_order() {
        let mut session = ChatSession::new();
        for (question, answer) in [("a", "b"), ("c", "d")] {
            session.begin_turn(question).unwrap();
            let reply = session.open_reply();
            session.append_fragment(reply, answer);
            session.complete_turn();
        }

        let history = session.history();
        assert_eq!(history.len(), session.messages().len() - 1);
        assert_eq!(
            history,
            vec![
                HistoryEntry::user("a"),
                HistoryEntry::model("b"),
                HistoryEntry::user("c"),
                HistoryEntry::model("d"),
            ]
        );
    }

    #[test]
    fn test_history_skips_empty_replies() {
        let mut session = ChatSession::new();
        session.begin_turn("Oi").unwrap();
        session.open_reply();
        session.complete_turn();

        assert_eq!(session.history(), vec![HistoryEntry::user("Oi")]);
    }
}
