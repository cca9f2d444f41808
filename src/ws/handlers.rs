//! WebSocket message dispatch
//!
//! Every command is acknowledged to its sender with a result envelope;
//! session-wide effects go out over the broadcast channel from the
//! state machine itself.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::AppState;
use crate::types::{ConnId, ConnectionHandle};
use std::sync::Arc;

/// Handle client messages and return optional response for the sender
pub async fn handle_message(
    msg: ClientMessage,
    conn_id: ConnId,
    handle: &ConnectionHandle,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::Register { username, password } => {
            handle_register(state, handle, username, password).await
        }

        ClientMessage::Login { username, password } => {
            handle_login(state, handle, username, password).await
        }

        ClientMessage::SubmitPrompt { username, text } => {
            match state.submit_prompt(&username, text).await {
                Ok(()) => Some(ServerMessage::PromptResult {
                    success: true,
                    message: "Prompt submitted successfully.".to_string(),
                }),
                Err(e) => Some(ServerMessage::PromptResult {
                    success: false,
                    message: e.to_string(),
                }),
            }
        }

        ClientMessage::SubmitAnswer {
            username,
            prompt_id,
            text,
        } => match state.submit_answer(&username, &prompt_id, text).await {
            Ok(()) => Some(ServerMessage::AnswerResult {
                success: true,
                message: "Answer submitted successfully.".to_string(),
            }),
            Err(e) => Some(ServerMessage::AnswerResult {
                success: false,
                message: e.to_string(),
            }),
        },

        ClientMessage::CastVote {
            username,
            prompt_id,
            candidate,
        } => match state.cast_vote(&username, &prompt_id, &candidate).await {
            Ok(()) => Some(ServerMessage::VoteResult {
                success: true,
                message: "Vote recorded.".to_string(),
            }),
            Err(e) => Some(ServerMessage::VoteResult {
                success: false,
                message: e.to_string(),
            }),
        },

        ClientMessage::Chat { username, text } => {
            if text.trim().is_empty() {
                return None;
            }
            state.broadcast_to_all(ServerMessage::Chat { username, text });
            None
        }

        ClientMessage::Admin { action } => match state.handle_admin(conn_id, action).await {
            Ok(message) => Some(ServerMessage::AdminResult {
                success: true,
                message,
            }),
            Err(e) => Some(ServerMessage::AdminResult {
                success: false,
                message: e.to_string(),
            }),
        },
    }
}

/// Create the account at the identity service, then take a seat.
async fn handle_register(
    state: &Arc<AppState>,
    handle: &ConnectionHandle,
    username: String,
    password: String,
) -> Option<ServerMessage> {
    if let Err(e) = state.identity.register(&username, &password).await {
        return Some(ServerMessage::JoinResult {
            success: false,
            message: e.to_string(),
        });
    }
    seat_participant(state, handle, username).await
}

/// Verify credentials at the identity service, then take a seat.
async fn handle_login(
    state: &Arc<AppState>,
    handle: &ConnectionHandle,
    username: String,
    password: String,
) -> Option<ServerMessage> {
    if let Err(e) = state.identity.login(&username, &password).await {
        return Some(ServerMessage::JoinResult {
            success: false,
            message: e.to_string(),
        });
    }
    seat_participant(state, handle, username).await
}

async fn seat_participant(
    state: &Arc<AppState>,
    handle: &ConnectionHandle,
    username: String,
) -> Option<ServerMessage> {
    match state.admit(username, handle.clone()).await {
        Ok(role) => Some(ServerMessage::JoinResult {
            success: true,
            message: format!("Joined as {role:?}."),
        }),
        Err(e) => Some(ServerMessage::JoinResult {
            success: false,
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testutil::{handle as conn_handle, test_state};

    #[tokio::test]
    async fn test_register_seats_participant() {
        let state = test_state();
        let (handle, _rx) = conn_handle(7);

        let response = handle_message(
            ClientMessage::Register {
                username: "alice".to_string(),
                password: "long enough".to_string(),
            },
            7,
            &handle,
            &state,
        )
        .await;

        assert!(matches!(
            response,
            Some(ServerMessage::JoinResult { success: true, .. })
        ));
        assert!(state.session.lock().await.participant("alice").is_some());
    }

    #[tokio::test]
    async fn test_register_rejects_bad_username() {
        let state = test_state();
        let (handle, _rx) = conn_handle(7);

        let response = handle_message(
            ClientMessage::Register {
                username: "abc".to_string(),
                password: "long enough".to_string(),
            },
            7,
            &handle,
            &state,
        )
        .await;

        assert!(matches!(
            response,
            Some(ServerMessage::JoinResult { success: false, .. })
        ));
        assert!(state.session.lock().await.roster.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_login_rejected() {
        let state = test_state();
        let (first, _rx1) = conn_handle(1);
        let (second, _rx2) = conn_handle(2);

        handle_message(
            ClientMessage::Login {
                username: "alice".to_string(),
                password: "long enough".to_string(),
            },
            1,
            &first,
            &state,
        )
        .await;
        let response = handle_message(
            ClientMessage::Login {
                username: "alice".to_string(),
                password: "long enough".to_string(),
            },
            2,
            &second,
            &state,
        )
        .await;

        assert!(matches!(
            response,
            Some(ServerMessage::JoinResult { success: false, .. })
        ));
        assert_eq!(state.session.lock().await.roster.len(), 1);
    }

    #[tokio::test]
    async fn test_command_from_stranger_fails() {
        let state = test_state();
        let (handle, _rx) = conn_handle(1);

        let response = handle_message(
            ClientMessage::SubmitPrompt {
                username: "nobody".to_string(),
                text: "a prompt that is long enough to pass".to_string(),
            },
            1,
            &handle,
            &state,
        )
        .await;

        assert!(matches!(
            response,
            Some(ServerMessage::PromptResult { success: false, .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_chat_dropped() {
        let state = test_state();
        let (handle, _rx) = conn_handle(1);

        let response = handle_message(
            ClientMessage::Chat {
                username: "alice".to_string(),
                text: "   ".to_string(),
            },
            1,
            &handle,
            &state,
        )
        .await;

        assert!(response.is_none());
    }
}
