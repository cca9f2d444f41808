//! Wire protocol between clients and the session server.
//!
//! Messages travel as JSON over the WebSocket, tagged with `t`.

use crate::session::snapshot::GameSnapshot;
use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Create an account at the identity service, then join the session.
    Register { username: String, password: String },
    /// Verify credentials at the identity service, then join the session.
    Login { username: String, password: String },
    SubmitPrompt {
        username: String,
        text: String,
    },
    SubmitAnswer {
        username: String,
        prompt_id: PromptId,
        text: String,
    },
    CastVote {
        username: String,
        prompt_id: PromptId,
        candidate: Username,
    },
    /// Pure broadcast, no state effect.
    Chat { username: String, text: String },
    Admin { action: AdminAction },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AdminAction {
    StartGame,
    PauseGame,
    ResumeGame,
    ResetGame,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent to every new connection with the current state snapshot.
    Welcome {
        protocol: String,
        server_now: String,
        snapshot: GameSnapshot,
    },
    JoinResult {
        success: bool,
        message: String,
    },
    PromptResult {
        success: bool,
        message: String,
    },
    AnswerResult {
        success: bool,
        message: String,
    },
    VoteResult {
        success: bool,
        message: String,
    },
    AdminResult {
        success: bool,
        message: String,
    },
    PromptCountUpdate {
        count: usize,
        submitters: Vec<PromptSubmitter>,
    },
    PhaseChange {
        phase: Phase,
        round_number: u32,
        state_number: u64,
    },
    /// Sent to each player individually with their own assignments only.
    AssignedPrompts {
        prompts: Vec<AssignedPromptInfo>,
    },
    /// One per active prompt when voting opens.
    VotingOpen {
        prompt_id: PromptId,
        prompt_text: String,
        candidates: Vec<CandidateAnswer>,
    },
    RoundResults {
        round_number: u32,
        prompts: Vec<PromptResults>,
    },
    Leaderboard {
        totals: Vec<ScoreEntry>,
    },
    /// Final ranking, broadcast once on game over.
    FinalPodium {
        ranking: Vec<ScoreEntry>,
    },
    GameStateUpdate {
        snapshot: GameSnapshot,
    },
    Chat {
        username: String,
        text: String,
    },
    Message {
        text: String,
    },
    Error {
        code: String,
        msg: String,
    },
}

impl ServerMessage {
    /// Error notice from a command rejection.
    pub fn from_error(err: &crate::error::GameError) -> Self {
        ServerMessage::Error {
            code: err.code().to_string(),
            msg: err.to_string(),
        }
    }
}

/// A player's view of one of their assignments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignedPromptInfo {
    pub prompt_id: PromptId,
    pub prompt_text: String,
}

/// Submitter attribution shown alongside the prompt count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptSubmitter {
    pub username: Username,
    pub text: String,
}

/// One answer offered for voting (author revealed, votes hidden).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateAnswer {
    pub username: Username,
    pub text: String,
}

/// Per-prompt outcome in the results broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptResults {
    pub prompt_id: PromptId,
    pub prompt_text: String,
    pub answers: Vec<AnswerOutcome>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub username: Username,
    pub text: String,
    pub votes: usize,
    pub points: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreEntry {
    pub username: Username,
    pub score: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_roundtrip() {
        let json = r#"{"t":"cast_vote","username":"carol","prompt_id":"prompt_1_0","candidate":"alice"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::CastVote {
                username,
                prompt_id,
                candidate,
            } => {
                assert_eq!(username, "carol");
                assert_eq!(prompt_id, "prompt_1_0");
                assert_eq!(candidate, "alice");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_admin_action_uses_camel_case() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"admin","action":"startGame"}"#).unwrap();
        assert!(matches!(
            msg,
            ClientMessage::Admin {
                action: AdminAction::StartGame
            }
        ));
    }

    #[test]
    fn test_phase_change_serialization() {
        let msg = ServerMessage::PhaseChange {
            phase: Phase::Prompts,
            round_number: 1,
            state_number: 2,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"t\":\"phase_change\""));
        assert!(json.contains("\"phase\":\"prompts\""));
    }
}
