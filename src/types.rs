use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::protocol::ServerMessage;

pub type Username = String;
pub type PromptId = String;
pub type ConnId = u64;

/// Rounds played before the game ends
pub const TOTAL_ROUNDS: u32 = 3;
/// Seats available before new joiners become audience
pub const MAX_PLAYERS: usize = 8;
/// Minimum players required for the admin to start the game
pub const MIN_PLAYERS: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Joining,
    Prompts,
    Answers,
    Voting,
    Results,
    Scores,
    GameOver,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Joining => "joining",
            Phase::Prompts => "prompts",
            Phase::Answers => "answers",
            Phase::Voting => "voting",
            Phase::Results => "results",
            Phase::Scores => "scores",
            Phase::GameOver => "gameOver",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Player,
    Audience,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantState {
    Active,
    Answered,
    Voted,
    Disconnected,
}

/// Handle back to a participant's connection. Messages pushed here reach
/// that socket only, as opposed to the broadcast channel. Rebound if the
/// same connection re-identifies.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub conn_id: ConnId,
    pub tx: mpsc::UnboundedSender<ServerMessage>,
}

impl ConnectionHandle {
    /// Best-effort direct send; a closed receiver means the socket is gone
    /// and the disconnect path will clean up.
    pub fn send(&self, msg: ServerMessage) {
        let _ = self.tx.send(msg);
    }
}

/// A joined player or audience member. Keyed by username, removed on
/// disconnect, never retained across reset.
#[derive(Debug, Clone)]
pub struct Participant {
    pub username: Username,
    pub role: Role,
    pub handle: ConnectionHandle,
    pub is_admin: bool,
    pub score: u32,
    pub round_score: u32,
    pub assigned_prompts: Vec<PromptId>,
    pub state: ParticipantState,
}

impl Participant {
    pub fn new(username: Username, role: Role, handle: ConnectionHandle) -> Self {
        Self {
            username,
            role,
            handle,
            is_admin: false,
            score: 0,
            round_score: 0,
            assigned_prompts: Vec::new(),
            state: ParticipantState::Active,
        }
    }
}

/// A prompt in play for the current round, bound to exactly two players.
/// `assigned_players` is fixed at assignment time and never mutated after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    pub id: PromptId,
    pub text: String,
    pub assigned_players: [Username; 2],
}

impl Prompt {
    pub fn is_assigned_to(&self, username: &str) -> bool {
        self.assigned_players.iter().any(|p| p == username)
    }
}

/// A prompt submitted by a participant, pooled until consumed at round start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedPrompt {
    pub id: PromptId,
    pub username: Username,
    pub text: String,
}

/// One player's answer to one assigned prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Answer {
    pub prompt_id: PromptId,
    pub username: Username,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_display_matches_wire_names() {
        assert_eq!(Phase::Joining.to_string(), "joining");
        assert_eq!(Phase::GameOver.to_string(), "gameOver");
        assert_eq!(serde_json::to_string(&Phase::GameOver).unwrap(), "\"gameOver\"");
    }

    #[test]
    fn test_participant_defaults() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let p = Participant::new(
            "alice".to_string(),
            Role::Player,
            ConnectionHandle { conn_id: 1, tx },
        );
        assert!(!p.is_admin);
        assert_eq!(p.score, 0);
        assert_eq!(p.state, ParticipantState::Active);
        assert!(p.assigned_prompts.is_empty());
    }

    #[test]
    fn test_prompt_assignment_membership() {
        let prompt = Prompt {
            id: "prompt_1_0".to_string(),
            text: "Describe a place you would love to visit.".to_string(),
            assigned_players: ["alice".to_string(), "bobby".to_string()],
        };
        assert!(prompt.is_assigned_to("alice"));
        assert!(!prompt.is_assigned_to("carol"));
    }
}
