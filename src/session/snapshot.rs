//! Immutable state snapshots for broadcast.
//!
//! Built by copying fields off the aggregate rather than serializing the
//! aggregate itself: connection handles and vote sets stay out of the
//! wire format by construction.

use serde::{Deserialize, Serialize};

use super::Session;
use crate::protocol::ScoreEntry;
use crate::types::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub phase: Phase,
    pub state_number: u64,
    pub round_number: u32,
    pub total_rounds: u32,
    pub is_paused: bool,
    pub players: Vec<PlayerSnapshot>,
    pub audience: Vec<Username>,
    pub prompt_count: usize,
    /// Cumulative totals, highest first.
    pub totals: Vec<ScoreEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub username: Username,
    pub is_admin: bool,
    pub score: u32,
    pub round_score: u32,
    pub state: ParticipantState,
}

impl Session {
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            phase: self.phase,
            state_number: self.state_number,
            round_number: self.round_number,
            total_rounds: self.total_rounds,
            is_paused: self.is_paused,
            players: self
                .players()
                .map(|p| PlayerSnapshot {
                    username: p.username.clone(),
                    is_admin: p.is_admin,
                    score: p.score,
                    round_score: p.round_score,
                    state: p.state,
                })
                .collect(),
            audience: self
                .roster
                .iter()
                .filter(|p| p.role == Role::Audience)
                .map(|p| p.username.clone())
                .collect(),
            prompt_count: self.submitted_prompts.len(),
            totals: self.leaderboard(),
        }
    }
}
