mod answers;
mod assign;
mod machine;
mod roster;
mod scoring;
pub mod snapshot;
mod votes;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

use crate::identity::IdentityBackend;
use crate::prompts::SupplementarySource;
use crate::protocol::ServerMessage;
use crate::types::*;

/// The canonical game state. One instance per process, owned behind a
/// single mutex so every command is evaluated against a consistent state.
#[derive(Debug)]
pub struct Session {
    pub phase: Phase,
    pub state_number: u64,
    pub round_number: u32,
    pub total_rounds: u32,
    pub is_paused: bool,
    /// Players and audience in join order. Admin succession relies on the
    /// ordering, so this is a sequence, not a map.
    pub roster: Vec<Participant>,
    /// Prompts in play for the current round.
    pub active_prompts: Vec<Prompt>,
    /// Player-submitted prompts, pooled until consumed at round start.
    pub submitted_prompts: Vec<SubmittedPrompt>,
    /// Answers recorded per active prompt.
    pub answers: HashMap<PromptId, Vec<Answer>>,
    /// promptId -> candidate author -> set of voters.
    pub votes: HashMap<PromptId, HashMap<Username, HashSet<Username>>>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: Phase::Joining,
            state_number: 0,
            round_number: 1,
            total_rounds: TOTAL_ROUNDS,
            is_paused: false,
            roster: Vec::new(),
            active_prompts: Vec::new(),
            submitted_prompts: Vec::new(),
            answers: HashMap::new(),
            votes: HashMap::new(),
        }
    }

    /// Reinitialize every field to its joining-phase default. Usable from
    /// any phase; connected clients must re-join.
    pub fn reset(&mut self) {
        *self = Session::new();
    }

    /// Players in join order.
    pub fn players(&self) -> impl Iterator<Item = &Participant> {
        self.roster.iter().filter(|p| p.role == Role::Player)
    }

    pub fn players_mut(&mut self) -> impl Iterator<Item = &mut Participant> {
        self.roster.iter_mut().filter(|p| p.role == Role::Player)
    }

    pub fn player_count(&self) -> usize {
        self.players().count()
    }

    /// Players plus audience: everyone eligible to cast a vote.
    pub fn eligible_voters(&self) -> usize {
        self.roster.len()
    }

    pub fn participant(&self, username: &str) -> Option<&Participant> {
        self.roster.iter().find(|p| p.username == username)
    }

    pub fn participant_mut(&mut self, username: &str) -> Option<&mut Participant> {
        self.roster.iter_mut().find(|p| p.username == username)
    }

    pub fn active_prompt(&self, prompt_id: &str) -> Option<&Prompt> {
        self.active_prompts.iter().find(|p| p.id == prompt_id)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared application state
pub struct AppState {
    /// Single mutation boundary: every state-changing command locks this
    /// and runs to completion, including any phase advancement it triggers.
    pub session: Mutex<Session>,
    /// Fan-out channel for notifications addressed to every connection.
    pub broadcast: broadcast::Sender<ServerMessage>,
    pub identity: Box<dyn IdentityBackend>,
    pub prompt_source: Box<dyn SupplementarySource>,
}

impl AppState {
    pub fn new(
        identity: Box<dyn IdentityBackend>,
        prompt_source: Box<dyn SupplementarySource>,
    ) -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(256);
        Arc::new(Self {
            session: Mutex::new(Session::new()),
            broadcast: tx,
            identity,
            prompt_source,
        })
    }

    /// State wired from the environment: HTTP identity backend and the
    /// configured supplementary prompt source.
    pub fn from_env() -> Arc<Self> {
        Self::new(
            crate::identity::backend_from_env(),
            crate::prompts::source_from_env(),
        )
    }

    /// Broadcast to all connections. Send errors just mean nobody is
    /// subscribed right now.
    pub fn broadcast_to_all(&self, msg: ServerMessage) {
        let _ = self.broadcast.send(msg);
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use tokio::sync::mpsc;

    /// State with the accept-all identity backend and built-in prompts.
    pub fn test_state() -> Arc<AppState> {
        AppState::new(
            Box::new(crate::identity::AcceptAll),
            Box::new(crate::prompts::BuiltinSource),
        )
    }

    /// A connection handle whose receiver is kept alive for inspection.
    pub fn handle(conn_id: ConnId) -> (ConnectionHandle, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ConnectionHandle { conn_id, tx }, rx)
    }

    /// A connection handle for tests that never read the direct channel.
    pub fn detached_handle(conn_id: ConnId) -> ConnectionHandle {
        handle(conn_id).0
    }
}
