//! Session state machine: phase transitions and round progression.
//!
//! Commands lock the session, mutate, and run any advancement they
//! triggered before releasing — no handler ever observes a partially
//! mutated state. Advancement is idempotent per completion event because
//! the phase is checked and changed under the same lock.

use rand::seq::SliceRandom;

use super::{AppState, Session};
use crate::error::{GameError, GameResult};
use crate::prompts::FETCH_TIMEOUT;
use crate::protocol::{
    AdminAction, AssignedPromptInfo, CandidateAnswer, PromptSubmitter, ServerMessage,
};
use crate::types::*;

/// Inclusive prompt length bounds in characters.
const PROMPT_MIN_CHARS: usize = 20;
const PROMPT_MAX_CHARS: usize = 100;

impl Session {
    /// Pool a submitted prompt until the next round consumes it. Open to
    /// players and audience alike during the joining and prompts phases.
    pub fn submit_prompt(&mut self, username: &str, text: String) -> GameResult<()> {
        let len = text.chars().count();
        if !(PROMPT_MIN_CHARS..=PROMPT_MAX_CHARS).contains(&len) {
            return Err(GameError::PromptLength);
        }
        if self.participant(username).is_none() {
            return Err(GameError::UnknownUser(username.to_string()));
        }
        if !matches!(self.phase, Phase::Joining | Phase::Prompts) {
            return Err(GameError::WrongPhase(self.phase));
        }

        self.submitted_prompts.push(SubmittedPrompt {
            id: ulid::Ulid::new().to_string(),
            username: username.to_string(),
            text,
        });
        Ok(())
    }

    /// Whether every active player has submitted at least one prompt
    /// this round.
    pub fn prompts_complete(&self) -> bool {
        let mut any = false;
        for p in self.players() {
            if p.state == ParticipantState::Disconnected {
                continue;
            }
            any = true;
            if !self
                .submitted_prompts
                .iter()
                .any(|sp| sp.username == p.username)
            {
                return false;
            }
        }
        any
    }

    /// Validate and apply the admin start command. The caller transitions
    /// into the prompts phase afterwards.
    fn apply_start_game(&mut self) -> GameResult<()> {
        if self.phase != Phase::Joining {
            return Err(GameError::WrongPhase(self.phase));
        }
        if self.player_count() < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers);
        }

        for p in self.players_mut() {
            p.score = 0;
            p.round_score = 0;
            p.state = ParticipantState::Active;
        }
        self.round_number = 1;
        Ok(())
    }
}

impl AppState {
    /// Advance to `phase`, bumping the state number exactly once and
    /// broadcasting the change.
    fn transition(&self, session: &mut Session, phase: Phase) {
        session.phase = phase;
        session.state_number += 1;
        tracing::info!(
            "Phase -> {} (round {}, state {})",
            phase,
            session.round_number,
            session.state_number
        );
        self.broadcast_to_all(ServerMessage::PhaseChange {
            phase,
            round_number: session.round_number,
            state_number: session.state_number,
        });
    }

    /// Admit a participant who has already cleared the identity service.
    /// Role is a player seat during joining while seats remain, audience
    /// otherwise.
    pub async fn admit(&self, username: Username, handle: ConnectionHandle) -> GameResult<Role> {
        let mut session = self.session.lock().await;
        let rebind = session.participant_by_conn(handle.conn_id).is_some();
        let seat = session.role_for_next_join();
        let role = session.join(username.clone(), seat, handle)?.role;
        if rebind {
            return Ok(role);
        }
        let snapshot = session.snapshot();
        drop(session);

        let noun = match role {
            Role::Player => "player",
            Role::Audience => "audience member",
        };
        self.broadcast_to_all(ServerMessage::Message {
            text: format!("{username} has joined as a {noun}."),
        });
        self.broadcast_to_all(ServerMessage::GameStateUpdate { snapshot });
        Ok(role)
    }

    /// Record a submitted prompt, publish the updated count, and advance
    /// once every player has contributed.
    pub async fn submit_prompt(&self, username: &str, text: String) -> GameResult<()> {
        let mut session = self.session.lock().await;
        session.submit_prompt(username, text)?;

        self.broadcast_to_all(ServerMessage::PromptCountUpdate {
            count: session.submitted_prompts.len(),
            submitters: session
                .submitted_prompts
                .iter()
                .map(|sp| PromptSubmitter {
                    username: sp.username.clone(),
                    text: sp.text.clone(),
                })
                .collect(),
        });

        self.maybe_advance(&mut session).await;
        Ok(())
    }

    /// Record an answer and advance once every assigned player answered.
    pub async fn submit_answer(
        &self,
        username: &str,
        prompt_id: &str,
        text: String,
    ) -> GameResult<()> {
        let mut session = self.session.lock().await;
        session.submit_answer(username, prompt_id, text)?;
        self.maybe_advance(&mut session).await;
        Ok(())
    }

    /// Record a vote and advance once the tally reaches the voter count.
    pub async fn cast_vote(
        &self,
        voter: &str,
        prompt_id: &str,
        candidate: &str,
    ) -> GameResult<()> {
        let mut session = self.session.lock().await;
        session.cast_vote(voter, prompt_id, candidate)?;
        self.broadcast_to_all(ServerMessage::Message {
            text: format!("{voter} has voted."),
        });
        self.maybe_advance(&mut session).await;
        Ok(())
    }

    /// Admin control surface. Non-admin attempts are rejected, not
    /// silently ignored. Returns the receipt message for the sender.
    pub async fn handle_admin(&self, conn_id: ConnId, action: AdminAction) -> GameResult<String> {
        let mut session = self.session.lock().await;
        if !session.is_admin_conn(conn_id) {
            return Err(GameError::NotAdmin);
        }

        match action {
            AdminAction::StartGame => {
                session.apply_start_game()?;
                self.begin_prompts(&mut session);
                // Prompts pooled during joining may already satisfy the
                // completion condition
                self.maybe_advance(&mut session).await;
                Ok("Game started successfully.".to_string())
            }
            AdminAction::PauseGame => {
                session.is_paused = true;
                self.broadcast_to_all(ServerMessage::Message {
                    text: "Game has been paused by the admin.".to_string(),
                });
                Ok("Game paused successfully.".to_string())
            }
            AdminAction::ResumeGame => {
                session.is_paused = false;
                self.broadcast_to_all(ServerMessage::Message {
                    text: "Game has been resumed by the admin.".to_string(),
                });
                // A condition satisfied while paused fires now
                self.maybe_advance(&mut session).await;
                Ok("Game resumed successfully.".to_string())
            }
            AdminAction::ResetGame => {
                session.reset();
                self.broadcast_to_all(ServerMessage::PhaseChange {
                    phase: Phase::Joining,
                    round_number: 1,
                    state_number: 0,
                });
                Ok("Game has been reset.".to_string())
            }
        }
    }

    /// Transport-level disconnect: remove the participant, promote a new
    /// admin if needed, and re-check completion with them gone.
    pub async fn handle_disconnect(&self, conn_id: ConnId) {
        let mut session = self.session.lock().await;
        let Some(removed) = session.leave(conn_id) else {
            return;
        };

        tracing::info!("{} disconnected", removed.username);
        self.broadcast_to_all(ServerMessage::Message {
            text: format!("{} has disconnected.", removed.username),
        });
        self.broadcast_to_all(ServerMessage::GameStateUpdate {
            snapshot: session.snapshot(),
        });

        self.maybe_advance(&mut session).await;
    }

    /// Evaluate the current phase's completion condition and advance if
    /// it holds. Suspended while paused.
    async fn maybe_advance(&self, session: &mut Session) {
        if session.is_paused {
            return;
        }
        match session.phase {
            Phase::Prompts if session.prompts_complete() => {
                self.begin_answers(session).await;
            }
            Phase::Answers if session.answers_complete() => {
                self.begin_voting(session);
            }
            Phase::Voting if session.voting_complete() => {
                self.finish_round(session);
            }
            _ => {}
        }
    }

    /// Enter the prompts phase: fresh assignments and player states for
    /// the round about to be played.
    fn begin_prompts(&self, session: &mut Session) {
        session.active_prompts.clear();
        session.answers.clear();
        session.votes.clear();
        for p in session.roster.iter_mut() {
            if p.state != ParticipantState::Disconnected {
                p.state = ParticipantState::Active;
            }
        }
        self.transition(session, Phase::Prompts);
    }

    /// Enter the answers phase: consume the submitted pool, pad it with
    /// supplementary prompts, assign, and deal each player their hand.
    ///
    /// The supplementary fetch is the one network call allowed while the
    /// session lock is held; it is bounded and fails open so a hung
    /// source cannot wedge the round.
    async fn begin_answers(&self, session: &mut Session) {
        let submitted: Vec<SubmittedPrompt> = session.submitted_prompts.drain(..).collect();
        let wanted = submitted.len() / 2;

        let supplementary = if wanted > 0 {
            match tokio::time::timeout(FETCH_TIMEOUT, self.prompt_source.fetch_prompts()).await {
                Ok(Ok(mut fetched)) => {
                    fetched.shuffle(&mut rand::rng());
                    fetched.truncate(wanted);
                    fetched
                }
                Ok(Err(e)) => {
                    tracing::warn!("Supplementary prompt fetch failed: {}", e);
                    Vec::new()
                }
                Err(_) => {
                    tracing::warn!("Supplementary prompt fetch timed out");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let mut pool: Vec<String> = submitted.into_iter().map(|sp| sp.text).collect();
        pool.extend(supplementary);

        session.assign_prompts(pool);
        self.transition(session, Phase::Answers);

        // Each player sees their own assignments only
        for p in session.players() {
            if p.assigned_prompts.is_empty() {
                continue;
            }
            let prompts: Vec<AssignedPromptInfo> = p
                .assigned_prompts
                .iter()
                .filter_map(|id| session.active_prompt(id))
                .map(|prompt| AssignedPromptInfo {
                    prompt_id: prompt.id.clone(),
                    prompt_text: prompt.text.clone(),
                })
                .collect();
            p.handle.send(ServerMessage::AssignedPrompts { prompts });
        }
    }

    /// Enter the voting phase and publish every prompt's candidates.
    fn begin_voting(&self, session: &mut Session) {
        self.transition(session, Phase::Voting);
        for prompt in &session.active_prompts {
            self.broadcast_to_all(ServerMessage::VotingOpen {
                prompt_id: prompt.id.clone(),
                prompt_text: prompt.text.clone(),
                candidates: session
                    .answers_for(&prompt.id)
                    .iter()
                    .map(|a| CandidateAnswer {
                        username: a.username.clone(),
                        text: a.text.clone(),
                    })
                    .collect(),
            });
        }
    }

    /// All votes are in: step through results and scores, then open the
    /// next round or end the game.
    fn finish_round(&self, session: &mut Session) {
        self.transition(session, Phase::Results);
        session.compute_round_scores();
        self.broadcast_to_all(ServerMessage::RoundResults {
            round_number: session.round_number,
            prompts: session.round_results(),
        });

        self.transition(session, Phase::Scores);
        session.fold_totals();
        self.broadcast_to_all(ServerMessage::Leaderboard {
            totals: session.leaderboard(),
        });

        if session.round_number < session.total_rounds {
            session.round_number += 1;
            self.begin_prompts(session);
        } else {
            self.transition(session, Phase::GameOver);
            self.broadcast_to_all(ServerMessage::FinalPodium {
                ranking: session.leaderboard(),
            });
        }
    }
}
