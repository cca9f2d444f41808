//! Answer ledger: one answer per (prompt, assigned player) pair.

use super::Session;
use crate::error::{GameError, GameResult};
use crate::types::*;

/// Inclusive answer length bounds in characters.
const ANSWER_MIN_CHARS: usize = 5;
const ANSWER_MAX_CHARS: usize = 200;

impl Session {
    /// Record an answer. The player counts as having answered once every
    /// prompt assigned to them carries their answer; players dealt two
    /// prompts stay pending until both are in.
    pub fn submit_answer(
        &mut self,
        username: &str,
        prompt_id: &str,
        text: String,
    ) -> GameResult<()> {
        if !self
            .participant(username)
            .is_some_and(|p| p.role == Role::Player)
        {
            return Err(GameError::UnknownUser(username.to_string()));
        }

        if self.phase != Phase::Answers {
            return Err(GameError::WrongPhase(self.phase));
        }

        let prompt = self
            .active_prompt(prompt_id)
            .ok_or(GameError::UnknownPrompt)?;
        if !prompt.is_assigned_to(username) {
            return Err(GameError::NotAssigned);
        }

        if self
            .answers
            .get(prompt_id)
            .is_some_and(|answers| answers.iter().any(|a| a.username == username))
        {
            return Err(GameError::DuplicateAnswer);
        }

        let len = text.chars().count();
        if !(ANSWER_MIN_CHARS..=ANSWER_MAX_CHARS).contains(&len) {
            return Err(GameError::AnswerLength);
        }

        self.answers
            .entry(prompt_id.to_string())
            .or_default()
            .push(Answer {
                prompt_id: prompt_id.to_string(),
                username: username.to_string(),
                text,
            });

        let answered_all = self.participant(username).is_some_and(|p| {
            p.assigned_prompts.iter().all(|pid| {
                self.answers
                    .get(pid)
                    .is_some_and(|answers| answers.iter().any(|a| a.username == username))
            })
        });
        if answered_all {
            if let Some(p) = self.participant_mut(username) {
                p.state = ParticipantState::Answered;
            }
        }

        Ok(())
    }

    /// Whether every active (non-disconnected) player has answered.
    /// Disconnected players are excluded from the denominator, and so are
    /// players the pairing formula left without an assignment (even player
    /// counts leave the last join unpaired) — they have nothing to answer.
    pub fn answers_complete(&self) -> bool {
        let mut any = false;
        for p in self.players() {
            if p.state == ParticipantState::Disconnected || p.assigned_prompts.is_empty() {
                continue;
            }
            any = true;
            if p.state != ParticipantState::Answered {
                return false;
            }
        }
        any
    }

    pub fn answers_for(&self, prompt_id: &str) -> &[Answer] {
        self.answers
            .get(prompt_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
