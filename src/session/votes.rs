//! Vote tally: one vote per (prompt, voter), no self-votes.

use super::Session;
use crate::error::{GameError, GameResult};
use crate::types::*;

impl Session {
    /// Record a vote for a candidate's answer on a prompt and mark the
    /// voter as having voted.
    pub fn cast_vote(
        &mut self,
        voter: &str,
        prompt_id: &str,
        candidate: &str,
    ) -> GameResult<()> {
        if self.participant(voter).is_none() {
            return Err(GameError::UnknownUser(voter.to_string()));
        }

        if self.phase != Phase::Voting {
            return Err(GameError::WrongPhase(self.phase));
        }

        let prompt = self
            .active_prompt(prompt_id)
            .ok_or(GameError::UnknownPrompt)?;

        if prompt.is_assigned_to(voter) {
            return Err(GameError::SelfVote);
        }

        if !self
            .answers_for(prompt_id)
            .iter()
            .any(|a| a.username == candidate)
        {
            return Err(GameError::UnknownCandidate);
        }

        let tally = self.votes.entry(prompt_id.to_string()).or_default();
        if tally.values().any(|voters| voters.contains(voter)) {
            return Err(GameError::DuplicateVote);
        }

        tally
            .entry(candidate.to_string())
            .or_default()
            .insert(voter.to_string());

        if let Some(p) = self.participant_mut(voter) {
            p.state = ParticipantState::Voted;
        }

        Ok(())
    }

    /// Vote count for one candidate on one prompt: set cardinality.
    pub fn vote_count(&self, prompt_id: &str, candidate: &str) -> usize {
        self.votes
            .get(prompt_id)
            .and_then(|tally| tally.get(candidate))
            .map(|voters| voters.len())
            .unwrap_or(0)
    }

    /// Total votes cast across all active prompts.
    pub fn total_votes(&self) -> usize {
        self.active_prompts
            .iter()
            .filter_map(|p| self.votes.get(&p.id))
            .map(|tally| tally.values().map(|voters| voters.len()).sum::<usize>())
            .sum()
    }

    /// Whether enough votes are in: total across all prompts reaches the
    /// number of eligible voters (players plus audience).
    pub fn voting_complete(&self) -> bool {
        let voters = self.eligible_voters();
        voters > 0 && self.total_votes() >= voters
    }
}
