//! Scoring: vote counts into round scores, round scores into totals.

use super::Session;
use crate::protocol::{AnswerOutcome, PromptResults, ScoreEntry};

impl Session {
    /// Recompute round scores from the current vote tallies. A player may
    /// collect points from up to two answers when assigned to two prompts.
    pub fn compute_round_scores(&mut self) {
        let round_number = self.round_number;

        for p in self.players_mut() {
            p.round_score = 0;
        }

        let mut earned: Vec<(String, u32)> = Vec::new();
        for prompt in &self.active_prompts {
            for answer in self.answers_for(&prompt.id) {
                let votes = self.vote_count(&prompt.id, &answer.username) as u32;
                earned.push((answer.username.clone(), round_number * votes * 100));
            }
        }

        for (username, points) in earned {
            if let Some(p) = self.participant_mut(&username) {
                p.round_score += points;
            }
        }
    }

    /// Fold round scores into totals and zero them out.
    pub fn fold_totals(&mut self) {
        for p in self.players_mut() {
            p.score += p.round_score;
            p.round_score = 0;
        }
    }

    /// Per-prompt results for the current round, for broadcast.
    pub fn round_results(&self) -> Vec<PromptResults> {
        self.active_prompts
            .iter()
            .map(|prompt| PromptResults {
                prompt_id: prompt.id.clone(),
                prompt_text: prompt.text.clone(),
                answers: self
                    .answers_for(&prompt.id)
                    .iter()
                    .map(|answer| {
                        let votes = self.vote_count(&prompt.id, &answer.username);
                        AnswerOutcome {
                            username: answer.username.clone(),
                            text: answer.text.clone(),
                            votes,
                            points: self.round_number * votes as u32 * 100,
                        }
                    })
                    .collect(),
            })
            .collect()
    }

    /// Cumulative totals, highest first (username breaks ties so the
    /// ordering is stable for clients).
    pub fn leaderboard(&self) -> Vec<ScoreEntry> {
        let mut totals: Vec<ScoreEntry> = self
            .players()
            .map(|p| ScoreEntry {
                username: p.username.clone(),
                score: p.score,
            })
            .collect();
        totals.sort_by(|a, b| b.score.cmp(&a.score).then(a.username.cmp(&b.username)));
        totals
    }
}
