//! Identity roster: who is in the session and in what role.

use super::Session;
use crate::error::{GameError, GameResult};
use crate::types::*;

impl Session {
    /// Role for the next joiner: a player seat during the joining phase
    /// while seats remain, audience otherwise.
    pub fn role_for_next_join(&self) -> Role {
        if self.phase == Phase::Joining && self.player_count() < MAX_PLAYERS {
            Role::Player
        } else {
            Role::Audience
        }
    }

    /// Admit a participant. Usernames are unique across players and
    /// audience combined (case-sensitive exact match). The first player to
    /// join while no player holds the admin flag becomes admin.
    ///
    /// A connection holds at most one seat: re-identifying under the same
    /// username rebinds the handle to the existing seat, re-identifying
    /// under a different one is rejected. Without this, a disconnect
    /// would leave a ghost seat that counts toward `eligible_voters` but
    /// can never vote.
    pub fn join(
        &mut self,
        username: Username,
        role: Role,
        handle: ConnectionHandle,
    ) -> GameResult<&Participant> {
        if let Some(idx) = self
            .roster
            .iter()
            .position(|p| p.handle.conn_id == handle.conn_id)
        {
            if self.roster[idx].username != username {
                return Err(GameError::AlreadySeated);
            }
            self.roster[idx].handle = handle;
            return Ok(&self.roster[idx]);
        }

        if self.participant(&username).is_some() {
            return Err(GameError::DuplicateUsername);
        }

        let mut participant = Participant::new(username, role, handle);
        if role == Role::Player && !self.players().any(|p| p.is_admin) {
            participant.is_admin = true;
        }

        self.roster.push(participant);
        Ok(self.roster.last().expect("just pushed"))
    }

    /// Remove the participant bound to this connection. If they held the
    /// admin flag, the lowest-joined remaining player is promoted; with no
    /// players left there is no admin until the next player joins.
    pub fn leave(&mut self, conn_id: ConnId) -> Option<Participant> {
        let idx = self
            .roster
            .iter()
            .position(|p| p.handle.conn_id == conn_id)?;
        let removed = self.roster.remove(idx);

        if removed.is_admin {
            if let Some(successor) = self.players_mut().next() {
                successor.is_admin = true;
            }
        }

        Some(removed)
    }

    pub fn participant_by_conn(&self, conn_id: ConnId) -> Option<&Participant> {
        self.roster.iter().find(|p| p.handle.conn_id == conn_id)
    }

    /// Whether the participant on this connection holds the admin flag.
    pub fn is_admin_conn(&self, conn_id: ConnId) -> bool {
        self.participant_by_conn(conn_id)
            .map(|p| p.is_admin)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::detached_handle;
    use super::*;

    fn join_player(session: &mut Session, name: &str, conn_id: ConnId) {
        session
            .join(name.to_string(), Role::Player, detached_handle(conn_id))
            .unwrap();
    }

    #[test]
    fn test_first_player_becomes_admin() {
        let mut session = Session::new();
        join_player(&mut session, "alice", 1);
        join_player(&mut session, "bobby", 2);

        assert!(session.participant("alice").unwrap().is_admin);
        assert!(!session.participant("bobby").unwrap().is_admin);
    }

    #[test]
    fn test_audience_never_gets_admin() {
        let mut session = Session::new();
        session
            .join("watch".to_string(), Role::Audience, detached_handle(1))
            .unwrap();
        assert!(!session.participant("watch").unwrap().is_admin);

        // A later player still claims the flag
        join_player(&mut session, "alice", 2);
        assert!(session.participant("alice").unwrap().is_admin);
    }

    #[test]
    fn test_duplicate_username_rejected_across_roles() {
        let mut session = Session::new();
        join_player(&mut session, "alice", 1);

        let err = session
            .join("alice".to_string(), Role::Audience, detached_handle(2))
            .unwrap_err();
        assert_eq!(err, GameError::DuplicateUsername);
        assert_eq!(session.roster.len(), 1);
    }

    #[test]
    fn test_admin_succession_is_join_order() {
        let mut session = Session::new();
        join_player(&mut session, "alice", 1);
        join_player(&mut session, "bobby", 2);
        join_player(&mut session, "carol", 3);

        let removed = session.leave(1).unwrap();
        assert_eq!(removed.username, "alice");
        assert!(session.participant("bobby").unwrap().is_admin);
        assert!(!session.participant("carol").unwrap().is_admin);
    }

    #[test]
    fn test_no_admin_after_last_player_leaves() {
        let mut session = Session::new();
        join_player(&mut session, "alice", 1);
        session
            .join("watch".to_string(), Role::Audience, detached_handle(2))
            .unwrap();

        session.leave(1);
        assert!(session.roster.iter().all(|p| !p.is_admin));

        // Next player to join picks the flag back up
        join_player(&mut session, "diana", 3);
        assert!(session.participant("diana").unwrap().is_admin);
    }

    #[test]
    fn test_second_identity_on_same_conn_rejected() {
        let mut session = Session::new();
        join_player(&mut session, "alice", 1);

        let err = session
            .join("malice".to_string(), Role::Player, detached_handle(1))
            .unwrap_err();
        assert_eq!(err, GameError::AlreadySeated);
        assert_eq!(session.roster.len(), 1);

        // The socket closing clears the whole roster entry for the conn
        session.leave(1);
        assert!(session.roster.is_empty());
    }

    #[test]
    fn test_rejoin_same_conn_rebinds_handle() {
        let mut session = Session::new();
        join_player(&mut session, "alice", 1);
        session.participant_mut("alice").unwrap().score = 300;

        session
            .join("alice".to_string(), Role::Player, detached_handle(1))
            .unwrap();

        assert_eq!(session.roster.len(), 1);
        let alice = session.participant("alice").unwrap();
        assert!(alice.is_admin);
        assert_eq!(alice.score, 300);
    }

    #[test]
    fn test_leave_unknown_conn_is_noop() {
        let mut session = Session::new();
        join_player(&mut session, "alice", 1);
        assert!(session.leave(99).is_none());
        assert_eq!(session.roster.len(), 1);
    }

    #[test]
    fn test_role_for_next_join_caps_players() {
        let mut session = Session::new();
        for i in 0..MAX_PLAYERS {
            assert_eq!(session.role_for_next_join(), Role::Player);
            join_player(&mut session, &format!("play{i}"), i as ConnId);
        }
        assert_eq!(session.role_for_next_join(), Role::Audience);
    }

    #[test]
    fn test_mid_game_joiners_are_audience() {
        let mut session = Session::new();
        join_player(&mut session, "alice", 1);
        session.phase = Phase::Answers;
        assert_eq!(session.role_for_next_join(), Role::Audience);
    }
}
