//! Error taxonomy for session commands.
//!
//! Every variant is local to the triggering command: the command is rejected
//! with a user-facing message and no state is mutated.

use crate::types::Phase;

pub type GameResult<T> = Result<T, GameError>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GameError {
    // Validation: malformed or out-of-range input
    #[error("Username must be more than 4 and less than 8 characters.")]
    UsernameLength,

    #[error("Password must be more than 8 and less than 16 characters.")]
    PasswordLength,

    #[error("Prompt must be between 20 and 100 characters.")]
    PromptLength,

    #[error("Answer must be between 5 and 200 characters.")]
    AnswerLength,

    // State conflicts: the participant may retry with different input
    #[error("Username is already taken in the game.")]
    DuplicateUsername,

    #[error("This connection has already joined the game.")]
    AlreadySeated,

    #[error("User {0} not found in the game.")]
    UnknownUser(String),

    #[error("Prompt not found.")]
    UnknownPrompt,

    #[error("Selected answer does not exist for this prompt.")]
    UnknownCandidate,

    #[error("You are not assigned to this prompt.")]
    NotAssigned,

    #[error("You have already submitted an answer for this prompt.")]
    DuplicateAnswer,

    #[error("You cannot vote on your own prompt.")]
    SelfVote,

    #[error("You have already voted on this prompt.")]
    DuplicateVote,

    #[error("That is not allowed during the {0} phase.")]
    WrongPhase(Phase),

    #[error("At least 3 players are required to start the game.")]
    NotEnoughPlayers,

    // Authorization
    #[error("Only the admin can do that.")]
    NotAdmin,

    // Collaborator failure: surfaced as a generic failure to the requester
    #[error("{0}")]
    IdentityService(String),
}

impl GameError {
    /// Stable machine-readable code for the wire protocol.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::UsernameLength => "USERNAME_LENGTH",
            GameError::PasswordLength => "PASSWORD_LENGTH",
            GameError::PromptLength => "PROMPT_LENGTH",
            GameError::AnswerLength => "ANSWER_LENGTH",
            GameError::DuplicateUsername => "DUPLICATE_USERNAME",
            GameError::AlreadySeated => "ALREADY_SEATED",
            GameError::UnknownUser(_) => "UNKNOWN_USER",
            GameError::UnknownPrompt => "UNKNOWN_PROMPT",
            GameError::UnknownCandidate => "UNKNOWN_CANDIDATE",
            GameError::NotAssigned => "NOT_ASSIGNED",
            GameError::DuplicateAnswer => "DUPLICATE_ANSWER",
            GameError::SelfVote => "SELF_VOTE",
            GameError::DuplicateVote => "DUPLICATE_VOTE",
            GameError::WrongPhase(_) => "WRONG_PHASE",
            GameError::NotEnoughPlayers => "NOT_ENOUGH_PLAYERS",
            GameError::NotAdmin => "UNAUTHORIZED",
            GameError::IdentityService(_) => "IDENTITY_SERVICE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_user_facing() {
        assert_eq!(
            GameError::SelfVote.to_string(),
            "You cannot vote on your own prompt."
        );
        assert_eq!(
            GameError::WrongPhase(Phase::Voting).to_string(),
            "That is not allowed during the voting phase."
        );
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(GameError::NotAdmin.code(), "UNAUTHORIZED");
        assert_eq!(GameError::DuplicateVote.code(), "DUPLICATE_VOTE");
    }
}
