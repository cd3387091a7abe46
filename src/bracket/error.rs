use thiserror::Error;
use uuid::Uuid;

use crate::models::MatchSlot;

/// Broad class of a bracket failure, used by callers to decide whether a
/// request can be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; retry after fixing the request.
    Validation,
    /// Structurally impossible request; not retryable as-is.
    Configuration,
    /// Wiring or double-submission bug; never overwrite, surface it.
    Consistency,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketError {
    #[error("tournament {tournament_id}: at least {required} participant(s) required, got {actual}")]
    InsufficientParticipants {
        tournament_id: Uuid,
        required: usize,
        actual: usize,
    },

    #[error("tournament {tournament_id}: seed {seed} is assigned to more than one participant")]
    DuplicateSeed { tournament_id: Uuid, seed: i32 },

    #[error("tournament {tournament_id}: participant {participant_id} is listed more than once")]
    DuplicateParticipant {
        tournament_id: Uuid,
        participant_id: Uuid,
    },

    #[error("tournament {tournament_id}: invalid participant: {reason}")]
    InvalidParticipant { tournament_id: Uuid, reason: String },

    #[error("invalid bracket size {size} for {participants} participant(s)")]
    InvalidBracketSize { size: usize, participants: usize },

    #[error("match number offset must be at least 1, got {offset}")]
    InvalidMatchNumberOffset { offset: i32 },

    #[error("match numbers starting at {start} overflow the match number range")]
    MatchNumbersExhausted { start: i32 },

    #[error("tournament {tournament_id}: losers bracket needs at least 2 winners rounds, got {rounds}")]
    InsufficientWinnersRounds { tournament_id: Uuid, rounds: usize },

    #[error("tournament {tournament_id}: match {match_number} not found")]
    MatchNotFound {
        tournament_id: Uuid,
        match_number: i32,
    },

    #[error("tournament {tournament_id}: no match with id {match_id}")]
    UnknownMatchId { tournament_id: Uuid, match_id: Uuid },

    #[error("tournament {tournament_id}: match {match_number} (round {round}) is already {status}")]
    MatchAlreadyCompleted {
        tournament_id: Uuid,
        match_number: i32,
        round: i32,
        status: String,
    },

    #[error("tournament {tournament_id}: match {match_number} (round {round}) is still waiting on a participant")]
    MatchNotReady {
        tournament_id: Uuid,
        match_number: i32,
        round: i32,
    },

    #[error("tournament {tournament_id}: match {match_number} (round {round}): {reason}")]
    InvalidResult {
        tournament_id: Uuid,
        match_number: i32,
        round: i32,
        reason: String,
    },

    #[error("tournament {tournament_id}: slot {slot:?} of match {match_number} (round {round}) is already filled")]
    SlotAlreadyFilled {
        tournament_id: Uuid,
        match_number: i32,
        round: i32,
        slot: MatchSlot,
    },
}

impl BracketError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BracketError::InsufficientParticipants { .. }
            | BracketError::DuplicateSeed { .. }
            | BracketError::DuplicateParticipant { .. }
            | BracketError::InvalidParticipant { .. }
            | BracketError::MatchNotReady { .. }
            | BracketError::InvalidResult { .. } => ErrorKind::Validation,
            BracketError::InvalidBracketSize { .. }
            | BracketError::InvalidMatchNumberOffset { .. }
            | BracketError::MatchNumbersExhausted { .. }
            | BracketError::InsufficientWinnersRounds { .. } => ErrorKind::Configuration,
            BracketError::MatchNotFound { .. }
            | BracketError::UnknownMatchId { .. }
            | BracketError::MatchAlreadyCompleted { .. }
            | BracketError::SlotAlreadyFilled { .. } => ErrorKind::Consistency,
        }
    }
}
