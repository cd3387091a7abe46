use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tournament::BracketType;

/// Lifecycle of a bracket match
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    /// At least one participant slot still waits on a predecessor.
    Pending,
    Ready,
    Completed,
    /// Bracket-reset final that turned out not to be needed.
    Skipped,
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStatus::Pending => write!(f, "pending"),
            MatchStatus::Ready => write!(f, "ready"),
            MatchStatus::Completed => write!(f, "completed"),
            MatchStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// Participant position inside a match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MatchSlot {
    First,
    Second,
}

impl MatchSlot {
    /// Slot fed by the match at `position` within its round.
    pub fn for_position(position: usize) -> Self {
        if position % 2 == 0 {
            MatchSlot::First
        } else {
            MatchSlot::Second
        }
    }
}

/// Build-time pointer to a participant slot of a downstream match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SlotRef {
    pub match_number: i32,
    pub slot: MatchSlot,
}

impl SlotRef {
    pub fn new(match_number: i32, slot: MatchSlot) -> Self {
        Self { match_number, slot }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Match {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub bracket_type: BracketType,
    pub round_number: i32,
    pub match_number: i32,
    pub participant1_id: Option<Uuid>,
    pub participant2_id: Option<Uuid>,
    pub winner_id: Option<Uuid>,
    pub loser_id: Option<Uuid>,
    pub winner_next: Option<SlotRef>,
    pub loser_next: Option<SlotRef>,
    pub status: MatchStatus,
    pub is_bye: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Match {
    /// Create an unresolved match. The id is derived from the tournament id
    /// and match number so regenerating the same input yields the same ids.
    pub fn new(
        tournament_id: Uuid,
        bracket_type: BracketType,
        round_number: i32,
        match_number: i32,
    ) -> Self {
        Self {
            id: Self::derive_id(tournament_id, match_number),
            tournament_id,
            bracket_type,
            round_number,
            match_number,
            participant1_id: None,
            participant2_id: None,
            winner_id: None,
            loser_id: None,
            winner_next: None,
            loser_next: None,
            status: MatchStatus::Pending,
            is_bye: false,
            completed_at: None,
        }
    }

    pub fn derive_id(tournament_id: Uuid, match_number: i32) -> Uuid {
        Uuid::new_v5(&tournament_id, &match_number.to_be_bytes())
    }

    pub fn participant(&self, slot: MatchSlot) -> Option<Uuid> {
        match slot {
            MatchSlot::First => self.participant1_id,
            MatchSlot::Second => self.participant2_id,
        }
    }

    pub fn participant_mut(&mut self, slot: MatchSlot) -> &mut Option<Uuid> {
        match slot {
            MatchSlot::First => &mut self.participant1_id,
            MatchSlot::Second => &mut self.participant2_id,
        }
    }

    pub fn has_both_participants(&self) -> bool {
        self.participant1_id.is_some() && self.participant2_id.is_some()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, MatchStatus::Completed | MatchStatus::Skipped)
    }

    /// Promote a pending match once both slots are known.
    /// Returns true when the match became playable.
    pub fn refresh_status(&mut self) -> bool {
        if self.status == MatchStatus::Pending && self.has_both_participants() {
            self.status = MatchStatus::Ready;
            return true;
        }
        false
    }

    pub fn is_participant(&self, id: Uuid) -> bool {
        self.participant1_id == Some(id) || self.participant2_id == Some(id)
    }
}
