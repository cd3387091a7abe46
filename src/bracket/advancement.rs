use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use super::{Bracket, BracketError};
use crate::models::{Match, MatchStatus, SlotRef};

impl Bracket {
    /// Record the result of `match_number` and push the winner (and loser,
    /// when wired) into their pre-assigned downstream slots.
    ///
    /// Nothing is mutated unless every check passes. Returns the matches
    /// that became playable because of this result.
    pub fn advance(
        &mut self,
        match_number: i32,
        winner_id: Uuid,
        loser_id: Uuid,
    ) -> Result<Vec<Match>, BracketError> {
        let position = self.position(match_number)?;
        let current = &self.matches[position];

        if current.is_finished() {
            return Err(BracketError::MatchAlreadyCompleted {
                tournament_id: self.tournament_id,
                match_number,
                round: current.round_number,
                status: current.status.to_string(),
            });
        }
        if !current.has_both_participants() {
            return Err(BracketError::MatchNotReady {
                tournament_id: self.tournament_id,
                match_number,
                round: current.round_number,
            });
        }
        if winner_id == loser_id
            || !current.is_participant(winner_id)
            || !current.is_participant(loser_id)
        {
            return Err(BracketError::InvalidResult {
                tournament_id: self.tournament_id,
                match_number,
                round: current.round_number,
                reason: format!(
                    "winner {winner_id} and loser {loser_id} must be the two participants"
                ),
            });
        }

        // Winners champion taking the first grand final ends the event.
        let reset_skipped = self.is_reset_decider(match_number)
            && current.participant1_id == Some(winner_id);

        let mut writes: Vec<(SlotRef, Uuid)> = Vec::with_capacity(2);
        if !reset_skipped {
            writes.extend(current.winner_next.map(|target| (target, winner_id)));
            writes.extend(current.loser_next.map(|target| (target, loser_id)));
        }

        for (target, _) in &writes {
            let target_match = &self.matches[self.position(target.match_number)?];
            if target_match.participant(target.slot).is_some() {
                return Err(BracketError::SlotAlreadyFilled {
                    tournament_id: self.tournament_id,
                    match_number: target.match_number,
                    round: target_match.round_number,
                    slot: target.slot,
                });
            }
        }

        let current = &mut self.matches[position];
        current.winner_id = Some(winner_id);
        current.loser_id = Some(loser_id);
        current.status = MatchStatus::Completed;
        current.completed_at = Some(Utc::now());

        let mut playable = Vec::new();
        for (target, participant) in writes {
            let target_pos = self.position(target.match_number)?;
            let target_match = &mut self.matches[target_pos];
            *target_match.participant_mut(target.slot) = Some(participant);
            if target_match.refresh_status() {
                debug!(
                    match_number = target_match.match_number,
                    round = target_match.round_number,
                    "match became playable"
                );
                playable.push(target_match.clone());
            }
        }

        if reset_skipped {
            if let Some(&reset) = self.grand_final.get(1) {
                let reset_pos = self.position(reset)?;
                self.matches[reset_pos].status = MatchStatus::Skipped;
            }
        }

        info!(
            tournament_id = %self.tournament_id,
            match_number,
            winner_id = %winner_id,
            loser_id = %loser_id,
            newly_playable = playable.len(),
            "Match result applied"
        );

        Ok(playable)
    }

    /// Apply a result addressed by the persistent match id.
    pub fn advance_by_id(
        &mut self,
        match_id: Uuid,
        winner_id: Uuid,
        loser_id: Uuid,
    ) -> Result<Vec<Match>, BracketError> {
        let match_number = self
            .get_by_id(match_id)
            .map(|m| m.match_number)
            .ok_or(BracketError::UnknownMatchId {
                tournament_id: self.tournament_id,
                match_id,
            })?;
        self.advance(match_number, winner_id, loser_id)
    }

    fn is_reset_decider(&self, match_number: i32) -> bool {
        self.grand_final.len() == 2 && self.grand_final[0] == match_number
    }
}
