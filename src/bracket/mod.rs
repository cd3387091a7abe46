//! Bracket generation and progression.
//!
//! Generation is a pure, all-or-nothing build from an ordered participant
//! list to a set of wired [`Match`] records. Progression applies one match
//! result at a time through [`Bracket::advance`].

pub mod advancement;
pub mod double_elimination;
pub mod error;
pub mod losers_bracket;
pub mod seeding;
pub mod single_elimination;

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::models::{BracketType, Match, MatchStatus, Participant, SlotRef, TournamentFormat};

pub use error::{BracketError, ErrorKind};
pub use seeding::{assign_slots, bracket_size, bye_count, BracketSlot};

/// Knobs that shape a build without changing the participant input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateOptions {
    /// First match number handed out by the build.
    pub match_number_offset: i32,
    /// Add a second grand final played only if the losers champion wins the first.
    pub grand_final_reset: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            match_number_offset: 1,
            grand_final_reset: false,
        }
    }
}

/// Match numbers handed out by a single build.
#[derive(Debug, Clone)]
pub struct MatchSequence {
    start: i32,
    /// `None` once `i32::MAX` has been handed out.
    next: Option<i32>,
}

impl MatchSequence {
    pub fn starting_at(offset: i32) -> Self {
        Self {
            start: offset,
            next: Some(offset),
        }
    }

    pub fn allocate(&mut self) -> Result<i32, BracketError> {
        let number = self.next.ok_or(BracketError::MatchNumbersExhausted { start: self.start })?;
        self.next = number.checked_add(1);
        Ok(number)
    }
}

/// Where a participant of a not-yet-built match comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feeder {
    Winner(i32),
    Loser(i32),
}

impl Feeder {
    pub fn match_number(&self) -> i32 {
        match self {
            Feeder::Winner(number) | Feeder::Loser(number) => *number,
        }
    }
}

/// A generated bracket: every match plus the per-round groupings.
#[derive(Debug, Clone, Serialize)]
pub struct Bracket {
    pub tournament_id: Uuid,
    pub format: TournamentFormat,
    pub bracket_size: usize,
    pub byes: usize,
    /// Participants in seed order.
    pub participants: Vec<Participant>,
    /// Ordered by match number.
    pub matches: Vec<Match>,
    pub winners_rounds: Vec<Vec<i32>>,
    pub losers_rounds: Vec<Vec<i32>>,
    pub grand_final: Vec<i32>,
    #[serde(skip)]
    index: HashMap<i32, usize>,
}

impl Bracket {
    pub fn new(tournament_id: Uuid, format: TournamentFormat, participants: &[Participant]) -> Self {
        let mut sorted = participants.to_vec();
        sorted.sort_by_key(|p| p.seed);
        let size = bracket_size(sorted.len());
        Self {
            tournament_id,
            format,
            bracket_size: size,
            byes: size - sorted.len().min(size),
            participants: sorted,
            matches: Vec::new(),
            winners_rounds: Vec::new(),
            losers_rounds: Vec::new(),
            grand_final: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub(crate) fn push_match(
        &mut self,
        bracket_type: BracketType,
        round_number: i32,
        sequence: &mut MatchSequence,
    ) -> Result<i32, BracketError> {
        let number = sequence.allocate()?;
        self.matches.push(Match::new(
            self.tournament_id,
            bracket_type,
            round_number,
            number,
        ));
        self.index.insert(number, self.matches.len() - 1);
        Ok(number)
    }

    pub fn get(&self, match_number: i32) -> Option<&Match> {
        self.index.get(&match_number).map(|&i| &self.matches[i])
    }

    pub fn get_by_id(&self, match_id: Uuid) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == match_id)
    }

    pub(crate) fn position(&self, match_number: i32) -> Result<usize, BracketError> {
        self.index
            .get(&match_number)
            .copied()
            .ok_or(BracketError::MatchNotFound {
                tournament_id: self.tournament_id,
                match_number,
            })
    }

    /// Point `feeder`'s outcome at `target`. A feeder that is already
    /// decided (a round-one bye) is written through immediately.
    pub(crate) fn wire(&mut self, feeder: Feeder, target: SlotRef) -> Result<(), BracketError> {
        let source = self.position(feeder.match_number())?;
        let target_pos = self.position(target.match_number)?;

        let source_match = &mut self.matches[source];
        let resolved = match feeder {
            Feeder::Winner(_) => {
                source_match.winner_next = Some(target);
                source_match.winner_id
            }
            Feeder::Loser(_) => {
                source_match.loser_next = Some(target);
                source_match.loser_id
            }
        };

        if source_match.status == MatchStatus::Completed {
            if let Some(participant) = resolved {
                let target_match = &mut self.matches[target_pos];
                *target_match.participant_mut(target.slot) = Some(participant);
                target_match.refresh_status();
            }
        }
        Ok(())
    }

    /// Matches that can be played right now.
    pub fn ready_matches(&self) -> Vec<&Match> {
        self.matches
            .iter()
            .filter(|m| m.status == MatchStatus::Ready)
            .collect()
    }

    /// Tournament winner, once the deciding match is done.
    pub fn champion(&self) -> Option<Uuid> {
        if self.participants.len() == 1 {
            return self.participants.first().map(|p| p.id);
        }
        let deciding: &[i32] = match self.format {
            TournamentFormat::SingleElimination => self
                .winners_rounds
                .last()
                .map(Vec::as_slice)
                .unwrap_or_default(),
            TournamentFormat::DoubleElimination => self.grand_final.as_slice(),
        };
        deciding
            .iter()
            .rev()
            .filter_map(|&number| self.get(number))
            .find(|m| m.status != MatchStatus::Skipped)
            .filter(|m| m.status == MatchStatus::Completed)
            .and_then(|m| m.winner_id)
    }

    pub fn is_complete(&self) -> bool {
        self.champion().is_some()
    }
}

/// Build the full bracket for `participants`.
///
/// Input is validated before anything is built; a failure in any stage
/// discards the partial bracket.
pub fn generate_bracket(
    tournament_id: Uuid,
    format: TournamentFormat,
    participants: &[Participant],
    options: &GenerateOptions,
) -> Result<Bracket, BracketError> {
    validate_participants(tournament_id, participants)?;
    if options.match_number_offset < 1 {
        return Err(BracketError::InvalidMatchNumberOffset {
            offset: options.match_number_offset,
        });
    }

    let mut bracket = Bracket::new(tournament_id, format, participants);
    let slots = assign_slots(participants, bracket.bracket_size)?;
    let mut sequence = MatchSequence::starting_at(options.match_number_offset);

    match format {
        TournamentFormat::SingleElimination => {
            single_elimination::build_winners_bracket(&mut bracket, &slots, &mut sequence)?;
        }
        TournamentFormat::DoubleElimination => {
            double_elimination::build_double_elimination(
                &mut bracket,
                &slots,
                &mut sequence,
                options.grand_final_reset,
            )?;
        }
    }

    info!(
        tournament_id = %tournament_id,
        format = %format,
        participants = participants.len(),
        bracket_size = bracket.bracket_size,
        byes = bracket.byes,
        matches = bracket.matches.len(),
        "Bracket generated"
    );

    Ok(bracket)
}

fn validate_participants(
    tournament_id: Uuid,
    participants: &[Participant],
) -> Result<(), BracketError> {
    if participants.is_empty() {
        return Err(BracketError::InsufficientParticipants {
            tournament_id,
            required: 1,
            actual: 0,
        });
    }

    let mut seeds = HashSet::new();
    let mut ids = HashSet::new();
    for participant in participants {
        participant
            .validate()
            .map_err(|e| BracketError::InvalidParticipant {
                tournament_id,
                reason: format!("{} (seed {}): {}", participant.display_name, participant.seed, e),
            })?;
        if !seeds.insert(participant.seed) {
            return Err(BracketError::DuplicateSeed {
                tournament_id,
                seed: participant.seed,
            });
        }
        if !ids.insert(participant.id) {
            return Err(BracketError::DuplicateParticipant {
                tournament_id,
                participant_id: participant.id,
            });
        }
    }

    debug!(tournament_id = %tournament_id, count = participants.len(), "participants validated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(count: i32) -> Vec<Participant> {
        (1..=count)
            .map(|seed| Participant::new(Uuid::new_v4(), format!("p{seed}"), seed))
            .collect()
    }

    #[test]
    fn test_sequence_starts_at_offset() {
        let mut sequence = MatchSequence::starting_at(100);
        assert_eq!(sequence.allocate(), Ok(100));
        assert_eq!(sequence.allocate(), Ok(101));
    }

    #[test]
    fn test_empty_field_is_rejected() {
        let err = generate_bracket(
            Uuid::new_v4(),
            TournamentFormat::SingleElimination,
            &[],
            &GenerateOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BracketError::InsufficientParticipants { actual: 0, .. }));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_duplicate_seed_is_rejected() {
        let mut participants = field(4);
        participants[3].seed = 2;
        let err = generate_bracket(
            Uuid::new_v4(),
            TournamentFormat::SingleElimination,
            &participants,
            &GenerateOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BracketError::DuplicateSeed { seed: 2, .. }));
    }

    #[test]
    fn test_duplicate_participant_is_rejected() {
        let mut participants = field(3);
        participants[2].id = participants[0].id;
        let err = generate_bracket(
            Uuid::new_v4(),
            TournamentFormat::DoubleElimination,
            &participants,
            &GenerateOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BracketError::DuplicateParticipant { .. }));
    }

    #[test]
    fn test_invalid_participant_is_rejected() {
        let mut participants = field(3);
        participants[1].seed = 0;
        let err = generate_bracket(
            Uuid::new_v4(),
            TournamentFormat::SingleElimination,
            &participants,
            &GenerateOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_single_participant_has_no_matches() {
        let participants = field(1);
        let bracket = generate_bracket(
            Uuid::new_v4(),
            TournamentFormat::SingleElimination,
            &participants,
            &GenerateOptions::default(),
        )
        .unwrap();
        assert!(bracket.matches.is_empty());
        assert_eq!(bracket.bracket_size, 1);
        assert_eq!(bracket.champion(), Some(participants[0].id));
    }

    #[test]
    fn test_match_numbers_follow_offset() {
        let options = GenerateOptions {
            match_number_offset: 1000,
            ..GenerateOptions::default()
        };
        let bracket = generate_bracket(
            Uuid::new_v4(),
            TournamentFormat::SingleElimination,
            &field(4),
            &options,
        )
        .unwrap();
        let numbers: Vec<i32> = bracket.matches.iter().map(|m| m.match_number).collect();
        assert_eq!(numbers, vec![1000, 1001, 1002]);
    }

    #[test]
    fn test_offset_near_max_is_rejected_not_overflowed() {
        for format in [TournamentFormat::SingleElimination, TournamentFormat::DoubleElimination] {
            let options = GenerateOptions {
                match_number_offset: i32::MAX - 1,
                grand_final_reset: true,
            };
            let err = generate_bracket(Uuid::new_v4(), format, &field(4), &options).unwrap_err();
            assert_eq!(err, BracketError::MatchNumbersExhausted { start: i32::MAX - 1 });
            assert_eq!(err.kind(), ErrorKind::Configuration);
        }
    }

    #[test]
    fn test_last_number_fits_at_max() {
        let mut sequence = MatchSequence::starting_at(i32::MAX);
        assert_eq!(sequence.allocate(), Ok(i32::MAX));
        assert!(sequence.allocate().is_err());

        let options = GenerateOptions {
            match_number_offset: i32::MAX,
            ..GenerateOptions::default()
        };
        let bracket = generate_bracket(
            Uuid::new_v4(),
            TournamentFormat::SingleElimination,
            &field(2),
            &options,
        )
        .unwrap();
        assert_eq!(bracket.matches[0].match_number, i32::MAX);
    }

    #[test]
    fn test_non_positive_offset_is_rejected() {
        for offset in [0, -5] {
            let options = GenerateOptions {
                match_number_offset: offset,
                ..GenerateOptions::default()
            };
            let err = generate_bracket(
                Uuid::new_v4(),
                TournamentFormat::SingleElimination,
                &field(4),
                &options,
            )
            .unwrap_err();
            assert_eq!(err, BracketError::InvalidMatchNumberOffset { offset });
            assert_eq!(err.kind(), ErrorKind::Configuration);
        }
    }
}
