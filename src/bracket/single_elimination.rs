use tracing::{debug, warn};

use super::seeding::BracketSlot;
use super::{Bracket, BracketError, Feeder, MatchSequence};
use crate::models::{BracketType, MatchSlot, MatchStatus, SlotRef};

/// Build the winners bracket from a seeded slot array and record its rounds
/// on `bracket`. Round-one byes are settled on the spot and their winners
/// written into round two.
pub fn build_winners_bracket(
    bracket: &mut Bracket,
    slots: &[BracketSlot],
    sequence: &mut MatchSequence,
) -> Result<(), BracketError> {
    if slots.len() < 2 {
        return Ok(());
    }

    let mut rounds: Vec<Vec<i32>> = Vec::new();

    let mut first_round = Vec::with_capacity(slots.len() / 2);
    for pair in slots.chunks(2) {
        let number = bracket.push_match(BracketType::Winners, 1, sequence)?;
        let position = bracket.position(number)?;
        let m = &mut bracket.matches[position];
        m.participant1_id = pair[0].as_ref().map(|p| p.id);
        m.participant2_id = pair.get(1).and_then(|slot| slot.as_ref().map(|p| p.id));

        match (m.participant1_id, m.participant2_id) {
            (Some(_), Some(_)) => m.status = MatchStatus::Ready,
            (Some(only), None) | (None, Some(only)) => {
                m.winner_id = Some(only);
                m.status = MatchStatus::Completed;
                m.is_bye = true;
            }
            (None, None) => {
                warn!(match_number = number, "round one pairing has no participants");
                m.status = MatchStatus::Skipped;
                m.is_bye = true;
            }
        }
        first_round.push(number);
    }
    rounds.push(first_round);

    let mut round_number = 1;
    while rounds[rounds.len() - 1].len() > 1 {
        round_number += 1;
        let previous = rounds[rounds.len() - 1].clone();
        let current = (0..previous.len() / 2)
            .map(|_| bracket.push_match(BracketType::Winners, round_number, sequence))
            .collect::<Result<Vec<i32>, _>>()?;

        for (position, &source) in previous.iter().enumerate() {
            let target = SlotRef::new(current[position / 2], MatchSlot::for_position(position));
            bracket.wire(Feeder::Winner(source), target)?;
        }
        rounds.push(current);
    }

    debug!(
        tournament_id = %bracket.tournament_id,
        rounds = rounds.len(),
        "winners bracket built"
    );
    bracket.winners_rounds = rounds;
    Ok(())
}
