use tracing::debug;

use super::losers_bracket::build_losers_bracket;
use super::seeding::BracketSlot;
use super::single_elimination::build_winners_bracket;
use super::{Bracket, BracketError, Feeder, MatchSequence};
use crate::models::{BracketType, MatchSlot, SlotRef};

/// Winners bracket, losers bracket, then the grand final.
///
/// The winners champion takes the first grand-final slot and the losers
/// champion the second. With `grand_final_reset` a second final is wired
/// from both outcomes of the first; it only gets played when the losers
/// champion wins the first one.
pub fn build_double_elimination(
    bracket: &mut Bracket,
    slots: &[BracketSlot],
    sequence: &mut MatchSequence,
    grand_final_reset: bool,
) -> Result<(), BracketError> {
    build_winners_bracket(bracket, slots, sequence)?;
    let losers_champion = build_losers_bracket(bracket, sequence)?;

    let winners_final = bracket
        .winners_rounds
        .last()
        .and_then(|round| round.first())
        .copied()
        .ok_or(BracketError::InsufficientWinnersRounds {
            tournament_id: bracket.tournament_id,
            rounds: 0,
        })?;

    let first_final = bracket.push_match(BracketType::GrandFinal, 1, sequence)?;
    bracket.wire(
        Feeder::Winner(winners_final),
        SlotRef::new(first_final, MatchSlot::First),
    )?;
    bracket.wire(losers_champion, SlotRef::new(first_final, MatchSlot::Second))?;
    bracket.grand_final.push(first_final);

    if grand_final_reset {
        let reset = bracket.push_match(BracketType::GrandFinal, 2, sequence)?;
        bracket.wire(Feeder::Winner(first_final), SlotRef::new(reset, MatchSlot::First))?;
        bracket.wire(Feeder::Loser(first_final), SlotRef::new(reset, MatchSlot::Second))?;
        bracket.grand_final.push(reset);
    }

    debug!(
        tournament_id = %bracket.tournament_id,
        grand_finals = bracket.grand_final.len(),
        "double elimination bracket built"
    );
    Ok(())
}
