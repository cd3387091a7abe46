use tracing::debug;

use super::{Bracket, BracketError, Feeder, MatchSequence};
use crate::models::{BracketType, MatchSlot, MatchStatus, SlotRef};

/// Build the losers bracket on top of an existing winners bracket.
///
/// The bracket is a sequence of two kinds of rounds over an ordered
/// survivor population:
///
/// * reduction rounds pair survivors two at a time; an odd survivor out
///   (always the last one, so a held bye recipient when there is one) is
///   carried into the next round untouched;
/// * merge rounds pair survivor `i` with the `i`-th loser freshly dropped
///   from the matching winners round; extra drops pair among themselves.
///
/// Losers round 1 is a reduction of the winners-round-1 drops. Every later
/// winners round first reduces the survivors until they no longer outnumber
/// its drops and then merges them in. Rounds without any match are not
/// emitted. Returns the feeder for the losers champion.
pub fn build_losers_bracket(
    bracket: &mut Bracket,
    sequence: &mut MatchSequence,
) -> Result<Feeder, BracketError> {
    let winners_rounds = bracket.winners_rounds.len();
    if winners_rounds < 2 {
        return Err(BracketError::InsufficientWinnersRounds {
            tournament_id: bracket.tournament_id,
            rounds: winners_rounds,
        });
    }

    let drops = dropped_losers(bracket, 0);
    let mut survivors = reduce(bracket, sequence, drops)?;

    for round in 1..winners_rounds {
        let drops = dropped_losers(bracket, round);
        while survivors.len() > drops.len().max(1) {
            survivors = reduce(bracket, sequence, survivors)?;
        }
        survivors = merge(bracket, sequence, survivors, drops)?;
    }

    debug!(
        tournament_id = %bracket.tournament_id,
        rounds = bracket.losers_rounds.len(),
        "losers bracket built"
    );

    match survivors.as_slice() {
        [champion] => Ok(*champion),
        _ => Err(BracketError::InsufficientWinnersRounds {
            tournament_id: bracket.tournament_id,
            rounds: winners_rounds,
        }),
    }
}

/// Losers of winners round `round` (0-based) in match order. Byes drop nobody.
fn dropped_losers(bracket: &Bracket, round: usize) -> Vec<Feeder> {
    bracket.winners_rounds[round]
        .iter()
        .filter_map(|&number| bracket.get(number))
        .filter(|m| !m.is_bye && m.status != MatchStatus::Skipped)
        .map(|m| Feeder::Loser(m.match_number))
        .collect()
}

fn reduce(
    bracket: &mut Bracket,
    sequence: &mut MatchSequence,
    population: Vec<Feeder>,
) -> Result<Vec<Feeder>, BracketError> {
    if population.len() < 2 {
        return Ok(population);
    }

    let mut pairs = Vec::with_capacity(population.len() / 2);
    let mut held = None;
    let mut feeders = population.into_iter();
    while let Some(first) = feeders.next() {
        match feeders.next() {
            Some(second) => pairs.push((first, second)),
            None => held = Some(first),
        }
    }

    let mut next = emit_round(bracket, sequence, pairs)?;
    next.extend(held);
    Ok(next)
}

fn merge(
    bracket: &mut Bracket,
    sequence: &mut MatchSequence,
    survivors: Vec<Feeder>,
    drops: Vec<Feeder>,
) -> Result<Vec<Feeder>, BracketError> {
    let matched = survivors.len().min(drops.len());
    let mut pairs: Vec<(Feeder, Feeder)> = survivors
        .iter()
        .copied()
        .zip(drops.iter().copied())
        .collect();

    let mut leftovers = survivors[matched..]
        .iter()
        .chain(drops[matched..].iter())
        .copied();
    let mut held = None;
    while let Some(first) = leftovers.next() {
        match leftovers.next() {
            Some(second) => pairs.push((first, second)),
            None => held = Some(first),
        }
    }

    let mut next = emit_round(bracket, sequence, pairs)?;
    next.extend(held);
    Ok(next)
}

/// Create one losers round from `pairs`, wiring each feeder into its slot.
/// Returns the winners of the new matches in match order.
fn emit_round(
    bracket: &mut Bracket,
    sequence: &mut MatchSequence,
    pairs: Vec<(Feeder, Feeder)>,
) -> Result<Vec<Feeder>, BracketError> {
    if pairs.is_empty() {
        return Ok(Vec::new());
    }

    let round_number = bracket.losers_rounds.len() as i32 + 1;
    let mut numbers = Vec::with_capacity(pairs.len());
    for (first, second) in pairs {
        let number = bracket.push_match(BracketType::Losers, round_number, sequence)?;
        bracket.wire(first, SlotRef::new(number, MatchSlot::First))?;
        bracket.wire(second, SlotRef::new(number, MatchSlot::Second))?;
        numbers.push(number);
    }

    let winners = numbers.iter().map(|&n| Feeder::Winner(n)).collect();
    bracket.losers_rounds.push(numbers);
    Ok(winners)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::seeding::{assign_slots, bracket_size};
    use crate::bracket::single_elimination::build_winners_bracket;
    use crate::models::{Participant, TournamentFormat};
    use uuid::Uuid;

    fn winners_only(count: i32) -> (Bracket, MatchSequence) {
        let participants: Vec<Participant> = (1..=count)
            .map(|seed| Participant::new(Uuid::new_v4(), format!("p{seed}"), seed))
            .collect();
        let mut bracket = Bracket::new(
            Uuid::new_v4(),
            TournamentFormat::DoubleElimination,
            &participants,
        );
        let slots = assign_slots(&participants, bracket_size(participants.len())).unwrap();
        let mut sequence = MatchSequence::starting_at(1);
        build_winners_bracket(&mut bracket, &slots, &mut sequence).unwrap();
        (bracket, sequence)
    }

    fn shape(bracket: &Bracket) -> Vec<usize> {
        bracket.losers_rounds.iter().map(Vec::len).collect()
    }

    #[test]
    fn test_rejects_single_winners_round() {
        let (mut bracket, mut sequence) = winners_only(2);
        let err = build_losers_bracket(&mut bracket, &mut sequence).unwrap_err();
        assert!(matches!(
            err,
            BracketError::InsufficientWinnersRounds { rounds: 1, .. }
        ));
        assert!(bracket.losers_rounds.is_empty());
    }

    #[test]
    fn test_four_participants() {
        let (mut bracket, mut sequence) = winners_only(4);
        let champion = build_losers_bracket(&mut bracket, &mut sequence).unwrap();
        assert_eq!(shape(&bracket), vec![1, 1]);

        let w1 = &bracket.winners_rounds[0];
        let winners_final = bracket.winners_rounds[1][0];
        let l1 = bracket.losers_rounds[0][0];
        let l2 = bracket.losers_rounds[1][0];

        assert_eq!(
            bracket.get(w1[0]).unwrap().loser_next,
            Some(SlotRef::new(l1, MatchSlot::First))
        );
        assert_eq!(
            bracket.get(w1[1]).unwrap().loser_next,
            Some(SlotRef::new(l1, MatchSlot::Second))
        );
        assert_eq!(
            bracket.get(l1).unwrap().winner_next,
            Some(SlotRef::new(l2, MatchSlot::First))
        );
        assert_eq!(
            bracket.get(winners_final).unwrap().loser_next,
            Some(SlotRef::new(l2, MatchSlot::Second))
        );
        assert_eq!(champion, Feeder::Winner(l2));
    }

    #[test]
    fn test_full_eight_field_alternates_rounds() {
        let (mut bracket, mut sequence) = winners_only(8);
        build_losers_bracket(&mut bracket, &mut sequence).unwrap();
        assert_eq!(shape(&bracket), vec![2, 2, 1, 1]);

        // merge rounds put survivors first and fresh drops second
        let merge_round = &bracket.losers_rounds[1];
        for (position, &number) in merge_round.iter().enumerate() {
            let dropped_from = bracket.winners_rounds[1][position];
            assert_eq!(
                bracket.get(dropped_from).unwrap().loser_next,
                Some(SlotRef::new(number, MatchSlot::Second))
            );
        }
    }

    #[test]
    fn test_five_participants_with_byes() {
        let (mut bracket, mut sequence) = winners_only(5);
        let champion = build_losers_bracket(&mut bracket, &mut sequence).unwrap();
        // one round-one drop waits for round two: 1 + 1 + 1 matches
        assert_eq!(shape(&bracket), vec![1, 1, 1]);

        let first_drop = bracket.winners_rounds[0][3];
        let l1 = bracket.losers_rounds[0][0];
        assert_eq!(
            bracket.get(first_drop).unwrap().loser_next,
            Some(SlotRef::new(l1, MatchSlot::First))
        );
        let second_round = &bracket.winners_rounds[1];
        assert_eq!(
            bracket.get(second_round[0]).unwrap().loser_next,
            Some(SlotRef::new(l1, MatchSlot::Second))
        );

        // the unmatched round-two drop carries its bye into losers round 2
        let l2 = bracket.losers_rounds[1][0];
        assert_eq!(
            bracket.get(second_round[1]).unwrap().loser_next,
            Some(SlotRef::new(l2, MatchSlot::Second))
        );
        assert_eq!(
            bracket.get(l1).unwrap().winner_next,
            Some(SlotRef::new(l2, MatchSlot::First))
        );
        assert_eq!(champion, Feeder::Winner(bracket.losers_rounds[2][0]));
    }

    #[test]
    fn test_bye_matches_drop_nobody() {
        let (mut bracket, mut sequence) = winners_only(5);
        build_losers_bracket(&mut bracket, &mut sequence).unwrap();
        for &number in &bracket.winners_rounds[0] {
            let m = bracket.get(number).unwrap();
            assert_eq!(m.is_bye, m.loser_next.is_none());
        }
    }

    #[test]
    fn test_every_entrant_is_wired_exactly_once() {
        for count in 3..=40 {
            let (mut bracket, mut sequence) = winners_only(count);
            let champion = build_losers_bracket(&mut bracket, &mut sequence).unwrap();

            let losers_matches: usize = bracket.losers_rounds.iter().map(Vec::len).sum();
            // every losers match eliminates one of the count - 1 entrants except the champion
            assert_eq!(losers_matches, count as usize - 2, "field of {count}");

            for round in &bracket.losers_rounds {
                for &number in round {
                    let target = bracket.get(number).unwrap();
                    let feeders = bracket
                        .matches
                        .iter()
                        .filter(|m| {
                            m.winner_next.map(|t| t.match_number) == Some(number)
                                || m.loser_next.map(|t| t.match_number) == Some(number)
                        })
                        .count();
                    assert_eq!(feeders, 2, "losers match {number} of field {count}");
                    assert_eq!(target.status, MatchStatus::Pending);
                }
            }

            let champion_match = bracket.get(champion.match_number()).unwrap();
            assert!(champion_match.winner_next.is_none());
        }
    }
}
