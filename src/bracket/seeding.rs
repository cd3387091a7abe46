use tracing::debug;

use super::error::BracketError;
use crate::models::Participant;

/// A seeded bracket position; `None` is a bye.
pub type BracketSlot = Option<Participant>;

/// Smallest power of two that can hold `participants` entrants.
pub fn bracket_size(participants: usize) -> usize {
    participants.max(1).next_power_of_two()
}

pub fn bye_count(participants: usize) -> usize {
    bracket_size(participants) - participants
}

/// Lay participants onto `size` slots.
///
/// Byes go to the even slots 0, 2, 4, ... and are handed to the strongest
/// seeds; the remaining participants fill the rest of the array in seed
/// order. A full field (no byes) uses the protected layout instead so the
/// top two seeds sit in opposite halves.
pub fn assign_slots(
    participants: &[Participant],
    size: usize,
) -> Result<Vec<BracketSlot>, BracketError> {
    let count = participants.len();
    if count == 0 {
        return Ok(Vec::new());
    }
    if size == 0 || !size.is_power_of_two() || size < count {
        return Err(BracketError::InvalidBracketSize {
            size,
            participants: count,
        });
    }

    let mut sorted = participants.to_vec();
    sorted.sort_by_key(|p| p.seed);

    let mut slots: Vec<BracketSlot> = vec![None; size];
    if count <= 2 {
        for (slot, participant) in sorted.into_iter().enumerate() {
            slots[slot] = Some(participant);
        }
        return Ok(slots);
    }

    let byes = size - count;
    if byes == 0 {
        let mut by_rank: Vec<BracketSlot> = sorted.into_iter().map(Some).collect();
        for (slot, rank) in protected_order(size).into_iter().enumerate() {
            slots[slot] = by_rank[rank - 1].take();
        }
        return Ok(slots);
    }

    let mut queue = sorted.into_iter();
    for bye in 0..byes {
        slots[bye * 2] = queue.next();
    }
    // slots 1, 3, .. 2*byes-1 stay empty as the bye partners
    for slot in slots.iter_mut().skip(byes * 2) {
        *slot = queue.next();
    }

    debug!(size, byes, participants = count, "assigned bracket slots");
    Ok(slots)
}

/// Seed ranks in slot order for a full bracket: 1 v size, folded recursively.
fn protected_order(size: usize) -> Vec<usize> {
    let mut ranks = vec![1usize];
    while ranks.len() < size {
        let width = ranks.len() * 2 + 1;
        ranks = ranks.iter().flat_map(|&rank| [rank, width - rank]).collect();
    }
    ranks
}
