use crate::{
    error::BracketError,
    models::{Match, Team},
};

/// Where a completed match sends its winner
#[derive(Debug, Clone, PartialEq)]
pub struct NextSlot<'a> {
    pub next_match: &'a Match,
    pub team: Team,
    /// Zero-based position of `next_match` within its round
    pub position: usize,
}

/// The match at zero-based `position` feeds `position / 2` of the next round,
/// filling side one from even positions and side two from odd ones.
pub fn feeder_target(position: usize) -> (usize, Team) {
    let team = if position % 2 == 0 {
        Team::Team1
    } else {
        Team::Team2
    };

    (position / 2, team)
}

pub fn next_round_number(round_number: u32) -> Result<u32, BracketError> {
    round_number
        .checked_add(1)
        .ok_or(BracketError::RoundOverflow { round_number })
}

/// Checks that a round is listed as matches `1..=N` in ascending order.
pub fn ensure_contiguous(round_number: u32, matches: &[Match]) -> Result<(), BracketError> {
    for (expected, match_) in (1u32..).zip(matches) {
        if match_.match_number != expected {
            return Err(BracketError::NonContiguousRound {
                round_number,
                expected,
                found: match_.match_number,
            });
        }
    }

    Ok(())
}

/// Finds the next-round slot for `completed`.
///
/// `round` and `next_round` must be sorted ascending by match number. Returns `None`
/// when the completed match is in a terminal round or there is no next round.
pub fn locate_next_slot<'a, S: AsRef<str>>(
    completed: &Match,
    round: &[Match],
    next_round: &'a [Match],
    terminal_rounds: &[S],
) -> Result<Option<NextSlot<'a>>, BracketError> {
    if completed.is_terminal(terminal_rounds) {
        return Ok(None);
    }

    let next_round_number = next_round_number(completed.round_number)?;
    ensure_contiguous(completed.round_number, round)?;

    let position = round
        .iter()
        .position(|x| x.id == completed.id)
        .ok_or(BracketError::MatchNotInRound {
            round_number: completed.round_number,
            match_number: completed.match_number,
        })?;

    if next_round.is_empty() {
        return Ok(None);
    }

    ensure_contiguous(next_round_number, next_round)?;

    let (next_position, team) = feeder_target(position);
    let next_match = next_round
        .get(next_position)
        .ok_or(BracketError::NextMatchNotFound {
            round_number: next_round_number,
            position: next_position,
        })?;

    Ok(Some(NextSlot {
        next_match,
        team,
        position: next_position,
    }))
}
