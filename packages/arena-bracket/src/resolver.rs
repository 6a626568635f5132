use cosmwasm_schema::cw_serde;

use crate::{
    error::BracketError,
    models::{Match, Slot, Team},
};

/// How a caller designates the winner of a match
#[cw_serde]
pub enum WinnerSpec {
    /// The winning side
    Team { team: Team },
    /// The id of the winning side's primary player
    Player { winner_id: String },
}

/// The canonical identity of a match winner
#[cw_serde]
pub struct WinnerIdentity {
    pub team: Team,
    pub primary: Slot,
    /// Always set for doubles and mixed
    pub partner: Option<Slot>,
    /// "Primary" or "Primary / Partner"
    pub name: String,
}

impl WinnerIdentity {
    pub fn primary_id(&self) -> Option<String> {
        self.primary.id.clone()
    }

    /// Registered ids on the winning side, guests are skipped
    pub fn ids(&self) -> Vec<String> {
        self.primary
            .id
            .iter()
            .chain(self.partner.as_ref().and_then(|x| x.id.as_ref()))
            .cloned()
            .collect()
    }

    /// Whether the given slots already hold this identity
    pub fn occupies(&self, primary: &Slot, partner: Option<&Slot>) -> bool {
        if !primary.is_resolved() || !primary.same_occupant(&self.primary) {
            return false;
        }

        match (&self.partner, partner) {
            (None, _) => true,
            (Some(expected), Some(actual)) => actual.same_occupant(expected),
            (Some(_), None) => false,
        }
    }

    /// The slots to write into the next round
    pub fn slots(&self) -> (Slot, Option<Slot>) {
        let clear = |slot: &Slot| Slot {
            is_bye: false,
            ..slot.clone()
        };

        (clear(&self.primary), self.partner.as_ref().map(clear))
    }
}

pub fn resolve_winner(match_: &Match, spec: &WinnerSpec) -> Result<WinnerIdentity, BracketError> {
    let team = match spec {
        WinnerSpec::Team { team } => *team,
        WinnerSpec::Player { winner_id } => {
            if match_.player1.id.as_deref() == Some(winner_id.as_str()) {
                Team::Team1
            } else if match_.player2.id.as_deref() == Some(winner_id.as_str()) {
                Team::Team2
            } else {
                return Err(BracketError::WinnerNotInMatch {
                    winner_id: winner_id.clone(),
                    match_number: match_.match_number,
                });
            }
        }
    };

    resolve_side(match_, team)
}

/// Builds the identity of one side of a match
pub fn resolve_side(match_: &Match, team: Team) -> Result<WinnerIdentity, BracketError> {
    let primary = match_.primary(team);
    if !primary.is_resolved() {
        return Err(BracketError::UnresolvedSide {
            team,
            match_number: match_.match_number,
        });
    }

    if !match_.category.is_team() {
        return Ok(WinnerIdentity {
            team,
            primary: primary.clone(),
            partner: None,
            name: primary.name.clone(),
        });
    }

    let partner = match_
        .partner(team)
        .filter(|x| x.is_resolved())
        .ok_or(BracketError::MissingPartner {
            team,
            match_number: match_.match_number,
        })?;

    Ok(WinnerIdentity {
        team,
        primary: primary.clone(),
        partner: Some(partner.clone()),
        name: format!("{} / {}", primary.name, partner.name),
    })
}

/// Rebuilds the winner of a finished match from its slots and checks it against the
/// recorded winner. Fails when the slots were rewritten after the result was entered.
pub fn recorded_winner(match_: &Match, team: Team) -> Result<WinnerIdentity, BracketError> {
    let winner = resolve_side(match_, team)?;

    if match_.winner_id != winner.primary_id()
        || match_.winner_name.as_deref() != Some(winner.name.as_str())
    {
        return Err(BracketError::WinnerMismatch {
            match_number: match_.match_number,
            team,
            recorded: match_.winner_name.clone().unwrap_or_default(),
            found: winner.name,
        });
    }

    Ok(winner)
}
