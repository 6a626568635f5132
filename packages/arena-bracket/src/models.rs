use std::fmt;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Timestamp, Uint128};

/// Name carried by a slot that has not received a player yet
pub const TBD: &str = "TBD";

/// Round labels that never feed another round
pub const DEFAULT_TERMINAL_ROUNDS: [&str; 2] = ["Final", "Group Stage"];

#[cw_serde]
#[derive(Copy, Eq)]
pub enum Category {
    Singles,
    Doubles,
    Mixed,
}

impl Category {
    /// Doubles and mixed sides are a primary player plus a partner
    pub fn is_team(&self) -> bool {
        matches!(self, Category::Doubles | Category::Mixed)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Singles => write!(f, "singles"),
            Category::Doubles => write!(f, "doubles"),
            Category::Mixed => write!(f, "mixed"),
        }
    }
}

#[cw_serde]
#[derive(Copy, Eq)]
pub enum MatchStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    Walkover,
}

impl MatchStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Walkover)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Scheduled => write!(f, "scheduled"),
            MatchStatus::InProgress => write!(f, "in_progress"),
            MatchStatus::Completed => write!(f, "completed"),
            MatchStatus::Cancelled => write!(f, "cancelled"),
            MatchStatus::Walkover => write!(f, "walkover"),
        }
    }
}

/// A side of a match. `Team1` is player1 (+ player3), `Team2` is player2 (+ player4).
#[cw_serde]
#[derive(Copy, Eq)]
pub enum Team {
    Team1,
    Team2,
}

impl Team {
    pub fn opponent(&self) -> Team {
        match self {
            Team::Team1 => Team::Team2,
            Team::Team2 => Team::Team1,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Team1 => write!(f, "team1"),
            Team::Team2 => write!(f, "team2"),
        }
    }
}

#[cw_serde]
#[derive(Copy, Eq)]
pub enum CompletionType {
    Normal,
    Walkover,
    Forfeit,
    Disqualification,
    Manual,
    Retired,
}

impl fmt::Display for CompletionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionType::Normal => write!(f, "normal"),
            CompletionType::Walkover => write!(f, "walkover"),
            CompletionType::Forfeit => write!(f, "forfeit"),
            CompletionType::Disqualification => write!(f, "disqualification"),
            CompletionType::Manual => write!(f, "manual"),
            CompletionType::Retired => write!(f, "retired"),
        }
    }
}

/// A player position on a match
#[cw_serde]
#[derive(Eq)]
pub struct Slot {
    /// Registered player id, `None` for guests and empty slots
    pub id: Option<String>,
    pub name: String,
    /// Stamped by bracket generation when no feeder can ever fill this slot
    #[serde(default)]
    pub is_bye: bool,
}

impl Slot {
    pub fn tbd() -> Self {
        Slot {
            id: None,
            name: TBD.to_string(),
            is_bye: false,
        }
    }

    /// Byes keep the `TBD` name so readers unaware of the flag still see an empty slot
    pub fn bye() -> Self {
        Slot {
            id: None,
            name: TBD.to_string(),
            is_bye: true,
        }
    }

    pub fn player(id: impl Into<String>, name: impl Into<String>) -> Self {
        Slot {
            id: Some(id.into()),
            name: name.into(),
            is_bye: false,
        }
    }

    pub fn guest(name: impl Into<String>) -> Self {
        Slot {
            id: None,
            name: name.into(),
            is_bye: false,
        }
    }

    pub fn is_tbd(&self) -> bool {
        self.name == TBD
    }

    pub fn is_resolved(&self) -> bool {
        !self.is_bye && !self.is_tbd()
    }

    /// Same occupant, ignoring the bye marker
    pub fn same_occupant(&self, other: &Slot) -> bool {
        self.name == other.name && self.id == other.id
    }
}

/// Per-game points for each side
#[cw_serde]
#[derive(Eq)]
pub struct Score {
    pub team1: Vec<u32>,
    pub team2: Vec<u32>,
}

impl Score {
    /// A full-game sweep for `winner`, used for byes
    pub fn sweep(winner: Team, games: &[u32]) -> Self {
        let blank = vec![0u32; games.len()];
        match winner {
            Team::Team1 => Score {
                team1: games.to_vec(),
                team2: blank,
            },
            Team::Team2 => Score {
                team1: blank,
                team2: games.to_vec(),
            },
        }
    }
}

#[cw_serde]
pub struct Match {
    pub id: Uint128,
    pub tournament_id: Uint128,
    pub category: Category,
    pub age_group: Option<String>,
    /// Display label, e.g. "Quarter Final"
    pub round: String,
    pub round_number: u32,
    pub match_number: u32,
    pub player1: Slot,
    pub player2: Slot,
    pub player3: Option<Slot>,
    pub player4: Option<Slot>,
    pub status: MatchStatus,
    pub winner_team: Option<Team>,
    pub winner_id: Option<String>,
    pub winner_ids: Vec<String>,
    pub winner_name: Option<String>,
    pub completion_type: Option<CompletionType>,
    pub completion_reason: Option<String>,
    pub score: Option<Score>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    /// Incremented on every write
    pub version: u64,
}

impl Match {
    /// Partition of a tournament that owns an independent bracket
    pub fn division(&self) -> String {
        division_key(self.category, self.age_group.as_deref())
    }

    pub fn is_terminal<S: AsRef<str>>(&self, terminal_rounds: &[S]) -> bool {
        let round = self.round.trim();
        terminal_rounds
            .iter()
            .any(|x| x.as_ref().trim().eq_ignore_ascii_case(round))
    }

    pub fn primary(&self, team: Team) -> &Slot {
        match team {
            Team::Team1 => &self.player1,
            Team::Team2 => &self.player2,
        }
    }

    pub fn partner(&self, team: Team) -> Option<&Slot> {
        match team {
            Team::Team1 => self.player3.as_ref(),
            Team::Team2 => self.player4.as_ref(),
        }
    }

    /// Overwrites one side. The partner is only touched for doubles and mixed.
    pub fn set_side(&mut self, team: Team, primary: Slot, partner: Option<Slot>) {
        let is_team = self.category.is_team();
        let (primary_slot, partner_slot) = match team {
            Team::Team1 => (&mut self.player1, &mut self.player3),
            Team::Team2 => (&mut self.player2, &mut self.player4),
        };
        *primary_slot = primary;
        if is_team {
            *partner_slot = partner;
        }
    }

    /// Bracket position label used in errors and events
    pub fn label(&self) -> String {
        format!(
            "{} R{} M{}",
            self.division(),
            self.round_number,
            self.match_number
        )
    }
}

pub fn division_key(category: Category, age_group: Option<&str>) -> String {
    format!("{}:{}", category, age_group.unwrap_or_default().trim())
}
