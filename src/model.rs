use serde::{Deserialize, Serialize};

pub type PlayerId = String;
pub type TeamId = u32;

/// Width of the per-side skater slot table used for grouping and export.
/// Anything past the sixth skater overflows and is not part of a lineup key.
pub const SKATER_SLOTS: usize = 6;

/// Skaters per side in a full-strength lineup.
pub const FULL_STRENGTH_SKATERS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    Home,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Goalie,
    Center,
    LeftWing,
    RightWing,
    Defenseman,
    Unknown,
}

impl Position {
    pub fn from_feed_name(raw: &str) -> Self {
        match raw.trim() {
            "Goalie" => Position::Goalie,
            "Center" => Position::Center,
            "Left Wing" => Position::LeftWing,
            "Right Wing" => Position::RightWing,
            "Defenseman" => Position::Defenseman,
            _ => Position::Unknown,
        }
    }

    pub fn is_goalie(self) -> bool {
        self == Position::Goalie
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub team_id: TeamId,
    pub venue: Venue,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: PlayerId,
    pub first_name: String,
    pub last_name: String,
    pub handedness: Option<String>,
    pub position: Position,
}

impl Player {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotEvent {
    pub event_id: u64,
    pub period: u32,
    pub time: u32,
    pub team_id: TeamId,
    pub player_id: Option<PlayerId>,
    pub kind: String,
    pub secondary_type: String,
    pub goal: bool,
}

/// One player's continuous stay on the ice, in period-relative seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRecord {
    pub player_id: PlayerId,
    pub team_id: TeamId,
    pub period: u32,
    pub start_time: u32,
    pub end_time: u32,
    pub position: Position,
}

impl ShiftRecord {
    pub fn duration(&self) -> u32 {
        self.end_time - self.start_time
    }

    pub fn is_active_at(&self, t: u32) -> bool {
        self.start_time <= t && t < self.end_time
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TeamPair {
    pub home: TeamId,
    pub away: TeamId,
}

impl TeamPair {
    pub fn venue_of(&self, team_id: TeamId) -> Option<Venue> {
        if team_id == self.home {
            Some(Venue::Home)
        } else if team_id == self.away {
            Some(Venue::Away)
        } else {
            None
        }
    }
}

/// One side of a lineup snapshot: at most one goalie and the skaters sorted
/// ascending by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SideRoster {
    pub goalie: Option<PlayerId>,
    pub skaters: Vec<PlayerId>,
}

impl SideRoster {
    pub fn skater(&self, slot: usize) -> Option<&PlayerId> {
        self.skaters.get(slot)
    }

    /// Skater slots as a fixed-width table; overflow past [`SKATER_SLOTS`] is dropped.
    pub fn slots(&self) -> [Option<PlayerId>; SKATER_SLOTS] {
        std::array::from_fn(|i| self.skater(i).cloned())
    }

    pub fn is_full_strength(&self) -> bool {
        self.goalie.is_some() && self.skaters.len() == FULL_STRENGTH_SKATERS
    }
}

/// A maximal interval of a period with a constant on-ice lineup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupState {
    pub period: u32,
    pub start_time: u32,
    pub end_time: u32,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub home: SideRoster,
    pub away: SideRoster,
}

impl LineupState {
    pub fn duration(&self) -> u32 {
        self.end_time - self.start_time
    }

    pub fn side(&self, venue: Venue) -> &SideRoster {
        match venue {
            Venue::Home => &self.home,
            Venue::Away => &self.away,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCounts {
    pub home_shots: u32,
    pub home_goals: u32,
    pub away_shots: u32,
    pub away_goals: u32,
}

impl EventCounts {
    pub fn record(&mut self, venue: Venue, goal: bool) {
        let goal = u32::from(goal);
        match venue {
            Venue::Home => {
                self.home_shots += 1;
                self.home_goals += goal;
            }
            Venue::Away => {
                self.away_shots += 1;
                self.away_goals += goal;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributedLineupState {
    pub state: LineupState,
    pub counts: EventCounts,
}
