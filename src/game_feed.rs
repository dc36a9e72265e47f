use serde_json::Value;

use crate::error::IntegrityError;
use crate::model::{Player, Position, ShotEvent, Team, TeamPair, Venue};

pub const SHOT_EVENTS: [&str; 4] = ["Blocked Shot", "Goal", "Missed Shot", "Shot"];
pub const FINAL_STATE: &str = "Final";

#[derive(Debug, Clone)]
pub struct GameFeed {
    pub status: Option<String>,
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
    pub shots: Vec<ShotEvent>,
}

impl GameFeed {
    pub fn team_pair(&self) -> Result<TeamPair, IntegrityError> {
        let find = |venue: Venue, field: &'static str| {
            self.teams
                .iter()
                .find(|t| t.venue == venue)
                .map(|t| t.team_id)
                .ok_or(IntegrityError::MissingField { field })
        };
        Ok(TeamPair {
            home: find(Venue::Home, "gameData.teams.home")?,
            away: find(Venue::Away, "gameData.teams.away")?,
        })
    }

    pub fn is_final(&self) -> bool {
        self.status.as_deref() == Some(FINAL_STATE)
    }
}

/// Converts a period clock "MM:SS" to seconds. Anything that is not exactly
/// five characters is rejected.
pub fn to_seconds(raw: &str) -> Result<u32, IntegrityError> {
    let malformed = || IntegrityError::MalformedClock {
        raw: raw.to_string(),
    };
    if raw.len() != 5 {
        return Err(malformed());
    }
    let (minutes, seconds) = raw.split_once(':').ok_or_else(malformed)?;
    let minutes = minutes.parse::<u32>().map_err(|_| malformed())?;
    let seconds = seconds.parse::<u32>().map_err(|_| malformed())?;
    Ok(minutes * 60 + seconds)
}

pub fn game_status(game: &Value) -> Option<&str> {
    game.get("gameData")
        .and_then(|d| d.get("status"))
        .and_then(|s| s.get("abstractGameState"))
        .and_then(|s| s.as_str())
}

pub fn parse_game(game: &Value) -> Result<GameFeed, IntegrityError> {
    let data = game
        .get("gameData")
        .ok_or(IntegrityError::MissingField { field: "gameData" })?;

    let mut teams = Vec::with_capacity(2);
    for (venue, key, field) in [
        (Venue::Home, "home", "gameData.teams.home"),
        (Venue::Away, "away", "gameData.teams.away"),
    ] {
        let team = data
            .get("teams")
            .and_then(|t| t.get(key))
            .ok_or(IntegrityError::MissingField { field })?;
        teams.push(Team {
            team_id: team
                .get("id")
                .and_then(as_u32)
                .ok_or(IntegrityError::MissingField { field: "team.id" })?,
            venue,
            name: str_field(team, "name").unwrap_or_default(),
        });
    }

    let mut players = Vec::new();
    if let Some(map) = data.get("players").and_then(|p| p.as_object()) {
        for player in map.values() {
            players.push(parse_player(player)?);
        }
    }

    let plays = game
        .get("liveData")
        .and_then(|l| l.get("plays"))
        .and_then(|p| p.get("allPlays"))
        .and_then(|a| a.as_array())
        .ok_or(IntegrityError::MissingField {
            field: "liveData.plays.allPlays",
        })?;
    let mut shots = Vec::new();
    for play in plays {
        if let Some(shot) = parse_shot(play)? {
            shots.push(shot);
        }
    }

    Ok(GameFeed {
        status: game_status(game).map(|s| s.to_string()),
        teams,
        players,
        shots,
    })
}

fn parse_player(v: &Value) -> Result<Player, IntegrityError> {
    let player_id = v
        .get("id")
        .and_then(id_string)
        .ok_or(IntegrityError::MissingField { field: "player.id" })?;
    Ok(Player {
        player_id,
        first_name: str_field(v, "firstName").unwrap_or_default(),
        last_name: str_field(v, "lastName").unwrap_or_default(),
        handedness: str_field(v, "shootsCatches"),
        position: v
            .get("primaryPosition")
            .and_then(|p| p.get("name"))
            .and_then(|n| n.as_str())
            .map(Position::from_feed_name)
            .unwrap_or(Position::Unknown),
    })
}

fn parse_shot(play: &Value) -> Result<Option<ShotEvent>, IntegrityError> {
    let Some(result) = play.get("result") else {
        return Ok(None);
    };
    let Some(kind) = result.get("event").and_then(|e| e.as_str()) else {
        return Ok(None);
    };
    if !SHOT_EVENTS.contains(&kind) {
        return Ok(None);
    }
    let goal = kind == "Goal";

    let about = play
        .get("about")
        .ok_or(IntegrityError::MissingField { field: "play.about" })?;
    let clock = about
        .get("periodTime")
        .and_then(|t| t.as_str())
        .ok_or(IntegrityError::MissingField {
            field: "about.periodTime",
        })?;

    // The goal scorer is the shooter of record for goals.
    let shooter_role = if goal { "Scorer" } else { "Shooter" };
    let player_id = play
        .get("players")
        .and_then(|p| p.as_array())
        .and_then(|players| {
            players.iter().find(|p| {
                p.get("playerType").and_then(|t| t.as_str()) == Some(shooter_role)
            })
        })
        .and_then(|p| p.get("player"))
        .and_then(|p| p.get("id"))
        .and_then(id_string);

    Ok(Some(ShotEvent {
        event_id: about
            .get("eventId")
            .and_then(|v| v.as_u64())
            .ok_or(IntegrityError::MissingField {
                field: "about.eventId",
            })?,
        period: about
            .get("period")
            .and_then(as_u32)
            .ok_or(IntegrityError::MissingField {
                field: "about.period",
            })?,
        time: to_seconds(clock)?,
        team_id: play
            .get("team")
            .and_then(|t| t.get("id"))
            .and_then(as_u32)
            .ok_or(IntegrityError::MissingField { field: "team.id" })?,
        player_id,
        kind: kind.to_string(),
        secondary_type: str_field(result, "secondaryType").unwrap_or_default(),
        goal,
    }))
}

fn str_field(v: &Value, key: &str) -> Option<String> {
    v.get(key).and_then(|x| x.as_str()).map(|s| s.to_string())
}

fn as_u32(v: &Value) -> Option<u32> {
    if let Some(n) = v.as_u64() {
        return u32::try_from(n).ok();
    }
    v.as_str()?.trim().parse::<u32>().ok()
}

pub(crate) fn id_string(v: &Value) -> Option<String> {
    if let Some(n) = v.as_u64() {
        return Some(n.to_string());
    }
    v.as_str().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
