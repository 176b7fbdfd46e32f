use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::position::{DeclaredPosition, Position};
use crate::analysis::ranks::PlayerRank;
use crate::analysis::role_tally::RoleTally;

/// Raw per-game lane information as the upstream source reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleSignal {
    Position(String),
    RoleLane { role: String, lane: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Queue {
    RankedSolo,
    RankedFlex,
    Clash,
    NormalDraft,
    NormalBlind,
    Other,
}

impl Queue {
    // https://static.developer.riotgames.com/docs/lol/queues.json
    pub fn from_queue_id(id: i64) -> Queue {
        match id {
            420 => Queue::RankedSolo,
            440 => Queue::RankedFlex,
            700 => Queue::Clash,
            400 => Queue::NormalDraft,
            430 => Queue::NormalBlind,
            _ => Queue::Other,
        }
    }

    /// Queues whose games feed the role and champion tables.
    pub const NON_RANDOM: [Queue; 5] = [
        Queue::RankedSolo,
        Queue::RankedFlex,
        Queue::Clash,
        Queue::NormalDraft,
        Queue::NormalBlind,
    ];

    pub fn queue_id(self) -> Option<i64> {
        match self {
            Queue::RankedSolo => Some(420),
            Queue::RankedFlex => Some(440),
            Queue::Clash => Some(700),
            Queue::NormalDraft => Some(400),
            Queue::NormalBlind => Some(430),
            Queue::Other => None,
        }
    }

    pub fn is_ranked(self) -> bool {
        matches!(self, Queue::RankedSolo | Queue::RankedFlex | Queue::Clash)
    }

    /// Drafted or blind summoner's rift games; excludes ARAM and event modes.
    pub fn is_non_random(self) -> bool {
        self.is_ranked() || matches!(self, Queue::NormalDraft | Queue::NormalBlind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub champion: String,
    pub role: RoleSignal,
    pub queue: Queue,
    pub played_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChampionMasteryEntry {
    pub champion: String,
    pub points: u64,
    pub last_played: DateTime<Utc>,
}

/// A ranked queue standing as reported by league-v4.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueEntry {
    pub queue_type: String,
    pub tier: String,
    pub rank: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    pub puuid: String,
    pub game_name: String,
    pub tag_line: String,
}

impl PlayerIdentity {
    pub fn riot_id(&self) -> String {
        format!("{}#{}", self.game_name, self.tag_line)
    }
}

/// One clash team member as the team lookup returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterMember {
    pub puuid: String,
    pub declared: Option<DeclaredPosition>,
}

/// Everything known about one scouted player for the current request.
#[derive(Debug, Clone)]
pub struct Player {
    pub identity: PlayerIdentity,
    pub matches: Vec<MatchRecord>,
    pub mastery: Vec<ChampionMasteryEntry>,
    pub rank: PlayerRank,
    /// External, possibly imprecise signal from the team lookup.
    pub locked_in_position: Option<DeclaredPosition>,
    /// Authoritative lane once the roster has been resolved.
    pub real_position: Option<Position>,
    pub role_tally: Option<RoleTally>,
}

impl Player {
    pub fn new(identity: PlayerIdentity) -> Self {
        Player {
            identity,
            matches: Vec::new(),
            mastery: Vec::new(),
            rank: PlayerRank::Unranked,
            locked_in_position: None,
            real_position: None,
            role_tally: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.identity.game_name
    }

    /// Whether any drafted or blind game was found; ARAM and event games
    /// alone do not count.
    pub fn has_history(&self) -> bool {
        self.non_random_matches().next().is_some()
    }

    /// The lane whose champion pool should be listed for this player.
    pub fn pool_position(&self) -> Option<Position> {
        self.real_position
            .or_else(|| self.locked_in_position.and_then(DeclaredPosition::lane))
    }

    pub fn ranked_matches(&self) -> impl Iterator<Item = &MatchRecord> {
        self.matches.iter().filter(|m| m.queue.is_ranked())
    }

    pub fn non_random_matches(&self) -> impl Iterator<Item = &MatchRecord> {
        self.matches.iter().filter(|m| m.queue.is_non_random())
    }
}
