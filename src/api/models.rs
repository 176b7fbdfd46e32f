use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::collections::HashMap;

use crate::analysis::position::DeclaredPosition;
use crate::model::{LeagueEntry, MatchRecord, PlayerIdentity, Queue, RoleSignal, RosterMember};

// Account V1 response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub puuid: String,
    #[serde(default)]
    pub game_name: String,
    #[serde(default)]
    pub tag_line: String,
}

impl From<AccountDto> for PlayerIdentity {
    fn from(dto: AccountDto) -> Self {
        PlayerIdentity {
            puuid: dto.puuid,
            game_name: dto.game_name,
            tag_line: dto.tag_line,
        }
    }
}

// League V4 response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueEntryDto {
    pub queue_type: String,
    #[serde(default)]
    pub tier: String,
    #[serde(default)]
    pub rank: String,
}

impl From<LeagueEntryDto> for LeagueEntry {
    fn from(dto: LeagueEntryDto) -> Self {
        LeagueEntry {
            queue_type: dto.queue_type,
            tier: dto.tier,
            rank: dto.rank,
        }
    }
}

// Champion Mastery V4 response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionMasteryDto {
    pub champion_id: i64,
    pub champion_points: u64,
    /// Milliseconds since the epoch.
    #[serde(default)]
    pub last_play_time: i64,
}

impl ChampionMasteryDto {
    pub fn last_played(&self) -> DateTime<Utc> {
        millis_to_utc(self.last_play_time)
    }
}

// Match V5 response
#[derive(Debug, Deserialize)]
pub struct MatchDto {
    pub info: MatchInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    /// Milliseconds since the epoch.
    pub game_creation: i64,
    #[serde(default)]
    pub queue_id: i64,
    pub participants: Vec<ParticipantDto>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub puuid: String,
    pub champion_name: String,
    #[serde(default)]
    pub team_position: String, // TOP, JUNGLE, MIDDLE, BOTTOM, UTILITY or empty
    #[serde(default)]
    pub lane: String, // TOP, JUNGLE, MIDDLE, BOTTOM, NONE
    #[serde(default)]
    pub role: String, // SOLO, NONE, CARRY, SUPPORT, DUO
}

impl ParticipantDto {
    /// Prefers the post-game position and falls back to the lane/role pair
    /// older games only carry.
    pub fn role_signal(&self) -> RoleSignal {
        if self.team_position.trim().is_empty() {
            RoleSignal::RoleLane {
                role: self.role.clone(),
                lane: self.lane.clone(),
            }
        } else {
            RoleSignal::Position(self.team_position.clone())
        }
    }
}

impl MatchDto {
    /// The game as seen by `puuid`, if they took part in it.
    pub fn record_for(&self, puuid: &str) -> Option<MatchRecord> {
        let participant = self.info.participants.iter().find(|p| p.puuid == puuid)?;
        Some(MatchRecord {
            champion: participant.champion_name.clone(),
            role: participant.role_signal(),
            queue: Queue::from_queue_id(self.info.queue_id),
            played_at: millis_to_utc(self.info.game_creation),
        })
    }
}

// Clash V1 responses
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClashPlayerDto {
    pub puuid: String,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub position: String, // TOP, JUNGLE, MIDDLE, BOTTOM, UTILITY, FILL, UNSELECTED
}

impl From<ClashPlayerDto> for RosterMember {
    fn from(dto: ClashPlayerDto) -> Self {
        RosterMember {
            declared: DeclaredPosition::from_roster_field(&dto.position),
            puuid: dto.puuid,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClashTeamDto {
    pub id: String,
    #[serde(default)]
    pub players: Vec<ClashPlayerDto>,
}

// Data Dragon responses
#[derive(Debug, Deserialize)]
pub struct DataDragonChampions {
    pub version: String,
    pub data: HashMap<String, ChampionInfo>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChampionInfo {
    pub id: String,
    pub name: String,
    /// Numeric champion id as a string, e.g. "266".
    pub key: String,
}

fn millis_to_utc(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::position::Position;

    const MATCH_JSON: &str = r#"{
        "metadata": {"matchId": "NA1_1"},
        "info": {
            "gameCreation": 1700000000000,
            "queueId": 700,
            "participants": [
                {"puuid": "a", "championName": "Ahri", "teamPosition": "MIDDLE", "lane": "MIDDLE", "role": "SOLO"},
                {"puuid": "b", "championName": "Thresh", "teamPosition": "", "lane": "BOTTOM", "role": "SUPPORT"}
            ]
        }
    }"#;

    #[test]
    fn match_record_uses_team_position() {
        let dto: MatchDto = serde_json::from_str(MATCH_JSON).unwrap();
        let record = dto.record_for("a").unwrap();
        assert_eq!(record.champion, "Ahri");
        assert_eq!(record.queue, Queue::Clash);
        assert_eq!(record.role, RoleSignal::Position("MIDDLE".to_string()));
        assert_eq!(record.played_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn match_record_falls_back_to_lane_and_role() {
        let dto: MatchDto = serde_json::from_str(MATCH_JSON).unwrap();
        let record = dto.record_for("b").unwrap();
        assert_eq!(
            record.role,
            RoleSignal::RoleLane {
                role: "SUPPORT".to_string(),
                lane: "BOTTOM".to_string()
            }
        );
        assert!(dto.record_for("nobody").is_none());
    }

    #[test]
    fn clash_player_maps_declared_position() {
        let dto: ClashPlayerDto =
            serde_json::from_str(r#"{"puuid": "p", "teamId": "t", "position": "FILL"}"#).unwrap();
        let member = RosterMember::from(dto);
        assert_eq!(member.declared, Some(DeclaredPosition::Fill));

        let dto: ClashPlayerDto =
            serde_json::from_str(r#"{"puuid": "p", "position": "UTILITY"}"#).unwrap();
        assert_eq!(
            RosterMember::from(dto).declared,
            Some(DeclaredPosition::Lane(Position::Utility))
        );
    }
}
