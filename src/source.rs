use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::model::{ChampionMasteryEntry, LeagueEntry, MatchRecord, PlayerIdentity, RosterMember};

/// The upstream collaborators the scouting pipeline reads from.
///
/// Implementations own retries, rate limiting and catalog lookups; callers
/// treat every error as final for that query.
pub trait ScoutSource {
    /// Resolves a `Name#TAG` handle.
    fn find_player(&self, game_name: &str, tag_line: &str) -> Result<PlayerIdentity, AppError>;

    fn find_player_by_puuid(&self, puuid: &str) -> Result<PlayerIdentity, AppError>;

    /// The clash team the player is registered on, including the player.
    fn team_roster(&self, player: &PlayerIdentity) -> Result<Vec<RosterMember>, AppError>;

    /// Games played since `since`; an empty list is a valid answer.
    fn match_history(
        &self,
        player: &PlayerIdentity,
        since: DateTime<Utc>,
    ) -> Result<Vec<MatchRecord>, AppError>;

    fn champion_mastery(
        &self,
        player: &PlayerIdentity,
    ) -> Result<Vec<ChampionMasteryEntry>, AppError>;

    fn league_entries(&self, player: &PlayerIdentity) -> Result<Vec<LeagueEntry>, AppError>;
}

/// Splits `Name#TAG`; a missing tag defaults to the region's usual `NA1`.
pub fn parse_riot_id(handle: &str) -> Result<(String, String), AppError> {
    let handle = handle.trim();
    let (name, tag) = match handle.split_once('#') {
        Some((name, tag)) => (name.trim(), tag.trim()),
        None => (handle, "NA1"),
    };
    if name.is_empty() || tag.is_empty() {
        return Err(AppError::InvalidRiotId);
    }
    Ok((name.to_string(), tag.to_string()))
}
