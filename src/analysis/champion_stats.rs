use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::model::MatchRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct ChampionStats {
    pub name: String,
    pub games_played: u32,
    pub last_played: Option<DateTime<Utc>>,
}

impl ChampionStats {
    pub fn new(name: String) -> Self {
        ChampionStats {
            name,
            games_played: 0,
            last_played: None,
        }
    }

    pub fn played_since(&self, cutoff: DateTime<Utc>) -> bool {
        self.last_played.is_some_and(|t| t >= cutoff)
    }
}

/// Counts how often each champion was played across a set of games.
#[derive(Debug, Default)]
pub struct ChampionStatsTracker {
    stats: HashMap<String, ChampionStats>,
}

impl ChampionStatsTracker {
    pub fn new() -> Self {
        ChampionStatsTracker {
            stats: HashMap::new(),
        }
    }

    pub fn from_matches<'a>(
        matches: impl IntoIterator<Item = &'a MatchRecord>,
        since: DateTime<Utc>,
    ) -> Self {
        let mut tracker = ChampionStatsTracker::new();
        for record in matches.into_iter().filter(|m| m.played_at >= since) {
            tracker.add_game(&record.champion, record.played_at);
        }
        tracker
    }

    pub fn add_game(&mut self, champion_name: &str, played_at: DateTime<Utc>) {
        let entry = self
            .stats
            .entry(champion_name.to_string())
            .or_insert_with(|| ChampionStats::new(champion_name.to_string()));

        entry.games_played += 1;
        entry.last_played = Some(entry.last_played.map_or(played_at, |t| t.max(played_at)));
    }

    /// Adds games without a known date, e.g. from a lane's champion pool.
    pub fn add_games(&mut self, champion_name: &str, games: u32) {
        let entry = self
            .stats
            .entry(champion_name.to_string())
            .or_insert_with(|| ChampionStats::new(champion_name.to_string()));
        entry.games_played += games;
    }

    /// Most played first; equal counts fall back to name order.
    pub fn top(&self, amount: usize) -> Vec<ChampionStats> {
        let mut stats: Vec<ChampionStats> = self.stats.values().cloned().collect();
        stats.sort_by(|a, b| match b.games_played.cmp(&a.games_played) {
            Ordering::Equal => a.name.cmp(&b.name),
            other => other,
        });
        stats.truncate(amount);
        stats
    }

    pub fn get_champion(&self, name: &str) -> Option<&ChampionStats> {
        self.stats.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Queue, RoleSignal};
    use chrono::Duration;

    fn game(champion: &str, days_ago: i64, now: DateTime<Utc>) -> MatchRecord {
        MatchRecord {
            champion: champion.to_string(),
            role: RoleSignal::Position("MIDDLE".to_string()),
            queue: Queue::RankedSolo,
            played_at: now - Duration::days(days_ago),
        }
    }

    #[test]
    fn counts_games_and_latest_play() {
        let now = Utc::now();
        let games = vec![game("Ahri", 10, now), game("Ahri", 2, now), game("Lux", 5, now)];

        let tracker = ChampionStatsTracker::from_matches(&games, now - Duration::days(30));

        let ahri = tracker.get_champion("Ahri").unwrap();
        assert_eq!(ahri.games_played, 2);
        assert_eq!(ahri.last_played, Some(now - Duration::days(2)));
    }

    #[test]
    fn ignores_games_before_lookback() {
        let now = Utc::now();
        let games = vec![game("Ahri", 400, now), game("Lux", 5, now)];

        let tracker = ChampionStatsTracker::from_matches(&games, now - Duration::days(180));

        assert!(tracker.get_champion("Ahri").is_none());
        assert!(tracker.get_champion("Lux").is_some());
    }

    #[test]
    fn top_is_deterministic_on_ties() {
        let mut tracker = ChampionStatsTracker::new();
        tracker.add_games("Zed", 3);
        tracker.add_games("Ahri", 3);
        tracker.add_games("Lux", 7);

        let names: Vec<String> = tracker.top(10).into_iter().map(|s| s.name).collect();

        assert_eq!(names, vec!["Lux", "Ahri", "Zed"]);
    }
}
