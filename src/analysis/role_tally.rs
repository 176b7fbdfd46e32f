use std::collections::BTreeMap;
use tracing::warn;

use super::highlight::{Highlight, ScoredCell, ScoredColumn};
use super::position::{classify, Position};
use crate::model::{MatchRecord, Player};

/// Games in a lane needed for the top play-rate highlight.
pub const HIGH_ROLE_GAMES: u32 = 50;
/// Games in a lane needed for the secondary play-rate highlight.
pub const ELEVATED_ROLE_GAMES: u32 = 25;

/// Games per lane for one player, plus the champions played in each lane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleTally {
    counts: [u32; Position::COUNT],
    pools: [BTreeMap<String, u32>; Position::COUNT],
    unclassified: u32,
}

impl RoleTally {
    pub fn from_matches<'a>(matches: impl IntoIterator<Item = &'a MatchRecord>) -> Self {
        let mut tally = RoleTally::default();
        for record in matches {
            tally.record(record);
        }
        tally
    }

    pub fn record(&mut self, record: &MatchRecord) {
        match classify(&record.role) {
            Ok(position) => {
                self.counts[position.index()] += 1;
                *self.pools[position.index()]
                    .entry(record.champion.clone())
                    .or_insert(0) += 1;
            }
            Err(miss) => {
                warn!(champion = %record.champion, %miss, "Dropping game with undetermined role");
                self.unclassified += 1;
            }
        }
    }

    pub fn count(&self, position: Position) -> u32 {
        self.counts[position.index()]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn unclassified(&self) -> u32 {
        self.unclassified
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Champions played while in `position`, with games per champion.
    pub fn position_pool(&self, position: Position) -> &BTreeMap<String, u32> {
        &self.pools[position.index()]
    }

    pub fn highlight(&self, position: Position) -> Highlight {
        play_rate_highlight(self.count(position))
    }
}

pub fn play_rate_highlight(games: u32) -> Highlight {
    if games >= HIGH_ROLE_GAMES {
        Highlight::Red
    } else if games >= ELEVATED_ROLE_GAMES {
        Highlight::Orange
    } else {
        Highlight::Plain
    }
}

/// Tallies every non-random game of the player and stores the result on it.
pub fn tally_player(player: &mut Player) -> &RoleTally {
    let tally = RoleTally::from_matches(player.non_random_matches());
    player.role_tally.insert(tally)
}

/// One column per player with history, rows in lineup order.
pub fn role_rate_columns(players: &[Player]) -> Vec<ScoredColumn> {
    players
        .iter()
        .filter(|p| p.has_history())
        .filter_map(|player| {
            let tally = player.role_tally.as_ref()?;
            let cells = Position::ALL
                .iter()
                .map(|&position| {
                    ScoredCell::new(
                        position.short_label(),
                        u64::from(tally.count(position)),
                        tally.highlight(position),
                    )
                })
                .collect();
            Some(ScoredColumn::new(player.name(), player.rank.tier(), cells))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Queue, RoleSignal};
    use chrono::Utc;
    use rstest::rstest;

    fn game(champion: &str, position: &str) -> MatchRecord {
        MatchRecord {
            champion: champion.to_string(),
            role: RoleSignal::Position(position.to_string()),
            queue: Queue::RankedSolo,
            played_at: Utc::now(),
        }
    }

    #[test]
    fn counts_games_per_lane_and_builds_pools() {
        let games = vec![
            game("Ahri", "MIDDLE"),
            game("Ahri", "MIDDLE"),
            game("Syndra", "MID"),
            game("Lee Sin", "JUNGLE"),
        ];

        let tally = RoleTally::from_matches(&games);

        assert_eq!(tally.count(Position::Middle), 3);
        assert_eq!(tally.count(Position::Jungle), 1);
        assert_eq!(tally.count(Position::Top), 0);
        assert_eq!(tally.total(), 4);
        assert_eq!(tally.position_pool(Position::Middle).get("Ahri"), Some(&2));
        assert_eq!(tally.position_pool(Position::Middle).get("Syndra"), Some(&1));
        assert!(tally.position_pool(Position::Top).is_empty());
    }

    #[test]
    fn unclassified_games_are_dropped_not_fatal() {
        let games = vec![game("Ahri", "MIDDLE"), game("Teemo", "RIVER")];

        let tally = RoleTally::from_matches(&games);

        assert_eq!(tally.total(), 1);
        assert_eq!(tally.unclassified(), 1);
    }

    #[test]
    fn empty_history_is_all_zero() {
        let tally = RoleTally::from_matches(&Vec::<MatchRecord>::new());
        assert!(tally.is_empty());
        for position in Position::ALL {
            assert_eq!(tally.count(position), 0);
        }
    }

    #[rstest]
    #[case(0, Highlight::Plain)]
    #[case(24, Highlight::Plain)]
    #[case(25, Highlight::Orange)]
    #[case(49, Highlight::Orange)]
    #[case(50, Highlight::Red)]
    fn play_rate_thresholds(#[case] games: u32, #[case] expected: Highlight) {
        assert_eq!(play_rate_highlight(games), expected);
    }
}
