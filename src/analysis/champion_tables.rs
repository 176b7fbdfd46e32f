use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

use super::champion_stats::{ChampionStats, ChampionStatsTracker};
use super::highlight::{escalate_shared, Highlight, Lattice, ScoredCell, ScoredColumn};
use crate::config::ScoutSettings;
use crate::model::{ChampionMasteryEntry, Player};

/// Share of a player's listed mastery a champion needs to stand out.
pub const HIGH_MASTERY_SHARE: f64 = 0.15;
/// Recent games above which a champion is a main.
pub const MANY_RECENT_GAMES: u32 = 25;
/// Recent games above which a champion is a regular pick.
pub const SOME_RECENT_GAMES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Mastery,
    RecentAll,
    RecentRanked,
    RoleChampions,
}

impl TableKind {
    pub fn lattice(self) -> Lattice {
        match self {
            TableKind::Mastery => Lattice::Mastery,
            _ => Lattice::Recency,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChampionTable {
    pub kind: TableKind,
    pub columns: Vec<ScoredColumn>,
}

impl ChampionTable {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Clears highlighting on champions not played since `cutoff`. Unknown
/// play dates count as stale.
fn strip_stale(
    columns: &mut [ScoredColumn],
    last_played: &[HashMap<String, DateTime<Utc>>],
    cutoff: DateTime<Utc>,
) {
    for (column, dates) in columns.iter_mut().zip(last_played) {
        for cell in column.cells.iter_mut().filter(|c| !c.is_empty()) {
            let fresh = dates.get(&cell.label).is_some_and(|t| *t >= cutoff);
            if !fresh && cell.highlight.is_marked() {
                debug!(champion = %cell.label, "Removing highlight from stale champion");
                cell.highlight = Highlight::Plain;
            }
        }
    }
}

fn top_mastery(entries: &[ChampionMasteryEntry], amount: usize) -> Vec<&ChampionMasteryEntry> {
    let mut sorted: Vec<&ChampionMasteryEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| match b.points.cmp(&a.points) {
        Ordering::Equal => a.champion.cmp(&b.champion),
        other => other,
    });
    sorted.truncate(amount);
    sorted
}

pub fn mastery_table(
    players: &[Player],
    settings: &ScoutSettings,
    now: DateTime<Utc>,
) -> ChampionTable {
    let mut columns = Vec::new();
    let mut last_played = Vec::new();

    for player in players.iter().filter(|p| p.has_history()) {
        let top = top_mastery(&player.mastery, settings.top_champions);
        let listed_total: u64 = top.iter().map(|e| e.points).sum();
        let threshold = listed_total as f64 * HIGH_MASTERY_SHARE;

        let cells = top
            .iter()
            .map(|entry| {
                let highlight = if entry.points as f64 >= threshold && listed_total > 0 {
                    Highlight::Orange
                } else {
                    Highlight::Plain
                };
                ScoredCell::new(entry.champion.clone(), entry.points, highlight)
            })
            .collect();

        let mut column = ScoredColumn::new(player.name(), player.rank.tier(), cells);
        column.pad_to(settings.top_champions);
        columns.push(column);
        last_played.push(
            top.iter()
                .map(|e| (e.champion.clone(), e.last_played))
                .collect::<HashMap<_, _>>(),
        );
    }

    escalate_shared(&mut columns, TableKind::Mastery.lattice());
    strip_stale(&mut columns, &last_played, now - settings.freshness);

    ChampionTable {
        kind: TableKind::Mastery,
        columns,
    }
}

pub fn recent_games_highlight(games: u32) -> Highlight {
    if games > MANY_RECENT_GAMES {
        Highlight::Orange
    } else if games > SOME_RECENT_GAMES {
        Highlight::Blue
    } else {
        Highlight::Plain
    }
}

fn stats_column(
    player: &Player,
    top: &[ChampionStats],
    rows: usize,
    highlight: impl Fn(u32) -> Highlight,
) -> ScoredColumn {
    let cells = top
        .iter()
        .map(|s| {
            ScoredCell::new(
                s.name.clone(),
                u64::from(s.games_played),
                highlight(s.games_played),
            )
        })
        .collect();
    let mut column = ScoredColumn::new(player.name(), player.rank.tier(), cells);
    column.pad_to(rows);
    column
}

/// Most played champions per player over the lookback window, either across
/// every drafted/blind game (`RecentAll`) or ranked and clash only.
pub fn recent_table(
    players: &[Player],
    kind: TableKind,
    settings: &ScoutSettings,
    now: DateTime<Utc>,
) -> ChampionTable {
    let since = now - settings.lookback;
    let mut columns = Vec::new();
    let mut last_played = Vec::new();

    for player in players.iter().filter(|p| p.has_history()) {
        let tracker = match kind {
            TableKind::RecentRanked => {
                ChampionStatsTracker::from_matches(player.ranked_matches(), since)
            }
            _ => ChampionStatsTracker::from_matches(player.non_random_matches(), since),
        };
        let top = tracker.top(settings.top_champions);

        columns.push(stats_column(player, &top, settings.top_champions, recent_games_highlight));
        last_played.push(
            top.iter()
                .filter_map(|s| s.last_played.map(|t| (s.name.clone(), t)))
                .collect::<HashMap<_, _>>(),
        );
    }

    escalate_shared(&mut columns, kind.lattice());
    strip_stale(&mut columns, &last_played, now - settings.freshness);

    ChampionTable { kind, columns }
}

/// Tiers for a lane pool are relative to the games listed in that column.
fn role_pool_highlight(games: u32, listed_total: u32) -> Highlight {
    if listed_total == 0 {
        Highlight::Plain
    } else if games >= listed_total / 4 {
        Highlight::Orange
    } else if games >= listed_total / 6 {
        Highlight::Blue
    } else {
        Highlight::Plain
    }
}

/// Top champions each player has played in the lane they will play.
/// Returns `None` when no player has a known lane.
pub fn role_champion_table(players: &[Player], settings: &ScoutSettings) -> Option<ChampionTable> {
    let mut columns = Vec::new();

    for player in players.iter().filter(|p| p.has_history()) {
        let (Some(position), Some(tally)) = (player.pool_position(), player.role_tally.as_ref())
        else {
            continue;
        };

        let mut tracker = ChampionStatsTracker::new();
        for (champion, games) in tally.position_pool(position) {
            tracker.add_games(champion, *games);
        }
        let top = tracker.top(settings.top_champions);
        let listed_total: u32 = top.iter().map(|s| s.games_played).sum();

        columns.push(stats_column(player, &top, settings.top_champions, |games| {
            role_pool_highlight(games, listed_total)
        }));
    }

    if columns.is_empty() {
        return None;
    }

    escalate_shared(&mut columns, TableKind::RoleChampions.lattice());
    Some(ChampionTable {
        kind: TableKind::RoleChampions,
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::position::Position;
    use crate::analysis::role_tally::tally_player;
    use crate::model::{MatchRecord, PlayerIdentity, Queue, RoleSignal};
    use chrono::Duration;
    use rstest::rstest;

    fn player(name: &str) -> Player {
        Player::new(PlayerIdentity {
            puuid: format!("{}-puuid", name),
            game_name: name.to_string(),
            tag_line: "NA1".to_string(),
        })
    }

    fn games(
        champion: &str,
        count: usize,
        queue: Queue,
        days_ago: i64,
        now: DateTime<Utc>,
    ) -> Vec<MatchRecord> {
        (0..count)
            .map(|_| MatchRecord {
                champion: champion.to_string(),
                role: RoleSignal::Position("MIDDLE".to_string()),
                queue,
                played_at: now - Duration::days(days_ago),
            })
            .collect()
    }

    fn mastery(
        champion: &str,
        points: u64,
        days_ago: i64,
        now: DateTime<Utc>,
    ) -> ChampionMasteryEntry {
        ChampionMasteryEntry {
            champion: champion.to_string(),
            points,
            last_played: now - Duration::days(days_ago),
        }
    }

    #[rstest]
    #[case(26, Highlight::Orange)]
    #[case(25, Highlight::Blue)]
    #[case(11, Highlight::Blue)]
    #[case(10, Highlight::Plain)]
    fn recent_game_tiers(#[case] games: u32, #[case] expected: Highlight) {
        assert_eq!(recent_games_highlight(games), expected);
    }

    #[test]
    fn mastery_columns_are_top_ten_padded_and_sorted() {
        let now = Utc::now();
        let mut p = player("solo");
        p.matches = games("Ahri", 1, Queue::RankedSolo, 1, now);
        p.mastery = vec![
            mastery("Lux", 5_000, 1, now),
            mastery("Ahri", 900_000, 1, now),
            mastery("Zed", 5_000, 1, now),
        ];

        let table = mastery_table(&[p], &ScoutSettings::default(), now);
        let column = &table.columns[0];

        assert_eq!(column.cells.len(), 10);
        assert_eq!(column.cells[0].label, "Ahri");
        assert_eq!(column.cells[0].highlight, Highlight::Orange);
        // equal points fall back to name order
        assert_eq!(column.cells[1].label, "Lux");
        assert_eq!(column.cells[2].label, "Zed");
        assert_eq!(column.cells[1].highlight, Highlight::Plain);
        assert!(column.cells[3].is_empty());
    }

    #[test]
    fn shared_mastery_champion_escalates_for_both_players() {
        let now = Utc::now();
        let mut a = player("a");
        a.matches = games("Ahri", 1, Queue::RankedSolo, 1, now);
        a.mastery = vec![mastery("Ahri", 500_000, 1, now), mastery("Zed", 20_000, 1, now)];
        let mut b = player("b");
        b.matches = games("Lux", 1, Queue::RankedSolo, 1, now);
        b.mastery = vec![mastery("Lux", 500_000, 1, now), mastery("Zed", 10_000, 1, now)];

        let table = mastery_table(&[a, b], &ScoutSettings::default(), now);

        assert_eq!(table.columns[0].cells[0].highlight, Highlight::Orange);
        assert_eq!(table.columns[0].cells[1].highlight, Highlight::Yellow);
        assert_eq!(table.columns[1].cells[1].highlight, Highlight::Yellow);
    }

    #[test]
    fn stale_champions_lose_highlight_but_stay_listed() {
        let now = Utc::now();
        let mut p = player("solo");
        p.matches = [
            games("Ahri", 30, Queue::RankedSolo, 60, now),
            games("Lux", 12, Queue::RankedSolo, 3, now),
        ]
        .concat();

        let table = recent_table(&[p], TableKind::RecentAll, &ScoutSettings::default(), now);
        let column = &table.columns[0];

        assert_eq!(column.cells[0].label, "Ahri");
        assert_eq!(column.cells[0].value, Some(30));
        assert_eq!(column.cells[0].highlight, Highlight::Plain);
        assert_eq!(column.cells[1].label, "Lux");
        assert_eq!(column.cells[1].highlight, Highlight::Blue);
    }

    #[test]
    fn ranked_table_ignores_normal_games() {
        let now = Utc::now();
        let mut p = player("solo");
        p.matches = [
            games("Ahri", 3, Queue::NormalDraft, 1, now),
            games("Lux", 2, Queue::Clash, 1, now),
        ]
        .concat();

        let settings = ScoutSettings::default();
        let all = recent_table(std::slice::from_ref(&p), TableKind::RecentAll, &settings, now);
        let ranked = recent_table(&[p], TableKind::RecentRanked, &settings, now);

        assert_eq!(all.columns[0].cells[0].label, "Ahri");
        assert_eq!(ranked.columns[0].cells[0].label, "Lux");
        assert!(ranked.columns[0].cells[1].is_empty());
    }

    #[test]
    fn players_without_history_are_left_out() {
        let now = Utc::now();
        let mut active = player("active");
        active.matches = games("Ahri", 2, Queue::RankedSolo, 1, now);
        let idle = player("idle");

        let settings = ScoutSettings::default();
        let table = recent_table(&[active, idle], TableKind::RecentAll, &settings, now);

        assert_eq!(table.columns.len(), 1);
        assert_eq!(table.columns[0].title, "active");
    }

    #[test]
    fn role_champions_use_the_resolved_lane_pool() {
        let now = Utc::now();
        let mut p = player("mid");
        p.matches = [
            games("Ahri", 8, Queue::RankedSolo, 1, now),
            games("Syndra", 1, Queue::RankedSolo, 1, now),
        ]
        .concat();
        tally_player(&mut p);
        p.real_position = Some(Position::Middle);

        let table = role_champion_table(&[p], &ScoutSettings::default()).unwrap();

        let column = &table.columns[0];
        assert_eq!(column.cells[0].label, "Ahri");
        assert_eq!(column.cells[0].highlight, Highlight::Orange);
        assert_eq!(column.cells[1].label, "Syndra");
        assert_eq!(column.cells[1].highlight, Highlight::Blue); // 1 >= 9 / 6
    }

    #[test]
    fn role_champions_absent_without_lanes() {
        let now = Utc::now();
        let mut p = player("nobody");
        p.matches = games("Ahri", 2, Queue::RankedSolo, 1, now);
        tally_player(&mut p);

        assert!(role_champion_table(&[p], &ScoutSettings::default()).is_none());
    }
}
