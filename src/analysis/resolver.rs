//! Assigns five players to five distinct lanes.
//!
//! Declared lanes are honoured first. Players that declared FILL, declared
//! nothing, or collided with a teammate on the same lane are then placed
//! greedily, one open lane at a time in lineup order, on whoever's play
//! history is most concentrated in that lane relative to the other lanes
//! that are still open. Exact ties go to the player listed first.

use thiserror::Error;
use tracing::{debug, info, warn};

use super::position::{DeclaredPosition, Position};
use super::role_tally::RoleTally;
use crate::model::Player;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("expected a roster of {expected} players, found {found}")]
    RosterSize { expected: usize, found: usize },

    #[error("{positions} open positions left for {players} unresolved players")]
    Unbalanced { positions: usize, players: usize },
}

#[derive(Debug, Clone, Copy)]
pub struct RosterEntry<'a> {
    pub declared: Option<DeclaredPosition>,
    pub tally: &'a RoleTally,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignedBy {
    Declared,
    Elimination,
    Dominance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub position: Position,
    pub assigned_by: AssignedBy,
}

/// Outcome of a resolution, indexed by the players' input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    assignments: Vec<Assignment>,
    collided: Vec<usize>,
}

impl Resolution {
    pub fn assignment(&self, player: usize) -> Option<Assignment> {
        self.assignments.get(player).copied()
    }

    pub fn position_of(&self, player: usize) -> Option<Position> {
        self.assignment(player).map(|a| a.position)
    }

    /// Whether the player's declaration was set aside because a teammate
    /// declared the same lane.
    pub fn collided(&self, player: usize) -> bool {
        self.collided.contains(&player)
    }

    /// Input index of the player in each lane, in lineup order.
    pub fn lineup(&self) -> Vec<usize> {
        let mut lineup: Vec<(Position, usize)> = self
            .assignments
            .iter()
            .enumerate()
            .map(|(idx, a)| (a.position, idx))
            .collect();
        lineup.sort();
        lineup.into_iter().map(|(_, idx)| idx).collect()
    }

    /// Moves per-player items from input order into lineup order.
    pub fn reorder<T>(&self, items: Vec<T>) -> Vec<T> {
        let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
        self.lineup()
            .into_iter()
            .filter_map(|idx| slots.get_mut(idx).and_then(Option::take))
            .collect()
    }
}

/// Players declaring a concrete lane someone else also declared.
fn colliding_claimants(roster: &[RosterEntry<'_>]) -> Vec<usize> {
    let lanes: Vec<Option<Position>> = roster
        .iter()
        .map(|entry| entry.declared.and_then(DeclaredPosition::lane))
        .collect();

    lanes
        .iter()
        .enumerate()
        .filter(|(idx, lane)| {
            lane.is_some()
                && lanes
                    .iter()
                    .enumerate()
                    .any(|(other, other_lane)| other != *idx && other_lane == *lane)
        })
        .map(|(idx, _)| idx)
        .collect()
}

/// Games in `position` minus games across every other still-open lane.
fn dominance(tally: &RoleTally, position: Position, other_open: &[Position]) -> i64 {
    let in_position = i64::from(tally.count(position));
    let elsewhere: i64 = other_open.iter().map(|&p| i64::from(tally.count(p))).sum();
    in_position - elsewhere
}

pub fn resolve_positions(roster: &[RosterEntry<'_>]) -> Result<Resolution, ResolveError> {
    if roster.len() != Position::COUNT {
        return Err(ResolveError::RosterSize {
            expected: Position::COUNT,
            found: roster.len(),
        });
    }

    let collided = colliding_claimants(roster);
    if !collided.is_empty() {
        debug!(players = ?collided, "Treating colliding declarations as fill");
    }
    let effective: Vec<Option<DeclaredPosition>> = roster
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            if collided.contains(&idx) {
                Some(DeclaredPosition::Fill)
            } else {
                entry.declared
            }
        })
        .collect();

    let mut assigned: Vec<Option<Assignment>> = vec![None; roster.len()];

    for position in Position::ALL {
        let claimant = effective
            .iter()
            .enumerate()
            .find(|(idx, declared)| {
                assigned[*idx].is_none() && **declared == Some(DeclaredPosition::Lane(position))
            })
            .map(|(idx, _)| idx);
        if let Some(idx) = claimant {
            assigned[idx] = Some(Assignment {
                position,
                assigned_by: AssignedBy::Declared,
            });
        }
    }

    let mut open_players: Vec<usize> = (0..roster.len())
        .filter(|&idx| assigned[idx].is_none())
        .collect();
    let mut open_positions: Vec<Position> = Position::ALL
        .into_iter()
        .filter(|p| !assigned.iter().flatten().any(|a| a.position == *p))
        .collect();

    if open_players.len() != open_positions.len() {
        return Err(ResolveError::Unbalanced {
            positions: open_positions.len(),
            players: open_players.len(),
        });
    }

    if let ([player], [position]) = (open_players.as_slice(), open_positions.as_slice()) {
        assigned[*player] = Some(Assignment {
            position: *position,
            assigned_by: AssignedBy::Elimination,
        });
        open_players.clear();
        open_positions.clear();
    }

    while !open_positions.is_empty() {
        let position = open_positions.remove(0);
        let winner = open_players
            .iter()
            .copied()
            .max_by(|&a, &b| {
                let score_a = dominance(roster[a].tally, position, &open_positions);
                let score_b = dominance(roster[b].tally, position, &open_positions);
                score_a.cmp(&score_b).then(b.cmp(&a))
            })
            .ok_or(ResolveError::Unbalanced {
                positions: open_positions.len() + 1,
                players: 0,
            })?;

        debug!(player = winner, %position, "Assigned open lane by play-rate dominance");
        assigned[winner] = Some(Assignment {
            position,
            assigned_by: AssignedBy::Dominance,
        });
        open_players.retain(|&idx| idx != winner);
    }

    let assignments: Vec<Assignment> = assigned.into_iter().flatten().collect();
    if assignments.len() != Position::COUNT {
        return Err(ResolveError::Unbalanced {
            positions: Position::COUNT - assignments.len(),
            players: open_players.len(),
        });
    }

    Ok(Resolution {
        assignments,
        collided,
    })
}

/// Resolves the roster, stores each player's real position and returns the
/// players in lineup order. On failure the players keep their input order.
pub fn order_players(mut players: Vec<Player>) -> (Vec<Player>, Result<Resolution, ResolveError>) {
    let empty = RoleTally::default();
    let resolution = {
        let roster: Vec<RosterEntry<'_>> = players
            .iter()
            .map(|p| RosterEntry {
                declared: p.locked_in_position,
                tally: p.role_tally.as_ref().unwrap_or(&empty),
            })
            .collect();
        resolve_positions(&roster)
    };

    match resolution {
        Ok(resolution) => {
            for (idx, player) in players.iter_mut().enumerate() {
                player.real_position = resolution.position_of(idx);
            }
            let players = resolution.reorder(players);
            info!(
                lineup = ?players.iter().map(|p| p.name().to_string()).collect::<Vec<_>>(),
                "Roster resolved"
            );
            (players, Ok(resolution))
        }
        Err(e) => {
            warn!(error = %e, "Could not resolve roster positions; keeping input order");
            (players, Err(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MatchRecord, Queue, RoleSignal};
    use chrono::Utc;
    use rstest::rstest;
    use std::collections::HashSet;

    use DeclaredPosition::{Fill, Lane};
    use Position::*;

    fn tally(counts: [u32; 5]) -> RoleTally {
        let mut games = Vec::new();
        for (position, count) in Position::ALL.iter().zip(counts) {
            for _ in 0..count {
                games.push(MatchRecord {
                    champion: "Ahri".to_string(),
                    role: RoleSignal::Position(position.api_name().to_string()),
                    queue: Queue::RankedSolo,
                    played_at: Utc::now(),
                });
            }
        }
        RoleTally::from_matches(&games)
    }

    fn roster<'a>(
        declared: &[Option<DeclaredPosition>],
        tallies: &'a [RoleTally],
    ) -> Vec<RosterEntry<'a>> {
        declared
            .iter()
            .zip(tallies)
            .map(|(d, t)| RosterEntry {
                declared: *d,
                tally: t,
            })
            .collect()
    }

    fn positions(resolution: &Resolution, players: usize) -> Vec<Position> {
        (0..players)
            .map(|idx| resolution.position_of(idx).unwrap())
            .collect()
    }

    fn assert_bijection(resolution: &Resolution) {
        let assigned: HashSet<Position> = (0..5)
            .map(|idx| resolution.position_of(idx).unwrap())
            .collect();
        assert_eq!(assigned.len(), 5);
    }

    #[rstest]
    #[case([Top, Jungle, Middle, Bottom, Utility])]
    #[case([Utility, Bottom, Middle, Jungle, Top])]
    #[case([Middle, Top, Utility, Jungle, Bottom])]
    fn distinct_declarations_are_kept_in_any_order(#[case] declared: [Position; 5]) {
        let tallies = vec![RoleTally::default(); 5];
        let decl: Vec<_> = declared.iter().map(|p| Some(Lane(*p))).collect();

        let resolution = resolve_positions(&roster(&decl, &tallies)).unwrap();

        assert_eq!(positions(&resolution, 5), declared.to_vec());
        for idx in 0..5 {
            assert_eq!(
                resolution.assignment(idx).unwrap().assigned_by,
                AssignedBy::Declared
            );
        }
    }

    #[rstest]
    #[case(Some(Fill))]
    #[case(None)]
    fn single_gap_filled_by_elimination(#[case] last: Option<DeclaredPosition>) {
        let tallies = vec![RoleTally::default(); 5];
        let decl = vec![
            Some(Lane(Top)),
            last,
            Some(Lane(Middle)),
            Some(Lane(Bottom)),
            Some(Lane(Utility)),
        ];

        let resolution = resolve_positions(&roster(&decl, &tallies)).unwrap();

        assert_eq!(resolution.position_of(1), Some(Jungle));
        assert_eq!(
            resolution.assignment(1).unwrap().assigned_by,
            AssignedBy::Elimination
        );
    }

    #[test]
    fn dominance_picks_concentrated_player() {
        // Player 0 plays lots of top but even more jungle; player 1 is a pure top laner.
        let tallies = vec![
            tally([20, 30, 0, 0, 0]),
            tally([15, 0, 0, 0, 0]),
            RoleTally::default(),
            RoleTally::default(),
            RoleTally::default(),
        ];
        let decl = vec![
            Some(Fill),
            Some(Fill),
            Some(Lane(Middle)),
            Some(Lane(Bottom)),
            Some(Lane(Utility)),
        ];

        let resolution = resolve_positions(&roster(&decl, &tallies)).unwrap();

        // TOP: p0 = 20 - 30 = -10, p1 = 15 - 0 = 15
        assert_eq!(resolution.position_of(1), Some(Top));
        assert_eq!(resolution.position_of(0), Some(Jungle));
        assert_eq!(
            resolution.assignment(0).unwrap().assigned_by,
            AssignedBy::Dominance
        );
    }

    #[test]
    fn exact_tie_goes_to_earlier_player() {
        let tallies = vec![
            RoleTally::default(),
            RoleTally::default(),
            RoleTally::default(),
            tally([5, 5, 0, 0, 0]),
            tally([5, 5, 0, 0, 0]),
        ];
        let decl = vec![
            Some(Lane(Middle)),
            Some(Lane(Bottom)),
            Some(Lane(Utility)),
            None,
            None,
        ];

        let resolution = resolve_positions(&roster(&decl, &tallies)).unwrap();

        assert_eq!(resolution.position_of(3), Some(Top));
        assert_eq!(resolution.position_of(4), Some(Jungle));
    }

    #[test]
    fn colliding_top_claims_are_resolved_by_dominance() {
        let tallies = vec![
            tally([40, 35, 0, 0, 0]),
            tally([30, 2, 0, 0, 0]),
            tally([0, 0, 60, 0, 0]),
            tally([0, 0, 0, 60, 0]),
            tally([0, 0, 0, 0, 60]),
        ];
        let decl = vec![
            Some(Lane(Top)),
            Some(Lane(Top)),
            Some(Lane(Middle)),
            Some(Lane(Bottom)),
            Some(Lane(Utility)),
        ];

        let resolution = resolve_positions(&roster(&decl, &tallies)).unwrap();

        // TOP: p0 = 40 - 35 = 5, p1 = 30 - 2 = 28
        assert_eq!(resolution.position_of(1), Some(Top));
        assert_eq!(resolution.position_of(0), Some(Jungle));
        assert!(resolution.collided(0));
        assert!(resolution.collided(1));
        assert!(!resolution.collided(2));
        assert_bijection(&resolution);
    }

    #[test]
    fn all_fill_with_empty_history_still_yields_bijection() {
        let tallies = vec![RoleTally::default(); 5];
        let decl = vec![None; 5];

        let resolution = resolve_positions(&roster(&decl, &tallies)).unwrap();

        assert_bijection(&resolution);
        assert_eq!(positions(&resolution, 5), Position::ALL.to_vec());
    }

    #[test]
    fn three_way_collision_with_open_lanes() {
        let tallies = vec![
            tally([0, 0, 10, 40, 0]),
            tally([0, 0, 30, 5, 2]),
            tally([0, 0, 3, 3, 50]),
            RoleTally::default(),
            RoleTally::default(),
        ];
        let decl = vec![
            Some(Lane(Middle)),
            Some(Lane(Middle)),
            Some(Lane(Middle)),
            Some(Lane(Top)),
            Some(Lane(Jungle)),
        ];

        let resolution = resolve_positions(&roster(&decl, &tallies)).unwrap();

        assert_eq!(resolution.position_of(1), Some(Middle));
        assert_eq!(resolution.position_of(0), Some(Bottom));
        assert_eq!(resolution.position_of(2), Some(Utility));
        assert_bijection(&resolution);
    }

    #[rstest]
    #[case(0)]
    #[case(4)]
    #[case(6)]
    fn wrong_roster_size_is_reported(#[case] size: usize) {
        let tallies = vec![RoleTally::default(); size];
        let decl = vec![None; size];

        let result = resolve_positions(&roster(&decl, &tallies));

        assert_eq!(
            result,
            Err(ResolveError::RosterSize {
                expected: 5,
                found: size
            })
        );
    }

    #[test]
    fn reorder_moves_items_into_lineup_order() {
        let tallies = vec![RoleTally::default(); 5];
        let decl = vec![
            Some(Lane(Utility)),
            Some(Lane(Top)),
            Some(Lane(Bottom)),
            Some(Lane(Jungle)),
            Some(Lane(Middle)),
        ];
        let resolution = resolve_positions(&roster(&decl, &tallies)).unwrap();

        let ordered = resolution.reorder(vec!["sup", "top", "bot", "jng", "mid"]);

        assert_eq!(ordered, vec!["top", "jng", "mid", "bot", "sup"]);
    }
}
