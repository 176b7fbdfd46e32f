use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::EnumIter;

use crate::model::RoleSignal;

/// One of the five lanes a team lineup is made of, in lineup order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
)]
pub enum Position {
    Top = 0,
    Jungle = 1,
    Middle = 2,
    Bottom = 3,
    Utility = 4,
}

impl Position {
    pub const COUNT: usize = 5;

    /// Canonical lineup order.
    pub const ALL: [Position; Position::COUNT] = [
        Position::Top,
        Position::Jungle,
        Position::Middle,
        Position::Bottom,
        Position::Utility,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Short label used as a row header in the role table.
    pub fn short_label(self) -> &'static str {
        match self {
            Position::Top => "Top",
            Position::Jungle => "Jng",
            Position::Middle => "Mid",
            Position::Bottom => "Bot",
            Position::Utility => "Sup",
        }
    }

    pub fn api_name(self) -> &'static str {
        match self {
            Position::Top => "TOP",
            Position::Jungle => "JUNGLE",
            Position::Middle => "MIDDLE",
            Position::Bottom => "BOTTOM",
            Position::Utility => "UTILITY",
        }
    }

    /// Parses a single position field (match-v5 team position, clash roster
    /// position or a scraped lane label).
    pub fn from_position_field(raw: &str) -> Option<Position> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "TOP" => Some(Position::Top),
            "JUNGLE" => Some(Position::Jungle),
            "MID" | "MIDDLE" => Some(Position::Middle),
            "BOTTOM" | "ADC" => Some(Position::Bottom),
            "UTILITY" | "SUPPORT" => Some(Position::Utility),
            _ => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

/// What a player said they would play before the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclaredPosition {
    Lane(Position),
    Fill,
}

impl DeclaredPosition {
    /// Clash roster positions; `UNSELECTED` and unknown values yield `None`.
    pub fn from_roster_field(raw: &str) -> Option<DeclaredPosition> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "FILL" => Some(DeclaredPosition::Fill),
            other => Position::from_position_field(other).map(DeclaredPosition::Lane),
        }
    }

    pub fn lane(self) -> Option<Position> {
        match self {
            DeclaredPosition::Lane(position) => Some(position),
            DeclaredPosition::Fill => None,
        }
    }
}

impl fmt::Display for DeclaredPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredPosition::Lane(position) => position.fmt(f),
            DeclaredPosition::Fill => f.write_str("FILL"),
        }
    }
}

/// A role signal that does not map onto any lane.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised role signal: {0}")]
pub struct RoleMiss(pub String);

/// Older match data reports a (role, lane) pair instead of a position.
fn lane_keyword(raw: &str) -> Option<Position> {
    match raw {
        "TOP" => Some(Position::Top),
        "JUNGLE" | "NONE" => Some(Position::Jungle),
        "MID" | "MIDDLE" => Some(Position::Middle),
        "BOTTOM" | "DUO" => Some(Position::Bottom),
        "DUO_SUPPORT" => Some(Position::Utility),
        _ => None,
    }
}

fn role_lane_pair(role: &str, lane: &str) -> Option<Position> {
    match (role, lane) {
        ("SOLO", "TOP") => Some(Position::Top),
        ("SOLO", "MID") | ("SOLO", "MIDDLE") => Some(Position::Middle),
        ("NONE", "JUNGLE") => Some(Position::Jungle),
        ("DUO_CARRY", "BOTTOM") => Some(Position::Bottom),
        ("DUO_SUPPORT", "BOTTOM") => Some(Position::Utility),
        _ => None,
    }
}

/// Maps one game's raw role signal onto a lane.
///
/// For compound signals the exact pair wins, then the lane alone, then the
/// role alone.
pub fn classify(signal: &RoleSignal) -> Result<Position, RoleMiss> {
    match signal {
        RoleSignal::Position(raw) => {
            Position::from_position_field(raw).ok_or_else(|| RoleMiss(raw.clone()))
        }
        RoleSignal::RoleLane { role, lane } => {
            let role_key = role.trim().to_ascii_uppercase();
            let lane_key = lane.trim().to_ascii_uppercase();

            role_lane_pair(&role_key, &lane_key)
                .or_else(|| lane_keyword(&lane_key))
                .or_else(|| lane_keyword(&role_key))
                .ok_or_else(|| RoleMiss(format!("{} - {}", role, lane)))
        }
    }
}
