use serde::{Deserialize, Serialize};
use std::fmt;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::model::LeagueEntry;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
)]
pub enum Tier {
    Iron,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Emerald,
    Diamond,
    Master,
    Grandmaster,
    Challenger,
}

impl Tier {
    pub fn parse(raw: &str) -> Option<Tier> {
        let raw = raw.trim().to_ascii_uppercase();
        Tier::iter().find(|tier| tier.to_string() == raw)
    }

    pub fn has_divisions(self) -> bool {
        self < Tier::Master
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Iron => "IRON",
            Tier::Bronze => "BRONZE",
            Tier::Silver => "SILVER",
            Tier::Gold => "GOLD",
            Tier::Platinum => "PLATINUM",
            Tier::Emerald => "EMERALD",
            Tier::Diamond => "DIAMOND",
            Tier::Master => "MASTER",
            Tier::Grandmaster => "GRANDMASTER",
            Tier::Challenger => "CHALLENGER",
        };
        f.write_str(name)
    }
}

/// Division inside a tier; `One` is the highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Division {
    One,
    Two,
    Three,
    Four,
}

impl Division {
    pub fn parse(raw: &str) -> Option<Division> {
        match raw.trim() {
            "I" => Some(Division::One),
            "II" => Some(Division::Two),
            "III" => Some(Division::Three),
            "IV" => Some(Division::Four),
            _ => None,
        }
    }

    fn strength(self) -> u8 {
        match self {
            Division::One => 4,
            Division::Two => 3,
            Division::Three => 2,
            Division::Four => 1,
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roman = match self {
            Division::One => "I",
            Division::Two => "II",
            Division::Three => "III",
            Division::Four => "IV",
        };
        f.write_str(roman)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerRank {
    Unranked,
    Ranked { tier: Tier, division: Division },
}

impl PlayerRank {
    pub fn tier(self) -> Option<Tier> {
        match self {
            PlayerRank::Ranked { tier, .. } => Some(tier),
            PlayerRank::Unranked => None,
        }
    }

    fn strength(self) -> (Option<Tier>, u8) {
        match self {
            PlayerRank::Unranked => (None, 0),
            PlayerRank::Ranked { tier, division } => (Some(tier), division.strength()),
        }
    }

    /// Best standing across every queue the player is placed in.
    pub fn best_of(entries: &[LeagueEntry]) -> PlayerRank {
        entries
            .iter()
            .filter_map(|entry| {
                let tier = Tier::parse(&entry.tier)?;
                let division = Division::parse(&entry.rank).unwrap_or(Division::One);
                Some(PlayerRank::Ranked { tier, division })
            })
            .max_by_key(|rank| rank.strength())
            .unwrap_or(PlayerRank::Unranked)
    }
}

impl fmt::Display for PlayerRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerRank::Unranked => f.write_str("UNRANKED"),
            PlayerRank::Ranked { tier, division } if tier.has_divisions() => {
                write!(f, "{} {}", tier, division)
            }
            PlayerRank::Ranked { tier, .. } => tier.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(queue: &str, tier: &str, rank: &str) -> LeagueEntry {
        LeagueEntry {
            queue_type: queue.to_string(),
            tier: tier.to_string(),
            rank: rank.to_string(),
        }
    }

    #[test]
    fn picks_highest_tier_across_queues() {
        let entries = vec![
            entry("RANKED_SOLO_5x5", "GOLD", "I"),
            entry("RANKED_FLEX_SR", "EMERALD", "IV"),
        ];
        assert_eq!(
            PlayerRank::best_of(&entries),
            PlayerRank::Ranked {
                tier: Tier::Emerald,
                division: Division::Four
            }
        );
    }

    #[test]
    fn same_tier_prefers_better_division() {
        let entries = vec![
            entry("RANKED_SOLO_5x5", "SILVER", "III"),
            entry("RANKED_FLEX_SR", "SILVER", "II"),
        ];
        assert_eq!(PlayerRank::best_of(&entries).to_string(), "SILVER II");
    }

    #[test]
    fn no_entries_is_unranked() {
        assert_eq!(PlayerRank::best_of(&[]), PlayerRank::Unranked);
        assert_eq!(PlayerRank::best_of(&[entry("CHERRY", "", "")]), PlayerRank::Unranked);
    }

    #[test]
    fn apex_tiers_render_without_division() {
        let rank = PlayerRank::best_of(&[entry("RANKED_SOLO_5x5", "MASTER", "I")]);
        assert_eq!(rank.to_string(), "MASTER");
    }
}
