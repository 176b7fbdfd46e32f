use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

use super::champion_tables::ChampionTable;
use super::highlight::Highlight;

/// Points every listed champion starts from before its highlight weight.
pub const BASE_BAN_POINTS: f64 = 100.0;
/// Bonus shown on the two strongest rows of the final list.
pub const DISPLAY_BONUS: f64 = 1.1;

const RED_SHARE: f64 = 0.09;
const ORANGE_SHARE: f64 = 0.07;
const YELLOW_SHARE: f64 = 0.05;

#[derive(Debug, Clone, PartialEq)]
pub struct BanRecommendation {
    pub champion_name: String,
    pub score: f64,
    pub display_score: f64,
    pub highlight: Highlight,
}

/// Accumulated ban points per champion across every folded table.
#[derive(Debug, Clone, Default)]
pub struct BanRecommender {
    scores: HashMap<String, f64>,
}

impl BanRecommender {
    pub fn new() -> Self {
        BanRecommender::default()
    }

    pub fn cell_points(highlight: Highlight) -> f64 {
        round_points(BASE_BAN_POINTS * highlight.ban_multiplier())
    }

    /// Adds points for every listed champion of the table. Scores are never
    /// reset, so champions that show up in several tables climb the list.
    pub fn fold_table(&mut self, table: &ChampionTable) {
        for cell in table
            .columns
            .iter()
            .flat_map(|c| &c.cells)
            .filter(|c| !c.is_empty())
        {
            let points = Self::cell_points(cell.highlight);
            let entry = self.scores.entry(cell.label.clone()).or_insert(0.0);
            *entry = round_points(*entry + points);
        }
        debug!(kind = ?table.kind, champions = self.scores.len(), "Folded table into ban scores");
    }

    /// Highest scores first, ties by champion name, coloured by their share of
    /// the listed total.
    pub fn get_recommendations(&self, top_n: usize) -> Vec<BanRecommendation> {
        let mut ranked: Vec<(&String, f64)> = self.scores.iter().map(|(k, v)| (k, *v)).collect();
        ranked.sort_by(|a, b| match b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal) {
            Ordering::Equal => a.0.cmp(b.0),
            other => other,
        });
        ranked.truncate(top_n);

        let listed_total: f64 = ranked.iter().map(|(_, s)| s).sum();

        ranked
            .into_iter()
            .map(|(name, score)| {
                let highlight = share_highlight(score, listed_total);
                let display_score = match highlight {
                    Highlight::Red | Highlight::Orange => round_points(score * DISPLAY_BONUS),
                    _ => score,
                };
                BanRecommendation {
                    champion_name: name.clone(),
                    score,
                    display_score,
                    highlight,
                }
            })
            .collect()
    }
}

fn share_highlight(score: f64, listed_total: f64) -> Highlight {
    if score > listed_total * RED_SHARE {
        Highlight::Red
    } else if score > listed_total * ORANGE_SHARE {
        Highlight::Orange
    } else if score > listed_total * YELLOW_SHARE {
        Highlight::Yellow
    } else {
        Highlight::Plain
    }
}

fn round_points(points: f64) -> f64 {
    (points * 100.0).round() / 100.0
}
