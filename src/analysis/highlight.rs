use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::ranks::Tier;

/// Severity attached to a table cell. Drives both the ban weighting and the
/// colour a cell is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Highlight {
    #[default]
    Plain,
    Green,
    Blue,
    Yellow,
    Orange,
    Red,
}

/// How a cell escalates when its champion also shows up for a teammate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lattice {
    /// Game-count tables: orange -> red, blue -> yellow, plain -> green.
    Recency,
    /// Mastery table: orange -> red, plain -> yellow.
    Mastery,
}

impl Highlight {
    pub fn is_marked(self) -> bool {
        self != Highlight::Plain
    }

    pub fn escalate(self, lattice: Lattice) -> Highlight {
        match (lattice, self) {
            (_, Highlight::Orange) => Highlight::Red,
            (Lattice::Recency, Highlight::Blue) => Highlight::Yellow,
            (Lattice::Recency, Highlight::Plain) => Highlight::Green,
            (Lattice::Mastery, Highlight::Plain) => Highlight::Yellow,
            (_, other) => other,
        }
    }

    /// Weight applied to the base ban points of a cell. Shared champions are
    /// counted once per player, so the shared tiers weigh a little less than
    /// their unshared counterpart.
    pub fn ban_multiplier(self) -> f64 {
        match self {
            Highlight::Red => 1.75,
            Highlight::Orange => 2.0,
            Highlight::Yellow => 1.15,
            Highlight::Blue => 1.4,
            Highlight::Green => 0.75,
            Highlight::Plain => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCell {
    pub label: String,
    pub value: Option<u64>,
    pub highlight: Highlight,
}

impl ScoredCell {
    pub fn new(label: impl Into<String>, value: u64, highlight: Highlight) -> Self {
        ScoredCell {
            label: label.into(),
            value: Some(value),
            highlight,
        }
    }

    /// Padding row for players with fewer than N champions.
    pub fn empty() -> Self {
        ScoredCell {
            label: String::new(),
            value: None,
            highlight: Highlight::Plain,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_empty()
    }
}

/// One player's column of a rendered table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredColumn {
    pub title: String,
    pub title_tier: Option<Tier>,
    pub cells: Vec<ScoredCell>,
}

impl ScoredColumn {
    pub fn new(title: impl Into<String>, title_tier: Option<Tier>, cells: Vec<ScoredCell>) -> Self {
        ScoredColumn {
            title: title.into(),
            title_tier,
            cells,
        }
    }

    pub fn pad_to(&mut self, rows: usize) {
        while self.cells.len() < rows {
            self.cells.push(ScoredCell::empty());
        }
    }

    pub fn labels(&self) -> HashSet<&str> {
        self.cells
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| c.label.as_str())
            .collect()
    }
}

/// Escalates, once, every cell whose champion is listed by another column.
pub fn escalate_shared(columns: &mut [ScoredColumn], lattice: Lattice) {
    let label_sets: Vec<HashSet<String>> = columns
        .iter()
        .map(|c| c.labels().into_iter().map(str::to_owned).collect())
        .collect();

    for (idx, column) in columns.iter_mut().enumerate() {
        for cell in column.cells.iter_mut().filter(|c| !c.is_empty()) {
            let shared = label_sets
                .iter()
                .enumerate()
                .any(|(other, labels)| other != idx && labels.contains(&cell.label));
            if shared {
                cell.highlight = cell.highlight.escalate(lattice);
            }
        }
    }
}
