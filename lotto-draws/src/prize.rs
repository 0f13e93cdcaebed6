use std::fmt;

use serde::{Deserialize, Serialize};

use crate::history::DrawHistory;
use crate::models::{Combination, DrawRecord};

/// Rang de gain d'une grille face à un tirage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrizeTier {
    /// 6 bons numéros
    First,
    /// 5 bons numéros + bonus
    Second,
    Third,
    Fourth,
    Fifth,
}

impl PrizeTier {
    pub fn evaluate(combination: &Combination, draw: &DrawRecord) -> Option<Self> {
        let hits = combination.overlap(draw.numbers.as_slice());
        match hits {
            6 => Some(PrizeTier::First),
            5 if combination.contains(draw.bonus) => Some(PrizeTier::Second),
            5 => Some(PrizeTier::Third),
            4 => Some(PrizeTier::Fourth),
            3 => Some(PrizeTier::Fifth),
            _ => None,
        }
    }
}

impl fmt::Display for PrizeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrizeTier::First => write!(f, "1등"),
            PrizeTier::Second => write!(f, "2등"),
            PrizeTier::Third => write!(f, "3등"),
            PrizeTier::Fourth => write!(f, "4등"),
            PrizeTier::Fifth => write!(f, "5등"),
        }
    }
}

impl DrawHistory {
    /// Tous les tirages passés où `combination` aurait été gagnante,
    /// du plus ancien au plus récent.
    pub fn matches(&self, combination: &Combination) -> Vec<(u32, PrizeTier)> {
        self.iter()
            .filter_map(|draw| PrizeTier::evaluate(combination, draw).map(|tier| (draw.draw_no, tier)))
            .collect()
    }
}
