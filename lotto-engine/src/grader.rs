use std::fmt;

use log::debug;
use serde::Serialize;

use lotto_draws::Combination;

use crate::patterns::{ConsecutivePairs, OddEven, SectionProfile};
use crate::snapshot::AnalyticsSnapshot;
use crate::subsets::subsets_of;

const BASE_SCORE: i32 = 70;
const MIN_SCORE: i32 = 0;
const MAX_SCORE: i32 = 200;

/// Un quadruplet revu depuis moins de 156 tirages (environ 3 ans) est pénalisé
/// lourdement.
const QUADRUPLET_RECENCY: u32 = 156;
const RECENT_QUADRUPLET_PENALTY: i32 = -150;
const OLD_QUADRUPLET_PENALTY: i32 = -40;

/// Niveau ordinal affiché, du pire au meilleur. Seul le score fait foi.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Grade {
    Low,
    LowerMiddle,
    Average,
    Middle,
    UpperMiddle,
    High,
    Top,
}

impl Grade {
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 180 => Grade::Top,
            s if s >= 150 => Grade::High,
            s if s >= 120 => Grade::UpperMiddle,
            s if s >= 90 => Grade::Middle,
            s if s >= 60 => Grade::Average,
            s if s >= 20 => Grade::LowerMiddle,
            _ => Grade::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Grade::Low => "하",
            Grade::LowerMiddle => "중하",
            Grade::Average => "보통",
            Grade::Middle => "중",
            Grade::UpperMiddle => "중상",
            Grade::High => "상",
            Grade::Top => "최상",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Contribution de chaque terme au score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    /// `None` quand l'écart-type des sommes est nul (terme ignoré).
    pub sum: Option<i32>,
    pub consecutive: i32,
    pub odd_even: i32,
    pub section: i32,
    pub quadruplet: i32,
}

impl ScoreBreakdown {
    fn total(&self) -> i32 {
        BASE_SCORE + self.sum.unwrap_or(0) + self.consecutive + self.odd_even + self.section + self.quadruplet
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GradeReport {
    pub score: i32,
    pub grade: Grade,
    pub breakdown: ScoreBreakdown,
}

/// Note une grille face aux empreintes de l'historique. Pure et déterministe.
pub fn grade(combination: &Combination, snapshot: &AnalyticsSnapshot) -> GradeReport {
    let breakdown = ScoreBreakdown {
        sum: sum_term(combination, snapshot),
        consecutive: consecutive_term(snapshot.consecutive.rank_of(&ConsecutivePairs::of(combination))),
        odd_even: odd_even_term(snapshot.odd_even.rank_of(&OddEven::of(combination))),
        section: section_term(snapshot.sections.rank_of(&SectionProfile::of(combination))),
        quadruplet: quadruplet_term(combination, snapshot),
    };
    let score = breakdown.total().clamp(MIN_SCORE, MAX_SCORE);
    GradeReport { score, grade: Grade::from_score(score), breakdown }
}

fn sum_term(combination: &Combination, snapshot: &AnalyticsSnapshot) -> Option<i32> {
    let stats = snapshot.sum_stats;
    if stats.std_dev <= 0.0 {
        debug!("Écart-type des sommes nul : terme de somme ignoré");
        return None;
    }
    let deviation = (combination.sum() as f64 - stats.mean).abs();
    let points = if deviation <= stats.std_dev {
        35
    } else if deviation <= 2.0 * stats.std_dev {
        15
    } else {
        -20
    };
    Some(points)
}

fn consecutive_term(rank: usize) -> i32 {
    match rank {
        1 => 20,
        2 => 10,
        _ => -15,
    }
}

fn odd_even_term(rank: usize) -> i32 {
    match rank {
        1 => 30,
        2 | 3 => 15,
        4 => -10,
        _ => -20,
    }
}

fn section_term(rank: usize) -> i32 {
    match rank {
        1 => 45,
        2..=3 => 20,
        4..=6 => 0,
        _ => -20,
    }
}

/// Le pire cas l'emporte : un seul quadruplet récent suffit à appliquer -150.
/// Des quadruplets uniquement anciens donnent un plancher unique de -40.
fn quadruplet_term(combination: &Combination, snapshot: &AnalyticsSnapshot) -> i32 {
    let mut penalty = 0;
    for quad in subsets_of::<4>(combination) {
        if let Some(&last_seen) = snapshot.quadruplet_last_seen.get(&quad) {
            if snapshot.latest_draw_no.saturating_sub(last_seen) < QUADRUPLET_RECENCY {
                return RECENT_QUADRUPLET_PENALTY;
            }
            penalty = OLD_QUADRUPLET_PENALTY;
        }
    }
    penalty
}
