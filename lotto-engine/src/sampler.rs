use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use rand::distr::weighted::WeightedIndex;
use rand::prelude::Distribution;
use rand::Rng;

use lotto_draws::{MAX_NUMBER, PICK_COUNT};

use crate::error::EngineError;
use crate::snapshot::AnalyticsSnapshot;

const POOL: usize = MAX_NUMBER as usize;

const TRANSITION_SCALE: f64 = 40.0;
const SEASONAL_FACTOR: f64 = 0.3;
const DUE_BOOST: f64 = 3.0;
/// Retard (en tirages) pour lequel un numéro est considéré « dû ».
const DUE_GAP: RangeInclusive<u32> = 5..=15;
const BASELINE_WEIGHT: f64 = 1.0;

/// Contexte d'échantillonnage : le tirage immédiatement précédent et la date du jour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingContext {
    pub previous_draw_numbers: [u8; PICK_COUNT + 1],
    pub today: NaiveDate,
}

impl SamplingContext {
    pub fn new(previous_draw_numbers: [u8; PICK_COUNT + 1], today: NaiveDate) -> Self {
        Self { previous_draw_numbers, today }
    }

    /// Contexte bâti sur le dernier tirage de l'instantané, `None` s'il est vide.
    pub fn from_snapshot(snapshot: &AnalyticsSnapshot, today: NaiveDate) -> Option<Self> {
        snapshot.latest_draw_numbers.map(|previous| Self::new(previous, today))
    }
}

/// Somme sur les numéros précédents `p` de `(k/T) · 40 · ln(k+1)`.
pub fn transition_weight(snapshot: &AnalyticsSnapshot, previous: &[u8], n: u8) -> f64 {
    previous
        .iter()
        .map(|&p| {
            let (k, total) = snapshot.transition(p, n);
            if k == 0 || total == 0 {
                return 0.0;
            }
            (k as f64 / total as f64) * TRANSITION_SCALE * ((k + 1) as f64).ln()
        })
        .sum()
}

/// Somme sur les numéros précédents `p` de la probabilité empirique `k/T`.
pub fn transition_probability(snapshot: &AnalyticsSnapshot, previous: &[u8], n: u8) -> f64 {
    previous
        .iter()
        .map(|&p| {
            let (k, total) = snapshot.transition(p, n);
            if total == 0 { 0.0 } else { k as f64 / total as f64 }
        })
        .sum()
}

/// Distribution de tirage par numéro, strictement positive sur 1..=45.
#[derive(Debug, Clone)]
pub struct WeightedSampler {
    weights: [f64; POOL],
    index: WeightedIndex<f64>,
}

impl WeightedSampler {
    pub fn build(snapshot: &AnalyticsSnapshot, context: &SamplingContext) -> Result<Self, EngineError> {
        let month0 = context.today.month0();
        let mut weights = [0.0f64; POOL];

        for (i, weight) in weights.iter_mut().enumerate() {
            let n = i as u8 + 1;
            let mut w = transition_weight(snapshot, &context.previous_draw_numbers, n);
            w += SEASONAL_FACTOR * snapshot.seasonal_score(month0, n);
            if DUE_GAP.contains(&snapshot.gap_of(n)) {
                w += DUE_BOOST;
            }
            *weight = if w > 0.0 { w } else { BASELINE_WEIGHT };
        }

        Self::from_weights(weights)
    }

    pub fn from_weights(weights: [f64; POOL]) -> Result<Self, EngineError> {
        let index = WeightedIndex::new(weights.iter().copied())?;
        Ok(Self { weights, index })
    }

    pub fn weights(&self) -> &[f64; POOL] {
        &self.weights
    }

    pub fn weight(&self, n: u8) -> f64 {
        self.weights[(n - 1) as usize]
    }

    /// Un numéro de 1 à 45, proportionnellement à son poids.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u8 {
        self.index.sample(rng) as u8 + 1
    }
}
