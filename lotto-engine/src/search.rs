use std::collections::HashSet;
use std::ops::RangeInclusive;

use chrono::Datelike;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

use lotto_draws::{Combination, DrawRecord, MAX_NUMBER, PICK_COUNT};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::patterns::ac_value;
use crate::sampler::{transition_probability, SamplingContext, WeightedSampler};
use crate::snapshot::AnalyticsSnapshot;

// Barème du score de recherche (indépendant de la note du `grader`)
const TRANSITION_POINTS: f64 = 5.0;
const TRANSITION_CAP: f64 = 35.0;
const SEASONAL_POINTS: f64 = 50.0;
const SEASONAL_CAP: f64 = 20.0;
const AC_THRESHOLD: u8 = 7;
const AC_BONUS: f64 = 20.0;
const SUM_RANGE: RangeInclusive<u32> = 80..=200;
const SUM_BONUS: f64 = 10.0;
/// Un numéro est « chaud » à partir de 2 apparitions sur la fenêtre récente.
const HOT_THRESHOLD: u32 = 2;
const HOT_COUNT: RangeInclusive<usize> = 1..=3;
const HOT_BONUS: f64 = 10.0;
const BASELINE: f64 = 5.0;
const MAX_CANDIDATE_SCORE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Origin {
    /// Choisie parmi les meilleurs survivants.
    Search,
    /// Aucun survivant : grille uniforme, non notée.
    Fallback,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub iterations: usize,
    pub survivors: usize,
    pub rejected_winning: usize,
    pub rejected_recent: usize,
}

impl SearchStats {
    fn merge(&mut self, other: &SearchStats) {
        self.iterations += other.iterations;
        self.survivors += other.survivors;
        self.rejected_winning += other.rejected_winning;
        self.rejected_recent += other.rejected_recent;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate {
    pub combination: Combination,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub combination: Combination,
    pub score: f64,
    pub origin: Origin,
    pub stats: SearchStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Winning,
    Recent,
}

/// Recherche Monte-Carlo bornée : tire des candidats, écarte les doublons
/// d'historique, note les survivants et tire au sort parmi les meilleurs.
pub struct RejectionSearch<'a> {
    snapshot: &'a AnalyticsSnapshot,
    sampler: &'a WeightedSampler,
    context: &'a SamplingContext,
    recent_draws: &'a [DrawRecord],
    config: &'a EngineConfig,
}

impl<'a> RejectionSearch<'a> {
    pub fn new(
        snapshot: &'a AnalyticsSnapshot,
        sampler: &'a WeightedSampler,
        context: &'a SamplingContext,
        recent_draws: &'a [DrawRecord],
        config: &'a EngineConfig,
    ) -> Self {
        Self { snapshot, sampler, context, recent_draws, config }
    }

    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SearchOutcome, EngineError> {
        let (survivors, stats) = if self.config.shards > 1 {
            self.explore_sharded(rng)?
        } else {
            self.explore(self.config.iteration_budget, rng)?
        };
        debug!(
            "Recherche : {} itérations, {} survivants, {} gagnants écartés, {} quasi-doublons écartés",
            stats.iterations, stats.survivors, stats.rejected_winning, stats.rejected_recent
        );
        self.select(survivors, stats, rng)
    }

    fn explore<R: Rng + ?Sized>(
        &self,
        budget: usize,
        rng: &mut R,
    ) -> Result<(Vec<ScoredCandidate>, SearchStats), EngineError> {
        let mut survivors = Vec::new();
        let mut stats = SearchStats::default();

        for _ in 0..budget {
            stats.iterations += 1;
            let candidate = self.draw_candidate(rng)?;
            match self.rejection(&candidate) {
                Some(Rejection::Winning) => stats.rejected_winning += 1,
                Some(Rejection::Recent) => stats.rejected_recent += 1,
                None => survivors.push(ScoredCandidate {
                    combination: candidate,
                    score: self.score(&candidate),
                }),
            }
        }

        stats.survivors = survivors.len();
        Ok((survivors, stats))
    }

    /// Répartit le budget entre `shards` workers rayon, chacun avec son propre
    /// générateur dérivé de `rng`. Les survivants sont fusionnés dans l'ordre
    /// des shards pour que la sélection reste reproductible.
    fn explore_sharded<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<(Vec<ScoredCandidate>, SearchStats), EngineError> {
        let shards = self.config.shards;
        let budget = self.config.iteration_budget;
        let plan: Vec<(u64, usize)> = (0..shards)
            .map(|i| (rng.random::<u64>(), budget / shards + usize::from(i < budget % shards)))
            .collect();

        let results: Vec<(Vec<ScoredCandidate>, SearchStats)> = plan
            .into_par_iter()
            .map(|(seed, shard_budget)| {
                let mut shard_rng = StdRng::seed_from_u64(seed);
                self.explore(shard_budget, &mut shard_rng)
            })
            .collect::<Result<_, _>>()?;

        let mut survivors = Vec::new();
        let mut stats = SearchStats::default();
        for (shard_survivors, shard_stats) in results {
            survivors.extend(shard_survivors);
            stats.merge(&shard_stats);
        }
        Ok((survivors, stats))
    }

    /// 6 numéros distincts ; chacun vient de l'échantillonneur pondéré avec
    /// la probabilité configurée, sinon d'un tirage uniforme.
    fn draw_candidate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Combination, EngineError> {
        let mut picked = [0u8; PICK_COUNT];
        let mut count = 0;
        while count < PICK_COUNT {
            let n = if rng.random_bool(self.config.weighted_draw_probability) {
                self.sampler.sample(rng)
            } else {
                rng.random_range(1..=MAX_NUMBER)
            };
            if !picked[..count].contains(&n) {
                picked[count] = n;
                count += 1;
            }
        }
        Ok(Combination::new(&picked)?)
    }

    fn rejection(&self, candidate: &Combination) -> Option<Rejection> {
        if self.snapshot.winning_combinations.contains(candidate) {
            return Some(Rejection::Winning);
        }
        let threshold = self.config.near_duplicate_overlap;
        if self
            .recent_draws
            .iter()
            .any(|draw| candidate.overlap(draw.numbers.as_slice()) >= threshold)
        {
            return Some(Rejection::Recent);
        }
        None
    }

    /// Score de plausibilité d'un candidat, dans [0, 100].
    pub fn score(&self, candidate: &Combination) -> f64 {
        let numbers = candidate.numbers();
        let previous = &self.context.previous_draw_numbers;

        let transition: f64 = numbers
            .iter()
            .map(|&n| transition_probability(self.snapshot, previous, n))
            .sum();
        let mut score = (transition * TRANSITION_POINTS).min(TRANSITION_CAP);

        if self.snapshot.history_len > 0 {
            let month0 = self.context.today.month0();
            let seasonal: f64 = numbers.iter().map(|&n| self.snapshot.seasonal_score(month0, n)).sum();
            score += (seasonal / self.snapshot.history_len as f64 * SEASONAL_POINTS).min(SEASONAL_CAP);
        }

        if ac_value(numbers) >= AC_THRESHOLD {
            score += AC_BONUS;
        }
        if SUM_RANGE.contains(&candidate.sum()) {
            score += SUM_BONUS;
        }
        let hot = numbers
            .iter()
            .filter(|&&n| self.snapshot.recent(n) >= HOT_THRESHOLD)
            .count();
        if HOT_COUNT.contains(&hot) {
            score += HOT_BONUS;
        }

        (score + BASELINE).clamp(0.0, MAX_CANDIDATE_SCORE)
    }

    fn select<R: Rng + ?Sized>(
        &self,
        mut survivors: Vec<ScoredCandidate>,
        stats: SearchStats,
        rng: &mut R,
    ) -> Result<SearchOutcome, EngineError> {
        survivors.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.combination.cmp(&b.combination))
        });
        let mut seen = HashSet::new();
        survivors.retain(|c| seen.insert(c.combination));

        let top = &survivors[..survivors.len().min(self.config.top_k)];
        if let Some(chosen) = top.choose(rng) {
            info!("Grille retenue {} (score {:.1}) parmi {} finalistes", chosen.combination, chosen.score, top.len());
            return Ok(SearchOutcome {
                combination: chosen.combination,
                score: chosen.score,
                origin: Origin::Search,
                stats,
            });
        }

        warn!("Aucun survivant après {} itérations : grille uniforme de repli", stats.iterations);
        Ok(SearchOutcome {
            combination: self.fallback(rng)?,
            score: 0.0,
            origin: Origin::Fallback,
            stats,
        })
    }

    /// Grille uniforme, toujours hors des combinaisons déjà gagnantes.
    fn fallback<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Combination, EngineError> {
        loop {
            let picked: Vec<u8> = rand::seq::index::sample(rng, MAX_NUMBER as usize, PICK_COUNT)
                .iter()
                .map(|i| i as u8 + 1)
                .collect();
            let candidate = Combination::new(&picked)?;
            if !self.snapshot.winning_combinations.contains(&candidate) {
                return Ok(candidate);
            }
        }
    }
}

/// Construit l'échantillonneur puis lance la recherche. Échoue si
/// l'instantané provient d'un historique vide.
pub fn recommend<R: Rng + ?Sized>(
    snapshot: &AnalyticsSnapshot,
    context: &SamplingContext,
    recent_draws: &[DrawRecord],
    config: &EngineConfig,
    rng: &mut R,
) -> Result<SearchOutcome, EngineError> {
    if snapshot.is_empty() {
        return Err(EngineError::InsufficientHistory {
            available: 0,
            required: config.min_history,
        });
    }
    let sampler = WeightedSampler::build(snapshot, context)?;
    RejectionSearch::new(snapshot, &sampler, context, recent_draws, config).run(rng)
}
