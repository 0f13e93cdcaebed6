use std::collections::{HashMap, HashSet};

use chrono::Datelike;
use log::{debug, info};
use rand::distr::weighted::WeightedIndex;

use lotto_draws::{Combination, DrawHistory, MAX_NUMBER, PICK_COUNT};

use crate::error::EngineError;
use crate::patterns::{ConsecutivePairs, Distribution, OddEven, SectionProfile};
use crate::subsets::{subsets_of, Pair, Quadruplet, Triplet};

const POOL: usize = MAX_NUMBER as usize;

/// Poids mensuel : même mois que la date courante.
const SAME_MONTH_WEIGHT: f64 = 3.0;
/// Poids mensuel : autre mois de la même saison.
const SAME_SEASON_WEIGHT: f64 = 1.0;

#[inline]
fn idx(n: u8) -> usize {
    (n - 1) as usize
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SumStats {
    pub mean: f64,
    pub std_dev: f64,
}

/// Empreintes statistiques de l'historique, calculées en une passe.
///
/// Les tableaux par numéro sont indexés par `numéro - 1`.
#[derive(Debug, Clone)]
pub struct AnalyticsSnapshot {
    pub history_len: usize,
    /// Occurrences (6 gagnants + bonus), lissées : chaque numéro vaut au moins 1.
    pub number_frequency: [u32; POOL],
    /// Mêmes occurrences avant lissage.
    pub observed_frequency: [u32; POOL],
    pub recent_frequency: [u32; POOL],
    pub last_seen: [u32; POOL],
    pub gap: [u32; POOL],
    pub pair_frequency: HashMap<Pair, u32>,
    pub triplet_frequency: HashMap<Triplet, u32>,
    pub quadruplet_last_seen: HashMap<Quadruplet, u32>,
    pub sum_stats: SumStats,
    pub odd_even: Distribution<OddEven>,
    pub sections: Distribution<SectionProfile>,
    pub consecutive: Distribution<ConsecutivePairs>,
    pub latest_draw_no: u32,
    /// 6 gagnants + bonus du dernier tirage.
    pub latest_draw_numbers: Option<[u8; PICK_COUNT + 1]>,
    pub winning_combinations: HashSet<Combination>,
    /// `transitions[p][n]` : nombre de fois où `n` est sorti au tirage suivant
    /// un tirage contenant `p` (7 numéros de part et d'autre).
    pub transitions: Vec<[u32; POOL]>,
    /// Apparitions de `p` dans un tirage qui a un successeur.
    pub predecessor_count: [u32; POOL],
    /// Occurrences des 6 gagnants par mois calendaire (`month0`).
    pub monthly_frequency: [[u32; POOL]; 12],
}

impl AnalyticsSnapshot {
    fn empty() -> Self {
        Self {
            history_len: 0,
            number_frequency: [0; POOL],
            observed_frequency: [0; POOL],
            recent_frequency: [0; POOL],
            last_seen: [0; POOL],
            gap: [0; POOL],
            pair_frequency: HashMap::new(),
            triplet_frequency: HashMap::new(),
            quadruplet_last_seen: HashMap::new(),
            sum_stats: SumStats::default(),
            odd_even: Distribution::default(),
            sections: Distribution::default(),
            consecutive: Distribution::default(),
            latest_draw_no: 0,
            latest_draw_numbers: None,
            winning_combinations: HashSet::new(),
            transitions: vec![[0; POOL]; POOL],
            predecessor_count: [0; POOL],
            monthly_frequency: [[0; POOL]; 12],
        }
    }

    /// Construit l'empreinte en une passe croissante sur `history`.
    ///
    /// Un historique vide donne un instantané vide (`latest_draw_no == 0`,
    /// tables vides) plutôt qu'une erreur : c'est à l'appelant de détecter
    /// le manque de données.
    pub fn build(history: &DrawHistory, recent_window: usize) -> Self {
        let mut snapshot = Self::empty();
        let draws = history.draws();
        let Some(latest) = draws.last() else {
            debug!("Historique vide : instantané vide");
            return snapshot;
        };

        let recent_start = draws.len().saturating_sub(recent_window);
        let mut sums: Vec<f64> = Vec::with_capacity(draws.len());
        let mut previous: Option<[u8; PICK_COUNT + 1]> = None;

        for (i, draw) in draws.iter().enumerate() {
            let all = draw.all_numbers();

            for &n in &all {
                snapshot.observed_frequency[idx(n)] += 1;
                snapshot.last_seen[idx(n)] = draw.draw_no;
                if i >= recent_start {
                    snapshot.recent_frequency[idx(n)] += 1;
                }
            }

            let month = draw.date.month0() as usize;
            for &n in draw.numbers.numbers() {
                snapshot.monthly_frequency[month][idx(n)] += 1;
            }

            if let Some(prev) = previous {
                for &p in &prev {
                    snapshot.predecessor_count[idx(p)] += 1;
                    for &n in &all {
                        snapshot.transitions[idx(p)][idx(n)] += 1;
                    }
                }
            }
            previous = Some(all);

            sums.push(draw.numbers.sum() as f64);
            snapshot.odd_even.increment(OddEven::of(&draw.numbers));
            snapshot.sections.increment(SectionProfile::of(&draw.numbers));
            snapshot.consecutive.increment(ConsecutivePairs::of(&draw.numbers));

            for pair in subsets_of::<2>(&draw.numbers) {
                *snapshot.pair_frequency.entry(pair).or_insert(0) += 1;
            }
            for triplet in subsets_of::<3>(&draw.numbers) {
                *snapshot.triplet_frequency.entry(triplet).or_insert(0) += 1;
            }
            for quad in subsets_of::<4>(&draw.numbers) {
                snapshot.quadruplet_last_seen.insert(quad, draw.draw_no);
            }

            snapshot.winning_combinations.insert(draw.numbers);
        }

        snapshot.history_len = draws.len();
        snapshot.latest_draw_no = latest.draw_no;
        snapshot.latest_draw_numbers = Some(latest.all_numbers());

        // Lissage : aucun numéro ne doit avoir un poids nul
        snapshot.number_frequency = snapshot.observed_frequency;
        for freq in &mut snapshot.number_frequency {
            if *freq == 0 {
                *freq = 1;
            }
        }

        for i in 0..POOL {
            snapshot.gap[i] = snapshot.latest_draw_no.saturating_sub(snapshot.last_seen[i]);
        }

        snapshot.sum_stats = population_stats(&sums);

        info!(
            "Instantané construit : {} tirages, dernier n°{}, somme moyenne {:.1} (σ={:.2})",
            snapshot.history_len, snapshot.latest_draw_no, snapshot.sum_stats.mean, snapshot.sum_stats.std_dev
        );
        snapshot
    }

    pub fn is_empty(&self) -> bool {
        self.history_len == 0
    }

    pub fn frequency(&self, n: u8) -> u32 {
        self.number_frequency[idx(n)]
    }

    pub fn recent(&self, n: u8) -> u32 {
        self.recent_frequency[idx(n)]
    }

    pub fn gap_of(&self, n: u8) -> u32 {
        self.gap[idx(n)]
    }

    pub fn pair_count(&self, a: u8, b: u8) -> u32 {
        self.pair_frequency.get(&Pair::new([a, b])).copied().unwrap_or(0)
    }

    pub fn triplet_count(&self, a: u8, b: u8, c: u8) -> u32 {
        self.triplet_frequency.get(&Triplet::new([a, b, c])).copied().unwrap_or(0)
    }

    /// `(k, T)` : `n` a suivi `p` `k` fois sur les `T` apparitions de `p`
    /// suivies d'un autre tirage.
    pub fn transition(&self, p: u8, n: u8) -> (u32, u32) {
        (self.transitions[idx(p)][idx(n)], self.predecessor_count[idx(p)])
    }

    /// Score saisonnier cumulé de `n` pour le mois `month0` (0 = janvier) :
    /// +3 par apparition un même mois, +1 un autre mois de la même saison.
    pub fn seasonal_score(&self, month0: u32, n: u8) -> f64 {
        let month = month0 as usize % 12;
        let season = season_of(month);
        (0..12)
            .filter(|&m| season_of(m) == season)
            .map(|m| {
                let weight = if m == month { SAME_MONTH_WEIGHT } else { SAME_SEASON_WEIGHT };
                weight * self.monthly_frequency[m][idx(n)] as f64
            })
            .sum()
    }

    /// Table de tirage pondérée par la fréquence lissée (réservoir pondéré).
    pub fn weighted_pool(&self) -> Result<WeightedIndex<u32>, EngineError> {
        Ok(WeightedIndex::new(self.number_frequency.iter().copied())?)
    }

    /// Numéros triés par fréquence décroissante (à égalité, le plus petit d'abord).
    pub fn by_frequency(&self) -> Vec<(u8, u32)> {
        let mut entries: Vec<(u8, u32)> = (1..=MAX_NUMBER).map(|n| (n, self.frequency(n))).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries
    }
}

/// Hiver = déc-fév, printemps = mars-mai, été = juin-août, automne = sept-nov.
fn season_of(month0: usize) -> usize {
    ((month0 + 1) % 12) / 3
}

fn population_stats(values: &[f64]) -> SumStats {
    if values.is_empty() {
        return SumStats::default();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    SumStats { mean, std_dev: variance.sqrt() }
}
