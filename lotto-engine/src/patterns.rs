use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use serde::Serialize;

use lotto_draws::Combination;

/// Rang attribué à une clé jamais observée : toujours dans la pire tranche.
pub const UNSEEN_RANK: usize = 99;

/// Taille des tiers de l'univers : 1-15, 16-30, 31-45.
const SECTION_WIDTH: u8 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OddEven {
    pub odd: u8,
    pub even: u8,
}

impl OddEven {
    pub fn of(combination: &Combination) -> Self {
        let odd = combination.numbers().iter().filter(|&&n| n % 2 == 1).count() as u8;
        Self { odd, even: combination.numbers().len() as u8 - odd }
    }
}

impl fmt::Display for OddEven {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.odd, self.even)
    }
}

/// Nombre de numéros par tiers (bas, milieu, haut), trié par ordre décroissant :
/// `[4, 2, 0]` couvre aussi bien 4 bas + 2 hauts que 2 bas + 4 milieux.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SectionProfile([u8; 3]);

impl SectionProfile {
    pub fn of(combination: &Combination) -> Self {
        let mut counts = [0u8; 3];
        for &n in combination.numbers() {
            let section = ((n - 1) / SECTION_WIDTH).min(2) as usize;
            counts[section] += 1;
        }
        counts.sort_unstable_by(|a, b| b.cmp(a));
        Self(counts)
    }

    pub fn counts(&self) -> &[u8; 3] {
        &self.0
    }
}

impl fmt::Display for SectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.0[0], self.0[1], self.0[2])
    }
}

/// Nombre de paires de numéros adjacents (`n` et `n + 1`) dans la grille.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ConsecutivePairs(pub u8);

impl ConsecutivePairs {
    pub fn of(combination: &Combination) -> Self {
        let pairs = combination.numbers().windows(2).filter(|w| w[1] == w[0] + 1).count();
        Self(pairs as u8)
    }
}

impl fmt::Display for ConsecutivePairs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}쌍", self.0)
    }
}

/// Valeur AC : nombre de différences absolues distinctes entre paires,
/// moins (taille - 1). Pour 6 numéros, entre 0 et 10.
pub fn ac_value(numbers: &[u8]) -> u8 {
    if numbers.len() < 2 {
        return 0;
    }
    let mut seen = [false; 256];
    let mut distinct = 0usize;
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            let diff = numbers[i].abs_diff(numbers[j]) as usize;
            if !seen[diff] {
                seen[diff] = true;
                distinct += 1;
            }
        }
    }
    distinct.saturating_sub(numbers.len() - 1) as u8
}

/// Comptage d'occurrences d'un motif sur l'historique.
#[derive(Debug, Clone)]
pub struct Distribution<K> {
    counts: HashMap<K, u32>,
}

impl<K> Default for Distribution<K> {
    fn default() -> Self {
        Self { counts: HashMap::new() }
    }
}

impl<K: Copy + Eq + Hash + Ord> Distribution<K> {
    pub fn increment(&mut self, key: K) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    pub fn count(&self, key: &K) -> u32 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    /// Entrées par nombre d'occurrences décroissant ; à égalité, par clé croissante
    /// pour que le classement soit stable.
    pub fn ranked(&self) -> Vec<(K, u32)> {
        let mut entries: Vec<(K, u32)> = self.counts.iter().map(|(&k, &c)| (k, c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries
    }

    /// Rang (1 = le plus fréquent) de `key`, ou `UNSEEN_RANK` si jamais observée.
    pub fn rank_of(&self, key: &K) -> usize {
        self.ranked()
            .iter()
            .position(|(k, _)| k == key)
            .map(|idx| idx + 1)
            .unwrap_or(UNSEEN_RANK)
    }
}
