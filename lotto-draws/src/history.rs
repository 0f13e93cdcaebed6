use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::DrawRecord;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("Tirage n°{next} ajouté après le n°{previous} : l'historique doit rester croissant")]
    OutOfOrder { previous: u32, next: u32 },
}

/// Suite ordonnée des tirages passés, par `draw_no` croissant.
///
/// Uniquement en ajout : un tirage publié n'est jamais modifié ni retiré.
/// Les trous de numérotation sont tolérés.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawHistory")]
pub struct DrawHistory {
    draws: Vec<DrawRecord>,
}

/// Forme sérialisée, revalidée par `from_draws` au chargement.
#[derive(Deserialize)]
struct RawHistory {
    draws: Vec<DrawRecord>,
}

impl TryFrom<RawHistory> for DrawHistory {
    type Error = HistoryError;

    fn try_from(raw: RawHistory) -> Result<Self, Self::Error> {
        Self::from_draws(raw.draws)
    }
}

impl DrawHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_draws(draws: Vec<DrawRecord>) -> Result<Self, HistoryError> {
        let mut history = Self::with_capacity(draws.len());
        for draw in draws {
            history.push(draw)?;
        }
        Ok(history)
    }

    fn with_capacity(capacity: usize) -> Self {
        Self { draws: Vec::with_capacity(capacity) }
    }

    pub fn push(&mut self, draw: DrawRecord) -> Result<(), HistoryError> {
        if let Some(last) = self.draws.last() {
            if draw.draw_no <= last.draw_no {
                return Err(HistoryError::OutOfOrder {
                    previous: last.draw_no,
                    next: draw.draw_no,
                });
            }
        }
        self.draws.push(draw);
        Ok(())
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn latest(&self) -> Option<&DrawRecord> {
        self.draws.last()
    }

    /// Les `n` tirages les plus récents, toujours en ordre croissant.
    pub fn last_n(&self, n: usize) -> &[DrawRecord] {
        let start = self.draws.len().saturating_sub(n);
        &self.draws[start..]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DrawRecord> {
        self.draws.iter()
    }
}

impl<'a> IntoIterator for &'a DrawHistory {
    type Item = &'a DrawRecord;
    type IntoIter = std::slice::Iter<'a, DrawRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.draws.iter()
    }
}

#[cfg(any(test, feature = "test-util"))]
pub use self::synthetic::make_test_history;

#[cfg(any(test, feature = "test-util"))]
mod synthetic {
    use chrono::{Duration, NaiveDate};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::DrawHistory;
    use crate::models::{Combination, DrawRecord, MAX_NUMBER, PICK_COUNT};

    /// Historique synthétique reproductible : un tirage par semaine à partir du
    /// 7 décembre 2002, numéros tirés uniformément.
    pub fn make_test_history(n: usize, seed: u64) -> DrawHistory {
        let mut rng = StdRng::seed_from_u64(seed);
        let start = NaiveDate::from_ymd_opt(2002, 12, 7).unwrap_or_default();

        let draws = (0..n)
            .map(|i| {
                let picked = rand::seq::index::sample(&mut rng, MAX_NUMBER as usize, PICK_COUNT + 1);
                let mut numbers = [0u8; PICK_COUNT];
                for (slot, idx) in numbers.iter_mut().zip(picked.iter()) {
                    *slot = idx as u8 + 1;
                }
                numbers.sort_unstable();
                let bonus = picked.index(PICK_COUNT) as u8 + 1;
                DrawRecord {
                    draw_no: i as u32 + 1,
                    date: start + Duration::weeks(i as i64),
                    numbers: Combination::from_sorted(numbers),
                    bonus,
                }
            })
            .collect();

        DrawHistory { draws }
    }
}
