use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Plus grand numéro tirable (univers 1-45).
pub const MAX_NUMBER: u8 = 45;

/// Nombre de numéros gagnants par tirage, hors bonus.
pub const PICK_COUNT: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombinationError {
    #[error("{0} numéros fournis, 6 attendus")]
    WrongLength(usize),
    #[error("Numéro {0} hors limites (1-45)")]
    OutOfRange(u8),
    #[error("Numéro en double : {0}")]
    Duplicate(u8),
    #[error("Numéro bonus {0} déjà présent parmi les numéros gagnants")]
    BonusInNumbers(u8),
}

/// Grille de 6 numéros distincts, toujours triée par ordre croissant.
///
/// Deux grilles contenant les mêmes numéros sont égales et ont le même hash,
/// quel que soit l'ordre de saisie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Combination([u8; PICK_COUNT]);

impl Combination {
    pub fn new(numbers: &[u8]) -> Result<Self, CombinationError> {
        if numbers.len() != PICK_COUNT {
            return Err(CombinationError::WrongLength(numbers.len()));
        }
        validate_numbers(numbers)?;

        let mut sorted = [0u8; PICK_COUNT];
        sorted.copy_from_slice(numbers);
        sorted.sort_unstable();
        Ok(Self(sorted))
    }

    /// `numbers` doit déjà être trié et sans doublon.
    #[cfg(any(test, feature = "test-util"))]
    pub(crate) fn from_sorted(numbers: [u8; PICK_COUNT]) -> Self {
        debug_assert!(numbers.windows(2).all(|w| w[0] < w[1]));
        Self(numbers)
    }

    pub fn numbers(&self) -> &[u8; PICK_COUNT] {
        &self.0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn contains(&self, number: u8) -> bool {
        self.0.binary_search(&number).is_ok()
    }

    /// Nombre de numéros partagés avec `other`.
    pub fn overlap(&self, other: &[u8]) -> usize {
        other.iter().filter(|&&n| self.contains(n)).count()
    }

    pub fn sum(&self) -> u32 {
        self.0.iter().map(|&n| n as u32).sum()
    }
}

impl TryFrom<Vec<u8>> for Combination {
    type Error = CombinationError;

    fn try_from(numbers: Vec<u8>) -> Result<Self, Self::Error> {
        Combination::new(&numbers)
    }
}

impl From<Combination> for Vec<u8> {
    fn from(combination: Combination) -> Self {
        combination.0.to_vec()
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|n| format!("{:2}", n)).collect();
        write!(f, "{}", parts.join(" - "))
    }
}

/// Un tirage officiel publié : 6 numéros gagnants et un numéro bonus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDrawRecord")]
pub struct DrawRecord {
    pub draw_no: u32,
    pub date: NaiveDate,
    pub numbers: Combination,
    pub bonus: u8,
}

#[derive(Deserialize)]
struct RawDrawRecord {
    draw_no: u32,
    date: NaiveDate,
    numbers: Vec<u8>,
    bonus: u8,
}

impl TryFrom<RawDrawRecord> for DrawRecord {
    type Error = CombinationError;

    fn try_from(raw: RawDrawRecord) -> Result<Self, Self::Error> {
        DrawRecord::new(raw.draw_no, raw.date, &raw.numbers, raw.bonus)
    }
}

impl DrawRecord {
    pub fn new(draw_no: u32, date: NaiveDate, numbers: &[u8], bonus: u8) -> Result<Self, CombinationError> {
        let numbers = Combination::new(numbers)?;
        if bonus < 1 || bonus > MAX_NUMBER {
            return Err(CombinationError::OutOfRange(bonus));
        }
        if numbers.contains(bonus) {
            return Err(CombinationError::BonusInNumbers(bonus));
        }
        Ok(Self { draw_no, date, numbers, bonus })
    }

    /// Les 7 numéros sortis : 6 gagnants puis le bonus.
    pub fn all_numbers(&self) -> [u8; PICK_COUNT + 1] {
        let mut all = [0u8; PICK_COUNT + 1];
        all[..PICK_COUNT].copy_from_slice(self.numbers.numbers());
        all[PICK_COUNT] = self.bonus;
        all
    }
}

fn validate_numbers(numbers: &[u8]) -> Result<(), CombinationError> {
    for &n in numbers {
        if n < 1 || n > MAX_NUMBER {
            return Err(CombinationError::OutOfRange(n));
        }
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                return Err(CombinationError::Duplicate(numbers[i]));
            }
        }
    }
    Ok(())
}
