use std::fmt;

use lotto_draws::Combination;

/// Sous-ensemble trié de `K` numéros, clé des tables de paires, triplets et
/// quadruplets. Égalité et hash structurels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Subset<const K: usize>([u8; K]);

pub type Pair = Subset<2>;
pub type Triplet = Subset<3>;
pub type Quadruplet = Subset<4>;

impl<const K: usize> Subset<K> {
    pub fn new(mut numbers: [u8; K]) -> Self {
        numbers.sort_unstable();
        Self(numbers)
    }

    pub fn numbers(&self) -> &[u8; K] {
        &self.0
    }
}

impl<const K: usize> fmt::Display for Subset<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|n| n.to_string()).collect();
        write!(f, "{}", parts.join("-"))
    }
}

/// Les C(6, K) sous-ensembles d'une grille, en ordre lexicographique.
pub fn subsets_of<const K: usize>(combination: &Combination) -> Subsets<'_, K> {
    Subsets::new(combination.as_slice())
}

pub struct Subsets<'a, const K: usize> {
    items: &'a [u8],
    indices: [usize; K],
    done: bool,
}

impl<'a, const K: usize> Subsets<'a, K> {
    /// `items` doit être trié pour que les clés produites soient canoniques.
    fn new(items: &'a [u8]) -> Self {
        Self {
            items,
            indices: std::array::from_fn(|j| j),
            done: K == 0 || K > items.len(),
        }
    }
}

impl<const K: usize> Iterator for Subsets<'_, K> {
    type Item = Subset<K>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let current: [u8; K] = std::array::from_fn(|j| self.items[self.indices[j]]);

        // Avance au prochain jeu d'indices : incrémente la position la plus à
        // droite qui n'a pas atteint son maximum, puis recale les suivantes.
        let n = self.items.len();
        let mut i = K;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.indices[i] != i + n - K {
                self.indices[i] += 1;
                for j in (i + 1)..K {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                break;
            }
        }

        Some(Subset(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn combo(numbers: &[u8]) -> Combination {
        Combination::new(numbers).unwrap()
    }

    #[test]
    fn test_subset_counts() {
        let c = combo(&[3, 12, 40, 7, 22, 31]);
        assert_eq!(subsets_of::<2>(&c).count(), 15);
        assert_eq!(subsets_of::<3>(&c).count(), 20);
        assert_eq!(subsets_of::<4>(&c).count(), 15);
        assert_eq!(subsets_of::<6>(&c).count(), 1);
    }

    #[test]
    fn test_subsets_distinct_and_sorted() {
        let c = combo(&[45, 1, 30, 2, 17, 9]);
        let quads: Vec<Quadruplet> = subsets_of::<4>(&c).collect();
        let unique: std::collections::HashSet<_> = quads.iter().collect();
        assert_eq!(unique.len(), quads.len());
        for q in &quads {
            assert!(q.numbers().windows(2).all(|w| w[0] < w[1]), "{} non trié", q);
        }
        assert_eq!(quads[0].numbers(), &[1, 2, 9, 17]);
        assert_eq!(quads[14].numbers(), &[9, 17, 30, 45]);
    }

    #[test]
    fn test_subset_key_order_independent() {
        assert_eq!(Pair::new([12, 3]), Pair::new([3, 12]));
        assert_eq!(Triplet::new([40, 3, 12]).to_string(), "3-12-40");
    }
}
