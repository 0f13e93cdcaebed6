use std::sync::{Arc, PoisonError, RwLock};

use chrono::NaiveDate;
use log::{debug, info};
use rand::distr::Distribution;
use rand::Rng;
use serde::Serialize;

use lotto_draws::{Combination, DrawHistory, PICK_COUNT};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::grader::{self, GradeReport};
use crate::sampler::SamplingContext;
use crate::search::{self, Origin, SearchStats};
use crate::snapshot::AnalyticsSnapshot;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub combination: Combination,
    /// Score de recherche dans [0, 100], 0 pour une grille de repli.
    pub score: f64,
    pub origin: Origin,
    pub grade: GradeReport,
    pub stats: SearchStats,
}

/// Point d'entrée du moteur : note et recommande des grilles à partir d'un
/// historique, en réutilisant l'instantané tant que l'historique n'a pas changé.
///
/// Le cache appartient à l'instance ; l'instantané est reconstruit hors du
/// verrou puis remplacé d'un bloc, les lectures en cours gardent l'ancien `Arc`.
pub struct RecommendationService {
    config: EngineConfig,
    cache: RwLock<Option<Arc<AnalyticsSnapshot>>>,
}

impl RecommendationService {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config, cache: RwLock::new(None) })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Instantané de `history`, depuis le cache si la longueur et le dernier
    /// tirage n'ont pas bougé.
    pub fn snapshot(&self, history: &DrawHistory) -> Arc<AnalyticsSnapshot> {
        let key = (history.len(), history.latest().map_or(0, |d| d.draw_no));

        if let Some(cached) = self.cache.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
            if (cached.history_len, cached.latest_draw_no) == key {
                debug!("Instantané en cache ({} tirages, dernier n°{})", key.0, key.1);
                return Arc::clone(cached);
            }
        }

        let fresh = Arc::new(AnalyticsSnapshot::build(history, self.config.recent_window));
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&fresh));
        fresh
    }

    pub fn invalidate(&self) {
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn grade(&self, history: &DrawHistory, numbers: &[u8]) -> Result<GradeReport, EngineError> {
        let combination = Combination::new(numbers)?;
        Ok(grader::grade(&combination, &self.snapshot(history)))
    }

    /// Recommande une grille pour le tirage suivant `history`, en date de `today`.
    pub fn recommend<R: Rng + ?Sized>(
        &self,
        history: &DrawHistory,
        today: NaiveDate,
        rng: &mut R,
    ) -> Result<Recommendation, EngineError> {
        let insufficient = EngineError::InsufficientHistory {
            available: history.len(),
            required: self.config.min_history,
        };
        if history.len() < self.config.min_history || history.is_empty() {
            return Err(insufficient);
        }

        let snapshot = self.snapshot(history);
        let context = SamplingContext::from_snapshot(&snapshot, today).ok_or(insufficient)?;
        let recent = history.last_n(self.config.near_duplicate_window);
        let outcome = search::recommend(&snapshot, &context, recent, &self.config, rng)?;
        let grade = grader::grade(&outcome.combination, &snapshot);

        info!(
            "Recommandation {} : score {:.1}, note {} ({:?})",
            outcome.combination, outcome.score, grade.grade, outcome.origin
        );
        Ok(Recommendation {
            combination: outcome.combination,
            score: outcome.score,
            origin: outcome.origin,
            grade,
            stats: outcome.stats,
        })
    }

    /// Tirage rapide pondéré par la fréquence lissée, sans contrainte de rejet.
    pub fn quick_pick<R: Rng + ?Sized>(
        &self,
        history: &DrawHistory,
        rng: &mut R,
    ) -> Result<Combination, EngineError> {
        if history.is_empty() {
            return Err(EngineError::InsufficientHistory { available: 0, required: 1 });
        }
        let pool = self.snapshot(history).weighted_pool()?;
        let mut picked = Vec::with_capacity(PICK_COUNT);
        while picked.len() < PICK_COUNT {
            let n = pool.sample(rng) as u8 + 1;
            if !picked.contains(&n) {
                picked.push(n);
            }
        }
        Ok(Combination::new(&picked)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotto_draws::history::make_test_history;
    use lotto_draws::DrawRecord;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn fast_config() -> EngineConfig {
        EngineConfig { iteration_budget: 600, ..Default::default() }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = EngineConfig { top_k: 0, ..Default::default() };
        assert!(matches!(RecommendationService::new(config), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_snapshot_is_cached() {
        let service = RecommendationService::new(fast_config()).unwrap();
        let history = make_test_history(80, 1);
        let a = service.snapshot(&history);
        let b = service.snapshot(&history);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_snapshot_rebuilt_when_history_grows() {
        let service = RecommendationService::new(fast_config()).unwrap();
        let mut history = make_test_history(80, 1);
        let before = service.snapshot(&history);

        let latest = history.latest().unwrap().clone();
        let next = DrawRecord::new(
            latest.draw_no + 1,
            latest.date + chrono::Duration::weeks(1),
            &[3, 11, 19, 27, 35, 43],
            44,
        )
        .unwrap();
        history.push(next).unwrap();

        let after = service.snapshot(&history);
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.history_len, 81);
        assert_eq!(before.history_len, 80, "l'ancien instantané n'est pas modifié");
    }

    #[test]
    fn test_invalidate() {
        let service = RecommendationService::new(fast_config()).unwrap();
        let history = make_test_history(70, 2);
        let a = service.snapshot(&history);
        service.invalidate();
        let b = service.snapshot(&history);
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.history_len, b.history_len);
    }

    #[test]
    fn test_grade_rejects_malformed_input() {
        let service = RecommendationService::new(fast_config()).unwrap();
        let history = make_test_history(70, 2);
        assert!(matches!(
            service.grade(&history, &[1, 2, 3, 4, 5]),
            Err(EngineError::InvalidCombination(_))
        ));
        assert!(matches!(
            service.grade(&history, &[1, 2, 3, 4, 5, 46]),
            Err(EngineError::InvalidCombination(_))
        ));
        assert!(matches!(
            service.grade(&history, &[1, 2, 3, 4, 5, 5]),
            Err(EngineError::InvalidCombination(_))
        ));
    }

    #[test]
    fn test_grade_ignores_input_order() {
        let service = RecommendationService::new(fast_config()).unwrap();
        let history = make_test_history(120, 4);
        let a = service.grade(&history, &[40, 3, 22, 9, 31, 15]).unwrap();
        let b = service.grade(&history, &[3, 9, 15, 22, 31, 40]).unwrap();
        assert_eq!(a, b);
        assert!((0..=200).contains(&a.score));
    }

    #[test]
    fn test_recommend_requires_min_history() {
        let service = RecommendationService::new(fast_config()).unwrap();
        let history = make_test_history(59, 5);
        let mut rng = StdRng::seed_from_u64(0);
        let result = service.recommend(&history, today(), &mut rng);
        assert!(matches!(
            result,
            Err(EngineError::InsufficientHistory { available: 59, required: 60 })
        ));
        // aucun instantané construit
        assert!(service.cache.read().unwrap().is_none());
    }

    #[test]
    fn test_recommend_result() {
        let service = RecommendationService::new(fast_config()).unwrap();
        let history = make_test_history(120, 6);
        let mut rng = StdRng::seed_from_u64(42);
        let rec = service.recommend(&history, today(), &mut rng).unwrap();

        let snapshot = service.snapshot(&history);
        assert!(!snapshot.winning_combinations.contains(&rec.combination));
        assert_eq!(rec.grade, grader::grade(&rec.combination, &snapshot));
        assert!((0.0..=100.0).contains(&rec.score));
        assert_eq!(rec.stats.iterations, 600);
    }

    #[test]
    fn test_quick_pick() {
        let service = RecommendationService::new(fast_config()).unwrap();
        let history = make_test_history(30, 7);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let c = service.quick_pick(&history, &mut rng).unwrap();
            assert!(c.numbers().windows(2).all(|w| w[0] < w[1]));
        }
        assert!(matches!(
            service.quick_pick(&DrawHistory::new(), &mut rng),
            Err(EngineError::InsufficientHistory { .. })
        ));
    }

    #[test]
    fn test_service_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RecommendationService>();
    }
}
