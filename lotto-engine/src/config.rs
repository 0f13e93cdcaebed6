use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Paramètres du moteur. Les barèmes de notation restent des constantes
/// dans `grader` et `search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Nombre minimal de tirages avant toute recommandation.
    pub min_history: usize,
    /// Fenêtre de la fréquence récente (104 tirages, environ deux ans).
    pub recent_window: usize,
    /// Nombre de tirages récents comparés par le filtre de quasi-doublons.
    pub near_duplicate_window: usize,
    /// Numéros communs à partir desquels un candidat est un quasi-doublon.
    pub near_duplicate_overlap: usize,
    pub iteration_budget: usize,
    /// Probabilité qu'un numéro du candidat vienne de l'échantillonneur pondéré
    /// plutôt que d'un tirage uniforme.
    pub weighted_draw_probability: f64,
    pub top_k: usize,
    /// Nombre de workers rayon pour la recherche (1 = séquentiel).
    pub shards: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_history: 60,
            recent_window: 104,
            near_duplicate_window: 30,
            near_duplicate_overlap: 4,
            iteration_budget: 5000,
            weighted_draw_probability: 0.6,
            top_k: 5,
            shards: 1,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let json = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(0.0..=1.0).contains(&self.weighted_draw_probability) {
            return Err(EngineError::Config(format!(
                "weighted_draw_probability doit être dans [0, 1] (reçu {})",
                self.weighted_draw_probability
            )));
        }
        if self.iteration_budget == 0 {
            return Err(EngineError::Config("iteration_budget doit être > 0".into()));
        }
        if self.top_k == 0 {
            return Err(EngineError::Config("top_k doit être > 0".into()));
        }
        if self.shards == 0 {
            return Err(EngineError::Config("shards doit être > 0".into()));
        }
        if self.recent_window == 0 {
            return Err(EngineError::Config("recent_window doit être > 0".into()));
        }
        if self.near_duplicate_overlap == 0 || self.near_duplicate_overlap > lotto_draws::PICK_COUNT {
            return Err(EngineError::Config(format!(
                "near_duplicate_overlap doit être dans [1, {}]",
                lotto_draws::PICK_COUNT
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.min_history, 60);
        assert_eq!(config.recent_window, 104);
        assert_eq!(config.iteration_budget, 5000);
        assert!((config.weighted_draw_probability - 0.6).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"iteration_budget": 800, "shards": 4}"#).unwrap();
        assert_eq!(config.iteration_budget, 800);
        assert_eq!(config.shards, 4);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.near_duplicate_window, 30);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            EngineConfig { weighted_draw_probability: 1.5, ..Default::default() },
            EngineConfig { iteration_budget: 0, ..Default::default() },
            EngineConfig { top_k: 0, ..Default::default() },
            EngineConfig { shards: 0, ..Default::default() },
            EngineConfig { near_duplicate_overlap: 7, ..Default::default() },
        ];
        for config in &bad {
            assert!(matches!(config.validate(), Err(EngineError::Config(_))), "{:?}", config);
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"top_k": 3, "weighted_draw_probability": 0.5}}"#).unwrap();
        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.top_k, 3);
        assert!((config.weighted_draw_probability - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ pas du json").unwrap();
        assert!(matches!(EngineConfig::load(file.path()), Err(EngineError::ConfigFormat(_))));
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = EngineConfig { shards: 8, ..Default::default() };
        let json = serde_json::to_string(&config).unwrap();
        let restored: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, config);
    }
}
