use lotto_draws::CombinationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Grille invalide : {0}")]
    InvalidCombination(#[from] CombinationError),

    #[error("Historique insuffisant : {available} tirages disponibles, {required} requis")]
    InsufficientHistory { available: usize, required: usize },

    #[error("Table de poids rejetée par l'échantillonneur : {0}")]
    Sampling(#[from] rand::distr::weighted::Error),

    #[error("Configuration invalide : {0}")]
    Config(String),

    #[error("Lecture de la configuration impossible : {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("Configuration JSON illisible : {0}")]
    ConfigFormat(#[from] serde_json::Error),
}
