mod display;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::StdRng;

use lotto_draws::import::load_csv;
use lotto_draws::{Combination, DrawHistory};
use lotto_engine::{EngineConfig, RecommendationService};

use crate::display::{
    display_draws, display_grade, display_import_summary, display_matches, display_quick_picks,
    display_recommendations, display_stats,
};

#[derive(Parser)]
#[command(name = "lotto", about = "Analyse des tirages Lotto 6/45 et recommandation de grilles")]
struct Cli {
    /// Historique des tirages (CSV : draw_no,date,n1..n6,bonus)
    #[arg(short, long, global = true, default_value = "data/lotto645.csv")]
    file: PathBuf,

    /// Paramètres du moteur (JSON), valeurs par défaut sinon
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lister les derniers tirages
    History {
        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: usize,
    },

    /// Afficher les statistiques de l'historique
    Stats {
        /// Nombre de numéros par tableau
        #[arg(short, long, default_value = "10")]
        top: usize,
    },

    /// Noter une grille de 6 numéros
    Grade {
        #[arg(required = true)]
        numbers: Vec<u8>,
    },

    /// Noter une grille et lister ses gains sur l'historique
    Check {
        #[arg(required = true)]
        numbers: Vec<u8>,
    },

    /// Recommander des grilles
    Recommend {
        /// Nombre de grilles
        #[arg(short, long, default_value = "1")]
        count: usize,

        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,

        /// Sortie JSON
        #[arg(long)]
        json: bool,
    },

    /// Tirage rapide pondéré par la fréquence
    QuickPick {
        #[arg(short, long, default_value = "1")]
        count: usize,

        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Configuration {:?} invalide", path))?,
        None => EngineConfig::default(),
    };
    let service = RecommendationService::new(config)?;
    let history = load_history(&cli.file)?;

    match cli.command {
        Command::History { last } => {
            display_draws(history.last_n(last));
            Ok(())
        }
        Command::Stats { top } => cmd_stats(&service, &history, top),
        Command::Grade { numbers } => cmd_grade(&service, &history, &numbers, false),
        Command::Check { numbers } => cmd_grade(&service, &history, &numbers, true),
        Command::Recommend { count, seed, json } => cmd_recommend(&service, &history, count, seed, json),
        Command::QuickPick { count, seed } => cmd_quick_pick(&service, &history, count, seed),
    }
}

fn load_history(path: &Path) -> Result<DrawHistory> {
    let (history, summary) = load_csv(path)?;
    display_import_summary(&summary);
    if history.is_empty() {
        bail!("Aucun tirage dans {:?}", path);
    }
    Ok(history)
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

fn cmd_stats(service: &RecommendationService, history: &DrawHistory, top: usize) -> Result<()> {
    let snapshot = service.snapshot(history);
    display_stats(&snapshot, top);
    Ok(())
}

fn cmd_grade(
    service: &RecommendationService,
    history: &DrawHistory,
    numbers: &[u8],
    with_matches: bool,
) -> Result<()> {
    let combination = Combination::new(numbers)?;
    let report = service.grade(history, combination.as_slice())?;
    display_grade(&combination, &report);
    if with_matches {
        display_matches(&history.matches(&combination));
    }
    Ok(())
}

fn cmd_recommend(
    service: &RecommendationService,
    history: &DrawHistory,
    count: usize,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let mut rng = make_rng(seed);
    let today = chrono::Local::now().date_naive();

    let pb = ProgressBar::new(count as u64);
    if json || count < 2 {
        pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
            .context("Modèle de barre de progression invalide")?
            .progress_chars("=> "),
    );

    let mut recommendations = Vec::with_capacity(count);
    for _ in 0..count {
        recommendations.push(service.recommend(history, today, &mut rng)?);
        pb.inc(1);
    }
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
    } else {
        display_recommendations(&recommendations);
    }
    Ok(())
}

fn cmd_quick_pick(
    service: &RecommendationService,
    history: &DrawHistory,
    count: usize,
    seed: Option<u64>,
) -> Result<()> {
    let mut rng = make_rng(seed);
    let picks = (0..count)
        .map(|_| service.quick_pick(history, &mut rng))
        .collect::<Result<Vec<_>, _>>()?;
    display_quick_picks(&picks);
    Ok(())
}
