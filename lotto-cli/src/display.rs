use std::fmt::Display;
use std::hash::Hash;

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use lotto_draws::import::ImportSummary;
use lotto_draws::{Combination, DrawRecord, PrizeTier, MAX_NUMBER};
use lotto_engine::grader::Grade;
use lotto_engine::patterns::Distribution;
use lotto_engine::search::Origin;
use lotto_engine::{AnalyticsSnapshot, GradeReport, Recommendation};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn grade_color(grade: Grade) -> Color {
    match grade {
        Grade::Top | Grade::High => Color::Green,
        Grade::UpperMiddle | Grade::Middle => Color::White,
        Grade::Average | Grade::LowerMiddle => Color::Yellow,
        Grade::Low => Color::Red,
    }
}

pub fn display_import_summary(summary: &ImportSummary) {
    log::info!(
        "Import : {} lignes, {} tirages, {} doublons, {} erreurs",
        summary.total_records, summary.imported, summary.duplicates, summary.errors
    );
    if summary.errors > 0 {
        println!("⚠ {} ligne(s) invalide(s) ignorée(s) à l'import", summary.errors);
    }
}

pub fn display_draws(draws: &[DrawRecord]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = new_table(vec!["Tirage", "Date", "Numéros", "Bonus"]);
    for draw in draws.iter().rev() {
        table.add_row(vec![
            draw.draw_no.to_string(),
            draw.date.to_string(),
            draw.numbers.to_string(),
            format!("{:2}", draw.bonus),
        ]);
    }
    println!("{table}");
}

pub fn display_stats(snapshot: &AnalyticsSnapshot, top: usize) {
    println!(
        "\n📊 Statistiques sur {} tirages (dernier : n°{})\n",
        snapshot.history_len, snapshot.latest_draw_no
    );

    let ranked = snapshot.by_frequency();
    let top = top.min(ranked.len());

    println!("── Numéros les plus fréquents ──");
    display_number_table(snapshot, &ranked[..top]);

    println!("\n── Numéros les moins fréquents ──");
    let coldest: Vec<(u8, u32)> = ranked.iter().rev().take(top).copied().collect();
    display_number_table(snapshot, &coldest);

    println!("\n── Plus longs retards ──");
    let mut gaps: Vec<u8> = (1..=MAX_NUMBER).collect();
    gaps.sort_by(|a, b| snapshot.gap_of(*b).cmp(&snapshot.gap_of(*a)).then(a.cmp(b)));
    let overdue: Vec<(u8, u32)> = gaps.iter().take(top).map(|&n| (n, snapshot.frequency(n))).collect();
    display_number_table(snapshot, &overdue);

    println!(
        "\nSomme des 6 numéros : moyenne {:.1}, écart-type {:.1}",
        snapshot.sum_stats.mean, snapshot.sum_stats.std_dev
    );

    println!("\n── Pair / impair (impairs:pairs) ──");
    display_distribution(&snapshot.odd_even);
    println!("\n── Profil par tiers (1-15, 16-30, 31-45, ordre décroissant) ──");
    display_distribution(&snapshot.sections);
    println!("\n── Numéros consécutifs ──");
    display_distribution(&snapshot.consecutive);
}

fn display_number_table(snapshot: &AnalyticsSnapshot, rows: &[(u8, u32)]) {
    let mut table = new_table(vec!["Numéro", "Fréquence", "Récente", "Retard"]);
    for &(n, _) in rows {
        let observed = snapshot.observed_frequency[(n - 1) as usize];
        table.add_row(vec![
            format!("{:2}", n),
            observed.to_string(),
            snapshot.recent(n).to_string(),
            snapshot.gap_of(n).to_string(),
        ]);
    }
    println!("{table}");
}

fn display_distribution<K: Copy + Eq + Hash + Ord + Display>(distribution: &Distribution<K>) {
    let total = distribution.total().max(1) as f64;
    let mut table = new_table(vec!["Rang", "Motif", "Tirages", "Part"]);
    for (rank, (key, count)) in distribution.ranked().iter().enumerate() {
        table.add_row(vec![
            (rank + 1).to_string(),
            key.to_string(),
            count.to_string(),
            format!("{:.1} %", *count as f64 * 100.0 / total),
        ]);
    }
    println!("{table}");
}

pub fn display_grade(combination: &Combination, report: &GradeReport) {
    println!("\n🎯 Grille {}\n", combination);

    let b = &report.breakdown;
    let mut table = new_table(vec!["Critère", "Points"]);
    let sum = b.sum.map_or("ignoré".to_string(), |p| format!("{:+}", p));
    table.add_row(vec!["Base".to_string(), "70".to_string()]);
    table.add_row(vec!["Somme".to_string(), sum]);
    table.add_row(vec!["Consécutifs".to_string(), format!("{:+}", b.consecutive)]);
    table.add_row(vec!["Pair / impair".to_string(), format!("{:+}", b.odd_even)]);
    table.add_row(vec!["Tranches".to_string(), format!("{:+}", b.section)]);
    table.add_row(vec!["Quadruplets".to_string(), format!("{:+}", b.quadruplet)]);
    println!("{table}");

    println!("Score : {} / 200, note : {}", report.score, report.grade);
}

pub fn display_matches(matches: &[(u32, PrizeTier)]) {
    if matches.is_empty() {
        println!("\nCette grille n'aurait rien gagné sur l'historique.");
        return;
    }

    println!("\n🏆 Gains passés ({} tirage(s))\n", matches.len());
    let mut table = new_table(vec!["Tirage", "Rang"]);
    for (draw_no, tier) in matches {
        let cell = match tier {
            PrizeTier::First | PrizeTier::Second => Cell::new(tier.to_string()).fg(Color::Green),
            _ => Cell::new(tier.to_string()),
        };
        table.add_row(vec![Cell::new(draw_no), cell]);
    }
    println!("{table}");
}

pub fn display_recommendations(recommendations: &[Recommendation]) {
    println!("\n🎲 Grilles recommandées\n");

    let mut table = new_table(vec!["#", "Numéros", "Score", "Note", "Origine", "Survivants"]);
    for (i, rec) in recommendations.iter().enumerate() {
        let origin = match rec.origin {
            Origin::Search => "recherche",
            Origin::Fallback => "repli",
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(rec.combination.to_string()),
            Cell::new(format!("{:.1}", rec.score)),
            Cell::new(format!("{} ({})", rec.grade.grade, rec.grade.score)).fg(grade_color(rec.grade.grade)),
            Cell::new(origin),
            Cell::new(format!("{}/{}", rec.stats.survivors, rec.stats.iterations)),
        ]);
    }
    println!("{table}");
}

pub fn display_quick_picks(picks: &[Combination]) {
    let mut table = new_table(vec!["#", "Numéros"]);
    for (i, pick) in picks.iter().enumerate() {
        table.add_row(vec![(i + 1).to_string(), pick.to_string()]);
    }
    println!("{table}");
}
