use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use log::warn;

use crate::history::DrawHistory;
use crate::models::DrawRecord;

/// Formats de date acceptés : ISO et format de publication coréen.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub total_records: u32,
    pub imported: u32,
    pub duplicates: u32,
    pub errors: u32,
}

/// Charge un fichier CSV `draw_no,date,n1,n2,n3,n4,n5,n6,bonus` (ligne d'en-tête
/// obligatoire, séparateur `,` ou `;`).
pub fn load_csv(path: &Path) -> Result<(DrawHistory, ImportSummary)> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;
    parse_csv(file)
}

pub fn parse_csv<R: Read>(mut input: R) -> Result<(DrawHistory, ImportSummary)> {
    let mut content = String::new();
    input.read_to_string(&mut content).context("Erreur de lecture du CSV")?;

    let delimiter = match content.lines().next() {
        Some(header) if header.contains(';') => b';',
        _ => b',',
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut summary = ImportSummary::default();
    let mut records = Vec::new();

    for record_result in reader.records() {
        summary.total_records += 1;
        let line = summary.total_records;
        match record_result {
            Ok(record) => match parse_record(&record) {
                Ok(draw) => records.push(draw),
                Err(e) => {
                    warn!("Ligne {} ignorée : {:#}", line, e);
                    summary.errors += 1;
                }
            },
            Err(e) => {
                warn!("Erreur lecture ligne {} : {}", line, e);
                summary.errors += 1;
            }
        }
    }

    records.sort_by_key(|d| d.draw_no);

    let mut history = DrawHistory::new();
    for draw in records {
        if history.latest().is_some_and(|last| last.draw_no == draw.draw_no) {
            warn!("Tirage n°{} en double, ignoré", draw.draw_no);
            summary.duplicates += 1;
            continue;
        }
        history.push(draw)?;
        summary.imported += 1;
    }

    Ok((history, summary))
}

fn parse_record(record: &csv::StringRecord) -> Result<DrawRecord> {
    if record.len() < 9 {
        bail!("{} champs, 9 attendus", record.len());
    }

    let get = |idx: usize| -> Result<&str> {
        record
            .get(idx)
            .with_context(|| format!("Champ manquant à l'index {}", idx))
    };

    let get_u8 = |idx: usize| -> Result<u8> {
        let s = get(idx)?;
        s.parse::<u8>()
            .with_context(|| format!("Impossible de parser '{}' (index {})", s, idx))
    };

    let draw_no_str = get(0)?;
    let draw_no: u32 = draw_no_str
        .parse()
        .with_context(|| format!("Numéro de tirage invalide : '{}'", draw_no_str))?;
    let date = parse_date(get(1)?)?;

    let numbers = [get_u8(2)?, get_u8(3)?, get_u8(4)?, get_u8(5)?, get_u8(6)?, get_u8(7)?];
    let bonus = get_u8(8)?;

    let draw = DrawRecord::new(draw_no, date, &numbers, bonus)
        .with_context(|| format!("Tirage n°{} invalide", draw_no))?;
    Ok(draw)
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .with_context(|| format!("Format de date invalide: '{}'", raw))
}
