//! Result writers: the ranked lineup table and the intermediate tables

use crate::config::OutputConfig;
use anyhow::{Context, Result};
use csv::Writer;
use lineup_simulator::{DuplicationRecord, FinalResult, RunReport};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

pub const LINEUP_STATISTICS_FILE: &str = "lineup_statistics.csv";
pub const SIMULATIONS_FILE: &str = "simulations.csv";
pub const RANKED_SIMULATIONS_FILE: &str = "ranked_simulations.csv";

/// Write the ranked lineups: `Player 1..Player N`, `lineups`, `Expected Money`
///
/// Player cells carry the original `position:name` tokens so the file can be
/// uploaded back to the contest site.
pub fn write_rankings<W: Write>(writer: W, results: &[FinalResult], roster_size: usize) -> csv::Result<()> {
    let mut writer = Writer::from_writer(writer);

    let mut header: Vec<String> = (1..=roster_size).map(|slot| format!("Player {slot}")).collect();
    header.push("lineups".to_string());
    header.push("Expected Money".to_string());
    writer.write_record(&header)?;

    for result in results {
        let mut record = result.raw_slots.clone();
        record.push(result.lineup_id.to_string());
        record.push(result.expected_money.to_string());
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write per-lineup ownership product, normalized share and duplication
pub fn write_lineup_statistics<W: Write>(writer: W, records: &[DuplicationRecord]) -> csv::Result<()> {
    let mut writer = Writer::from_writer(writer);
    writer.write_record(["lineup number", "prod ownership", "norm prod ownership", "duplication"])?;

    for record in records {
        writer.write_record([
            record.lineup_id.to_string(),
            format!("{:.9}", record.ownership_product),
            format!("{:.7}", record.normalized_ownership),
            format!("{:.7}", record.duplication),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write a lineups x trials matrix with `Sim 1..Sim T` columns
pub fn write_matrix<W, T>(writer: W, lineup_ids: &[u32], rows: &[Vec<T>]) -> csv::Result<()>
where
    W: Write,
    T: ToString,
{
    let mut writer = Writer::from_writer(writer);
    let trials = rows.first().map_or(0, Vec::len);

    let mut header = Vec::with_capacity(trials + 1);
    header.push("lineup".to_string());
    header.extend((1..=trials).map(|trial| format!("Sim {trial}")));
    writer.write_record(&header)?;

    for (id, row) in lineup_ids.iter().zip(rows) {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(id.to_string());
        record.extend(row.iter().map(ToString::to_string));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write every output of a run, returning the paths written
pub fn write_report(report: &RunReport, config: &OutputConfig) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    let path = config.rankings_file.clone();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    write_rankings(create(&path)?, &report.results, report.roster_size)
        .with_context(|| format!("Failed to write rankings to {}", path.display()))?;
    written.push(path);

    if let Some(tables) = &report.intermediate {
        let dir = &config.intermediate_dir;
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        let lineup_ids: Vec<u32> = report.duplication.iter().map(|record| record.lineup_id).collect();

        let path = dir.join(LINEUP_STATISTICS_FILE);
        write_lineup_statistics(create(&path)?, &report.duplication)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);

        let path = dir.join(SIMULATIONS_FILE);
        write_matrix(create(&path)?, &lineup_ids, tables.simulations.rows())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);

        let path = dir.join(RANKED_SIMULATIONS_FILE);
        write_matrix(create(&path)?, &lineup_ids, tables.ranks.rows())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    for path in &written {
        info!("Wrote {}", path.display());
    }
    Ok(written)
}

fn create(path: &std::path::Path) -> Result<File> {
    File::create(path).with_context(|| format!("Failed to create {}", path.display()))
}

/// Human-readable summary of the best `rows` lineups
pub fn format_summary(report: &RunReport, rows: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Ranked {} lineups over {} trials (seed {})",
        report.results.len(),
        report.trials,
        report.seed
    );

    for (position, result) in report.results.iter().take(rows).enumerate() {
        let _ = writeln!(
            out,
            "{:>4}. lineup {:<5} ${:>12.4}  dup {:>10.4}  {}",
            position + 1,
            result.lineup_id,
            result.expected_money,
            result.duplication,
            result.player_names.join(", ")
        );
    }

    if !report.skipped_lineups.is_empty() {
        let _ = writeln!(out, "Skipped lineups (unresolved names): {:?}", report.skipped_lineups);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: u32, money: f64) -> FinalResult {
        FinalResult {
            lineup_id: id,
            player_names: vec!["josh allen".to_string(), "nick chubb".to_string()],
            raw_slots: vec!["QB:Josh Allen".to_string(), "RB:Nick Chubb".to_string()],
            duplication: 2.0,
            total_payout: money * 2.0,
            expected_money: money,
        }
    }

    #[test]
    fn test_rankings_columns() {
        let mut buffer = Vec::new();
        write_rankings(&mut buffer, &[result(3, 1.5), result(1, 0.25)], 2).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Player 1,Player 2,lineups,Expected Money");
        assert_eq!(lines[1], "QB:Josh Allen,RB:Nick Chubb,3,1.5");
        assert_eq!(lines[2], "QB:Josh Allen,RB:Nick Chubb,1,0.25");
    }

    #[test]
    fn test_lineup_statistics_precision() {
        let record = DuplicationRecord {
            lineup_id: 1,
            ownership_product: 0.02,
            normalized_ownership: 2.0 / 3.0,
            duplication: 66.666_666_666,
        };
        let mut buffer = Vec::new();
        write_lineup_statistics(&mut buffer, &[record]).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "lineup number,prod ownership,norm prod ownership,duplication\n1,0.020000000,0.6666667,66.6666667\n"
        );
    }

    #[test]
    fn test_matrix_headers() {
        let mut buffer = Vec::new();
        write_matrix(&mut buffer, &[1, 2], &[vec![1u32, 2, 1], vec![2, 1, 1]]).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "lineup,Sim 1,Sim 2,Sim 3\n1,1,2,1\n2,2,1,1\n");
    }
}
