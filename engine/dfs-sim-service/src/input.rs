//! CSV input adapters
//!
//! Turns the four uploaded tables into the plain rows the simulator takes.
//! Headers are matched case-insensitively after trimming; extra columns are
//! ignored.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use lineup_simulator::{NameMapping, PayoutRow, StatsRow};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors raised while reading an input table
#[derive(Error, Debug)]
pub enum InputError {
    #[error("{table} table could not be read: {source}")]
    Csv {
        table: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("{table} table is missing column '{column}'")]
    MissingColumn { table: &'static str, column: &'static str },

    #[error("{table} table line {line}: invalid {column} value {value:?}")]
    InvalidValue { table: &'static str, line: u64, column: &'static str, value: String },

    #[error("{table} table line {line}: {message}")]
    InvalidRow { table: &'static str, line: u64, message: String },

    #[error("{table} table has no rows")]
    Empty { table: &'static str },
}

/// Paths of the tables a run reads
#[derive(Debug, Clone, PartialEq)]
pub struct InputPaths {
    pub stats: PathBuf,
    pub lineups: PathBuf,
    pub payouts: PathBuf,
    pub mappings: Option<PathBuf>,
}

/// Fully materialized inputs for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs {
    pub stats: Vec<StatsRow>,
    pub lineups: Vec<Vec<String>>,
    pub payouts: Vec<PayoutRow>,
    pub mappings: Vec<NameMapping>,
}

/// Read every table named in `paths`
pub fn load_inputs(paths: &InputPaths) -> Result<Inputs> {
    let stats = read_stats(open(&paths.stats)?)
        .with_context(|| format!("Failed to load statistics from {}", paths.stats.display()))?;
    let lineups = read_lineups(open(&paths.lineups)?)
        .with_context(|| format!("Failed to load lineups from {}", paths.lineups.display()))?;
    let payouts = read_payouts(open(&paths.payouts)?)
        .with_context(|| format!("Failed to load payouts from {}", paths.payouts.display()))?;
    let mappings = match &paths.mappings {
        Some(path) => read_mappings(open(path)?)
            .with_context(|| format!("Failed to load name mappings from {}", path.display()))?,
        None => Vec::new(),
    };

    info!(
        "Loaded {} players, {} lineups, {} payout ranks, {} name mappings",
        stats.len(),
        lineups.len(),
        payouts.len(),
        mappings.len()
    );
    Ok(Inputs { stats, lineups, payouts, mappings })
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open {}", path.display()))
}

/// Read the player statistics table
pub fn read_stats<R: Read>(reader: R) -> Result<Vec<StatsRow>, InputError> {
    const TABLE: &str = "statistics";
    let mut reader = csv_reader(reader);
    let headers = headers(&mut reader, TABLE)?;

    let name = column(&headers, TABLE, "Name")?;
    let projection = column(&headers, TABLE, "Projection")?;
    let std_dev = column(&headers, TABLE, "Std Dev")?;
    let ownership = column(&headers, TABLE, "Ownership%")?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| InputError::Csv { table: TABLE, source })?;
        let line = line_of(&record);

        let player = field(&record, name);
        if player.is_empty() {
            return Err(InputError::InvalidRow { table: TABLE, line, message: "empty player name".to_string() });
        }

        rows.push(StatsRow::new(
            player,
            number(&record, projection, TABLE, "Projection", line)?,
            number(&record, std_dev, TABLE, "Std Dev", line)?,
            number(&record, ownership, TABLE, "Ownership%", line)?,
        ));
    }

    non_empty(rows, TABLE)
}

/// Read the lineup table: one lineup per row, one `position:name` slot per cell
///
/// The header row only labels positions and is skipped. Empty cells are
/// dropped; the simulator rejects rows whose slot count differs.
pub fn read_lineups<R: Read>(reader: R) -> Result<Vec<Vec<String>>, InputError> {
    const TABLE: &str = "lineups";
    let mut reader = csv_reader(reader);
    headers(&mut reader, TABLE)?;

    let mut lineups = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| InputError::Csv { table: TABLE, source })?;
        let slots: Vec<String> =
            record.iter().map(str::trim).filter(|cell| !cell.is_empty()).map(str::to_string).collect();
        if !slots.is_empty() {
            lineups.push(slots);
        }
    }

    non_empty(lineups, TABLE)
}

/// Read the payout table from its first two columns, rank then prize
pub fn read_payouts<R: Read>(reader: R) -> Result<Vec<PayoutRow>, InputError> {
    const TABLE: &str = "payouts";
    let mut reader = csv_reader(reader);
    let headers = headers(&mut reader, TABLE)?;
    if headers.len() < 2 {
        return Err(InputError::MissingColumn { table: TABLE, column: "payout" });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| InputError::Csv { table: TABLE, source })?;
        let line = line_of(&record);
        let rank = parse_rank(field(&record, 0)).ok_or_else(|| InputError::InvalidValue {
            table: TABLE,
            line,
            column: "rank",
            value: field(&record, 0).to_string(),
        })?;
        rows.push(PayoutRow::new(rank, number(&record, 1, TABLE, "payout", line)?));
    }

    non_empty(rows, TABLE)
}

/// Read the optional lineup-name to statistics-name mapping table
pub fn read_mappings<R: Read>(reader: R) -> Result<Vec<NameMapping>, InputError> {
    const TABLE: &str = "mappings";
    let mut reader = csv_reader(reader);
    let headers = headers(&mut reader, TABLE)?;

    let lineup_name = column(&headers, TABLE, "lineup name")?;
    let stats_name = column(&headers, TABLE, "statistics name")?;

    let mut mappings = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| InputError::Csv { table: TABLE, source })?;
        let (from, to) = (field(&record, lineup_name), field(&record, stats_name));
        if !from.is_empty() && !to.is_empty() {
            mappings.push(NameMapping::new(from, to));
        }
    }

    Ok(mappings)
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new().has_headers(true).flexible(true).trim(Trim::All).from_reader(reader)
}

fn headers<R: Read>(reader: &mut csv::Reader<R>, table: &'static str) -> Result<StringRecord, InputError> {
    reader.headers().cloned().map_err(|source| InputError::Csv { table, source })
}

fn column(headers: &StringRecord, table: &'static str, column: &'static str) -> Result<usize, InputError> {
    headers
        .iter()
        .position(|header| header.trim_start_matches('\u{feff}').trim().eq_ignore_ascii_case(column))
        .ok_or(InputError::MissingColumn { table, column })
}

fn field(record: &StringRecord, index: usize) -> &str {
    record.get(index).map(str::trim).unwrap_or("")
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|position| position.line()).unwrap_or(0)
}

/// Parse a number, tolerating `$`, thousands separators and a trailing `%`
fn number(
    record: &StringRecord,
    index: usize,
    table: &'static str,
    column: &'static str,
    line: u64,
) -> Result<f64, InputError> {
    let raw = field(record, index);
    let cleaned: String = raw.trim_end_matches('%').chars().filter(|c| *c != '$' && *c != ',').collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| InputError::InvalidValue { table, line, column, value: raw.to_string() })
}

/// Ranks may be written as integers or as whole floats such as `3.0`
fn parse_rank(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().or_else(|| {
        let value = raw.parse::<f64>().ok()?;
        (value.fract() == 0.0 && value >= 0.0 && value <= u32::MAX as f64).then_some(value as u32)
    })
}

fn non_empty<T>(rows: Vec<T>, table: &'static str) -> Result<Vec<T>, InputError> {
    if rows.is_empty() {
        return Err(InputError::Empty { table });
    }
    Ok(rows)
}
