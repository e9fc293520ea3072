use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use contagion_core::DateRange;
use csv::{ReaderBuilder, StringRecord, Trim, Writer};
use std::fs::File;
use std::path::Path;

use crate::models::{CaseRecord, LagRow, PriceRecord};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CsvStorage;

impl CsvStorage {
    /// Reads daily case counts for one region from a CSV file.
    ///
    /// Format: region,date,new_cases (header row required)
    ///
    /// Rows for other regions and rows outside `window` are skipped, as are
    /// rows with an empty `new_cases` cell. Records are returned sorted by date.
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or a row cannot be parsed
    pub fn read_cases(
        path: impl AsRef<Path>,
        region: &str,
        window: &DateRange,
    ) -> Result<Vec<CaseRecord>> {
        let path = path.as_ref();
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_path(path)
            .with_context(|| format!("Failed to open case file: {}", path.display()))?;

        let mut records = Vec::new();
        let mut skipped = 0usize;

        for result in reader.records() {
            let row = result.with_context(|| format!("Malformed row in {}", path.display()))?;
            let line = line_of(&row);

            if !field(&row, 0, "region", line)?.eq_ignore_ascii_case(region) {
                continue;
            }

            let date = parse_date(field(&row, 1, "date", line)?, line)?;
            if !window.contains(date) {
                continue;
            }

            let raw_cases = field(&row, 2, "new_cases", line)?;
            if raw_cases.is_empty() {
                skipped += 1;
                continue;
            }

            records.push(CaseRecord::new(region, date, parse_count(raw_cases, line)?));
        }

        if skipped > 0 {
            tracing::warn!(
                path = %path.display(),
                region,
                skipped,
                "skipped case rows with empty new_cases"
            );
        }

        records.sort_by_key(|r| r.date);
        tracing::debug!(path = %path.display(), region, rows = records.len(), "read case file");
        Ok(records)
    }

    /// Reads daily OHLC prices for one instrument from a CSV file.
    ///
    /// Format: Date,Open,High,Low,Close[,...] (header row required, extra
    /// columns such as volume are ignored)
    ///
    /// Rows outside `window` are skipped, as are rows whose levels are empty
    /// or "null" (market holidays in some exports). Records are returned
    /// sorted by date.
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or a row cannot be parsed
    pub fn read_prices(
        path: impl AsRef<Path>,
        instrument: &str,
        window: &DateRange,
    ) -> Result<Vec<PriceRecord>> {
        let path = path.as_ref();
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_path(path)
            .with_context(|| format!("Failed to open price file: {}", path.display()))?;

        let mut records = Vec::new();
        let mut skipped = 0usize;

        for result in reader.records() {
            let row = result.with_context(|| format!("Malformed row in {}", path.display()))?;
            let line = line_of(&row);

            let date = parse_date(field(&row, 0, "Date", line)?, line)?;
            if !window.contains(date) {
                continue;
            }

            let levels = [
                field(&row, 1, "Open", line)?,
                field(&row, 2, "High", line)?,
                field(&row, 3, "Low", line)?,
                field(&row, 4, "Close", line)?,
            ];
            if levels
                .iter()
                .any(|v| v.is_empty() || v.eq_ignore_ascii_case("null"))
            {
                skipped += 1;
                continue;
            }

            records.push(PriceRecord {
                instrument: instrument.to_string(),
                date,
                open: parse_level(levels[0], line)?,
                high: parse_level(levels[1], line)?,
                low: parse_level(levels[2], line)?,
                close: parse_level(levels[3], line)?,
            });
        }

        if skipped > 0 {
            tracing::warn!(
                path = %path.display(),
                instrument,
                skipped,
                "skipped price rows without levels"
            );
        }

        records.sort_by_key(|r| r.date);
        tracing::debug!(path = %path.display(), instrument, rows = records.len(), "read price file");
        Ok(records)
    }

    /// Writes a lag profile to a CSV file.
    ///
    /// Format: shift,coefficient
    ///
    /// # Errors
    /// Returns error if file cannot be created or writing fails
    pub fn write_lag_profile(path: impl AsRef<Path>, rows: &[LagRow]) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        let mut writer = Writer::from_writer(file);

        writer.write_record(["shift", "coefficient"])?;

        for row in rows {
            writer.write_record(&[row.shift.to_string(), row.coefficient.to_string()])?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn line_of(row: &StringRecord) -> u64 {
    row.position().map_or(0, csv::Position::line)
}

fn field<'r>(row: &'r StringRecord, index: usize, name: &str, line: u64) -> Result<&'r str> {
    row.get(index)
        .ok_or_else(|| anyhow!("Missing column '{}' on line {}", name, line))
}

fn parse_date(raw: &str, line: u64) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .with_context(|| format!("Invalid date '{}' on line {}", raw, line))
}

// Some exports write counts as "123.0"
fn parse_count(raw: &str, line: u64) -> Result<i64> {
    if let Ok(count) = raw.parse::<i64>() {
        return Ok(count);
    }
    let value: f64 = raw
        .parse()
        .with_context(|| format!("Invalid case count '{}' on line {}", raw, line))?;
    if !value.is_finite() {
        return Err(anyhow!("Invalid case count '{}' on line {}", raw, line));
    }
    Ok(value.round() as i64)
}

fn parse_level(raw: &str, line: u64) -> Result<f64> {
    let value: f64 = raw
        .parse()
        .with_context(|| format!("Invalid price '{}' on line {}", raw, line))?;
    if !value.is_finite() {
        return Err(anyhow!("Invalid price '{}' on line {}", raw, line));
    }
    Ok(value)
}
