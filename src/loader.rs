use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use rust_decimal::Decimal;

use crate::config::DataConfig;
use crate::error::LoadError;
use crate::model::record::RawRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnMap {
    date: usize,
    open: usize,
    close: usize,
    close_name: String,
}

/// Read every row of a price CSV. Any bad row fails the whole load.
pub fn load_price_records(path: &Path, cfg: &DataConfig) -> Result<Vec<RawRecord>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let records = read_price_records(file, cfg)?;
    if records.is_empty() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }
    tracing::info!(path = %path.display(), rows = records.len(), "Loaded price rows");
    Ok(records)
}

/// Same as [`load_price_records`] over any reader; a header-only body yields `Ok(vec![])`.
pub fn read_price_records<R: Read>(reader: R, cfg: &DataConfig) -> Result<Vec<RawRecord>, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = resolve_columns(&headers, cfg)?;
    tracing::debug!(
        date = columns.date,
        open = columns.open,
        close = columns.close,
        close_name = %columns.close_name,
        "Resolved price columns"
    );

    let mut records = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let row = result?;
        let line = row
            .position()
            .map(|p| p.line())
            .unwrap_or(idx as u64 + 2);

        let date_raw = required_field(&row, columns.date, &cfg.date_column, line)?;
        let date = parse_date(date_raw, &cfg.date_formats).ok_or_else(|| LoadError::InvalidDate {
            line,
            value: date_raw.to_string(),
        })?;
        let open = price_field(&row, columns.open, &cfg.open_column, line)?;
        let close = price_field(&row, columns.close, &columns.close_name, line)?;

        records.push(RawRecord {
            line,
            date,
            open,
            close,
        });
    }
    Ok(records)
}

fn normalize_header(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').trim().to_lowercase()
}

fn resolve_columns(headers: &StringRecord, cfg: &DataConfig) -> Result<ColumnMap, LoadError> {
    let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
    let find = |name: &str| {
        let wanted = normalize_header(name);
        normalized.iter().position(|h| *h == wanted)
    };

    let date = find(cfg.date_column.as_str())
        .ok_or_else(|| LoadError::MissingColumn(cfg.date_column.clone()))?;
    let open = find(cfg.open_column.as_str())
        .ok_or_else(|| LoadError::MissingColumn(cfg.open_column.clone()))?;
    let (close, close_name) = cfg
        .close_columns
        .iter()
        .filter(|name| !name.trim().is_empty())
        .find_map(|name| find(name.as_str()).map(|idx| (idx, name.clone())))
        .ok_or_else(|| {
            LoadError::MissingColumn(
                cfg.close_columns
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "Close".to_string()),
            )
        })?;

    Ok(ColumnMap {
        date,
        open,
        close,
        close_name,
    })
}

fn required_field<'r>(
    row: &'r StringRecord,
    idx: usize,
    column: &str,
    line: u64,
) -> Result<&'r str, LoadError> {
    row.get(idx)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| LoadError::MissingValue {
            line,
            column: column.to_string(),
        })
}

fn price_field(row: &StringRecord, idx: usize, column: &str, line: u64) -> Result<Decimal, LoadError> {
    let raw = required_field(row, idx, column, line)?;
    parse_price(raw).ok_or_else(|| LoadError::InvalidPrice {
        line,
        column: column.to_string(),
        value: raw.to_string(),
    })
}

pub fn parse_date(raw: &str, formats: &[String]) -> Option<NaiveDate> {
    let raw = raw.trim();
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Largest accepted price magnitude. Keeps every `close - open` and every
/// monthly sum well inside `Decimal` range.
const MAX_ABS_PRICE: i64 = 1_000_000_000_000_000;

/// Parse a price cell.
///
/// Accepted shape: optional `+`/`-`, optional single `$`, then ASCII digits
/// with at most one `.`. The integer part may be grouped with `,` in groups
/// of three. Magnitude is capped at `MAX_ABS_PRICE`. `-$3.10`, `$1,234.50`
/// and `99` are valid; `$`, `USD 5`, `1.2.3`, `1,2,3`, `1_0` and `1e2` are not.
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let s = s.strip_prefix('$').unwrap_or(s);
    if !is_plain_amount(s) {
        return None;
    }
    let cleaned: String = s.chars().filter(|c| *c != ',').collect();
    let value = Decimal::from_str(&cleaned).ok()?;
    if value > Decimal::new(MAX_ABS_PRICE, 0) {
        return None;
    }
    Some(if negative { -value } else { value })
}

fn is_plain_amount(body: &str) -> bool {
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    let (int, frac) = match body.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (body, None),
    };
    if let Some(frac) = frac {
        if !all_digits(frac) {
            return false;
        }
    }
    if int.is_empty() {
        return frac.is_some_and(|f| !f.is_empty());
    }

    let mut groups = int.split(',');
    let lead = groups.next().unwrap_or_default();
    if lead.is_empty() || !all_digits(lead) {
        return false;
    }
    if !int.contains(',') {
        return true;
    }
    lead.len() <= 3 && groups.all(|g| g.len() == 3 && all_digits(g))
}
