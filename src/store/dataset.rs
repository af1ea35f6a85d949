//! Dataset rows and the pure merge/sort/cap core

use crate::indicator::RsiSnapshot;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

/// Exact column order of the on-disk format
pub const CSV_HEADER: [&str; 8] = [
    "Ticker",
    "Name",
    "Industry",
    "Date",
    "RSI7",
    "RSI14",
    "Yesterday_RSI7",
    "Yesterday_RSI14",
];

/// One persisted screen row; unique per (ticker, date)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenRecord {
    pub ticker: String,
    pub name: String,
    pub industry: String,
    pub date: NaiveDate,
    pub rsi7: Option<Decimal>,
    pub rsi14: Option<Decimal>,
    pub yesterday_rsi7: Option<Decimal>,
    pub yesterday_rsi14: Option<Decimal>,
}

impl ScreenRecord {
    /// Dedup key
    pub fn key(&self) -> (&str, NaiveDate) {
        (self.ticker.as_str(), self.date)
    }

    pub fn today_snapshot(&self) -> RsiSnapshot {
        RsiSnapshot {
            rsi7: self.rsi7,
            rsi14: self.rsi14,
        }
    }

    pub fn yesterday_snapshot(&self) -> RsiSnapshot {
        RsiSnapshot {
            rsi7: self.yesterday_rsi7,
            rsi14: self.yesterday_rsi14,
        }
    }
}

/// Sort invariant: date descending, ticker ascending on ties.
pub fn sort_rows(rows: &mut [ScreenRecord]) {
    rows.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.ticker.cmp(&b.ticker)));
}

/// Merge incoming rows into an existing set.
///
/// Every existing row whose key matches an incoming row is replaced, so a
/// same-day re-run never duplicates. The result satisfies the sort
/// invariant. Empty inputs are fine on either side.
pub fn merge(mut existing: Vec<ScreenRecord>, incoming: &[ScreenRecord]) -> Vec<ScreenRecord> {
    let replaced: HashSet<(&str, NaiveDate)> = incoming.iter().map(ScreenRecord::key).collect();
    existing.retain(|row| !replaced.contains(&row.key()));
    existing.extend_from_slice(incoming);
    sort_rows(&mut existing);
    existing
}

/// Key-based dedup keeping the LAST occurrence in input order, then sort.
pub fn dedup_keep_last(rows: Vec<ScreenRecord>) -> Vec<ScreenRecord> {
    let mut by_key: HashMap<(String, NaiveDate), ScreenRecord> = HashMap::new();
    for row in rows {
        by_key.insert((row.ticker.clone(), row.date), row);
    }
    let mut rows: Vec<ScreenRecord> = by_key.into_values().collect();
    sort_rows(&mut rows);
    rows
}

/// Keep the `max_rows` most recent rows under the sort invariant.
pub fn cap(mut rows: Vec<ScreenRecord>, max_rows: usize) -> Vec<ScreenRecord> {
    sort_rows(&mut rows);
    rows.truncate(max_rows);
    rows
}

/// Earliest and latest date across a row set.
pub fn date_range(rows: &[ScreenRecord]) -> Option<(NaiveDate, NaiveDate)> {
    let earliest = rows.iter().map(|r| r.date).min()?;
    let latest = rows.iter().map(|r| r.date).max()?;
    Some((earliest, latest))
}

/// Encode rows as the on-disk CSV format.
pub fn to_csv(rows: &[ScreenRecord]) -> Result<String, csv::Error> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(CSV_HEADER)?;

    for row in rows {
        wtr.write_record([
            row.ticker.as_str(),
            row.name.as_str(),
            row.industry.as_str(),
            &row.date.format("%Y-%m-%d").to_string(),
            &fmt_value(row.rsi7),
            &fmt_value(row.rsi14),
            &fmt_value(row.yesterday_rsi7),
            &fmt_value(row.yesterday_rsi14),
        ])?;
    }

    let data = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

fn fmt_value(value: Option<Decimal>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}

/// Decode the on-disk CSV format.
///
/// Returns the parsed rows plus the number of rows skipped as unreadable;
/// the caller decides whether a fully unreadable file counts as corrupt.
pub fn from_csv(text: &str) -> (Vec<ScreenRecord>, usize) {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable dataset row");
                skipped += 1;
                continue;
            }
        };
        match parse_row(&record) {
            Some(row) => rows.push(row),
            None => {
                tracing::warn!(row = ?record, "Skipping malformed dataset row");
                skipped += 1;
            }
        }
    }

    (rows, skipped)
}

fn parse_row(record: &csv::StringRecord) -> Option<ScreenRecord> {
    if record.len() < CSV_HEADER.len() {
        return None;
    }
    Some(ScreenRecord {
        ticker: record.get(0)?.to_string(),
        name: record.get(1)?.to_string(),
        industry: record.get(2)?.to_string(),
        date: NaiveDate::parse_from_str(record.get(3)?, "%Y-%m-%d").ok()?,
        rsi7: parse_value(record.get(4)?)?,
        rsi14: parse_value(record.get(5)?)?,
        yesterday_rsi7: parse_value(record.get(6)?)?,
        yesterday_rsi14: parse_value(record.get(7)?)?,
    })
}

/// Empty means absent; anything else must parse.
fn parse_value(field: &str) -> Option<Option<Decimal>> {
    if field.is_empty() {
        return Some(None);
    }
    Decimal::from_str(field).ok().map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(ticker: &str, date: (i32, u32, u32), rsi7: Decimal) -> ScreenRecord {
        ScreenRecord {
            ticker: ticker.to_string(),
            name: format!("Name {ticker}"),
            industry: "Test".to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            rsi7: Some(rsi7),
            rsi14: Some(dec!(50)),
            yesterday_rsi7: Some(dec!(45)),
            yesterday_rsi14: Some(dec!(48)),
        }
    }

    #[test]
    fn test_sort_invariant() {
        let mut rows = vec![
            record("B", (2024, 5, 1), dec!(40)),
            record("A", (2024, 5, 2), dec!(41)),
            record("A", (2024, 5, 1), dec!(42)),
            record("C", (2024, 5, 2), dec!(43)),
        ];
        sort_rows(&mut rows);
        let day2 = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let day1 = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let keys: Vec<(&str, NaiveDate)> = rows.iter().map(|r| (r.ticker.as_str(), r.date)).collect();
        assert_eq!(keys, vec![("A", day2), ("C", day2), ("A", day1), ("B", day1)]);
    }

    #[test]
    fn test_merge_replaces_same_key() {
        let existing = vec![record("A", (2024, 5, 1), dec!(40)), record("B", (2024, 5, 1), dec!(41))];
        let incoming = vec![record("A", (2024, 5, 1), dec!(72))];

        let merged = merge(existing, &incoming);
        assert_eq!(merged.len(), 2);
        let a = merged.iter().find(|r| r.ticker == "A").unwrap();
        assert_eq!(a.rsi7, Some(dec!(72)));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let existing = vec![record("A", (2024, 5, 1), dec!(40))];
        let incoming = vec![record("B", (2024, 5, 2), dec!(55)), record("A", (2024, 5, 2), dec!(60))];

        let once = merge(existing.clone(), &incoming);
        let twice = merge(once.clone(), &incoming);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_empty_inputs() {
        assert!(merge(Vec::new(), &[]).is_empty());
        let rows = vec![record("A", (2024, 5, 1), dec!(40))];
        assert_eq!(merge(rows.clone(), &[]), rows);
        assert_eq!(merge(Vec::new(), &rows), rows);
    }

    #[test]
    fn test_dedup_keeps_last_occurrence() {
        let rows = vec![
            record("A", (2024, 5, 10), dec!(40)),
            record("B", (2024, 5, 10), dec!(41)),
            record("A", (2024, 5, 10), dec!(72)),
        ];
        let deduped = dedup_keep_last(rows);
        assert_eq!(deduped.len(), 2);
        let a = deduped.iter().find(|r| r.ticker == "A").unwrap();
        assert_eq!(a.rsi7, Some(dec!(72)));
    }

    #[test]
    fn test_cap_keeps_most_recent() {
        let rows = vec![
            record("A", (2024, 5, 1), dec!(40)),
            record("A", (2024, 5, 3), dec!(41)),
            record("A", (2024, 5, 2), dec!(42)),
        ];
        let capped = cap(rows, 2);
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[0].date, NaiveDate::from_ymd_opt(2024, 5, 3).unwrap());
        assert_eq!(capped[1].date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
    }

    #[test]
    fn test_cap_noop_when_under_limit() {
        let rows = vec![record("A", (2024, 5, 1), dec!(40))];
        assert_eq!(cap(rows.clone(), 10).len(), 1);
    }

    #[test]
    fn test_csv_roundtrip_and_header() {
        let rows = vec![record("005930", (2024, 5, 1), dec!(72.5))];
        let csv = to_csv(&rows).unwrap();

        let header = csv.lines().next().unwrap();
        assert_eq!(
            header,
            "Ticker,Name,Industry,Date,RSI7,RSI14,Yesterday_RSI7,Yesterday_RSI14"
        );
        assert!(csv.lines().nth(1).unwrap().contains("2024-05-01"));
        assert!(csv.lines().nth(1).unwrap().contains("72.50"));

        let (parsed, skipped) = from_csv(&csv);
        assert_eq!(skipped, 0);
        assert_eq!(parsed, rows);
    }

    #[test]
    fn test_csv_empty_value_means_absent() {
        let text = "Ticker,Name,Industry,Date,RSI7,RSI14,Yesterday_RSI7,Yesterday_RSI14\n\
                    005930,Samsung,Chips,2024-05-01,72.50,,45.00,48.00\n";
        let (rows, skipped) = from_csv(text);
        assert_eq!(skipped, 0);
        assert_eq!(rows[0].rsi14, None);
        assert_eq!(rows[0].rsi7, Some(dec!(72.50)));
    }

    #[test]
    fn test_csv_skips_malformed_rows() {
        let text = "Ticker,Name,Industry,Date,RSI7,RSI14,Yesterday_RSI7,Yesterday_RSI14\n\
                    005930,Samsung,Chips,not-a-date,72.50,55.00,45.00,48.00\n\
                    000660,Hynix,Chips,2024-05-01,68.00,54.00,44.00,47.00\n";
        let (rows, skipped) = from_csv(text);
        assert_eq!(skipped, 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ticker, "000660");
    }

    #[test]
    fn test_date_range() {
        let rows = vec![
            record("A", (2024, 5, 3), dec!(40)),
            record("B", (2024, 4, 30), dec!(41)),
        ];
        let (earliest, latest) = date_range(&rows).unwrap();
        assert_eq!(earliest, NaiveDate::from_ymd_opt(2024, 4, 30).unwrap());
        assert_eq!(latest, NaiveDate::from_ymd_opt(2024, 5, 3).unwrap());
        assert!(date_range(&[]).is_none());
    }
}
