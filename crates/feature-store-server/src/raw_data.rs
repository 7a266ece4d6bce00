//! File-backed raw data provider
//!
//! Reads OHLCV bars from one headerless CSV file per ticker under
//! `data_dir`, formatted `date,open,high,low,close,volume`. Stands in for
//! a vendor market-data feed so the server is runnable standalone; swap in
//! an HTTP or message-bus client implementing [`RawDataProvider`] for a
//! real deployment.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use feature_store_core::Bar;
use feature_store_runtime::{RawDataProvider, RuntimeError};
use std::path::{Path, PathBuf};

pub struct CsvRawDataProvider {
    data_dir: PathBuf,
}

impl CsvRawDataProvider {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn path_for(&self, ticker: &str) -> PathBuf {
        self.data_dir.join(format!("{ticker}.csv"))
    }
}

#[async_trait]
impl RawDataProvider for CsvRawDataProvider {
    async fn fetch_range(&self, ticker: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> feature_store_runtime::Result<Vec<Bar>> {
        let path = self.path_for(ticker);
        let ticker = ticker.to_string();
        tokio::task::spawn_blocking(move || read_bars(&path, &ticker, start, end))
            .await
            .map_err(|e| RuntimeError::Upstream(format!("raw data read task panicked: {e}")))?
    }
}

fn read_bars(path: &Path, ticker: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> feature_store_runtime::Result<Vec<Bar>> {
    let contents = std::fs::read_to_string(path).map_err(|_| RuntimeError::UnknownTicker(ticker.to_string()))?;

    let mut bars = Vec::new();
    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 6 {
            return Err(RuntimeError::Upstream(format!("{}:{}: expected 6 columns, got {}", path.display(), lineno + 1, fields.len())));
        }

        let date = NaiveDate::parse_from_str(fields[0].trim(), "%Y-%m-%d")
            .map_err(|e| RuntimeError::Upstream(format!("{}:{}: bad date: {e}", path.display(), lineno + 1)))?;
        let t = date.and_hms_opt(0, 0, 0).expect("midnight is always valid").and_utc();
        if t < start || t > end {
            continue;
        }

        let field = |i: usize| -> feature_store_runtime::Result<f64> {
            fields[i].trim().parse::<f64>().map_err(|e| RuntimeError::Upstream(format!("{}:{}: bad number: {e}", path.display(), lineno + 1)))
        };
        bars.push(Bar::new(t, field(1)?, field(2)?, field(3)?, field(4)?, field(5)?));
    }

    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::io::Write;

    fn write_csv(dir: &Path, ticker: &str, lines: &[&str]) {
        let mut f = std::fs::File::create(dir.join(format!("{ticker}.csv"))).unwrap();
        for line in lines {
            writeln!(f, "{line}").unwrap();
        }
    }

    #[tokio::test]
    async fn reads_bars_within_range() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "AAPL",
            &["2024-11-01,1,1,1,100,1000", "2024-11-05,1,1,1,105,1000", "2024-11-09,1,1,1,110,1000"],
        );
        let provider = CsvRawDataProvider::new(dir.path().to_path_buf());
        let end = chrono::Utc.with_ymd_and_hms(2024, 11, 8, 0, 0, 0).unwrap();
        let start = end - Duration::days(10);
        let bars = provider.fetch_range("AAPL", start, end).await.unwrap();
        assert_eq!(bars.len(), 2);
        assert!(bars.iter().all(|b| b.t <= end));
    }

    #[tokio::test]
    async fn missing_ticker_file_is_unknown_ticker() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CsvRawDataProvider::new(dir.path().to_path_buf());
        let end = Utc::now();
        let err = provider.fetch_range("NOPE", end - Duration::days(5), end).await.unwrap_err();
        assert!(matches!(err, RuntimeError::UnknownTicker(_)));
    }

    #[tokio::test]
    async fn malformed_row_is_upstream_error() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "BAD", &["not,a,valid,row"]);
        let provider = CsvRawDataProvider::new(dir.path().to_path_buf());
        let end = Utc::now();
        let err = provider.fetch_range("BAD", end - Duration::days(5), end).await.unwrap_err();
        assert!(matches!(err, RuntimeError::Upstream(_)));
    }
}
