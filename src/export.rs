//! CSV and JSON export of a computed ladder.
//!
//! CSV columns: rung, drop_pct, price, alloc_pct, invested_amount,
//! cumulative_invested, weighted_average_price, take_profit_price,
//! cumulative_invested_pct. Undefined values are written as empty cells.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ladder::{ChartData, LadderResult, LadderSummary, TrimPlan};
use crate::report::{display_rows, DisplayRow};

/// Serialize the rounded rows of a ladder to CSV.
pub fn export_csv(result: &LadderResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in display_rows(result) {
        wtr.serialize(row).context("failed to write CSV row")?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Parse rows back from [`export_csv`] output.
pub fn import_csv(text: &str) -> Result<Vec<DisplayRow>> {
    let mut rdr = csv::Reader::from_reader(text.as_bytes());
    let mut rows = Vec::new();
    for (i, record) in rdr.deserialize().enumerate() {
        let row: DisplayRow = record.with_context(|| format!("failed to parse CSV row {}", i + 1))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Write the CSV export to `path`.
pub fn write_csv(path: &Path, result: &LadderResult) -> Result<()> {
    let csv = export_csv(result)?;
    std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))
}

/// Read a CSV export from `path`.
pub fn read_csv(path: &Path) -> Result<Vec<DisplayRow>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    import_csv(&text)
}

/// Full JSON document for one ladder run.
#[derive(Debug, Serialize)]
pub struct LadderExport {
    pub generated_at: DateTime<Utc>,
    pub symbol: String,
    pub rows: Vec<DisplayRow>,
    pub summary: LadderSummary,
    pub trim: TrimPlan,
    pub chart: ChartData,
}

impl LadderExport {
    pub fn new(symbol: &str, result: &LadderResult, trim: TrimPlan) -> Self {
        Self {
            generated_at: Utc::now(),
            symbol: symbol.to_string(),
            rows: display_rows(result),
            summary: result.summary(),
            trim,
            chart: result.chart_data(),
        }
    }
}

/// Pretty JSON of rows, summary, trim plan and chart series.
///
/// Undefined averages serialize as `null`.
pub fn export_json(symbol: &str, result: &LadderResult, trim: TrimPlan) -> Result<String> {
    serde_json::to_string_pretty(&LadderExport::new(symbol, result, trim))
        .context("failed to serialize ladder to JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ladder::compute;
    use rust_decimal_macros::dec;

    fn reference_ladder() -> LadderResult {
        compute(
            190.34,
            700_000.0,
            &[-15.0, -10.0, -7.0, -10.0, -10.0],
            &[20.0, 15.0, 20.0, 20.0, 15.0],
            1.2,
        )
        .unwrap()
    }

    #[test]
    fn test_csv_header_and_rows() {
        let csv = export_csv(&reference_ladder()).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next(),
            Some(
                "rung,drop_pct,price,alloc_pct,invested_amount,cumulative_invested,\
                 weighted_average_price,take_profit_price,cumulative_invested_pct"
            )
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("Buy 1,-15,161.789"));
        assert_eq!(csv.lines().count(), 6);
    }

    #[test]
    fn test_csv_round_trip() {
        let result = reference_ladder();
        let csv = export_csv(&result).unwrap();
        let rows = import_csv(&csv).unwrap();

        assert_eq!(rows, display_rows(&result));
        assert_eq!(rows[1].price, Some(dec!(145.6101)));
        assert_eq!(rows[4].cumulative_invested, Some(dec!(630000)));
    }

    #[test]
    fn test_csv_round_trip_undefined_average() {
        let result = compute(100.0, 1_000.0, &[-10.0, -5.0], &[0.0, 50.0], 1.2).unwrap();
        let rows = import_csv(&export_csv(&result).unwrap()).unwrap();

        assert_eq!(rows[0].weighted_average_price, None);
        assert_eq!(rows[0].take_profit_price, None);
        assert_eq!(rows[1].weighted_average_price, Some(dec!(85.5)));
    }

    #[test]
    fn test_csv_keeps_large_amounts() {
        let result = compute(100.0, 1e25, &[-10.0], &[50.0], 1.2).unwrap();
        let rows = import_csv(&export_csv(&result).unwrap()).unwrap();

        assert_eq!(rows, display_rows(&result));
        assert_eq!(rows[0].invested_amount, Some(dec!(5000000000000000000000000)));
        assert_eq!(rows[0].price, Some(dec!(90)));
    }

    #[test]
    fn test_import_rejects_garbage() {
        let text = "rung,drop_pct,price,alloc_pct,invested_amount,cumulative_invested,\
                    weighted_average_price,take_profit_price,cumulative_invested_pct\n\
                    Buy 1,abc,1,1,1,1,1,1,1\n";
        assert!(import_csv(text).is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let result = reference_ladder();
        let path = std::env::temp_dir().join(format!("dca_ladder_test_{}.csv", std::process::id()));

        write_csv(&path, &result).unwrap();
        let rows = read_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(rows.len(), 5);
        assert_eq!(rows, display_rows(&result));
    }

    #[test]
    fn test_json_export() {
        let result = compute(100.0, 1_000.0, &[-10.0], &[0.0], 1.2).unwrap();
        let trim = TrimPlan::new(10_000.0, 10.0, &result);
        let json = export_json("SPXL", &result, trim).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["symbol"], "SPXL");
        assert_eq!(value["rows"][0]["rung"], "Buy 1");
        assert!(value["rows"][0]["weighted_average_price"].is_null());
        assert!(value["summary"]["final_weighted_average_price"].is_null());
        assert_eq!(value["trim"]["trim_amount"], 1000.0);
        assert_eq!(value["chart"]["prices"][0], 90.0);
    }
}
