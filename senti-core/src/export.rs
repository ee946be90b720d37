//! CSV export of a completed run.
//!
//! The layout is fixed: a header line, then one line per result with the two
//! text columns always quoted and the numbers at two decimals. Lines are
//! joined by `\n` with no trailing newline.

use crate::types::AnalysisResult;
use std::fmt::Write as _;

/// Suggested file name for the export.
pub const DEFAULT_FILE_NAME: &str = "sentiment_analysis_results.csv";

/// MIME type of the export.
pub const CONTENT_TYPE: &str = "text/csv;charset=utf-8";

const HEADER: &str = "Text,Score,Magnitude,Explanation";

pub fn to_csv(results: &[AnalysisResult]) -> String {
    let mut out = String::from(HEADER);
    for r in results {
        // Writing into a String cannot fail.
        let _ = write!(
            out,
            "\n{},{},{},{}",
            quote(&r.original_text),
            fixed2(r.score),
            fixed2(r.magnitude),
            quote(r.explanation.as_deref().unwrap_or_default()),
        );
    }
    out
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Two decimals the way a browser's `toFixed(2)` writes them: exact ties
/// round away from zero, and any value below zero keeps its `-`.
fn fixed2(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    // Only multiples of 1/8 with an odd numerator sit exactly halfway.
    let eighths = abs * 8.0;
    let digits = if abs < 1e15 && eighths.fract() == 0.0 && eighths % 2.0 == 1.0 {
        let hundredths = (abs * 100.0).round() as u64;
        format!("{}.{:02}", hundredths / 100, hundredths % 100)
    } else {
        format!("{abs:.2}")
    };
    format!("{sign}{digits}")
}
