//! Plain-text rendering of a completed run.

use senti_core::charts::{Distribution, ScatterPoint};
use senti_core::AnalysisResult;
use std::fmt::Write as _;

const TEXT_WIDTH: usize = 40;
const EXPLANATION_WIDTH: usize = 48;
const BAR_WIDTH: usize = 40;

/// Scatter grid: score -1..=1 across, magnitude 1..=0 down.
const PLOT_COLUMNS: usize = 41;
const PLOT_ROWS: usize = 11;

/// Shorten to `max` characters on one line, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        return flat;
    }
    let mut cut: String = flat.chars().take(max.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

pub fn results_table(results: &[AnalysisResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<9} {:>6} {:>9}  {:<tw$}  {}",
        "#",
        "Sentiment",
        "Score",
        "Magnitude",
        "Text",
        "Explanation",
        tw = TEXT_WIDTH
    );
    for (index, r) in results.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>4}  {:<9} {:>6.2} {:>9.2}  {:<tw$}  {}",
            index + 1,
            r.sentiment().label(),
            r.score,
            r.magnitude,
            truncate(&r.original_text, TEXT_WIDTH),
            truncate(r.explanation_or_placeholder(), EXPLANATION_WIDTH),
            tw = TEXT_WIDTH
        );
    }
    out
}

/// Horizontal bar per bucket, scaled to the largest one.
pub fn distribution_chart(distribution: &Distribution) -> String {
    let largest = distribution
        .buckets()
        .iter()
        .map(|(_, count)| *count)
        .max()
        .unwrap_or(0);

    let mut out = String::from("Sentiment distribution\n");
    for (sentiment, count) in distribution.buckets() {
        let width = if largest == 0 {
            0
        } else {
            (count * BAR_WIDTH).div_ceil(largest)
        };
        let _ = writeln!(
            out,
            "  {:<9} {:<bw$} {count}",
            sentiment.label(),
            "█".repeat(width),
            bw = BAR_WIDTH
        );
    }
    out
}

/// Score (x) against magnitude (y). Overlapping points show as `#`.
pub fn scatter_chart(points: &[ScatterPoint]) -> String {
    let mut grid = vec![vec![' '; PLOT_COLUMNS]; PLOT_ROWS];
    for point in points {
        let column = scale(point.score + 1.0, 2.0, PLOT_COLUMNS);
        let row = PLOT_ROWS - 1 - scale(point.magnitude, 1.0, PLOT_ROWS);
        let cell = &mut grid[row][column];
        *cell = if *cell == ' ' { '*' } else { '#' };
    }

    let mut out = String::from("Magnitude vs. score\n");
    for (index, row) in grid.iter().enumerate() {
        let axis = match index {
            0 => "1.0",
            i if i == PLOT_ROWS - 1 => "0.0",
            _ => "",
        };
        let line: String = row.iter().collect();
        let _ = writeln!(out, "{axis:>5} |{}", line.trim_end());
    }
    let _ = writeln!(out, "      +{}", "-".repeat(PLOT_COLUMNS));
    let _ = writeln!(
        out,
        "      {:<half$}0{:>half$}",
        "-1",
        "1",
        half = PLOT_COLUMNS / 2
    );
    out
}

fn scale(value: f64, span: f64, cells: usize) -> usize {
    let position = (value / span).clamp(0.0, 1.0) * (cells - 1) as f64;
    position.round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use senti_core::charts;
    use test_case::test_case;

    #[test_case("short", 10, "short")]
    #[test_case("exactly ten", 11, "exactly ten")]
    #[test_case("a fairly long sentence", 10, "a fairl...")]
    #[test_case("line one\nline two", 40, "line one line two")]
    fn truncates(input: &str, max: usize, expected: &str) {
        assert_eq!(truncate(input, max), expected);
    }

    fn sample() -> Vec<AnalysisResult> {
        vec![
            AnalysisResult {
                original_text: "Great product!".into(),
                score: 0.8,
                magnitude: 0.9,
                explanation: Some("positive tone".into()),
            },
            AnalysisResult::unavailable("Terrible service."),
        ]
    }

    #[test]
    fn table_has_one_line_per_result() {
        let table = results_table(&sample());
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Sentiment"));
        assert!(lines[1].contains("Positive"));
        assert!(lines[1].contains("0.80"));
        assert!(lines[1].contains("positive tone"));
        assert!(lines[2].contains("Neutral"));
        assert!(lines[2].contains("analysis not available"));
    }

    #[test]
    fn bars_scale_to_largest_bucket() {
        let chart = distribution_chart(&Distribution {
            negative: 1,
            neutral: 0,
            positive: 2,
        });
        let lines: Vec<_> = chart.lines().collect();
        assert_eq!(lines[1].matches('█').count(), BAR_WIDTH / 2);
        assert_eq!(lines[2].matches('█').count(), 0);
        assert_eq!(lines[3].matches('█').count(), BAR_WIDTH);
        assert!(lines[3].ends_with(" 2"));
    }

    #[test]
    fn empty_distribution_has_no_bars() {
        let chart = distribution_chart(&Distribution::default());
        assert!(!chart.contains('█'));
    }

    #[test]
    fn scatter_places_points_on_the_grid() {
        let points = charts::scatter(&sample());
        let chart = scatter_chart(&points);
        let lines: Vec<_> = chart.lines().collect();

        // Title, grid rows, axis, tick labels
        assert_eq!(lines.len(), 1 + PLOT_ROWS + 2);
        // (0.0, 0.0) lands mid-way along the bottom row
        let bottom = lines[PLOT_ROWS];
        assert!(bottom.starts_with("  0.0 |"));
        assert_eq!(bottom.find('*'), Some("  0.0 |".len() + PLOT_COLUMNS / 2));
        assert_eq!(chart.matches('*').count(), 2);
    }

    #[test]
    fn overlapping_points_are_marked() {
        let points = charts::scatter(&[
            AnalysisResult::unavailable("a"),
            AnalysisResult::unavailable("b"),
        ]);
        let chart = scatter_chart(&points);
        assert_eq!(chart.matches('#').count(), 1);
        assert!(!chart.contains('*'));
    }
}
