/// Row scanner: classify story point cells and count each row once per run
use crate::identity::row_identity;
use crate::page::{CellSnapshot, Page};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Leading decimal literal, the part of a string `parseFloat` would read
static NUMERIC_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
        .expect("valid numeric regex")
});

/// Row keys seen so far in a run. Only ever grows.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    keys: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        SeenSet {
            keys: HashSet::new(),
        }
    }

    /// Record a key, returning `true` if it was not seen before.
    pub fn insert(&mut self, key: &str) -> bool {
        if self.keys.contains(key) {
            false
        } else {
            self.keys.insert(key.to_string())
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// How a story point cell's text counts toward the totals
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointValue {
    Estimate(f64),
    /// Empty or the placeholder token
    Unestimated,
    /// Anything else; counted nowhere
    Unrecognized,
}

/// Classify trimmed cell text.
pub fn classify(text: &str, placeholder: &str) -> PointValue {
    let text = text.trim();
    if text.is_empty() || text == placeholder {
        return PointValue::Unestimated;
    }

    NUMERIC_PREFIX
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map_or(PointValue::Unrecognized, PointValue::Estimate)
}

/// What one scan added on top of the rows already seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutcome {
    pub total: f64,
    pub remaining: u32,
    pub newly_seen: HashSet<String>,
    /// Size of the seen-set after this scan
    pub distinct_seen: usize,
}

/// Scan a set of cells against the seen-set, recording new rows in it
pub fn scan_cells(
    cells: &[CellSnapshot],
    seen: &mut SeenSet,
    placeholder: &str,
    prefix_len: usize,
) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();

    for cell in cells {
        let identity = row_identity(cell, prefix_len);
        if !seen.insert(&identity.key) {
            continue;
        }

        match classify(&cell.text, placeholder) {
            PointValue::Estimate(points) => outcome.total += points,
            PointValue::Unestimated => outcome.remaining += 1,
            PointValue::Unrecognized => {
                log::debug!("Ignoring unrecognized story point text {:?}", cell.text.trim());
            }
        }
        outcome.newly_seen.insert(identity.key);
    }

    outcome.distinct_seen = seen.len();
    outcome
}

/// Scan whatever the page currently renders
pub fn scan_page<P: Page>(
    page: &P,
    seen: &mut SeenSet,
    placeholder: &str,
    prefix_len: usize,
) -> ScanOutcome {
    scan_cells(&page.story_point_cells(), seen, placeholder, prefix_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{linked_cell, TablePage};

    #[test]
    fn test_classify_numbers() {
        assert_eq!(classify("5", "None"), PointValue::Estimate(5.0));
        assert_eq!(classify(" 2.5 ", "None"), PointValue::Estimate(2.5));
        assert_eq!(classify(".5", "None"), PointValue::Estimate(0.5));
        assert_eq!(classify("-1", "None"), PointValue::Estimate(-1.0));
        assert_eq!(classify("1e2", "None"), PointValue::Estimate(100.0));
    }

    #[test]
    fn test_classify_numeric_prefix() {
        assert_eq!(classify("3 pts", "None"), PointValue::Estimate(3.0));
        assert_eq!(classify("8.", "None"), PointValue::Estimate(8.0));
    }

    #[test]
    fn test_classify_unestimated() {
        assert_eq!(classify("None", "None"), PointValue::Unestimated);
        assert_eq!(classify("", "None"), PointValue::Unestimated);
        assert_eq!(classify("   ", "None"), PointValue::Unestimated);
    }

    #[test]
    fn test_classify_unrecognized() {
        assert_eq!(classify("n/a", "None"), PointValue::Unrecognized);
        assert_eq!(classify("none", "None"), PointValue::Unrecognized);
        assert_eq!(classify("inf", "None"), PointValue::Unrecognized);
        assert_eq!(classify("infinity", "None"), PointValue::Unrecognized);
        assert_eq!(classify("NaN", "None"), PointValue::Unrecognized);
    }

    #[test]
    fn test_classify_infinity() {
        assert_eq!(classify("Infinity", "None"), PointValue::Estimate(f64::INFINITY));
        assert_eq!(classify("-Infinity", "None"), PointValue::Estimate(f64::NEG_INFINITY));
        assert_eq!(classify("Infinity pts", "None"), PointValue::Estimate(f64::INFINITY));
    }

    #[test]
    fn test_scan_totals() {
        let cells = vec![
            linked_cell("PROJ-1", "5"),
            linked_cell("PROJ-2", "3"),
            linked_cell("PROJ-3", "None"),
        ];
        let mut seen = SeenSet::new();

        let outcome = scan_cells(&cells, &mut seen, "None", 50);

        assert_eq!(outcome.total, 8.0);
        assert_eq!(outcome.remaining, 1);
        assert_eq!(outcome.newly_seen.len(), 3);
        assert_eq!(outcome.distinct_seen, 3);
    }

    #[test]
    fn test_duplicate_identity_counts_once() {
        let cells = vec![linked_cell("PROJ-9", "2.5"), linked_cell("PROJ-9", "2.5")];
        let mut seen = SeenSet::new();

        let outcome = scan_cells(&cells, &mut seen, "None", 50);

        assert_eq!(outcome.total, 2.5);
        assert_eq!(outcome.newly_seen.len(), 1);
        assert_eq!(outcome.distinct_seen, 1);
    }

    #[test]
    fn test_unrecognized_rows_are_still_seen() {
        let cells = vec![linked_cell("PROJ-1", "?"), linked_cell("PROJ-2", "1")];
        let mut seen = SeenSet::new();

        let outcome = scan_cells(&cells, &mut seen, "None", 50);

        assert_eq!(outcome.total, 1.0);
        assert_eq!(outcome.remaining, 0);
        assert_eq!(outcome.distinct_seen, 2);
        assert!(seen.contains("https://tracker.test/browse/PROJ-1"));
    }

    #[test]
    fn test_rescan_contributes_nothing() {
        let page = TablePage::static_rows(&["1", "2", "", "None"]);
        let mut seen = SeenSet::new();

        let first = scan_page(&page, &mut seen, "None", 50);
        let second = scan_page(&page, &mut seen, "None", 50);

        assert_eq!(first.total, 3.0);
        assert_eq!(first.remaining, 2);
        assert_eq!(second.total, 0.0);
        assert_eq!(second.remaining, 0);
        assert!(second.newly_seen.is_empty());
        assert_eq!(second.distinct_seen, 4);
    }

    #[test]
    fn test_fresh_scans_are_deterministic() {
        let page = TablePage::static_rows(&["1.5", "4", "None", "x"]);

        let a = scan_page(&page, &mut SeenSet::new(), "None", 50);
        let b = scan_page(&page, &mut SeenSet::new(), "None", 50);

        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_page() {
        let page = TablePage::static_rows(&[]);
        let outcome = scan_page(&page, &mut SeenSet::new(), "None", 50);

        assert_eq!(outcome, ScanOutcome::default());
    }
}
