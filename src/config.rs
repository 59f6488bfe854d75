/// Extraction settings: page selectors and scroll-loop tuning
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for one extraction run.
///
/// Every field has a default matching the issue table layout, so the host
/// may pass a partial object (or nothing at all).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractionConfig {
    /// Elements holding a story point value
    pub cell_selector: String,
    /// The virtualized list's scrollable element
    pub container_selector: String,
    /// Ancestors tried in order when looking for a cell's row
    pub row_selectors: Vec<String>,
    pub link_selector: String,
    pub first_cell_selector: String,
    /// Text meaning "not estimated yet"
    pub placeholder: String,
    pub identity_prefix_len: usize,
    pub scroll_step: f64,
    pub settle_delay_ms: u32,
    /// Multiplier applied to the settle delay before the forced final scan
    pub final_settle_factor: u32,
    pub max_scroll_attempts: u32,
    pub stall_limit: u32,
    pub bottom_tolerance: f64,
}

impl ExtractionConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.settle_delay_ms))
    }

    pub fn final_settle_delay(&self) -> Duration {
        self.settle_delay() * self.final_settle_factor
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig {
            cell_selector:
                r#"[data-testid="issue-field-story-point-estimate-readview-full.ui.story-point-estimate"]"#
                    .to_string(),
            container_selector:
                r#"[data-testid="native-issue-table.ui.scroll-container.scroll-container"]"#
                    .to_string(),
            row_selectors: vec!["tr".to_string(), r#"[role="row"]"#.to_string()],
            link_selector: r#"a[href*="/browse/"]"#.to_string(),
            first_cell_selector: r#"td, [role="gridcell"]"#.to_string(),
            placeholder: "None".to_string(),
            identity_prefix_len: 50,
            scroll_step: 500.0,
            settle_delay_ms: 400,
            final_settle_factor: 2,
            max_scroll_attempts: 200,
            stall_limit: 3,
            bottom_tolerance: 10.0,
        }
    }
}
