/// The result message sent from the page to the popup
use crate::scroll::AggregateResult;
use serde::{Deserialize, Serialize};

pub const SEND_TOTAL_ACTION: &str = "sendTotal";
/// Sent instead of a result when the page side could not run at all
pub const EXTRACTION_FAILED_ACTION: &str = "extractionFailed";

/// Wire shape of a run's result.
///
/// Older page scripts never sent `processed`, and the popup reads any
/// missing number as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMessage {
    pub action: String,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub remaining: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What the popup makes of a message from the page
#[derive(Debug, Clone, PartialEq)]
pub enum PageReport {
    Totals(AggregateResult),
    Failed(String),
}

impl ExtractionMessage {
    pub fn failed(reason: impl Into<String>) -> Self {
        ExtractionMessage {
            action: EXTRACTION_FAILED_ACTION.to_string(),
            total: 0.0,
            remaining: 0,
            processed: None,
            error: Some(reason.into()),
        }
    }

    /// `None` for messages of any other action.
    pub fn into_report(self) -> Option<PageReport> {
        match self.action.as_str() {
            SEND_TOTAL_ACTION => Some(PageReport::Totals(self.into_result())),
            EXTRACTION_FAILED_ACTION => Some(PageReport::Failed(
                self.error.unwrap_or_else(|| "extraction failed".to_string()),
            )),
            _ => None,
        }
    }

    pub fn into_result(self) -> AggregateResult {
        AggregateResult {
            total: self.total,
            remaining_count: self.remaining,
            processed_count: self.processed.unwrap_or(0),
        }
    }
}

impl From<AggregateResult> for ExtractionMessage {
    fn from(result: AggregateResult) -> Self {
        ExtractionMessage {
            action: SEND_TOTAL_ACTION.to_string(),
            total: result.total,
            remaining: result.remaining_count,
            processed: Some(result.processed_count),
            error: None,
        }
    }
}

/// Whole numbers without a fraction, anything else to two decimals
pub fn format_total(total: f64) -> String {
    if total.fract() == 0.0 {
        format!("{}", total)
    } else {
        format!("{:.2}", total)
    }
}
