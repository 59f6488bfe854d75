/// Scroll-drive loop: reveal a virtualized table step by step and total it
use crate::config::ExtractionConfig;
use crate::error::PageError;
use crate::page::{Page, ScrollContainer};
use crate::scanner::{scan_page, ScanOutcome, SeenSet};
use log::{debug, info};
use tokio_util::sync::CancellationToken;

/// Totals for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AggregateResult {
    pub total: f64,
    /// Distinct rows whose value was empty or the placeholder
    pub remaining_count: u32,
    /// Distinct rows seen
    pub processed_count: u32,
}

/// Why a run stopped scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    /// No scroll container; a single scan of the page as rendered
    Fallback,
    /// Consecutive scans found nothing new
    Stalled,
    BottomReached,
    /// Iteration bound hit; followed by a forced scan at the bottom
    Exhausted,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunReport {
    pub result: AggregateResult,
    pub exit: RunExit,
}

/// Mutable loop state, discarded when the run ends.
#[derive(Debug, Clone, Copy, Default)]
struct ScrollState {
    offset: f64,
    max_height: f64,
    stalls: u32,
    attempts: u32,
}

#[derive(Debug, Default)]
struct Tally {
    total: f64,
    remaining: u32,
}

impl Tally {
    fn fold(&mut self, outcome: &ScanOutcome) {
        self.total += outcome.total;
        self.remaining += outcome.remaining;
    }

    fn finish(self, seen: &SeenSet) -> AggregateResult {
        AggregateResult {
            total: self.total,
            remaining_count: self.remaining,
            processed_count: saturating_count(seen.len()),
        }
    }
}

/// Row counts travel as `u32`; saturate rather than wrap.
fn saturating_count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Scan the page once with a fresh seen-set, without scrolling.
pub fn single_pass<P: Page>(page: &P, config: &ExtractionConfig) -> AggregateResult {
    let mut seen = SeenSet::new();
    let mut tally = Tally::default();
    tally.fold(&scan(page, config, &mut seen));
    tally.finish(&seen)
}

/// Scroll through the page's row list, scanning after every step
///
/// Algorithm:
/// 1. Without a scroll container, scan once and return
/// 2. Scroll to the top and let the page settle
/// 3. Each iteration: scan, then
///    - after `stall_limit` consecutive scans with no new rows, stop
///    - if the next step would land within `bottom_tolerance` of the end,
///      scan once more and stop
///    - otherwise scroll one step, settle, and pick up any growth in height
/// 4. If `max_scroll_attempts` ran out first, jump to the end, settle for
///    longer and scan a last time
///
/// Rows are counted once no matter how many scans see them.
pub async fn drive<P: Page>(
    page: &P,
    config: &ExtractionConfig,
    cancel: &CancellationToken,
) -> Result<RunReport, PageError> {
    let Some(container) = page.scroll_container() else {
        info!("No scroll container found, scanning the page as rendered");
        return Ok(RunReport {
            result: single_pass(page, config),
            exit: RunExit::Fallback,
        });
    };

    let mut seen = SeenSet::new();
    let mut tally = Tally::default();
    let mut state = ScrollState {
        max_height: container.scroll_height()?,
        ..ScrollState::default()
    };

    container.set_scroll_top(0.0)?;
    page.settle(config.settle_delay()).await;

    let exit = loop {
        if cancel.is_cancelled() {
            break RunExit::Cancelled;
        }
        if state.attempts >= config.max_scroll_attempts {
            break RunExit::Exhausted;
        }

        let outcome = scan(page, config, &mut seen);
        tally.fold(&outcome);

        if outcome.newly_seen.is_empty() {
            state.stalls += 1;
            if state.stalls >= config.stall_limit {
                break RunExit::Stalled;
            }
        } else {
            state.stalls = 0;
        }

        state.offset = container.scroll_top()?;
        let next = (state.offset + config.scroll_step).min(state.max_height);
        debug!(
            "Scroll attempt {}: offset {} of {}, {} new rows, {} stalls",
            state.attempts,
            state.offset,
            state.max_height,
            outcome.newly_seen.len(),
            state.stalls
        );

        if next >= state.max_height - config.bottom_tolerance {
            tally.fold(&scan(page, config, &mut seen));
            break RunExit::BottomReached;
        }

        container.set_scroll_top(next)?;
        page.settle(config.settle_delay()).await;

        state.max_height = state.max_height.max(container.scroll_height()?);
        state.attempts += 1;
    };

    if exit == RunExit::Exhausted {
        container.set_scroll_top(state.max_height)?;
        page.settle(config.final_settle_delay()).await;
        tally.fold(&scan(page, config, &mut seen));
    }

    let result = tally.finish(&seen);
    info!(
        "Run ended ({:?}) after {} scroll steps: total {}, remaining {}, processed {}",
        exit, state.attempts, result.total, result.remaining_count, result.processed_count
    );
    Ok(RunReport { result, exit })
}

fn scan<P: Page>(page: &P, config: &ExtractionConfig, seen: &mut SeenSet) -> ScanOutcome {
    scan_page(page, seen, &config.placeholder, config.identity_prefix_len)
}
