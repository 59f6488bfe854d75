/// Run boundary: one run at a time, and exactly one result per run
use crate::config::ExtractionConfig;
use crate::message::ExtractionMessage;
use crate::page::Page;
use crate::scroll::{drive, single_pass, RunExit};
use futures::channel::oneshot;
use log::warn;
use std::cell::Cell;
use std::rc::Rc;
use tokio_util::sync::CancellationToken;

/// Where a run's single result goes. Delivering consumes the sink.
pub trait ResultSink {
    fn deliver(self, message: ExtractionMessage);
}

impl ResultSink for oneshot::Sender<ExtractionMessage> {
    fn deliver(self, message: ExtractionMessage) {
        if self.send(message).is_err() {
            warn!("Result receiver dropped before the run finished");
        }
    }
}

/// Admits one run at a time on a page.
#[derive(Debug, Clone, Default)]
pub struct RunLock {
    busy: Rc<Cell<bool>>,
}

impl RunLock {
    pub fn new() -> Self {
        RunLock::default()
    }

    /// Claim the lock, or `None` while another run holds it.
    pub fn try_acquire(&self) -> Option<RunGuard> {
        if self.busy.replace(true) {
            None
        } else {
            Some(RunGuard {
                busy: Rc::clone(&self.busy),
            })
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }
}

/// Releases its `RunLock` when dropped.
#[derive(Debug)]
pub struct RunGuard {
    busy: Rc<Cell<bool>>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.busy.set(false);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunOutcome {
    Completed(RunExit),
    /// The scroll loop faulted and a single scan was reported instead
    Degraded,
    /// Another run was already in flight; nothing was delivered
    Rejected,
}

/// Run an extraction and deliver its result
///
/// A fault in the scroll loop is not propagated: the page is scanned once
/// more from scratch and that partial result is delivered instead.
pub async fn run<P, S>(
    page: &P,
    config: &ExtractionConfig,
    lock: &RunLock,
    cancel: &CancellationToken,
    sink: S,
) -> RunOutcome
where
    P: Page,
    S: ResultSink,
{
    let Some(_guard) = lock.try_acquire() else {
        warn!("Extraction already running on this page, ignoring trigger");
        return RunOutcome::Rejected;
    };

    let (result, outcome) = match drive(page, config, cancel).await {
        Ok(report) => (report.result, RunOutcome::Completed(report.exit)),
        Err(e) => {
            warn!("Extraction failed ({}), reporting a single scan instead", e);
            (single_pass(page, config), RunOutcome::Degraded)
        }
    };

    sink.deliver(ExtractionMessage::from(result));
    outcome
}
