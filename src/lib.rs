/// Story Points - Chrome Extension that totals story points on an issue table
/// Built with Rust + WASM + Yew

pub mod config;
pub mod error;
pub mod identity;
pub mod message;
pub mod orchestrator;
pub mod page;
pub mod scanner;
pub mod scroll;
pub mod ui;
pub mod web;

#[cfg(test)]
mod fixture;

use log::{debug, error};
use std::cell::RefCell;
use tokio_util::sync::CancellationToken;
use wasm_bindgen::prelude::*;

use crate::config::ExtractionConfig;
use crate::message::ExtractionMessage;
use crate::orchestrator::{ResultSink, RunLock, RunOutcome};
use crate::web::{RuntimeMessenger, WebPage};

thread_local! {
    /// Shared by every injection into the same page
    static RUN_LOCK: RunLock = RunLock::new();
    static ACTIVE_RUN: RefCell<Option<CancellationToken>> = const { RefCell::new(None) };
}

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

/// Total the story points on the current page and post the result to the
/// extension runtime. `config` may be `undefined` or a partial settings object.
///
/// Posts a failure message instead when the page cannot be read at all, so
/// the popup always hears back.
#[wasm_bindgen]
pub async fn run_extraction(config: JsValue) {
    let (config, page) = match prepare(config) {
        Ok(prepared) => prepared,
        Err(reason) => {
            error!("Extraction could not start: {}", reason);
            RuntimeMessenger.deliver(ExtractionMessage::failed(reason));
            return;
        }
    };

    let lock = RUN_LOCK.with(RunLock::clone);
    let cancel = CancellationToken::new();
    if !lock.is_busy() {
        ACTIVE_RUN.with(|active| *active.borrow_mut() = Some(cancel.clone()));
    }

    let outcome = orchestrator::run(&page, &config, &lock, &cancel, RuntimeMessenger).await;
    if outcome != RunOutcome::Rejected {
        ACTIVE_RUN.with(|active| *active.borrow_mut() = None);
    }
    debug!("Extraction finished: {:?}", outcome);
}

fn prepare(config: JsValue) -> Result<(ExtractionConfig, WebPage), String> {
    let config: ExtractionConfig = if config.is_undefined() || config.is_null() {
        ExtractionConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config).map_err(|e| format!("bad settings: {}", e))?
    };
    let page = WebPage::from_window(config.clone()).map_err(|e| e.to_string())?;
    Ok((config, page))
}

/// Stop the run in progress, if any. It still reports what it has counted.
#[wasm_bindgen]
pub fn cancel_extraction() {
    ACTIVE_RUN.with(|active| {
        if let Some(cancel) = active.borrow().as_ref() {
            cancel.cancel();
        }
    });
}
