/// Browser implementation of the page capability, used by the content script
use crate::config::ExtractionConfig;
use crate::error::PageError;
use crate::message::ExtractionMessage;
use crate::orchestrator::ResultSink;
use crate::page::{CellSnapshot, Page, RowSnapshot, ScrollContainer};
use log::{error, warn};
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, HtmlAnchorElement};

// Import JS bridge functions
#[wasm_bindgen(module = "/bridge/content.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    fn sendRuntimeMessage(message: JsValue) -> Result<(), JsValue>;
}

/// The live document of the page the script was injected into.
pub struct WebPage {
    document: Document,
    config: ExtractionConfig,
}

impl WebPage {
    pub fn from_window(config: ExtractionConfig) -> Result<Self, PageError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| PageError::Js("no document to scan".to_string()))?;
        Ok(WebPage { document, config })
    }

    fn snapshot(&self, cell: &Element) -> CellSnapshot {
        CellSnapshot {
            text: cell.text_content().unwrap_or_default(),
            row: self.enclosing_row(cell).map(|row| self.row_snapshot(&row)),
            sibling_index: sibling_index(cell),
        }
    }

    fn enclosing_row(&self, cell: &Element) -> Option<Element> {
        self.config
            .row_selectors
            .iter()
            .find_map(|selector| cell.closest(selector).ok().flatten())
    }

    fn row_snapshot(&self, row: &Element) -> RowSnapshot {
        let link = row.query_selector(&self.config.link_selector).ok().flatten();
        let first_cell = row
            .query_selector(&self.config.first_cell_selector)
            .ok()
            .flatten();

        RowSnapshot {
            link_href: link.as_ref().map(|link| match link.dyn_ref::<HtmlAnchorElement>() {
                Some(anchor) => anchor.href(),
                None => link.get_attribute("href").unwrap_or_default(),
            }),
            link_text: link.as_ref().map(|link| link.text_content().unwrap_or_default()),
            first_cell_text: first_cell.and_then(|cell| cell.text_content()),
        }
    }
}

fn sibling_index(element: &Element) -> Option<usize> {
    let children = element.parent_element()?.children();
    (0..children.length()).position(|i| children.item(i).as_ref() == Some(element))
}

impl Page for WebPage {
    type Container = WebScrollContainer;

    fn story_point_cells(&self) -> Vec<CellSnapshot> {
        let nodes = match self.document.query_selector_all(&self.config.cell_selector) {
            Ok(nodes) => nodes,
            Err(e) => {
                warn!("Story point selector failed: {:?}", e);
                return Vec::new();
            }
        };

        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|cell| self.snapshot(&cell))
            .collect()
    }

    fn scroll_container(&self) -> Option<WebScrollContainer> {
        self.document
            .query_selector(&self.config.container_selector)
            .ok()
            .flatten()
            .map(|element| WebScrollContainer { element })
    }

    fn settle(&self, delay: Duration) -> impl Future<Output = ()> {
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            let scheduled = web_sys::window().map(|window| {
                window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis)
            });
            if !matches!(scheduled, Some(Ok(_))) {
                let _ = resolve.call0(&JsValue::NULL);
            }
        });

        async move {
            if let Err(e) = JsFuture::from(promise).await {
                warn!("Settle timer failed: {:?}", e);
            }
        }
    }
}

/// The table's scrollable element. Fails once it leaves the document.
pub struct WebScrollContainer {
    element: Element,
}

impl WebScrollContainer {
    fn attached(&self) -> Result<&Element, PageError> {
        if self.element.is_connected() {
            Ok(&self.element)
        } else {
            Err(PageError::ContainerDetached)
        }
    }
}

impl ScrollContainer for WebScrollContainer {
    fn scroll_top(&self) -> Result<f64, PageError> {
        Ok(f64::from(self.attached()?.scroll_top()))
    }

    fn set_scroll_top(&self, offset: f64) -> Result<(), PageError> {
        self.attached()?.set_scroll_top(offset.round() as i32);
        Ok(())
    }

    fn scroll_height(&self) -> Result<f64, PageError> {
        Ok(f64::from(self.attached()?.scroll_height()))
    }
}

/// Posts the result to the extension runtime, where the popup listens.
pub struct RuntimeMessenger;

impl ResultSink for RuntimeMessenger {
    fn deliver(self, message: ExtractionMessage) {
        let value = match serde_wasm_bindgen::to_value(&message) {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to serialize result: {:?}", e);
                return;
            }
        };
        if let Err(e) = sendRuntimeMessage(value) {
            error!("Failed to send result: {:?}", e);
        }
    }
}
