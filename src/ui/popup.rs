/// Popup UI: trigger a calculation on the active page and show the result

use yew::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use log::{debug, error};
use patternfly_yew::prelude::*;
use crate::error::ReportError;
use crate::message::{ExtractionMessage, PageReport};
use crate::ui::components::{ResultCards, Results};

// Import JS bridge functions
#[wasm_bindgen(module = "/bridge/popup.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn queryActiveTab() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn injectExtractor(tab_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn reloadTab(tab_id: i32) -> Result<(), JsValue>;

    fn onRuntimeMessage(listener: &Closure<dyn FnMut(JsValue)>);

    fn offRuntimeMessage(listener: &Closure<dyn FnMut(JsValue)>);
}

#[derive(Clone, PartialEq)]
enum AppState {
    Idle,
    Calculating,
    Reloading,
    Error(String),
}

impl AppState {
    fn is_busy(&self) -> bool {
        matches!(self, AppState::Calculating | AppState::Reloading)
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| AppState::Idle);
    let results = use_state(|| Results::Blank);

    // Listen for the page's result message while the popup is open
    {
        let state = state.clone();
        let results = results.clone();

        use_effect_with((), move |_| {
            let listener = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
                let message: ExtractionMessage = match serde_wasm_bindgen::from_value(value) {
                    Ok(message) => message,
                    Err(e) => {
                        debug!("{}", ReportError::Decode(format!("{:?}", e)));
                        return;
                    }
                };
                match message.into_report() {
                    Some(PageReport::Totals(result)) => {
                        results.set(Results::Ready(result));
                        state.set(AppState::Idle);
                    }
                    Some(PageReport::Failed(reason)) => {
                        let e = ReportError::Injection(reason);
                        error!("Calculation failed: {}", e);
                        results.set(Results::Unavailable);
                        state.set(AppState::Error(e.to_string()));
                    }
                    None => {}
                }
            });
            onRuntimeMessage(&listener);

            move || {
                offRuntimeMessage(&listener);
                drop(listener);
            }
        });
    }

    // Calculate handler
    let on_calculate = {
        let state = state.clone();
        let results = results.clone();

        Callback::from(move |_| {
            // One run at a time
            if state.is_busy() {
                return;
            }

            let state = state.clone();
            let results = results.clone();

            state.set(AppState::Calculating);
            results.set(Results::Pending);

            spawn_local(async move {
                // Totals or a page-side failure arrive through the message listener
                if let Err(e) = start_extraction().await {
                    error!("Calculation failed: {}", e);
                    results.set(Results::Unavailable);
                    state.set(AppState::Error(e.to_string()));
                }
            });
        })
    };

    // Reload handler
    let on_reload = {
        let state = state.clone();

        Callback::from(move |_| {
            if state.is_busy() {
                return;
            }

            let state = state.clone();
            state.set(AppState::Reloading);

            spawn_local(async move {
                match reload_active_page().await {
                    Ok(_) => state.set(AppState::Idle),
                    Err(e) => {
                        error!("Reload failed: {}", e);
                        state.set(AppState::Error(e.to_string()));
                    }
                }
            });
        })
    };

    let is_busy = state.is_busy();
    let calculate_label = if *state == AppState::Calculating { "Calculating..." } else { "Calculate Total" };
    let reload_label = if *state == AppState::Reloading { "Reloading..." } else { "Reload Page" };

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Story Points"}</h1>

            <ResultCards results={*results} />

            // Status display
            {match &*state {
                AppState::Calculating | AppState::Reloading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                },
                AppState::Error(err) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                    </div>
                },
                AppState::Idle => html! {}
            }}

            <div class="flex-column-gap">
                <Button onclick={on_calculate} disabled={is_busy} variant={ButtonVariant::Primary} block={true}>
                    {calculate_label}
                </Button>
                <Button onclick={on_reload} disabled={is_busy} variant={ButtonVariant::Secondary} block={true}>
                    {reload_label}
                </Button>
            </div>

            <p class="footer-popup">
                {"Story Points v0.1.0"}
            </p>
        </div>
    }
}

// Helper functions

async fn active_tab_id() -> Result<i32, ReportError> {
    let tab_id = queryActiveTab()
        .await
        .map_err(|e| ReportError::Injection(format!("{:?}", e)))?;

    tab_id.as_f64().map(|id| id as i32).ok_or(ReportError::NoActivePage)
}

async fn start_extraction() -> Result<(), ReportError> {
    let tab_id = active_tab_id().await?;

    injectExtractor(tab_id)
        .await
        .map_err(|e| ReportError::Injection(format!("{:?}", e)))
}

async fn reload_active_page() -> Result<(), ReportError> {
    let tab_id = active_tab_id().await?;

    reloadTab(tab_id)
        .await
        .map_err(|e| ReportError::Reload(format!("{:?}", e)))
}
