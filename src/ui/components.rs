/// Result cards for the popup

use crate::message::format_total;
use crate::scroll::AggregateResult;
use yew::prelude::*;

/// What the result cards currently show
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Results {
    /// Nothing calculated yet
    Blank,
    Pending,
    /// The last attempt could not run on the page
    Unavailable,
    Ready(AggregateResult),
}

impl Results {
    pub fn total_text(&self) -> String {
        self.text(|r| format_total(r.total))
    }

    pub fn remaining_text(&self) -> String {
        self.text(|r| r.remaining_count.to_string())
    }

    pub fn processed_text(&self) -> String {
        self.text(|r| r.processed_count.to_string())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Results::Pending)
    }

    fn text(&self, field: impl Fn(&AggregateResult) -> String) -> String {
        match self {
            Results::Blank => "0".to_string(),
            Results::Pending => "...".to_string(),
            Results::Unavailable => "—".to_string(),
            Results::Ready(result) => field(result),
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct StatCardProps {
    pub label: AttrValue,
    pub value: String,
    #[prop_or(false)]
    pub loading: bool,
    #[prop_or_default]
    pub accent: AttrValue,
}

#[function_component(StatCard)]
pub fn stat_card(props: &StatCardProps) -> Html {
    let value_class = classes!("stat-value", props.loading.then_some("loading"));
    let color = if props.accent.is_empty() { "#5B4FE8" } else { props.accent.as_str() };

    html! {
        <div class="stat-card">
            <p class="stat-label">{&props.label}</p>
            <p class={value_class} style={format!("color: {};", color)}>{&props.value}</p>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ResultCardsProps {
    pub results: Results,
}

#[function_component(ResultCards)]
pub fn result_cards(props: &ResultCardsProps) -> Html {
    let results = props.results;
    let loading = results.is_pending();

    html! {
        <div class="stat-grid">
            <StatCard label="Total Points" value={results.total_text()} {loading} />
            <StatCard label="Remaining" value={results.remaining_text()} {loading} accent="#ff9800" />
            <StatCard label="Processed Tasks" value={results.processed_text()} {loading} accent="#4caf50" />
        </div>
    }
}
