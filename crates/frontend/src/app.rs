use crate::dashboards::d400_funnel_report::ui::FunnelReportPage;
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    view! { <FunnelReportPage /> }
}
