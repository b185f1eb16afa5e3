use contracts::shared::report_table::{
    compile, resolve, resolve_static, tree, AdNode, AdSetNode, CampaignNode, ExpansionStore,
    GradeEntry, HierarchyLevel, ReportNode, ReportSchema,
};
use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::dashboards::d400_funnel_report::api;
use crate::dashboards::d400_funnel_report::ui::grade_panel::GradePanel;

/// Отчёт по воронке: иерархическая таблица кампаний с ленивой подгрузкой
/// ad set-ов и объявлений
#[component]
pub fn FunnelReportPage() -> impl IntoView {
    let campaigns = RwSignal::new(Vec::<CampaignNode>::new());
    let expansion = RwSignal::new(ExpansionStore::new());
    let schema = RwSignal::new(ReportSchema::default());
    let loading = RwSignal::new(false);
    let error_msg = RwSignal::new(None::<String>);
    // Кампания, для которой открыта панель оценки
    let grade_target = RwSignal::new(None::<CampaignNode>);

    let load_report = move || {
        loading.set(true);
        error_msg.set(None);
        spawn_local(async move {
            // Схема пересобирается заново при каждой загрузке payload-а
            match api::get_report_rules().await {
                Ok(payload) => schema.set(compile(&payload)),
                Err(e) => error_msg.set(Some(e)),
            }
            match api::get_campaigns().await {
                Ok(list) => {
                    campaigns.set(list);
                    expansion.set(ExpansionStore::new());
                }
                Err(e) => error_msg.set(Some(e)),
            }
            loading.set(false);
        });
    };
    load_report();

    // Раскрытие строки кампании: повторный клик во время загрузки игнорируется,
    // уже загруженные дети открываются без повторного запроса
    let toggle_campaign = Callback::new(move |id: String| {
        let level = HierarchyLevel::Campaign;
        if expansion.get_untracked().is_expanded(level, &id) {
            expansion.update(|s| s.collapse(level, &id));
            return;
        }
        let already_loaded = campaigns
            .get_untracked()
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.ad_sets.is_some())
            .unwrap_or(false);
        if already_loaded {
            expansion.update(|s| s.expand(level, &id));
            return;
        }
        let mut may_fetch = false;
        expansion.update(|s| may_fetch = s.begin_load(level, &id));
        if !may_fetch {
            return;
        }
        spawn_local(async move {
            match api::get_ad_sets(&id).await {
                Ok(ad_sets) => {
                    campaigns.update(|list| *list = tree::attach_ad_sets(list, &id, ad_sets));
                    expansion.update(|s| s.finish_load(level, &id, true));
                }
                Err(e) => {
                    // Строка остаётся свёрнутой, оператор может повторить
                    log!("ad set fetch failed for campaign {}: {}", id, e);
                    expansion.update(|s| s.finish_load(level, &id, false));
                }
            }
        });
    });

    let toggle_ad_set = Callback::new(move |id: String| {
        let level = HierarchyLevel::AdSet;
        if expansion.get_untracked().is_expanded(level, &id) {
            expansion.update(|s| s.collapse(level, &id));
            return;
        }
        let loaded = campaigns.get_untracked();
        let ads_loaded = loaded
            .iter()
            .filter_map(|c| c.ad_sets.as_ref())
            .flatten()
            .find(|s| s.id == id)
            .map(|s| s.ads.is_some())
            .unwrap_or(false);
        if ads_loaded {
            expansion.update(|s| s.expand(level, &id));
            return;
        }
        // Кампания-владелец ищется среди уже загруженных; если её нет,
        // запрос не выполняется
        let Some(campaign_id) =
            tree::find_campaign_for_ad_set(&loaded, &id).map(|c| c.id.clone())
        else {
            return;
        };
        let mut may_fetch = false;
        expansion.update(|s| may_fetch = s.begin_load(level, &id));
        if !may_fetch {
            return;
        }
        spawn_local(async move {
            match api::get_ads(&id, &campaign_id).await {
                Ok(ads) => {
                    campaigns.update(|list| *list = tree::attach_ads(list, &id, ads));
                    expansion.update(|s| s.finish_load(level, &id, true));
                }
                Err(e) => {
                    log!("ad fetch failed for ad set {}: {}", id, e);
                    expansion.update(|s| s.finish_load(level, &id, false));
                }
            }
        });
    });

    let header = move || {
        let s = schema.get();
        let span = s.header_row_span().to_string();

        let mut statics: Vec<AnyView> = Vec::new();
        for field in &s.static_fields {
            statics.push(
                view! { <th class="static-header" rowspan=span.clone()>{field.clone()}</th> }
                    .into_any(),
            );
        }

        if !s.has_sales_grid() {
            // Одна строка шапки: окно и метрика в одной ячейке
            let mut cells: Vec<AnyView> = Vec::new();
            for tf in &s.timeframes {
                for metric in &s.event_metrics {
                    cells.push(
                        view! { <th class="metric-header">{format!("{} · {}", tf.label, metric)}</th> }
                            .into_any(),
                    );
                }
            }
            return view! { <tr>{statics}{cells}</tr> }.into_any();
        }

        // Две строки шапки: группы окон сверху, метрики снизу
        let mut groups: Vec<AnyView> = Vec::new();
        for tf in &s.timeframes {
            groups.push(
                view! { <th class="group-header" colspan=s.event_metrics.len().to_string()>{tf.label.clone()}</th> }
                    .into_any(),
            );
        }
        for tf in &s.sales_timeframes {
            groups.push(
                view! { <th class="group-header group-header--sales" colspan=s.sales_metrics.len().to_string()>{tf.label.clone()}</th> }
                    .into_any(),
            );
        }
        let mut labels: Vec<AnyView> = Vec::new();
        for _ in &s.timeframes {
            for metric in &s.event_metrics {
                labels.push(view! { <th class="metric-header">{metric.clone()}</th> }.into_any());
            }
        }
        for _ in &s.sales_timeframes {
            for metric in &s.sales_metrics {
                labels.push(
                    view! { <th class="metric-header metric-header--sales">{metric.clone()}</th> }
                        .into_any(),
                );
            }
        }
        view! {
            <>
                <tr>{statics}{groups}</tr>
                <tr>{labels}</tr>
            </>
        }
        .into_any()
    };

    let rows = move || {
        let s = schema.get();
        let state = expansion.get();
        let mut out: Vec<AnyView> = Vec::new();
        for campaign in campaigns.get() {
            let campaign_open = state.is_expanded(HierarchyLevel::Campaign, &campaign.id);
            out.push(campaign_row(&campaign, &s, &state, toggle_campaign, grade_target));
            if !campaign_open {
                continue;
            }
            let Some(ad_sets) = &campaign.ad_sets else {
                continue;
            };
            for ad_set in ad_sets {
                out.push(ad_set_row(ad_set, &s, &state, toggle_ad_set));
                if !state.is_expanded(HierarchyLevel::AdSet, &ad_set.id) {
                    continue;
                }
                let Some(ads) = &ad_set.ads else { continue };
                for ad in ads {
                    out.push(ad_row(ad, &s));
                }
            }
        }
        out
    };

    view! {
        <div class="content">
            <div class="header">
                <h2>{"Отчёт по воронке"}</h2>
                <div class="header-actions">
                    <button class="btn btn-secondary" on:click=move |_| load_report()>
                        {"Обновить"}
                    </button>
                </div>
            </div>

            {move || error_msg.get().map(|e| view! { <div class="error">{e}</div> })}
            {move || loading.get().then(|| view! { <div class="loading">{"Загрузка..."}</div> })}

            <div class="table-container">
                <table class="funnel-report-table">
                    <thead>{header}</thead>
                    <tbody>{rows}</tbody>
                </table>
            </div>

            {move || {
                grade_target
                    .get()
                    .map(|campaign| {
                        view! {
                            <GradePanel
                                campaign=campaign
                                on_close=Callback::new(move |_| grade_target.set(None))
                                on_saved=Callback::new(move |(id, entry): (String, GradeEntry)| {
                                    campaigns
                                        .update(|list| {
                                            *list = tree::apply_campaign_grade(
                                                list,
                                                &id,
                                                entry.clone(),
                                            );
                                        });
                                })
                            />
                        }
                    })
            }}
        </div>
    }
}

/// Ячейки метрик общие для всех трёх уровней иерархии
fn metric_cells<N: ReportNode>(node: &N, schema: &ReportSchema) -> Vec<AnyView> {
    let mut cells: Vec<AnyView> = Vec::new();
    for tf in &schema.timeframes {
        for metric in &schema.event_metrics {
            let value = resolve(node, &tf.key, metric);
            cells.push(view! { <td class="metric-cell">{value}</td> }.into_any());
        }
    }
    for tf in &schema.sales_timeframes {
        for metric in &schema.sales_metrics {
            let value = resolve(node, &tf.key, metric);
            cells.push(
                view! { <td class="metric-cell metric-cell--sales">{value}</td> }.into_any(),
            );
        }
    }
    cells
}

/// Колонка, в которой дочерние строки показывают своё имя: колонка
/// Campaign, а если она выключена, первая статическая колонка
fn name_cell_index(schema: &ReportSchema) -> usize {
    schema
        .static_fields
        .iter()
        .position(|f| f == "Campaign")
        .unwrap_or(0)
}

fn expander_marker(is_open: bool, is_loading: bool) -> &'static str {
    if is_loading {
        "…"
    } else if is_open {
        "▾"
    } else {
        "▸"
    }
}

fn campaign_row(
    campaign: &CampaignNode,
    schema: &ReportSchema,
    state: &ExpansionStore,
    on_toggle: Callback<String>,
    grade_target: RwSignal<Option<CampaignNode>>,
) -> AnyView {
    let is_open = state.is_expanded(HierarchyLevel::Campaign, &campaign.id);
    let is_loading = state.is_loading(HierarchyLevel::Campaign, &campaign.id);
    let marker = expander_marker(is_open, is_loading);

    let mut cells: Vec<AnyView> = Vec::new();
    for field in &schema.static_fields {
        match field.as_str() {
            "Campaign" => {
                let id = campaign.id.clone();
                let name = campaign.name.clone();
                cells.push(
                    view! {
                        <td class="static-cell static-cell--name">
                            <button class="expander" on:click=move |_| on_toggle.run(id.clone())>
                                {marker}
                            </button>
                            <span>{name}</span>
                        </td>
                    }
                    .into_any(),
                );
            }
            "Grade" => {
                let target = campaign.clone();
                cells.push(
                    view! {
                        <td class="static-cell">
                            <button
                                class="grade-button"
                                on:click=move |_| grade_target.set(Some(target.clone()))
                            >
                                {"Оценить"}
                            </button>
                        </td>
                    }
                    .into_any(),
                );
            }
            _ => {
                let value = resolve_static(campaign, field);
                cells.push(view! { <td class="static-cell">{value}</td> }.into_any());
            }
        }
    }
    cells.extend(metric_cells(campaign, schema));

    view! { <tr class="row row--campaign">{cells}</tr> }.into_any()
}

fn ad_set_row(
    ad_set: &AdSetNode,
    schema: &ReportSchema,
    state: &ExpansionStore,
    on_toggle: Callback<String>,
) -> AnyView {
    let is_open = state.is_expanded(HierarchyLevel::AdSet, &ad_set.id);
    let is_loading = state.is_loading(HierarchyLevel::AdSet, &ad_set.id);
    let marker = expander_marker(is_open, is_loading);

    let mut cells: Vec<AnyView> = Vec::new();
    for index in 0..schema.static_fields.len() {
        if index == name_cell_index(schema) {
            let id = ad_set.id.clone();
            let name = ad_set.name.clone();
            cells.push(
                view! {
                    <td class="static-cell static-cell--name" style="padding-left: 20px;">
                        <button class="expander" on:click=move |_| on_toggle.run(id.clone())>
                            {marker}
                        </button>
                        <span>{name}</span>
                    </td>
                }
                .into_any(),
            );
        } else {
            cells.push(view! { <td class="static-cell"></td> }.into_any());
        }
    }
    cells.extend(metric_cells(ad_set, schema));

    view! { <tr class="row row--ad-set">{cells}</tr> }.into_any()
}

fn ad_row(ad: &AdNode, schema: &ReportSchema) -> AnyView {
    let mut cells: Vec<AnyView> = Vec::new();
    for index in 0..schema.static_fields.len() {
        if index == name_cell_index(schema) {
            let name = ad.name.clone();
            cells.push(
                view! {
                    <td class="static-cell static-cell--name" style="padding-left: 40px;">
                        <span>{name}</span>
                    </td>
                }
                .into_any(),
            );
        } else {
            cells.push(view! { <td class="static-cell"></td> }.into_any());
        }
    }
    cells.extend(metric_cells(ad, schema));

    view! { <tr class="row row--ad">{cells}</tr> }.into_any()
}
