use chrono::Local;
use contracts::shared::report_table::{CampaignGrade, CampaignNode, GradeEntry, SaveGradeRequest};
use leptos::logging::log;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::dashboards::d400_funnel_report::api;

/// Панель оценки кампании: сегодняшняя оценка, история и форма сохранения
#[component]
pub fn GradePanel(
    /// Кампания, для которой выставляется оценка
    campaign: CampaignNode,
    #[prop(into)] on_close: Callback<()>,
    /// Вызывается после успешного сохранения с id кампании и новой записью
    #[prop(into)] on_saved: Callback<(String, GradeEntry)>,
) -> impl IntoView {
    let campaign_id = campaign.id.clone();
    let campaign_name = campaign.name.clone();
    let platform = campaign
        .ad_source
        .clone()
        .unwrap_or_else(|| "meta".to_string());

    let today_grade = RwSignal::new(None::<GradeEntry>);
    let history = RwSignal::new(Vec::<GradeEntry>::new());
    let selected = RwSignal::new(CampaignGrade::Good);
    let comment = RwSignal::new(String::new());
    let saving = RwSignal::new(false);
    let saved_flash = RwSignal::new(false);

    // Загрузка сегодняшней оценки и истории при открытии панели
    spawn_local({
        let campaign_id = campaign_id.clone();
        async move {
            match api::get_today_grade(&campaign_id).await {
                Ok(entries) => {
                    let entry = entries.into_iter().next();
                    if let Some(grade) = entry
                        .as_ref()
                        .and_then(|e| CampaignGrade::from_code(&e.grade))
                    {
                        selected.set(grade);
                    }
                    today_grade.set(entry);
                }
                Err(e) => log!("today grade fetch failed: {}", e),
            }
            match api::get_grade_history(&campaign_id).await {
                Ok(entries) => history.set(entries),
                Err(e) => log!("grade history fetch failed: {}", e),
            }
        }
    });

    let save = move |_| {
        if saving.get_untracked() {
            return;
        }
        saving.set(true);
        let comment_text = comment.get_untracked();
        let request = SaveGradeRequest {
            campaign_id: campaign_id.clone(),
            date: Local::now().date_naive(),
            grade: selected.get_untracked().as_code().to_string(),
            comment: (!comment_text.trim().is_empty()).then(|| comment_text.trim().to_string()),
            platform: platform.clone(),
        };
        let id = campaign_id.clone();
        spawn_local(async move {
            match api::save_grade(&request).await {
                Ok(_) => {
                    let entry = GradeEntry {
                        date: request.date,
                        grade: request.grade.clone(),
                        comment: request.comment.clone(),
                    };
                    // Оптимистичное обновление: панель и дерево кампаний
                    // получают новую запись сразу после подтверждения
                    today_grade.set(Some(entry.clone()));
                    history.update(|list| list.insert(0, entry.clone()));
                    on_saved.run((id, entry));
                    saving.set(false);
                    saved_flash.set(true);
                    gloo_timers::future::TimeoutFuture::new(2_000).await;
                    saved_flash.set(false);
                }
                Err(e) => {
                    // Локальное состояние не трогаем, оператор может повторить
                    log!("grade save failed: {}", e);
                    saving.set(false);
                }
            }
        });
    };

    view! {
        <div class="grade-panel-overlay" on:click=move |_| on_close.run(())>
            <div class="grade-panel" on:click=move |ev| ev.stop_propagation()>
                <div class="grade-panel__header">
                    <h3>{format!("Оценка кампании: {}", campaign_name)}</h3>
                    <button class="btn-close" on:click=move |_| on_close.run(())>
                        {"✕"}
                    </button>
                </div>

                <div class="grade-panel__today">
                    {move || match today_grade.get() {
                        Some(entry) => {
                            view! {
                                <p>
                                    {"Сегодня: "}
                                    <strong>{entry.grade_label()}</strong>
                                    {entry
                                        .comment
                                        .as_ref()
                                        .map(|c| format!(": {}", c))
                                        .unwrap_or_default()}
                                </p>
                            }
                                .into_any()
                        }
                        None => {
                            view! { <p class="muted">{"Сегодня оценка ещё не выставлена"}</p> }
                                .into_any()
                        }
                    }}
                </div>

                <div class="grade-panel__picker">
                    {CampaignGrade::all()
                        .into_iter()
                        .map(|grade| {
                            view! {
                                <button
                                    class="grade-option"
                                    class:grade-option--selected=move || selected.get() == grade
                                    on:click=move |_| selected.set(grade)
                                >
                                    {grade.label()}
                                </button>
                            }
                        })
                        .collect_view()}
                </div>

                <textarea
                    class="grade-panel__comment"
                    placeholder="Комментарий (необязательно)"
                    prop:value=move || comment.get()
                    on:input=move |ev| comment.set(event_target_value(&ev))
                ></textarea>

                <div class="grade-panel__actions">
                    <button class="btn btn-primary" disabled=move || saving.get() on:click=save>
                        {move || if saving.get() { "Сохранение..." } else { "Сохранить" }}
                    </button>
                    {move || {
                        saved_flash
                            .get()
                            .then(|| view! { <span class="saved-flash">{"Сохранено"}</span> })
                    }}
                </div>

                <div class="grade-panel__history">
                    <h4>{"История оценок"}</h4>
                    {move || {
                        let entries = history.get();
                        if entries.is_empty() {
                            view! { <p class="muted">{"История пуста"}</p> }.into_any()
                        } else {
                            entries
                                .into_iter()
                                .map(|entry| {
                                    view! {
                                        <div class="grade-history-row">
                                            <span class="grade-history-row__date">
                                                {entry.date.format("%d.%m.%Y").to_string()}
                                            </span>
                                            <span class="grade-history-row__grade">
                                                {entry.grade_label()}
                                            </span>
                                            <span class="grade-history-row__comment">
                                                {entry.comment.clone().unwrap_or_default()}
                                            </span>
                                        </div>
                                    }
                                })
                                .collect_view()
                                .into_any()
                        }
                    }}
                </div>
            </div>
        </div>
    }
}
