//! REST-клиент отчёта по воронке: кампании, дочерние уровни, оценки

use contracts::shared::report_table::{
    AdNode, AdSetNode, CampaignNode, GradeEntry, RulesPayload, SaveGradeRequest,
    SaveGradeResponse,
};
use gloo_net::http::Request;
use serde::de::DeserializeOwned;

use crate::shared::api_utils::api_url;

const API_BASE: &str = "/api/funnel_report";

async fn get_json<T: DeserializeOwned>(path: &str) -> Result<T, String> {
    let response = Request::get(&api_url(path))
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    if !response.ok() {
        return Err(format!("HTTP error: {}", response.status()));
    }

    response
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}

/// Текущая конфигурация отчёта (rules payload)
pub async fn get_report_rules() -> Result<RulesPayload, String> {
    get_json(&format!("{}/rules", API_BASE)).await
}

/// Верхний уровень иерархии: кампании с метриками по всем окнам
pub async fn get_campaigns() -> Result<Vec<CampaignNode>, String> {
    get_json(&format!("{}/campaigns", API_BASE)).await
}

/// Ad set-ы кампании (ленивая загрузка при раскрытии строки)
pub async fn get_ad_sets(campaign_id: &str) -> Result<Vec<AdSetNode>, String> {
    get_json(&format!("{}/campaigns/{}/ad_sets", API_BASE, campaign_id)).await
}

/// Объявления ad set-а (ленивая загрузка при раскрытии строки)
pub async fn get_ads(ad_set_id: &str, campaign_id: &str) -> Result<Vec<AdNode>, String> {
    get_json(&format!(
        "{}/ad_sets/{}/ads?campaign_id={}",
        API_BASE, ad_set_id, campaign_id
    ))
    .await
}

/// Сегодняшняя оценка кампании (пустой список, если ещё не выставлена)
pub async fn get_today_grade(campaign_id: &str) -> Result<Vec<GradeEntry>, String> {
    get_json(&format!("{}/grades/{}/today", API_BASE, campaign_id)).await
}

/// История оценок кампании
pub async fn get_grade_history(campaign_id: &str) -> Result<Vec<GradeEntry>, String> {
    get_json(&format!("{}/grades/{}/history", API_BASE, campaign_id)).await
}

/// Сохранить оценку кампании за дату
pub async fn save_grade(request: &SaveGradeRequest) -> Result<SaveGradeResponse, String> {
    let response = Request::post(&api_url(&format!("{}/grades", API_BASE)))
        .json(request)
        .map_err(|e| format!("Serialize error: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    if !response.ok() {
        return Err(format!("HTTP error: {}", response.status()));
    }

    response
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}
