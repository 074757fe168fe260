use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use webpulse_service::MonitoringExecutor;

use crate::error::ApiError;

macros_utils::routes! {
    route history_route,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    url: Option<String>,
}

/// Global check history, oldest first. An empty `url` means no filter.
#[get("/history")]
pub async fn history_route(
    executor: web::Data<MonitoringExecutor>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, ApiError> {
    let url = query.url.as_deref().filter(|url| !url.is_empty());

    let history = executor.history(url).await?;
    Ok(HttpResponse::Ok().json(history))
}
