use actix_web::{HttpResponse, post, web};
use serde::Deserialize;
use webpulse_service::MonitoringExecutor;
use webpulse_service::validation::validate_check_url;

use crate::error::ApiError;

macros_utils::routes! {
    route check_route,
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    url: Option<String>,
}

/// Run an ad-hoc check; the result is kept in the global history only.
///
/// Unreachable targets still answer 200 with an `offline` result.
#[post("/check")]
pub async fn check_route(
    executor: web::Data<MonitoringExecutor>,
    body: web::Json<CheckRequest>,
) -> Result<HttpResponse, ApiError> {
    let CheckRequest { url } = body.into_inner();
    validate_check_url(url.as_deref()).to_result()?;

    let result = executor.check_url(&url.unwrap_or_default()).await?;
    Ok(HttpResponse::Ok().json(result))
}
