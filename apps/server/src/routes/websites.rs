use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use webpulse_service::MonitoringExecutor;
use webpulse_service::validation::validate_new_website;

use crate::error::ApiError;

macros_utils::routes! {
    route list_websites,
    route add_website,
    route remove_website,
    route refresh_website,
    route website_summary,
}

#[derive(Debug, Deserialize)]
pub struct AddWebsiteRequest {
    url: Option<String>,
    name: Option<String>,
}

#[derive(Serialize)]
struct Removed {
    success: bool,
}

/// Ids that are not UUIDs cannot name a website
fn website_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}

#[get("/websites")]
pub async fn list_websites(executor: web::Data<MonitoringExecutor>) -> Result<HttpResponse, ApiError> {
    let websites = executor.websites().await?;
    Ok(HttpResponse::Ok().json(websites))
}

/// Register a website and answer with it once its first check is applied
#[post("/websites")]
pub async fn add_website(
    executor: web::Data<MonitoringExecutor>,
    body: web::Json<AddWebsiteRequest>,
) -> Result<HttpResponse, ApiError> {
    let AddWebsiteRequest { url, name } = body.into_inner();
    validate_new_website(url.as_deref(), name.as_deref()).to_result()?;

    let website = executor
        .add_website(&url.unwrap_or_default(), &name.unwrap_or_default())
        .await?;
    Ok(HttpResponse::Ok().json(website))
}

#[delete("/websites/{id}")]
pub async fn remove_website(
    executor: web::Data<MonitoringExecutor>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = website_id(&path)?;

    if executor.remove_website(id).await? {
        Ok(HttpResponse::Ok().json(Removed { success: true }))
    } else {
        Err(ApiError::NotFound)
    }
}

#[post("/websites/{id}/refresh")]
pub async fn refresh_website(
    executor: web::Data<MonitoringExecutor>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = website_id(&path)?;

    let website = executor.refresh_website(id).await?;
    Ok(HttpResponse::Ok().json(website))
}

#[get("/websites/{id}/summary")]
pub async fn website_summary(
    executor: web::Data<MonitoringExecutor>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = website_id(&path)?;

    let summary = executor.website_summary(id).await?;
    Ok(HttpResponse::Ok().json(summary))
}
