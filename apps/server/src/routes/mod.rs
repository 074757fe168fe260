use actix_web::{HttpRequest, error::JsonPayloadError, web};

use crate::error::ApiError;

mod check;
mod health;
mod history;
mod websites;


/// Register every API route under `/api`
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::scope("/api")
            .configure(health::routes)
            .configure(check::routes)
            .configure(websites::routes)
            .configure(history::routes),
    );
}

/// Malformed bodies answer 400 with the same `{ "error" }` shape as other failures
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        ApiError::BadRequest(format!("Invalid request body: {err}")).into()
    })
}
