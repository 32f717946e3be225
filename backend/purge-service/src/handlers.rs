use actix_web::{web, HttpResponse};
use amp_cache_purge::CachePurger;
use serde::Deserialize;
use tracing::info;

use crate::error::{AppError, Result};

#[derive(Debug, Deserialize)]
pub struct PurgeParams {
    #[serde(default)]
    pub url: String,
}

/// GET /purge?url=...
pub async fn purge_get(
    purger: web::Data<CachePurger>,
    query: web::Query<PurgeParams>,
) -> Result<HttpResponse> {
    run_purge(&purger, &query.url).await
}

/// POST /purge with form field `url`
pub async fn purge_post(
    purger: web::Data<CachePurger>,
    form: web::Form<PurgeParams>,
) -> Result<HttpResponse> {
    run_purge(&purger, &form.url).await
}

async fn run_purge(purger: &CachePurger, url: &str) -> Result<HttpResponse> {
    let url = url.trim();
    if url.is_empty() {
        return Err(AppError::ValidationError("missing url parameter".into()));
    }

    let report = purger.purge_url(url).await?;
    info!(url = %url, purged = ?report.purged_variants(), "Purge request served");

    Ok(HttpResponse::Ok().content_type("text/plain").body("success"))
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health)).service(
        web::resource("/purge")
            .route(web::get().to(purge_get))
            .route(web::post().to(purge_post)),
    );
}
