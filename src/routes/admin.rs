use actix_web::{web, HttpResponse};

use crate::configuration::Settings;
use crate::error::{AppError, AuthError};
use crate::middleware::ApiMetrics;
use crate::repository::Repository;

/// GET /admin/metrics
pub async fn metrics(metrics: web::Data<ApiMetrics>) -> HttpResponse {
    let page = format!(
        r#"<html>
  <body>
    <h1>Welcome, Postboard Admin</h1>
    <p>The front-end has been visited {} times!</p>
  </body>
</html>"#,
        metrics.hits()
    );

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(page)
}

/// POST /admin/reset
///
/// Dev platform only. Zeroes the hit counter and deletes every user,
/// which takes their posts and refresh tokens with them.
pub async fn reset(
    settings: web::Data<Settings>,
    metrics: web::Data<ApiMetrics>,
    repository: web::Data<dyn Repository>,
) -> Result<HttpResponse, AppError> {
    if !settings.application.is_dev() {
        let reason = "reset is only allowed on the dev platform".to_string();
        return Err(AuthError::Forbidden(reason).into());
    }

    metrics.reset();
    let deleted = repository.delete_all_users().await?;

    tracing::warn!(deleted_users = deleted, "State reset");
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Hits reset to 0 and all users deleted"))
}
