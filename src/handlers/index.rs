use actix_web::{web, HttpResponse};
use tera::{Context, Tera};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Upload form page.
pub async fn index(tmpl: web::Data<Tera>, config: web::Data<Config>) -> AppResult<HttpResponse> {
    let mut context = Context::new();
    context.insert("model", &config.model);
    context.insert("export_enabled", &config.variant.export_enabled());

    let rendered = tmpl
        .render("index.html", &context)
        .map_err(|e| AppError::Internal(format!("template error: {}", e)))?;
    Ok(HttpResponse::Ok().content_type("text/html").body(rendered))
}
